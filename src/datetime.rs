//! Excel date serial conversion.
//!
//! Spreadsheets store dates as a day count since the 1900 epoch. Calendar conversion is done by
//! `calamine`; this module only pins the result to a time zone. The default zone is
//! Asia/Shanghai, which has been a fixed UTC+08:00 without daylight saving since 1991.
//!
//! Serials below 1 carry no date, only a time of day (a cell formatted `hh:mm`). Those are
//! placed on 1970-01-01 rather than on the 1900 epoch.

use calamine::{ExcelDateTime, ExcelDateTimeType};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

use crate::error::{MapperError, MapperResult};

const SHANGHAI_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// The Asia/Shanghai offset (UTC+08:00).
pub fn shanghai_offset() -> FixedOffset {
    FixedOffset::east_opt(SHANGHAI_UTC_OFFSET_SECS).expect("UTC+08:00 is a valid offset")
}

/// Unix timestamp (seconds) for an Excel serial read as Asia/Shanghai wall-clock time.
///
/// ```rust
/// use sheet_ingest::datetime::excel_to_timestamp;
///
/// // 1970-01-01 00:00 in Shanghai is 8 hours before the Unix epoch.
/// assert_eq!(excel_to_timestamp(25569.0).unwrap(), -8 * 3600);
/// ```
pub fn excel_to_timestamp(serial: f64) -> MapperResult<i64> {
    excel_to_datetime(serial).map(|dt| dt.timestamp())
}

/// Calendar date-time for an Excel serial in Asia/Shanghai.
pub fn excel_to_datetime(serial: f64) -> MapperResult<DateTime<FixedOffset>> {
    excel_to_datetime_in(serial, shanghai_offset())
}

/// Calendar date-time for an Excel serial read as wall-clock time at `offset`.
pub fn excel_to_datetime_in(serial: f64, offset: FixedOffset) -> MapperResult<DateTime<FixedOffset>> {
    if !serial.is_finite() || serial < 0.0 {
        return Err(MapperError::invalid_input(format!("not a valid excel date serial: {serial}")));
    }

    let naive = if serial < 1.0 {
        time_of_day_on_unix_epoch(serial)
    } else {
        ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, false).as_datetime()
    }
    .ok_or_else(|| MapperError::invalid_input(format!("excel date serial out of range: {serial}")))?;

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| MapperError::invalid_input(format!("ambiguous local time for serial {serial}")))
}

/// Wall-clock time for a day fraction, dated 1970-01-01.
fn time_of_day_on_unix_epoch(fraction: f64) -> Option<NaiveDateTime> {
    let secs = (fraction * 86_400.0).round() as i64;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, FixedOffset, Timelike};

    use super::{excel_to_datetime, excel_to_datetime_in, excel_to_timestamp};
    use crate::error::MapperError;

    #[test]
    fn epoch_serial_is_shifted_by_shanghai_offset() {
        assert_eq!(excel_to_timestamp(25569.0).unwrap(), -28_800);
        assert_eq!(excel_to_timestamp(25569.5).unwrap(), 14_400);
    }

    #[test]
    fn time_only_serials_land_on_unix_epoch_day() {
        assert_eq!(excel_to_timestamp(0.0).unwrap(), -28_800);
        assert_eq!(excel_to_timestamp(0.5).unwrap(), 14_400);

        let dt = excel_to_datetime(0.395833333).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (1970, 1, 1));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (9, 30, 0));
    }

    #[test]
    fn serial_one_is_still_a_1900_date() {
        let dt = excel_to_datetime(1.0).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (1900, 1, 1));
    }

    #[test]
    fn calendar_fields_are_local_wall_clock() {
        let dt = excel_to_datetime(45000.75).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 3, 15));
        assert_eq!((dt.hour(), dt.minute()), (18, 0));
        assert_eq!(dt.offset().local_minus_utc(), 8 * 3600);
        assert_eq!(dt.timestamp(), 1_678_838_400 + 18 * 3600 - 8 * 3600);
    }

    #[test]
    fn other_offsets_are_supported() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(excel_to_datetime_in(25569.0, utc).unwrap().timestamp(), 0);
    }

    #[test]
    fn invalid_serials_are_rejected() {
        for bad in [f64::NAN, f64::INFINITY, -1.0] {
            let err = excel_to_timestamp(bad).unwrap_err();
            assert!(matches!(err, MapperError::InvalidInput { .. }));
        }
    }
}
