//! CSV decoding into a [`Sheet`].

use calamine::Data;

use crate::error::{LoadError, MapperResult};

use super::decoder::Sheet;
use super::source::Source;

/// Decode a CSV source into a single sheet.
///
/// Rules:
///
/// - No header handling here: the header row is just row 1 (or the configured start line).
/// - Rows may have different lengths; short rows are padded with empty cells.
/// - Every non-empty cell is text. No numeric inference is done.
/// - Blank lines are kept as empty rows, so sheet row `n` is physical line `n` of the file
///   (counting a multi-line quoted field once).
pub fn load_csv_sheet(source: &Source) -> MapperResult<Sheet> {
    match source {
        Source::Path(path) => {
            let bytes = std::fs::read(path).map_err(LoadError::from)?;
            load_csv_from_bytes(&bytes)
        }
        Source::Upload { bytes, .. } => load_csv_from_bytes(bytes),
    }
}

/// Decode an in-memory CSV body.
pub fn load_csv_from_bytes(bytes: &[u8]) -> MapperResult<Sheet> {
    let mut rdr = reader_builder().from_reader(bytes);
    let mut rows: Vec<Vec<Data>> = Vec::new();
    let mut record = csv::StringRecord::new();

    loop {
        // The reader positions a record before the blank lines it skips over.
        let start = rdr.position().byte() as usize;
        if !rdr.read_record(&mut record).map_err(LoadError::from)? {
            break;
        }
        rows.extend((0..skipped_blank_lines(bytes, start)).map(|_| Vec::new()));
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Data::Empty
                    } else {
                        Data::String(field.to_owned())
                    }
                })
                .collect(),
        );
    }
    Ok(Sheet::from_rows(rows))
}

/// Number of empty lines between `start` and the next record.
///
/// `\r\n`, `\r` and `\n` each end one line. A `\n` directly after the `\r` that ended the
/// previous record belongs to that record.
fn skipped_blank_lines(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    if i > 0 && bytes.get(i - 1) == Some(&b'\r') && bytes.get(i) == Some(&b'\n') {
        i += 1;
    }

    let mut blank = 0;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => i += 2,
            b'\r' | b'\n' => i += 1,
            _ => break,
        }
        blank += 1;
    }
    blank
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}
