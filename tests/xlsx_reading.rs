use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rust_xlsxwriter::{Format, Workbook};

use sheet_ingest::datetime::excel_to_timestamp;
use sheet_ingest::ingestion::{RowMapper, Source};
use sheet_ingest::types::{FieldMap, Record, Value};
use sheet_ingest::{LoadError, MapperError, MapperResult};

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("sheet-ingest-{name}-{nanos}.xlsx"))
}

fn member_fields() -> FieldMap {
    [("name", "name"), ("age", "age"), ("joined", "joined"), ("active", "active")]
        .into_iter()
        .collect()
}

/// Sheet1: header + 3 data rows (one blank). Sheet2: a row that must never be read.
fn members_workbook() -> Workbook {
    let mut wb = Workbook::new();
    let date = Format::new().set_num_format("yyyy-mm-dd hh:mm");

    let ws = wb.add_worksheet();
    ws.set_name("Members").unwrap();
    ws.write_string(0, 0, "name").unwrap();
    ws.write_string(0, 1, "age").unwrap();
    ws.write_string(0, 2, "joined").unwrap();
    ws.write_string(0, 3, "active").unwrap();
    ws.write_string(0, 4, "notes").unwrap();

    ws.write_string(1, 0, "Ada").unwrap();
    ws.write_number(1, 1, 36).unwrap();
    ws.write_number_with_format(1, 2, 45000.75, &date).unwrap();
    ws.write_boolean(1, 3, true).unwrap();
    ws.write_string(1, 4, "ignored").unwrap();

    // row 3 left blank on purpose

    ws.write_string(3, 0, "Grace").unwrap();
    // age left empty
    ws.write_number(3, 2, 1.5).unwrap();
    ws.write_boolean(3, 3, false).unwrap();

    let ws2 = wb.add_worksheet();
    ws2.set_name("Archive").unwrap();
    ws2.write_string(0, 0, "name").unwrap();
    ws2.write_string(1, 0, "Linus").unwrap();

    wb
}

#[test]
fn read_xlsx_first_sheet_happy_path() {
    let path = tmp_file("members");
    members_workbook().save(&path).unwrap();

    let records = RowMapper::new()
        .set_source(path.as_path())
        .unwrap()
        .set_field_map(member_fields())
        .read_list()
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("name"), Some(&Value::from("Ada")));
    assert_eq!(records[0].get("age"), Some(&Value::Int(36)));
    assert_eq!(records[0].get("active"), Some(&Value::Bool(true)));
    assert!(records[0].get("notes").is_none());

    assert_eq!(records[1].get("name"), Some(&Value::from("Grace")));
    assert_eq!(records[1].get("age"), Some(&Value::empty()));
    assert_eq!(records[1].get("joined"), Some(&Value::Float(1.5)));

    // Only the first sheet is read.
    assert!(records.iter().all(|r| r.get("name") != Some(&Value::from("Linus"))));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn date_cells_surface_as_serials() {
    let path = tmp_file("dates");
    members_workbook().save(&path).unwrap();

    let records = RowMapper::new()
        .set_source(path.as_path())
        .unwrap()
        .set_field_map(member_fields())
        .read_list()
        .unwrap();

    let joined = records[0].get("joined").and_then(Value::as_f64).unwrap();
    assert!((joined - 45000.75).abs() < 1e-9);
    // 2023-03-15 18:00 in Shanghai == 10:00 UTC
    assert_eq!(excel_to_timestamp(joined).unwrap(), 1_678_838_400 + 10 * 3600);
    assert_eq!(RowMapper::excel_to_timestamp(joined).unwrap(), excel_to_timestamp(joined).unwrap());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn read_xlsx_upload_in_batches() {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "Report").unwrap();
    ws.write_string(1, 0, "sku").unwrap();
    ws.write_string(1, 1, "qty").unwrap();
    for i in 0..5u32 {
        ws.write_string(i + 2, 0, format!("SKU-{i}")).unwrap();
        ws.write_number(i + 2, 1, f64::from(i * 10)).unwrap();
    }
    let bytes = wb.save_to_buffer().unwrap();

    let mut seen: Vec<Vec<Record>> = Vec::new();
    let rest = RowMapper::new()
        .set_source(Source::upload("stock.xlsx", bytes))
        .unwrap()
        .set_field_map([("sku", "sku"), ("qty", "quantity")].into_iter().collect())
        .set_start_line(2)
        .unwrap()
        .set_batch(2, |batch: Vec<Record>| -> MapperResult<()> {
            seen.push(batch);
            Ok(())
        })
        .unwrap()
        .read_list()
        .unwrap();

    assert!(rest.is_empty());
    assert_eq!(seen.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 2, 1]);
    assert_eq!(seen[2][0].get("sku"), Some(&Value::from("SKU-4")));
    assert_eq!(seen[2][0].get("quantity"), Some(&Value::Int(40)));
}

#[test]
fn corrupt_xlsx_is_load_error() {
    let err = RowMapper::new()
        .set_source(Source::upload("broken.xlsx", b"PK not really".to_vec()))
        .unwrap()
        .set_field_map(member_fields())
        .read_list()
        .unwrap_err();
    assert!(matches!(err, MapperError::Load(LoadError::Excel(_))));
}

#[test]
fn csv_bytes_named_xlsx_are_rejected_by_the_xlsx_decoder() {
    let err = RowMapper::new()
        .set_source(Source::upload("export.xlsx", "name\nAda\n"))
        .unwrap()
        .read_list()
        .unwrap_err();
    assert!(matches!(err, MapperError::Load(_)));
}
