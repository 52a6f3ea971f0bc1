//! Format dispatch and the first-sheet grid every decoder produces.
//!
//! [`Decoder`] is selected once per read from the source extension. Whatever the format, the
//! decoded first sheet is exposed as a [`Sheet`] addressed by 1-based column and row, the same
//! way spreadsheet users number cells.

use calamine::{Data, Range};

use crate::error::MapperResult;
use crate::types::Value;

use super::source::{Source, SourceFormat};
use super::{csv, excel};

/// Decoder bound to one source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    Csv,
    Xls,
    Xlsx,
}

impl Decoder {
    pub fn for_format(format: SourceFormat) -> Self {
        match format {
            SourceFormat::Csv => Decoder::Csv,
            SourceFormat::Xls => Decoder::Xls,
            SourceFormat::Xlsx => Decoder::Xlsx,
        }
    }

    pub fn format(self) -> SourceFormat {
        match self {
            Decoder::Csv => SourceFormat::Csv,
            Decoder::Xls => SourceFormat::Xls,
            Decoder::Xlsx => SourceFormat::Xlsx,
        }
    }

    /// Decode the first sheet of `source`. Any further sheets are ignored.
    pub fn load_sheet(self, source: &Source) -> MapperResult<Sheet> {
        match self {
            Decoder::Csv => csv::load_csv_sheet(source),
            Decoder::Xls => excel::load_first_sheet(source, excel::WorkbookKind::Xls),
            Decoder::Xlsx => excel::load_first_sheet(source, excel::WorkbookKind::Xlsx),
        }
    }
}

/// One decoded worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    range: Range<Data>,
}

impl Sheet {
    pub(crate) fn from_range(range: Range<Data>) -> Self {
        Self { range }
    }

    /// Build a sheet from row-major cells. Row 0 becomes spreadsheet row 1.
    ///
    /// Short rows are padded with empty cells up to the widest row.
    pub fn from_rows(rows: Vec<Vec<Data>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Self::from_range(Range::empty());
        }

        let mut range = Range::new((0, 0), (rows.len() as u32 - 1, width as u32 - 1));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        Self::from_range(range)
    }

    /// Highest populated column, 1-based. `0` for an empty sheet.
    pub fn highest_column(&self) -> usize {
        self.range.end().map(|(_, c)| c as usize + 1).unwrap_or(0)
    }

    /// Highest populated row, 1-based. `0` for an empty sheet.
    pub fn highest_row(&self) -> usize {
        self.range.end().map(|(r, _)| r as usize + 1).unwrap_or(0)
    }

    fn cell(&self, column: usize, row: usize) -> &Data {
        if column == 0 || row == 0 {
            return &Data::Empty;
        }
        self.range
            .get_value(((row - 1) as u32, (column - 1) as u32))
            .unwrap_or(&Data::Empty)
    }

    /// Cell value at 1-based `column`/`row`. Missing and empty cells read as `Text("")`.
    pub fn cell_value(&self, column: usize, row: usize) -> Value {
        cell_to_value(self.cell(column, row))
    }

    /// Cell at 1-based `column`/`row` rendered as a header label.
    pub fn header_label(&self, column: usize, row: usize) -> String {
        cell_to_header_string(self.cell(column, row))
    }
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => cell_to_value(other).to_string(),
    }
}

fn cell_to_value(c: &Data) -> Value {
    match c {
        Data::Empty => Value::empty(),
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => float_to_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        // Date cells keep their serial; see `crate::datetime`.
        Data::DateTime(dt) => float_to_value(dt.as_f64()),
        Data::DateTimeIso(s) => Value::Text(s.clone()),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Text(e.to_string()),
    }
}

fn float_to_value(f: f64) -> Value {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Value::Int(f as i64)
    } else {
        Value::Float(f)
    }
}
