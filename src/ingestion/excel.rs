//! XLS/XLSX loading via `calamine`.

use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook, open_workbook_from_rs, Data, Range, Reader, Xls, Xlsx};

use crate::error::{LoadError, MapperResult};

use super::decoder::Sheet;
use super::source::Source;

/// Workbook container handled by `calamine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkbookKind {
    Xls,
    Xlsx,
}

/// Open the workbook behind `source` and decode its first worksheet.
///
/// Other worksheets are never read.
pub(crate) fn load_first_sheet(source: &Source, kind: WorkbookKind) -> MapperResult<Sheet> {
    let range = match (source, kind) {
        (Source::Path(path), WorkbookKind::Xls) => {
            let wb: Xls<_> = open_workbook(path).map_err(excel_err)?;
            first_range(wb)?
        }
        (Source::Path(path), WorkbookKind::Xlsx) => {
            let wb: Xlsx<_> = open_workbook(path).map_err(excel_err)?;
            first_range(wb)?
        }
        (Source::Upload { bytes, .. }, WorkbookKind::Xls) => {
            let wb: Xls<_> =
                open_workbook_from_rs(Cursor::new(bytes.as_slice())).map_err(excel_err)?;
            first_range(wb)?
        }
        (Source::Upload { bytes, .. }, WorkbookKind::Xlsx) => {
            let wb: Xlsx<_> =
                open_workbook_from_rs(Cursor::new(bytes.as_slice())).map_err(excel_err)?;
            first_range(wb)?
        }
    };
    Ok(Sheet::from_range(range))
}

fn first_range<RS, R>(mut workbook: R) -> Result<Range<Data>, LoadError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    calamine::Error: From<R::Error>,
{
    match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(excel_err),
        None => Err(LoadError::NoSheet),
    }
}

fn excel_err(e: impl Into<calamine::Error>) -> LoadError {
    LoadError::Excel(e.into())
}
