//! `sheet-ingest` reads CSV/XLS/XLSX spreadsheets into keyed records.
//!
//! The primary entrypoint is [`ingestion::RowMapper`]. It reads the first sheet of a source,
//! takes one row as the header row, and turns every following row into a [`types::Record`]
//! whose keys come from a caller-supplied [`types::FieldMap`] (header label -> output key).
//!
//! ## Formats
//!
//! The format is chosen from the file extension, matched exactly and case-sensitively:
//!
//! - **CSV**: `.csv` (decoded with the `csv` crate; every cell is text)
//! - **Excel**: `.xls`, `.xlsx` (decoded with `calamine`; first sheet only)
//!
//! Anything else fails with [`MapperError::UnsupportedFormat`].
//!
//! ## Row rules
//!
//! - Empty cells read as an empty string, never as a missing value.
//! - Headers not present in the field map (and empty headers) are dropped.
//! - Rows whose mapped record is empty are skipped.
//! - A repeated header takes the value of its last column.
//!
//! ## Quick example
//!
//! ```no_run
//! use sheet_ingest::ingestion::RowMapper;
//! use sheet_ingest::types::FieldMap;
//!
//! # fn main() -> Result<(), sheet_ingest::MapperError> {
//! let fields: FieldMap = [("姓名", "name"), ("手机号", "phone")].into_iter().collect();
//! let records = RowMapper::new()
//!     .set_source("members.xlsx")?
//!     .set_field_map(fields)
//!     .set_start_line(2)?
//!     .read_list()?;
//! for r in &records {
//!     println!("{:?} {:?}", r.get("name"), r.get("phone"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Batching
//!
//! With [`ingestion::RowMapper::set_batch`], records go to a sink every `size` rows and the
//! return value of `read_list` is **always empty**:
//!
//! ```no_run
//! use sheet_ingest::ingestion::RowMapper;
//! use sheet_ingest::types::{FieldMap, Record};
//! use sheet_ingest::MapperResult;
//!
//! # fn main() -> Result<(), sheet_ingest::MapperError> {
//! let fields: FieldMap = [("id", "id")].into_iter().collect();
//! let mut inserted = 0;
//! let rest = RowMapper::new()
//!     .set_source("big.csv")?
//!     .set_field_map(fields)
//!     .set_batch(500, |batch: Vec<Record>| -> MapperResult<()> {
//!         inserted += batch.len();
//!         Ok(())
//!     })?
//!     .read_list()?;
//! assert!(rest.is_empty());
//! println!("inserted={inserted}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: the row mapper, decoders, sources and observers
//! - [`types`]: values, records and field maps
//! - [`datetime`]: Excel date serial conversion
//! - [`error`]: error types

pub mod datetime;
pub mod error;
pub mod ingestion;
pub mod types;

pub use error::{LoadError, MapperError, MapperResult};
