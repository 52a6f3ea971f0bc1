//! Reading entrypoints and implementations.
//!
//! Most callers should use [`RowMapper`] (from [`mapper`]) which:
//!
//! - selects a [`Decoder`] from the source extension (`csv`, `xls`, `xlsx`)
//! - loads the first sheet and maps each data row through a [`crate::types::FieldMap`]
//! - returns the records, or hands them to a [`RecordSink`] in batches
//! - optionally reports success/failure/alerts to a [`ReadObserver`]
//!
//! Format-specific loaders live under [`csv`] and (crate-internal) `excel`.

pub mod csv;
pub mod decoder;
mod excel;
pub mod mapper;
pub mod observability;
pub mod source;

pub use decoder::{Decoder, Sheet};
pub use mapper::{map_sheet, RecordSink, RowMapper};
pub use observability::{
    CompositeObserver, FileObserver, ReadContext, ReadEvent, ReadObserver, ReadSeverity, ReadStats,
    StdErrObserver,
};
pub use source::{Source, SourceFormat};
