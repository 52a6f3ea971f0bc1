use std::error::Error as StdError;

use thiserror::Error;

/// Convenience result type for row mapping operations.
pub type MapperResult<T> = Result<T, MapperError>;

/// Error type returned by [`crate::ingestion::RowMapper`] and the date helpers.
///
/// Every variant is terminal for the call that produced it. Records already handed to a batch
/// sink before the failure stay delivered.
#[derive(Debug, Error)]
pub enum MapperError {
    /// The caller configured the mapper with an unusable value (empty source, start line 0,
    /// batch size 0, invalid date serial, ...).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The source extension is not one of `csv`, `xls`, `xlsx` (exact, case-sensitive).
    #[error("unsupported format: extension '{extension}' (expected csv, xls or xlsx)")]
    UnsupportedFormat { extension: String },

    /// The decoder could not open or parse the source.
    #[error("failed to load source: {0}")]
    Load(#[from] LoadError),

    /// The batch sink returned an error; iteration stopped at that batch.
    #[error("batch sink failed: {0}")]
    Sink(#[source] Box<dyn StdError + Send + Sync>),
}

impl MapperError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Wrap any error returned from a sink.
    pub fn sink(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Sink(err.into())
    }
}

/// Decoder failures, grouped under [`MapperError::Load`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// XLS/XLSX decoding error.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The workbook contains no worksheet to read.
    #[error("workbook has no sheets")]
    NoSheet,
}

impl LoadError {
    /// Whether the failure originates from the filesystem rather than the file content.
    pub fn is_io(&self) -> bool {
        match self {
            LoadError::Io(_) => true,
            LoadError::Csv(err) => matches!(err.kind(), csv::ErrorKind::Io(_)),
            LoadError::Excel(
                calamine::Error::Io(_)
                | calamine::Error::Xlsx(calamine::XlsxError::Io(_))
                | calamine::Error::Xls(calamine::XlsError::Io(_)),
            ) => true,
            _ => false,
        }
    }
}
