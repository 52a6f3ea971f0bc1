//! Tabular sources and extension-based format detection.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{MapperError, MapperResult};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values.
    Csv,
    /// Legacy BIFF workbook.
    Xls,
    /// Office Open XML workbook.
    Xlsx,
}

impl SourceFormat {
    /// Parse a format from a file extension.
    ///
    /// The match is exact and case-sensitive: `XLSX` or `Csv` are rejected.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "csv" => Some(Self::Csv),
            "xls" => Some(Self::Xls),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
        }
    }
}

/// Where tabular data is read from.
#[derive(Clone, PartialEq, Eq)]
pub enum Source {
    /// A file on disk.
    Path(PathBuf),
    /// An in-memory upload. The format is taken from `file_name`'s extension.
    Upload { file_name: String, bytes: Vec<u8> },
}

impl Source {
    /// Create an upload source from a client file name and its contents.
    pub fn upload(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Upload {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Whether there is nothing to read from.
    pub fn is_empty(&self) -> bool {
        match self {
            Source::Path(p) => p.as_os_str().is_empty(),
            Source::Upload { file_name, bytes } => file_name.is_empty() || bytes.is_empty(),
        }
    }

    /// Raw file extension, without the leading dot.
    pub fn extension(&self) -> Option<&str> {
        let path = match self {
            Source::Path(p) => p.as_path(),
            Source::Upload { file_name, .. } => Path::new(file_name.as_str()),
        };
        path.extension().and_then(|s| s.to_str())
    }

    /// Resolve the format from the extension.
    pub fn format(&self) -> MapperResult<SourceFormat> {
        let ext = self.extension().unwrap_or("");
        SourceFormat::from_extension(ext).ok_or_else(|| MapperError::UnsupportedFormat {
            extension: ext.to_string(),
        })
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Source::Upload { file_name, bytes } => f
                .debug_struct("Upload")
                .field("file_name", file_name)
                .field("bytes_len", &bytes.len())
                .finish(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => write!(f, "{}", p.display()),
            Source::Upload { file_name, bytes } => write!(f, "upload:{file_name} ({} bytes)", bytes.len()),
        }
    }
}

impl From<PathBuf> for Source {
    fn from(p: PathBuf) -> Self {
        Source::Path(p)
    }
}

impl From<&Path> for Source {
    fn from(p: &Path) -> Self {
        Source::Path(p.to_path_buf())
    }
}

impl From<&str> for Source {
    fn from(p: &str) -> Self {
        Source::Path(PathBuf::from(p))
    }
}

impl From<String> for Source {
    fn from(p: String) -> Self {
        Source::Path(PathBuf::from(p))
    }
}
