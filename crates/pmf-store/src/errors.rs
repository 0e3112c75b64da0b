use std::{io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Error)]
pub enum StoreError {
    #[error("the PMF database at {path:?} could not be opened")]
    #[diagnostic(help("check that the path exists and is writable, then try again"))]
    Unavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("a query on the PMF database failed")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    DataFormat(#[from] DataFormatError),

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// NOTE: Line numbers are 1-based, like an editor's
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum DataFormatError {
    #[error("line {line}: expected 3 whitespace-separated values, but found {found}")]
    #[diagnostic(help("each line of a PMF file should be an `x y z` triple"))]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: {value:?} is not a number")]
    NotANumber { line: usize, value: String },

    #[error("line {line}: {value:?} is not a finite number")]
    NotFinite { line: usize, value: String },

    #[error("a stored {record} could not be decoded: {reason}")]
    #[diagnostic(help("the database may have been written by an incompatible version"))]
    Encoding { record: &'static str, reason: String },
}

impl StoreError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: rusqlite::Error) -> Self {
        let path = path.into();
        Self::Unavailable { path, source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        Self::Io { path, source }
    }
}

impl DataFormatError {
    pub(crate) fn encoding(record: &'static str, error: &serde_json::Error) -> Self {
        let reason = error.to_string();
        Self::Encoding { record, reason }
    }
}
