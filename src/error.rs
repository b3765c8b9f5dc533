use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("output mode {0} is not implemented")]
    UnknownRenderMode(String),

    #[error("no database connection found, use 'use FILENAME' to open one")]
    NoActiveConnection,

    #[error("failed to open database: {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("command failed: {0}")]
    Statement(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("row has {found} cells but the result set has {expected} columns")]
    RowArity { expected: usize, found: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for ShellError {
    fn from(e: rusqlite::Error) -> Self {
        ShellError::Statement(e.to_string())
    }
}

pub type ShellResult<T> = Result<T, ShellError>;
