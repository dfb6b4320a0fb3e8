use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read flow table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write flow table {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Flow table {path} is corrupted at line {line}: {reason}")]
    Corrupted { path: PathBuf, line: usize, reason: String },

    #[error("Flow table {path} is truncated: header says {expected} rows, found {found}")]
    Truncated { path: PathBuf, expected: usize, found: usize },

    #[error("Failed to write analysis output {path}: {reason}")]
    Output { path: PathBuf, reason: String },
}
