use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ThresholdError {
    #[error("{name} threshold must be within [0, 1], got {value}")]
    OutOfRange { name: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write store file {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store file {path:?} is not a JSON array of postings")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
