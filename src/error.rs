use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at the edges of the library (file input, color strings, fonts).
/// Layout itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognized color string {0:?}")]
    InvalidColor(String),

    #[error("font error: {0}")]
    Font(String),
}

pub type Result<T> = std::result::Result<T, Error>;
