//! Parser error types.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal to a single document; siblings are unaffected.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8.
    #[error("{path} is not valid UTF-8 text")]
    Decode { path: PathBuf },

    /// The file sits outside its category root or in an unusable directory.
    #[error("{path} cannot be placed under its category: {reason}")]
    Location { path: PathBuf, reason: String },
}
