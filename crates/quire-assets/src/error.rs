//! Asset error and warning types.

use serde::Serialize;
use thiserror::Error;

/// Errors from an [`ObjectStorage`](crate::ObjectStorage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The client could not be built from the configured credentials.
    #[error("object storage client for bucket '{bucket}': {reason}")]
    Client { bucket: String, reason: String },

    /// The backend rejected or failed the upload.
    #[error("upload of '{key}' failed: {source}")]
    Upload {
        key: String,
        #[source]
        source: object_store::Error,
    },

    /// The public URL cannot be formed.
    #[error("no public domain configured for uploaded assets")]
    NoPublicDomain,

    #[error("{0}")]
    Other(String),
}

/// Why an image link was left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum WarningReason {
    /// No file at the resolved path.
    Missing,
    /// The file exists but could not be read.
    Unreadable(String),
    /// The storage backend returned an error.
    UploadFailed(String),
    /// The upload did not finish within the configured timeout.
    Timeout,
}

impl std::fmt::Display for WarningReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => f.write_str("file not found"),
            Self::Unreadable(reason) => write!(f, "unreadable: {reason}"),
            Self::UploadFailed(reason) => write!(f, "upload failed: {reason}"),
            Self::Timeout => f.write_str("upload timed out"),
        }
    }
}

/// A non-fatal problem with one image reference. The link stays byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetWarning {
    /// Link target as written in the body.
    pub path: String,
    pub reason: WarningReason,
}

impl std::fmt::Display for AssetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}
