//! Store error types.

use std::time::Duration;

use thiserror::Error;

/// Errors from building or running remote store commands.
///
/// Any of these aborts the remaining steps of the document being synced;
/// the run itself continues.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The executor ran the command and reported failure.
    #[error("remote command failed on '{database}': {diagnostic}")]
    RemoteCommand { database: String, diagnostic: String },

    /// The executor did not answer within the caller's timeout.
    #[error("remote command on '{database}' timed out after {after:?}")]
    Timeout { database: String, after: Duration },

    /// The executor process could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Output could not be interpreted.
    #[error("unreadable command output: {0}")]
    Response(String),

    /// A row that must exist after an upsert was not found.
    #[error("node '{title}' under parent {parent_id} not found after upsert")]
    MissingNode { title: String, parent_id: i64 },

    /// A table or column name is not a plain identifier.
    #[error("invalid SQL identifier '{0}'")]
    InvalidIdentifier(String),

    /// Underlying libSQL error (local executor setup).
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

impl StoreError {
    /// Transport-level failures: the command may or may not have been applied.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Spawn { .. })
    }
}
