//! The seam between command building and whatever runs the command.

use std::future::Future;
use std::sync::Arc;

use crate::error::StoreError;
use crate::sql::Command;

/// What an executor reports back for one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// JSON envelope for queries: `[{"results": [...], "success": true}]`.
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    #[must_use]
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Best available explanation of a failure.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Runs one command against a named database.
///
/// `Err` is reserved for failures to run the command at all (spawn errors,
/// unreadable output). A command that ran and failed is `Ok` with
/// `success == false`.
pub trait CommandExecutor: Send + Sync {
    fn execute(
        &self,
        database: &str,
        command: &Command,
    ) -> impl Future<Output = Result<CommandOutput, StoreError>> + Send;
}

impl<E: CommandExecutor> CommandExecutor for Arc<E> {
    fn execute(
        &self,
        database: &str,
        command: &Command,
    ) -> impl Future<Output = Result<CommandOutput, StoreError>> + Send {
        (**self).execute(database, command)
    }
}
