//! Sync run tuning: parallelism and timeouts.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const fn default_concurrency() -> usize {
    4
}

const fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Blog posts synced at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Asset uploads in flight at once, across all documents.
    #[serde(default = "default_concurrency")]
    pub upload_concurrency: usize,

    /// Timeout for a single remote command.
    #[serde(default = "default_timeout_secs")]
    pub remote_timeout_secs: u64,

    /// Timeout for a single asset upload.
    #[serde(default = "default_timeout_secs")]
    pub upload_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            upload_concurrency: default_concurrency(),
            remote_timeout_secs: default_timeout_secs(),
            upload_timeout_secs: default_timeout_secs(),
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub const fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    #[must_use]
    pub const fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}
