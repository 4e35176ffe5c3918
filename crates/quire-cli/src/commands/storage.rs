//! Asset backend chosen at startup.

use std::future::Future;

use quire_assets::{ObjectStorage, R2Storage, StorageError};
use quire_config::R2Config;

pub enum AssetBackend {
    R2(R2Storage),
    /// No R2 credentials (local runs only): every upload fails, so image
    /// links stay as written and each one is reported as a warning.
    Offline,
}

impl AssetBackend {
    /// R2 when configured; `Offline` is only allowed for local runs.
    pub fn from_config(r2: &R2Config, local: bool) -> anyhow::Result<Self> {
        if r2.is_configured() {
            return Ok(Self::R2(R2Storage::from_config(r2)?));
        }
        if local {
            tracing::warn!("R2 is not configured; image links will be left unchanged");
            return Ok(Self::Offline);
        }
        anyhow::bail!("R2 is not configured")
    }
}

impl ObjectStorage for AssetBackend {
    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &'static str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send {
        async move {
            match self {
                Self::R2(storage) => storage.put(bucket, key, bytes, content_type).await,
                Self::Offline => Err(StorageError::Other(String::from(
                    "object storage is not configured",
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_runs_fall_back_to_offline() {
        let backend = AssetBackend::from_config(&R2Config::default(), true).unwrap();
        assert!(matches!(backend, AssetBackend::Offline));
        assert!(AssetBackend::from_config(&R2Config::default(), false).is_err());
    }

    #[tokio::test]
    async fn offline_uploads_fail() {
        let result = AssetBackend::Offline
            .put("bucket", "blog/images/a.png", b"png".to_vec(), "image/png")
            .await;
        assert!(matches!(result, Err(StorageError::Other(_))));
    }
}
