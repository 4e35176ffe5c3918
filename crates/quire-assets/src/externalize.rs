//! Upload referenced images and point links at the uploaded copies.
//!
//! Uploads are memoized per canonical local path for the lifetime of the
//! [`Externalizer`], failures included: a path that failed once is not
//! retried in the same run, and concurrent references to one path share a
//! single in-flight upload.

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{OnceCell, Semaphore};
use tracing::{debug, warn};

use crate::error::{AssetWarning, WarningReason};
use crate::scan::{content_type_for, rewrite_targets, scan_references};
use crate::storage::ObjectStorage;

type UploadOutcome = Result<String, WarningReason>;

/// Body rewritten plus the references that were left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Externalized {
    pub body: String,
    pub warnings: Vec<AssetWarning>,
    /// References replaced with a remote URL.
    pub rewritten: usize,
}

pub struct Externalizer<S> {
    storage: Arc<S>,
    bucket: String,
    uploads: Arc<Semaphore>,
    timeout: Duration,
    memo: Mutex<HashMap<PathBuf, Arc<OnceCell<UploadOutcome>>>>,
}

impl<S: ObjectStorage> Externalizer<S> {
    /// `upload_concurrency` is clamped to at least one.
    pub fn new(
        storage: Arc<S>,
        bucket: impl Into<String>,
        upload_concurrency: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
            uploads: Arc::new(Semaphore::new(upload_concurrency.max(1))),
            timeout,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Rewrite every `![alt](images/...)` in `body` whose file exists under
    /// `document_dir` and uploads successfully. Objects are stored under
    /// `{category_prefix}/images/{file name}`.
    pub async fn externalize(
        &self,
        body: &str,
        document_dir: &Path,
        category_prefix: &str,
    ) -> Externalized {
        let references = scan_references(body);
        if references.is_empty() {
            return Externalized {
                body: body.to_string(),
                warnings: Vec::new(),
                rewritten: 0,
            };
        }

        // Distinct targets upload concurrently; repeats reuse the outcome.
        let mut targets: Vec<&str> = references
            .iter()
            .map(|reference| reference.relative_path.as_str())
            .collect();
        targets.sort_unstable();
        targets.dedup();

        let outcomes: HashMap<&str, UploadOutcome> = join_all(targets.into_iter().map(|target| async move {
            let outcome = self.upload_target(target, document_dir, category_prefix).await;
            (target, outcome)
        }))
        .await
        .into_iter()
        .collect();

        let mut replacements: Vec<(Range<usize>, String)> = Vec::new();
        let mut warnings = Vec::new();
        for reference in &references {
            match outcomes.get(reference.relative_path.as_str()) {
                Some(Ok(url)) => replacements.push((reference.target_span.clone(), url.clone())),
                Some(Err(reason)) => {
                    warn!(path = %reference.relative_path, %reason, "image link left unchanged");
                    warnings.push(AssetWarning {
                        path: reference.relative_path.clone(),
                        reason: reason.clone(),
                    });
                }
                None => {}
            }
        }

        Externalized {
            body: rewrite_targets(body, &replacements),
            rewritten: replacements.len(),
            warnings,
        }
    }

    async fn upload_target(
        &self,
        target: &str,
        document_dir: &Path,
        category_prefix: &str,
    ) -> UploadOutcome {
        let resolved = document_dir.join(target);
        let Ok(canonical) = tokio::fs::canonicalize(&resolved).await else {
            return Err(WarningReason::Missing);
        };
        if !tokio::fs::metadata(&canonical)
            .await
            .is_ok_and(|meta| meta.is_file())
        {
            return Err(WarningReason::Missing);
        }

        let file_name = Path::new(target)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let cell = self.memo_cell(&canonical)?;
        cell.get_or_init(|| self.upload(canonical.clone(), file_name, category_prefix))
            .await
            .clone()
    }

    fn memo_cell(&self, canonical: &Path) -> Result<Arc<OnceCell<UploadOutcome>>, WarningReason> {
        let mut memo = self
            .memo
            .lock()
            .map_err(|_| WarningReason::UploadFailed("upload memo poisoned".to_string()))?;
        Ok(Arc::clone(
            memo.entry(canonical.to_path_buf())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        ))
    }

    async fn upload(&self, path: PathBuf, file_name: String, category_prefix: &str) -> UploadOutcome {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| WarningReason::Unreadable(e.to_string()))?;
        let key = format!("{}/images/{file_name}", category_prefix.trim_matches('/'));
        let content_type = content_type_for(&file_name);

        let Ok(_permit) = self.uploads.acquire().await else {
            return Err(WarningReason::UploadFailed("upload pool closed".to_string()));
        };
        debug!(path = %path.display(), %key, "uploading image");
        match tokio::time::timeout(
            self.timeout,
            self.storage.put(&self.bucket, &key, bytes, content_type),
        )
        .await
        {
            Ok(Ok(url)) => Ok(url),
            Ok(Err(error)) => Err(WarningReason::UploadFailed(error.to_string())),
            Err(_) => Err(WarningReason::Timeout),
        }
    }

    /// Distinct local files an upload was attempted for.
    pub fn attempted(&self) -> usize {
        self.memo.lock().map_or(0, |memo| memo.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use pretty_assertions::assert_eq;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStorage {
        puts: AtomicUsize,
        keys: Mutex<Vec<(String, &'static str)>>,
    }

    impl ObjectStorage for CountingStorage {
        fn put(
            &self,
            _bucket: &str,
            key: &str,
            _bytes: Vec<u8>,
            content_type: &'static str,
        ) -> impl Future<Output = Result<String, StorageError>> + Send {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.keys.lock().unwrap().push((key.to_string(), content_type));
            let url = format!("https://cdn.test/{key}");
            async move { Ok(url) }
        }
    }

    fn externalizer(storage: &Arc<CountingStorage>) -> Externalizer<CountingStorage> {
        Externalizer::new(Arc::clone(storage), "bucket", 2, Duration::from_secs(5))
    }

    fn corpus() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/a.png"), b"png").unwrap();
        std::fs::write(dir.path().join("images/b.jpg"), b"jpg").unwrap();
        dir
    }

    #[tokio::test]
    async fn present_image_is_rewritten() {
        let dir = corpus();
        let storage = Arc::new(CountingStorage::default());
        let body = "See ![diagram](images/a.png) here.";

        let out = externalizer(&storage).externalize(body, dir.path(), "blog").await;

        assert_eq!(out.body, "See ![diagram](https://cdn.test/blog/images/a.png) here.");
        assert!(out.warnings.is_empty());
        assert_eq!(out.rewritten, 1);
        assert_eq!(
            storage.keys.lock().unwrap().as_slice(),
            &[("blog/images/a.png".to_string(), "image/png")]
        );
    }

    #[tokio::test]
    async fn spaced_file_name_is_uploaded_and_rewritten() {
        let dir = corpus();
        std::fs::write(dir.path().join("images/Screenshot 2024.png"), b"png").unwrap();
        let storage = Arc::new(CountingStorage::default());
        let body = "![shot](images/Screenshot 2024.png)";

        let out = externalizer(&storage).externalize(body, dir.path(), "blog").await;

        assert_eq!(out.body, "![shot](https://cdn.test/blog/images/Screenshot 2024.png)");
        assert!(out.warnings.is_empty());
        assert_eq!(storage.puts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_image_is_left_byte_identical() {
        let dir = corpus();
        let storage = Arc::new(CountingStorage::default());
        let body = "![gone](images/missing.png) and ![ok](images/b.jpg)";

        let out = externalizer(&storage).externalize(body, dir.path(), "wiki").await;

        assert_eq!(out.body, "![gone](images/missing.png) and ![ok](https://cdn.test/wiki/images/b.jpg)");
        assert_eq!(
            out.warnings,
            vec![AssetWarning {
                path: "images/missing.png".into(),
                reason: WarningReason::Missing,
            }]
        );
    }

    #[tokio::test]
    async fn repeated_reference_uploads_once() {
        let dir = corpus();
        let storage = Arc::new(CountingStorage::default());
        let ext = externalizer(&storage);

        let first = ext
            .externalize("![a](images/a.png) ![again](images/a.png)", dir.path(), "blog")
            .await;
        let second = ext.externalize("![a](images/a.png)", dir.path(), "blog").await;

        assert_eq!(first.rewritten, 2);
        assert_eq!(second.rewritten, 1);
        assert_eq!(storage.puts.load(Ordering::SeqCst), 1);
        assert_eq!(ext.attempted(), 1);
    }

    #[tokio::test]
    async fn body_without_images_is_untouched() {
        let storage = Arc::new(CountingStorage::default());
        let body = "plain [link](images/a.png) text";
        let out = externalizer(&storage)
            .externalize(body, Path::new("/nowhere"), "blog")
            .await;
        assert_eq!(out.body, body);
        assert_eq!(storage.puts.load(Ordering::SeqCst), 0);
    }

    struct FailingStorage(AtomicUsize);

    impl ObjectStorage for FailingStorage {
        fn put(
            &self,
            _bucket: &str,
            key: &str,
            _bytes: Vec<u8>,
            _content_type: &'static str,
        ) -> impl Future<Output = Result<String, StorageError>> + Send {
            self.0.fetch_add(1, Ordering::SeqCst);
            let key = key.to_string();
            async move { Err(StorageError::Other(format!("denied {key}"))) }
        }
    }

    #[tokio::test]
    async fn failed_upload_is_remembered() {
        let dir = corpus();
        let storage = Arc::new(FailingStorage(AtomicUsize::new(0)));
        let ext = Externalizer::new(Arc::clone(&storage), "bucket", 1, Duration::from_secs(5));
        let body = "![a](images/a.png)";

        let first = ext.externalize(body, dir.path(), "blog").await;
        let second = ext.externalize(body, dir.path(), "blog").await;

        assert_eq!(first.body, body);
        assert_eq!(second.body, body);
        assert!(matches!(first.warnings[0].reason, WarningReason::UploadFailed(_)));
        assert_eq!(storage.0.load(Ordering::SeqCst), 1);
    }

    struct StalledStorage;

    impl ObjectStorage for StalledStorage {
        fn put(
            &self,
            _bucket: &str,
            _key: &str,
            _bytes: Vec<u8>,
            _content_type: &'static str,
        ) -> impl Future<Output = Result<String, StorageError>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_upload_times_out() {
        let dir = corpus();
        let ext = Externalizer::new(Arc::new(StalledStorage), "bucket", 1, Duration::from_secs(60));
        let out = ext.externalize("![a](images/a.png)", dir.path(), "blog").await;
        assert_eq!(out.warnings[0].reason, WarningReason::Timeout);
        assert_eq!(out.body, "![a](images/a.png)");
    }
}
