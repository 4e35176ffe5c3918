//! Object storage backends.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use quire_config::R2Config;
use tracing::debug;

use crate::error::StorageError;

/// Stores one object and reports the public URL it is served from.
pub trait ObjectStorage: Send + Sync {
    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &'static str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;
}

impl<S: ObjectStorage> ObjectStorage for Arc<S> {
    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &'static str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send {
        (**self).put(bucket, key, bytes, content_type)
    }
}

/// Cloudflare R2 through its S3-compatible API.
pub struct R2Storage {
    access_key_id: String,
    secret_access_key: String,
    endpoint: String,
    public_base: String,
    clients: Mutex<HashMap<String, Arc<AmazonS3>>>,
}

impl R2Storage {
    /// # Errors
    ///
    /// Returns [`StorageError::NoPublicDomain`] when neither `public_domain`
    /// nor `api_base_url` is set.
    pub fn from_config(r2: &R2Config) -> Result<Self, StorageError> {
        let public_base = r2.public_base().ok_or(StorageError::NoPublicDomain)?;
        Ok(Self {
            access_key_id: r2.access_key_id.clone(),
            secret_access_key: r2.secret_access_key.clone(),
            endpoint: r2.endpoint_url(),
            public_base,
            clients: Mutex::new(HashMap::new()),
        })
    }

    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        public_url(&self.public_base, key)
    }

    fn client(&self, bucket: &str) -> Result<Arc<AmazonS3>, StorageError> {
        let mut clients = self
            .clients
            .lock()
            .map_err(|_| StorageError::Other("client cache poisoned".to_string()))?;
        if let Some(client) = clients.get(bucket) {
            return Ok(Arc::clone(client));
        }
        let client = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region("auto")
            .with_endpoint(&self.endpoint)
            .with_access_key_id(&self.access_key_id)
            .with_secret_access_key(&self.secret_access_key)
            .with_virtual_hosted_style_request(false)
            .build()
            .map_err(|e| StorageError::Client {
                bucket: bucket.to_string(),
                reason: e.to_string(),
            })?;
        let client = Arc::new(client);
        clients.insert(bucket.to_string(), Arc::clone(&client));
        Ok(client)
    }
}

impl ObjectStorage for R2Storage {
    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &'static str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send {
        let client = self.client(bucket);
        let url = self.public_url(key);
        let key = key.to_string();

        async move {
            let client = client?;
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.into());
            let options = PutOptions {
                attributes,
                ..PutOptions::default()
            };
            debug!(%key, content_type, size = bytes.len(), "uploading object");
            client
                .put_opts(&ObjectPath::from(key.as_str()), PutPayload::from(bytes), options)
                .await
                .map_err(|source| StorageError::Upload { key, source })?;
            Ok(url)
        }
    }
}

/// `{base}/{key}` with exactly one slash between. Spaces in the key are
/// percent-encoded so the URL stays a single markdown link target.
#[must_use]
pub fn public_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/').replace(' ', "%20")
    )
}
