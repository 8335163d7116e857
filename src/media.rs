use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// StoredImage
///
/// Result of a successful upload: the durable URL persisted on the owning
/// record, plus the object key the media store accepts for deletion.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub url: String,
    pub key: String,
}

/// MediaStore
///
/// Abstract contract for the external image host. The concrete client
/// (S3MediaClient) talks to any S3-compatible endpoint; the mock keeps
/// everything in memory so handler tests run without a network.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Ensures the configured bucket exists. Used in the `Env::Local` setup
    /// to provision MinIO automatically. No-op in production.
    async fn ensure_bucket(&self);

    /// Uploads one image under `<folder>/<uuid>` and returns its durable URL
    /// together with the object key.
    async fn upload(
        &self,
        folder: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredImage, String>;

    /// Removes one object by key. Callers treat failures as non-fatal; see
    /// the release helpers in the handlers.
    async fn delete(&self, key: &str) -> Result<(), String>;
}

/// The shared handle stored in application state.
pub type MediaState = Arc<dyn MediaStore>;

/// Recovers the object key from a stored image URL: the last two path
/// segments with any file extension stripped. Returns `None` for URLs too
/// short to carry a `<folder>/<file>` suffix.
pub fn key_from_url(url: &str) -> Option<String> {
    let mut segments = url.split('/').rev().filter(|s| !s.is_empty());
    let file = segments.next()?;
    let folder = segments.next()?;
    let stem = file.split('.').next().unwrap_or(file);
    if stem.is_empty() {
        return None;
    }
    Some(format!("{}/{}", folder, stem))
}

/// S3MediaClient
///
/// Concrete implementation over the AWS SDK. Path-style addressing is
/// required for MinIO and most S3-compatible gateways, and it also makes the
/// public object URL predictable: `<endpoint>/<bucket>/<key>`.
#[derive(Clone)]
pub struct S3MediaClient {
    client: s3::Client,
    bucket_name: String,
    public_base: String,
}

impl S3MediaClient {
    /// Constructs the client from the credentials resolved by AppConfig.
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        let client = s3::Client::from_conf(config);

        Self {
            client,
            bucket_name: bucket.to_string(),
            public_base: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for S3MediaClient {
    /// Idempotent CreateBucket call, safe to run at startup.
    async fn ensure_bucket(&self) {
        let _ = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await;
    }

    async fn upload(
        &self,
        folder: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredImage, String> {
        let key = format!("{}/{}", folder, Uuid::new_v4());

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let url = format!("{}/{}/{}", self.public_base, self.bucket_name, key);
        Ok(StoredImage { url, key })
    }

    async fn delete(&self, key: &str) -> Result<(), String> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// MockMediaStore
///
/// In-memory implementation for tests. Records every uploaded key and every
/// delete request so assertions can check exactly which objects were touched.
pub struct MockMediaStore {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    uploaded: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            uploaded: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            uploaded: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl Default for MockMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn ensure_bucket(&self) {
        // No-op in mock environment.
    }

    async fn upload(
        &self,
        folder: &str,
        _data: Vec<u8>,
        _content_type: &str,
    ) -> Result<StoredImage, String> {
        if self.should_fail {
            return Err("Mock media error: simulation requested".to_string());
        }

        let key = format!("{}/{}", folder, Uuid::new_v4());
        self.uploaded.lock().unwrap().push(key.clone());

        // Deterministic, local-style URL for mock assertions.
        Ok(StoredImage {
            url: format!("http://localhost:9000/mock-bucket/{}", key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), String> {
        if self.should_fail {
            return Err("Mock media error: simulation requested".to_string());
        }
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
