//! Object storage for published artifacts.
//!
//! [`ObjectStore`] is the seam the job runner talks to; [`S3Store`] is the
//! production implementation on top of the AWS SDK. The SDK is async, so the
//! store owns a current-thread tokio runtime and blocks on each call. Callers
//! see a plain synchronous API.
//!
//! Uploads are hard failures. Presigning is a soft failure: problems are
//! logged and surface as `None`.

use crate::config::StorageConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Runtime;

/// Presigned URL lifetime used when the caller has no preference.
pub const DEFAULT_PRESIGN_EXPIRATION: Duration = Duration::from_secs(3600);

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Presign failed: {0}")]
    Presign(String),
    #[error("No bucket configured (set storage.bucket or --bucket)")]
    MissingBucket,
    #[error("Async runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// A place artifacts can be published to.
pub trait ObjectStore {
    /// Store `bytes` at `{key_prefix}/{name}` and return its public URL.
    fn upload(
        &self,
        key_prefix: &str,
        bytes: Vec<u8>,
        name: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Time-limited GET URL for `object_name`, or `None` if signing failed.
    fn presigned_url(&self, object_name: &str, expiration: Duration) -> Option<String>;

    /// Time-limited PUT URL for `object_name`, or `None` if signing failed.
    fn presigned_upload_url(
        &self,
        object_name: &str,
        content_type: &str,
        expiration: Duration,
    ) -> Option<String>;
}

/// Object key for `name` under `prefix`. An empty prefix yields `name` alone.
pub fn object_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Public virtual-hosted URL of an object in AWS S3.
pub fn public_url(bucket: &str, key: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com/{key}")
}

/// S3 (or S3-compatible) bucket.
pub struct S3Store {
    client: Client,
    bucket: String,
    endpoint: Option<String>,
    runtime: Runtime,
}

impl S3Store {
    /// Build a client from `config`.
    ///
    /// Static credentials are used when both keys are set; otherwise the AWS
    /// default chain (environment, profile, instance role) applies. A custom
    /// endpoint switches to path-style addressing.
    pub fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::MissingBucket);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "thumbgen-config",
            ));
        }
        let sdk_config = runtime.block_on(loader.load());

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        log::debug!(
            "S3 store for bucket {} in {}",
            config.bucket,
            config.region
        );
        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.clone(),
            runtime,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL of `key` in this store.
    pub fn object_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{key}", endpoint.trim_end_matches('/'), self.bucket),
            None => public_url(&self.bucket, key),
        }
    }
}

impl ObjectStore for S3Store {
    fn upload(
        &self,
        key_prefix: &str,
        bytes: Vec<u8>,
        name: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let key = object_key(key_prefix, name);
        let size = bytes.len();

        self.runtime
            .block_on(
                self.client
                    .put_object()
                    .bucket(&self.bucket)
                    .key(&key)
                    .acl(ObjectCannedAcl::PublicRead)
                    .content_type(content_type)
                    .body(ByteStream::from(bytes))
                    .send(),
            )
            .map_err(|e| StorageError::Upload(format!("{key}: {}", DisplayErrorContext(e))))?;

        log::info!("uploaded s3://{}/{key} ({size} bytes)", self.bucket);
        Ok(self.object_url(&key))
    }

    fn presigned_url(&self, object_name: &str, expiration: Duration) -> Option<String> {
        let result = presigning_config(expiration).and_then(|presign| {
            self.runtime
                .block_on(
                    self.client
                        .get_object()
                        .bucket(&self.bucket)
                        .key(object_name)
                        .presigned(presign),
                )
                .map_err(|e| StorageError::Presign(DisplayErrorContext(e).to_string()))
        });

        match result {
            Ok(request) => Some(request.uri().to_string()),
            Err(e) => {
                log::error!("presigning GET {object_name}: {e}");
                None
            }
        }
    }

    fn presigned_upload_url(
        &self,
        object_name: &str,
        content_type: &str,
        expiration: Duration,
    ) -> Option<String> {
        let result = presigning_config(expiration).and_then(|presign| {
            self.runtime
                .block_on(
                    self.client
                        .put_object()
                        .bucket(&self.bucket)
                        .key(object_name)
                        .content_type(content_type)
                        .presigned(presign),
                )
                .map_err(|e| StorageError::Presign(DisplayErrorContext(e).to_string()))
        });

        match result {
            Ok(request) => Some(request.uri().to_string()),
            Err(e) => {
                log::error!("presigning PUT {object_name}: {e}");
                None
            }
        }
    }
}

/// S3 refuses expirations beyond one week; the builder reports that here.
fn presigning_config(expiration: Duration) -> Result<PresigningConfig, StorageError> {
    PresigningConfig::expires_in(expiration).map_err(|e| StorageError::Presign(e.to_string()))
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;

    /// In-memory store that records every upload.
    #[derive(Default)]
    pub struct MemoryStore {
        pub objects: RefCell<Vec<(String, Vec<u8>, String)>>,
        pub fail_uploads: bool,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail_uploads: true,
                ..Self::default()
            }
        }

        pub fn keys(&self) -> Vec<String> {
            self.objects
                .borrow()
                .iter()
                .map(|(key, _, _)| key.clone())
                .collect()
        }
    }

    impl ObjectStore for MemoryStore {
        fn upload(
            &self,
            key_prefix: &str,
            bytes: Vec<u8>,
            name: &str,
            content_type: &str,
        ) -> Result<String, StorageError> {
            if self.fail_uploads {
                return Err(StorageError::Upload("simulated outage".into()));
            }
            let key = object_key(key_prefix, name);
            let url = public_url("memory", &key);
            self.objects
                .borrow_mut()
                .push((key, bytes, content_type.to_string()));
            Ok(url)
        }

        fn presigned_url(&self, object_name: &str, expiration: Duration) -> Option<String> {
            Some(format!(
                "{}?expires={}",
                public_url("memory", object_name),
                expiration.as_secs()
            ))
        }

        fn presigned_upload_url(
            &self,
            object_name: &str,
            _content_type: &str,
            expiration: Duration,
        ) -> Option<String> {
            self.presigned_url(object_name, expiration)
        }
    }

    fn offline_config() -> StorageConfig {
        StorageConfig {
            bucket: "mybucket".into(),
            access_key: Some("AKIDEXAMPLE".into()),
            secret_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".into()),
            ..StorageConfig::default()
        }
    }

    #[test]
    fn object_key_joins_prefix() {
        assert_eq!(object_key("photos", "x.jpg"), "photos/x.jpg");
        assert_eq!(object_key("photos/", "x.jpg"), "photos/x.jpg");
        assert_eq!(object_key("a/b", "x.jpg"), "a/b/x.jpg");
    }

    #[test]
    fn object_key_empty_prefix_is_name() {
        assert_eq!(object_key("", "x.jpg"), "x.jpg");
        assert_eq!(object_key("/", "x.jpg"), "x.jpg");
    }

    #[test]
    fn public_url_format() {
        assert_eq!(
            public_url("mybucket", "photos/x.jpg"),
            "https://mybucket.s3.amazonaws.com/photos/x.jpg"
        );
    }

    #[test]
    fn connect_requires_bucket() {
        let result = S3Store::connect(&StorageConfig::default());
        assert!(matches!(result, Err(StorageError::MissingBucket)));
    }

    #[test]
    fn object_url_without_endpoint_is_aws_url() {
        let store = S3Store::connect(&offline_config()).unwrap();
        assert_eq!(store.bucket(), "mybucket");
        assert_eq!(
            store.object_url("photos/x.jpg"),
            "https://mybucket.s3.amazonaws.com/photos/x.jpg"
        );
    }

    #[test]
    fn object_url_with_endpoint_is_path_style() {
        let config = StorageConfig {
            endpoint: Some("http://localhost:9000/".into()),
            ..offline_config()
        };
        let store = S3Store::connect(&config).unwrap();
        assert_eq!(
            store.object_url("x.jpg"),
            "http://localhost:9000/mybucket/x.jpg"
        );
    }

    // =========================================================================
    // Presigning (signed locally, no network)
    // =========================================================================

    #[test]
    fn presigned_url_embeds_expiration() {
        let store = S3Store::connect(&offline_config()).unwrap();
        let url = store
            .presigned_url("photos/cat.jpg", DEFAULT_PRESIGN_EXPIRATION)
            .unwrap();
        assert!(url.contains("photos/cat.jpg"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[test]
    fn presigned_upload_url_embeds_expiration() {
        let store = S3Store::connect(&offline_config()).unwrap();
        let url = store
            .presigned_upload_url("cat.jpg", "image/jpeg", Duration::from_secs(600))
            .unwrap();
        assert!(url.contains("cat.jpg"));
        assert!(url.contains("X-Amz-Expires=600"));
    }

    #[test]
    fn presigned_url_beyond_a_week_is_none() {
        let store = S3Store::connect(&offline_config()).unwrap();
        let eight_days = Duration::from_secs(8 * 24 * 60 * 60);
        assert!(store.presigned_url("cat.jpg", eight_days).is_none());
        assert!(
            store
                .presigned_upload_url("cat.jpg", "image/jpeg", eight_days)
                .is_none()
        );
    }

    #[test]
    fn memory_store_records_uploads() {
        let store = MemoryStore::new();
        let url = store
            .upload("thumbs", vec![1, 2, 3], "a.jpg", "image/jpeg")
            .unwrap();
        assert_eq!(url, "https://memory.s3.amazonaws.com/thumbs/a.jpg");
        assert_eq!(store.keys(), vec!["thumbs/a.jpg"]);
    }
}
