//! S3-compatible bucket client.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;

use crate::{join_url, ObjectStore, StorageError, StoredObject};

/// Key prefix used when `STORAGE_KEY_PREFIX` is unset.
pub const DEFAULT_KEY_PREFIX: &str = "smartphoto";

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket_name: String,
    /// Public base URL objects are served from.
    pub bucket_url: String,
    pub endpoint: String,
    /// Leading path segment for every key this service writes.
    pub key_prefix: String,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default                          |
    /// |-------------------------|----------|----------------------------------|
    /// | `OSS_ACCESS_KEY_ID`     | **yes**  | --                               |
    /// | `OSS_SECRET_ACCESS_KEY` | **yes**  | --                               |
    /// | `OSS_REGION`            | **yes**  | --                               |
    /// | `OSS_BUCKET_NAME`       | **yes**  | --                               |
    /// | `OSS_BUCKET_URL`        | **yes**  | --                               |
    /// | `OSS_ENDPOINT`          | no       | `https://{OSS_REGION}.aliyuncs.com` |
    /// | `STORAGE_KEY_PREFIX`    | no       | `smartphoto`                     |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing.
    pub fn from_env() -> Self {
        let required = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"))
        };

        let region = required("OSS_REGION");
        let endpoint = std::env::var("OSS_ENDPOINT")
            .unwrap_or_else(|_| format!("https://{region}.aliyuncs.com"));

        Self {
            access_key_id: required("OSS_ACCESS_KEY_ID"),
            secret_access_key: required("OSS_SECRET_ACCESS_KEY"),
            bucket_name: required("OSS_BUCKET_NAME"),
            bucket_url: required("OSS_BUCKET_URL"),
            key_prefix: std::env::var("STORAGE_KEY_PREFIX")
                .unwrap_or_else(|_| DEFAULT_KEY_PREFIX.into()),
            region,
            endpoint,
        }
    }
}

pub struct S3Storage {
    client: S3Client,
    bucket_name: String,
    bucket_url: String,
}

impl S3Storage {
    /// Build a client from static credentials and a custom endpoint.
    ///
    /// Virtual-hosted style addressing is kept (`force_path_style(false)`),
    /// which OSS requires.
    pub async fn connect(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "photoedit-env",
        );

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(false)
            .build();

        tracing::info!(
            bucket = %config.bucket_name,
            endpoint = %config.endpoint,
            "Object storage client configured",
        );

        Self {
            client: S3Client::from_conf(s3_config),
            bucket_name: config.bucket_name.clone(),
            bucket_url: config.bucket_url.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let size = bytes.len() as i64;

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key, error = %DisplayErrorContext(&e), "S3 put_object failed");
                StorageError::Upload {
                    key: key.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                }
            })?;

        tracing::debug!(key, size, "Object stored");

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size,
        })
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.bucket_url, key)
    }
}
