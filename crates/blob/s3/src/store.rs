use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, error, info, instrument};

use mediadrop_blob::{
    BlobContent, BlobError, BlobStore, BlobUpload, StoredBlob, ensure_kind, storage_filename,
};
use mediadrop_core::{BackendKind, StorageLocator};

use crate::auth::build_sdk_config;
use crate::config::S3StorageConfig;

/// Stores media bytes in an S3-compatible bucket.
///
/// The backend owns the one `aws_sdk_s3::Client` the process uses.
pub struct ObjectStoreBackend {
    client: aws_sdk_s3::Client,
    config: S3StorageConfig,
}

impl std::fmt::Debug for ObjectStoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ObjectStoreBackend {
    /// Build the S3 client from `config`.
    pub async fn new(config: S3StorageConfig) -> Result<Self, BlobError> {
        if config.bucket.trim().is_empty() {
            return Err(BlobError::Configuration(
                "s3 storage requires a bucket name".into(),
            ));
        }
        let sdk_config = build_sdk_config(&config.aws).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if config.aws.endpoint_url.is_some() {
            builder = builder.force_path_style(true);
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());
        info!(bucket = %config.bucket, prefix = %config.prefix, "s3 media storage ready");
        Ok(Self { client, config })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: aws_sdk_s3::Client, config: S3StorageConfig) -> Self {
        Self { client, config }
    }

    fn object_id<'a>(&self, locator: &'a StorageLocator) -> Result<&'a str, BlobError> {
        ensure_kind(BackendKind::Remote, locator)?;
        match locator {
            StorageLocator::Remote { object_id, .. } => Ok(object_id),
            StorageLocator::Local { path } => Err(BlobError::InvalidLocator(path.clone())),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, BlobError> {
        match self
            .client
            .head_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => {
                let msg = e.to_string();
                error!(key = %key, error = %msg, "S3 head_object failed");
                Err(BlobError::Storage(msg))
            }
        }
    }
}

#[async_trait]
impl BlobStore for ObjectStoreBackend {
    fn backend(&self) -> BackendKind {
        BackendKind::Remote
    }

    #[instrument(skip(self, upload), fields(bucket = %self.config.bucket, original_name = %upload.original_name))]
    async fn put(&self, upload: BlobUpload) -> Result<StoredBlob, BlobError> {
        let filename = storage_filename(&upload.original_name);
        let key = self.config.object_key(&filename);
        let size = upload.data.len() as u64;

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .content_type(&upload.content_type)
            .body(ByteStream::from(upload.data))
            .send()
            .await
            .map_err(|e| {
                let msg = e.to_string();
                error!(key = %key, error = %msg, "S3 put_object failed");
                BlobError::Storage(msg)
            })?;

        debug!(key = %key, size, "stored media object");
        Ok(StoredBlob {
            filename,
            locator: StorageLocator::Remote {
                url: self.config.object_url(&key),
                object_id: key,
            },
            size,
            content_type: upload.content_type,
        })
    }

    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    async fn open(&self, locator: &StorageLocator) -> Result<Option<BlobContent>, BlobError> {
        // No round-trip: the client learns about a missing object from the
        // bucket it is redirected to.
        self.object_id(locator)?;
        Ok(Some(BlobContent::Redirect(locator.reference().to_owned())))
    }

    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    async fn delete(&self, locator: &StorageLocator) -> Result<bool, BlobError> {
        let key = self.object_id(locator)?;
        if !self.exists(key).await? {
            return Ok(false);
        }
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let msg = e.to_string();
                error!(key = %key, error = %msg, "S3 delete_object failed");
                BlobError::Storage(msg)
            })?;
        Ok(true)
    }
}
