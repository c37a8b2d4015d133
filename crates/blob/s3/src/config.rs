use serde::{Deserialize, Serialize};

/// Key prefix objects are written under unless configured otherwise.
pub const DEFAULT_KEY_PREFIX: &str = "media_uploads/";

/// Connection settings shared by every AWS client.
#[derive(Clone, Serialize, Deserialize)]
pub struct AwsBaseConfig {
    /// AWS region (e.g. `"us-east-1"`).
    #[serde(default = "default_region")]
    pub region: String,

    /// Optional IAM role ARN to assume via STS.
    #[serde(default)]
    pub role_arn: Option<String>,

    /// Optional endpoint URL override (`MinIO`, `LocalStack`).
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Optional STS session name (defaults to `"mediadrop"`).
    #[serde(default)]
    pub session_name: Option<String>,

    /// Optional external ID for cross-account trust policies.
    #[serde(default)]
    pub external_id: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

impl std::fmt::Debug for AwsBaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsBaseConfig")
            .field("region", &self.region)
            .field("role_arn", &self.role_arn.as_ref().map(|_| "[REDACTED]"))
            .field("endpoint_url", &self.endpoint_url)
            .field("session_name", &self.session_name)
            .field("external_id", &self.external_id.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AwsBaseConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            role_arn: None,
            endpoint_url: None,
            session_name: None,
            external_id: None,
        }
    }

    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }
}

impl Default for AwsBaseConfig {
    fn default() -> Self {
        Self::new(default_region())
    }
}

/// Settings for the S3 media backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// Region, endpoint override and assumed role.
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// Bucket holding uploaded media.
    #[serde(default)]
    pub bucket: String,

    /// Key prefix objects are written under.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Base URL clients fetch objects from (CDN or public bucket domain).
    #[serde(default)]
    pub public_url: Option<String>,
}

fn default_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_owned()
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            aws: AwsBaseConfig::default(),
            bucket: String::new(),
            prefix: default_prefix(),
            public_url: None,
        }
    }
}

impl S3StorageConfig {
    pub fn new(bucket: impl Into<String>, aws: AwsBaseConfig) -> Self {
        Self {
            aws,
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Object key for a storage filename.
    pub fn object_key(&self, filename: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            filename.to_owned()
        } else {
            format!("{prefix}/{filename}")
        }
    }

    /// Public URL an object with `key` is served from.
    ///
    /// A configured `public_url` wins. With an endpoint override the URL is
    /// path-style; otherwise it is the bucket's virtual-hosted AWS domain.
    pub fn object_url(&self, key: &str) -> String {
        if let Some(base) = &self.public_url {
            return format!("{}/{key}", base.trim_end_matches('/'));
        }
        if let Some(endpoint) = &self.aws.endpoint_url {
            return format!("{}/{}/{key}", endpoint.trim_end_matches('/'), self.bucket);
        }
        format!(
            "https://{}.s3.{}.amazonaws.com/{key}",
            self.bucket, self.aws.region
        )
    }
}
