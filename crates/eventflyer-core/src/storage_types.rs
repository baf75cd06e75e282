use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Defined in core because configuration, key generation and the API health
/// endpoint all need to name the active backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl StorageBackend {
    /// Prefix prepended to every flyer key written to this backend.
    ///
    /// Object-store keys live under `flyers/`; local files sit directly in the
    /// uploads directory.
    pub fn key_prefix(self) -> &'static str {
        match self {
            StorageBackend::S3 => "flyers/",
            StorageBackend::Local => "",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// Object-store connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: Option<String>,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, ...)
    pub endpoint: Option<String>,
    /// Public base URL used to build returned object URLs (e.g. a CDN in front of the bucket)
    pub public_base_url: Option<String>,
}

impl Debug for S3Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("S3Settings")
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

/// Local filesystem storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSettings {
    /// Directory the flyer files are written to
    pub path: String,
    /// URL prefix the files are served under (path-relative by default)
    pub base_url: String,
}

/// Which storage backend the process runs with.
///
/// Resolved once at startup and injected into the storage factory; nothing
/// downstream reads environment variables to decide where flyers go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageSelection {
    S3(S3Settings),
    Local(LocalSettings),
}

impl StorageSelection {
    /// Select the object store when both a bucket and an access key are present,
    /// local storage otherwise.
    pub fn resolve(
        bucket: Option<String>,
        access_key_id: Option<String>,
        object_store: impl FnOnce(String, String) -> S3Settings,
        local: LocalSettings,
    ) -> Self {
        let bucket = bucket.filter(|b| !b.trim().is_empty());
        let access_key_id = access_key_id.filter(|k| !k.trim().is_empty());

        match (bucket, access_key_id) {
            (Some(bucket), Some(key)) => StorageSelection::S3(object_store(bucket, key)),
            _ => StorageSelection::Local(local),
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self {
            StorageSelection::S3(_) => StorageBackend::S3,
            StorageSelection::Local(_) => StorageBackend::Local,
        }
    }
}
