//! Configuration module
//!
//! Configuration is read once at startup from the process environment (with an
//! optional `.env` file) and injected into every component that needs it.

use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_MAX_IMAGE_DIMENSION, DEFAULT_STORAGE_TIMEOUT_SECS,
    MAX_FILE_SIZE_LIMIT_MB,
};
use crate::storage_types::{LocalSettings, S3Settings, StorageBackend, StorageSelection};

const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_S3_REGION: &str = "us-east-1";
const DEFAULT_UPLOADS_DIR: &str = "public/uploads";
const DEFAULT_UPLOADS_BASE_URL: &str = "/uploads";

/// Output format of the tracing subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "text" | "" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("Invalid LOG_FORMAT: {}", other)),
        }
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub log_format: LogFormat,
}

/// EventFlyer service configuration
#[derive(Clone, Debug)]
pub struct EventFlyerConfig {
    pub base: BaseConfig,
    /// Shared admin secret; `None` denies every admin request
    pub admin_token: Option<String>,
    /// Postgres URL; `None` selects the in-memory event store
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub storage: StorageSelection,
    // Upload limits
    pub max_file_size_bytes: usize,
    pub max_image_dimension: u32,
    pub storage_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<EventFlyerConfig>);

impl Config {
    fn inner(&self) -> &EventFlyerConfig {
        &self.0
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = EventFlyerConfig::from_lookup(lookup)?;
        config.validate()?;
        Ok(Config(Box::new(config)))
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().base.environment)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.inner().base.log_format
    }

    pub fn admin_token(&self) -> Option<&str> {
        self.inner().admin_token.as_deref()
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn storage(&self) -> &StorageSelection {
        &self.inner().storage
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage.backend()
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.inner().max_file_size_bytes
    }

    pub fn max_image_dimension(&self) -> u32 {
        self.inner().max_image_dimension
    }

    pub fn storage_timeout_secs(&self) -> u64 {
        self.inner().storage_timeout_secs
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl EventFlyerConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::Compact,
        };

        let base = BaseConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            log_format,
        };

        let local = LocalSettings {
            path: non_empty(lookup("UPLOADS_DIR"))
                .unwrap_or_else(|| DEFAULT_UPLOADS_DIR.to_string()),
            base_url: non_empty(lookup("UPLOADS_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_UPLOADS_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        let storage = StorageSelection::resolve(
            lookup("S3_BUCKET"),
            lookup("S3_ACCESS_KEY_ID"),
            |bucket, access_key_id| S3Settings {
                bucket,
                access_key_id,
                secret_access_key: non_empty(lookup("S3_SECRET_ACCESS_KEY")),
                region: non_empty(lookup("S3_REGION"))
                    .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
                endpoint: non_empty(lookup("S3_ENDPOINT")),
                public_base_url: non_empty(lookup("S3_PUBLIC_BASE_URL"))
                    .map(|url| url.trim_end_matches('/').to_string()),
            },
            local,
        );

        let max_file_size_mb = lookup("MAX_FILE_SIZE_MB")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);
        let max_file_size_bytes = max_file_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", max_file_size_mb))?;

        Ok(EventFlyerConfig {
            base,
            admin_token: non_empty(lookup("ADMIN_TOKEN")),
            database_url: non_empty(lookup("DATABASE_URL")),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage,
            max_file_size_bytes,
            max_image_dimension: lookup("MAX_IMAGE_DIMENSION")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_IMAGE_DIMENSION),
            storage_timeout_secs: lookup("STORAGE_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_STORAGE_TIMEOUT_SECS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.max_file_size_bytes > MAX_FILE_SIZE_LIMIT_MB * 1024 * 1024 {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB must be at most {}",
                MAX_FILE_SIZE_LIMIT_MB
            ));
        }

        if self.max_image_dimension == 0 {
            return Err(anyhow::anyhow!(
                "MAX_IMAGE_DIMENSION must be greater than 0"
            ));
        }

        if self.storage_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "STORAGE_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if is_production_env(&self.base.environment)
            && self.base.cors_origins.iter().any(|o| o == "*")
        {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if let Some(url) = &self.database_url {
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if let StorageSelection::S3(s3) = &self.storage {
            if s3.secret_access_key.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_SECRET_ACCESS_KEY must be set when S3_BUCKET and S3_ACCESS_KEY_ID are set"
                ));
            }
        }

        Ok(())
    }
}
