//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Credential configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Symmetric secret used to sign credentials (at least 16 characters)
    pub jwt_secret: String,
    /// Signing algorithm name, one of HS256/HS384/HS512
    pub jwt_algorithm: String,
    /// Access credential TTL in seconds
    pub access_token_ttl_seconds: u64,
    /// Refresh credential TTL in seconds
    pub refresh_token_ttl_seconds: u64,
    /// How long a revocation record is retained, independent of the credential's own TTL
    pub revocation_retention_seconds: u64,
    /// Clock skew tolerated when checking `exp`
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production-use-strong-random-secret-key".to_string(),
            jwt_algorithm: "HS256".to_string(),
            access_token_ttl_seconds: 900,
            refresh_token_ttl_seconds: 2 * 24 * 3600,
            revocation_retention_seconds: 3600,
            leeway_seconds: 0,
        }
    }
}

impl AuthConfig {
    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_seconds)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_seconds)
    }

    pub fn revocation_retention(&self) -> Duration {
        Duration::from_secs(self.revocation_retention_seconds)
    }

    /// Longest credential TTL that outlives the revocation retention window, if any
    ///
    /// A revoked credential whose TTL exceeds the retention window becomes
    /// acceptable again once its revocation record expires. This is reported,
    /// not corrected: the two TTLs are configured independently.
    pub fn revocation_gap(&self) -> Option<Duration> {
        let longest = self
            .access_token_ttl_seconds
            .max(self.refresh_token_ttl_seconds);
        (longest > self.revocation_retention_seconds).then(|| {
            Duration::from_secs(longest - self.revocation_retention_seconds)
        })
    }
}

/// Key-value store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Dragonfly/Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Namespace prepended to blocklist and rate limit keys
    pub namespace: String,
    /// Connection timeout in seconds
    pub connection_timeout_seconds: u64,
    /// Per-operation timeout in milliseconds
    pub operation_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            namespace: "gate".to_string(),
            connection_timeout_seconds: 5,
            operation_timeout_ms: 500,
        }
    }
}

/// Sliding-window rate limit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Width of the rolling window in seconds
    pub window_seconds: u64,
    /// Maximum admitted requests per identity per window
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_seconds: 60,
            max_requests: 10,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// First segment of every cache key
    pub key_prefix: String,
    /// TTL applied when a caller does not pass one
    pub default_ttl_seconds: u64,
    /// Enable cache compression for entries larger than threshold
    pub enable_compression: bool,
    /// Compression threshold in bytes
    pub compression_threshold_bytes: u64,
    /// Normalized queries longer than this are replaced by their SHA-256 digest
    pub max_query_len: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_prefix: "cache".to_string(),
            default_ttl_seconds: 60,
            enable_compression: true,
            compression_threshold_bytes: 10240, // 10KB
            max_query_len: 256,
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// One of "json", "pretty", "compact"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.auth.validate()?;
        self.store.validate()?;
        self.rate_limit.validate()?;
        self.cache.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Add local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("TOLLGATE").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;

        config.validate()?;

        if let Some(gap) = config.auth.revocation_gap() {
            tracing::warn!(
                gap_seconds = gap.as_secs(),
                retention_seconds = config.auth.revocation_retention_seconds,
                "Credential TTL exceeds revocation retention, revoked credentials may be accepted again"
            );
        }

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
