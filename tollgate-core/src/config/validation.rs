//! Configuration validation module

use crate::config::{AuthConfig, CacheConfig, LoggingConfig, RateLimitConfig, StoreConfig};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Authentication configuration error: {message}")]
    Auth { message: String },

    #[error("Store configuration error: {message}")]
    Store { message: String },

    #[error("Rate limit configuration error: {message}")]
    RateLimit { message: String },

    #[error("Cache configuration error: {message}")]
    Cache { message: String },

    #[error("Logging configuration error: {message}")]
    Logging { message: String },
}

impl ValidationError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}

/// Algorithms accepted for a symmetric signing secret
pub const SYMMETRIC_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.jwt_secret.len() < 16 {
            return Err(ValidationError::auth(
                "JWT secret must be at least 16 characters long",
            ));
        }

        if !SYMMETRIC_ALGORITHMS.contains(&self.jwt_algorithm.as_str()) {
            return Err(ValidationError::auth(format!(
                "JWT algorithm must be one of {:?}, got: {}",
                SYMMETRIC_ALGORITHMS, self.jwt_algorithm
            )));
        }

        if self.access_token_ttl_seconds == 0 {
            return Err(ValidationError::auth(
                "Access token TTL must be greater than 0 seconds",
            ));
        }

        if self.refresh_token_ttl_seconds == 0 {
            return Err(ValidationError::auth(
                "Refresh token TTL must be greater than 0 seconds",
            ));
        }

        if self.revocation_retention_seconds == 0 {
            return Err(ValidationError::auth(
                "Revocation retention must be greater than 0 seconds",
            ));
        }

        Ok(())
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::store(format!(
                "Store url must start with redis:// or rediss://, got: {}",
                self.url
            )));
        }

        if self.namespace.is_empty() {
            return Err(ValidationError::store("Store namespace cannot be empty"));
        }

        if self.connection_timeout_seconds == 0 {
            return Err(ValidationError::store(
                "Connection timeout must be greater than 0 seconds",
            ));
        }

        if self.operation_timeout_ms == 0 {
            return Err(ValidationError::store(
                "Operation timeout must be greater than 0 milliseconds",
            ));
        }

        Ok(())
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.window_seconds == 0 {
            return Err(ValidationError::rate_limit(
                "Window must be greater than 0 seconds",
            ));
        }

        if self.max_requests == 0 {
            return Err(ValidationError::rate_limit(
                "max_requests must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.key_prefix.is_empty() {
            return Err(ValidationError::cache("Cache key prefix cannot be empty"));
        }

        if self.default_ttl_seconds == 0 {
            return Err(ValidationError::cache(
                "Cache TTL must be greater than 0 seconds",
            ));
        }

        if self.max_query_len == 0 {
            return Err(ValidationError::cache(
                "max_query_len must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.format.as_str() {
            "json" | "pretty" | "compact" => Ok(()),
            other => Err(ValidationError::logging(format!(
                "Log format must be json, pretty or compact, got: {}",
                other
            ))),
        }
    }
}
