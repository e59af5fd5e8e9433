//! Credential revocation (blocklist)
//!
//! Revoked credential ids are stored in the key-value store with a fixed
//! retention TTL. Absence of a record means "not known to be revoked", so
//! callers still check the credential's own expiry.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::application::errors::StoreError;
use crate::infrastructure::store::KeyValueStore;

/// Revocation store trait
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Mark a credential id as revoked; calling it again refreshes the record
    async fn revoke(&self, jti: &str) -> Result<(), StoreError>;

    /// Check if a live revocation record exists for `jti`
    async fn is_revoked(&self, jti: &str) -> Result<bool, StoreError>;
}

/// Store-backed implementation of the revocation blocklist
pub struct CacheRevocationStore {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    retention: Duration,
}

impl CacheRevocationStore {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        namespace: impl Into<String>,
        retention: Duration,
    ) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            retention,
        }
    }

    /// Generate the store key for a revoked credential
    pub fn record_key(&self, jti: &str) -> String {
        format!("{}:blocklist:{}", self.namespace, jti)
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }
}

#[async_trait]
impl RevocationStore for CacheRevocationStore {
    async fn revoke(&self, jti: &str) -> Result<(), StoreError> {
        self.store
            .set_ex(&self.record_key(jti), b"", self.retention)
            .await?;
        debug!(
            token_jti = %jti,
            retention_seconds = self.retention.as_secs(),
            "Credential revoked"
        );
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, StoreError> {
        self.store.exists(&self.record_key(jti)).await
    }
}
