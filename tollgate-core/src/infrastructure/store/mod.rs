//! Key-value store backends
//!
//! Every piece of gate state (revocation records, rate windows, cache entries)
//! lives in an external key-value store reached through [`KeyValueStore`]:
//! - [`DragonflyStore`] for distributed, production use
//! - [`InMemoryStore`] for development, single-instance deployments and tests
//!
//! The handle is built by the host application and passed explicitly into
//! each component.

mod dragonfly;
mod memory;

pub use dragonfly::DragonflyStore;
pub use memory::InMemoryStore;

use async_trait::async_trait;
use std::time::Duration;

use crate::application::errors::StoreError;

/// One sliding-window admission attempt
///
/// Executed by [`KeyValueStore::window_admit`] as a single atomic unit:
/// insert `member` at `now_ms`, prune scores `<= now_ms - window_ms`, count,
/// drop `member` again if the count exceeds `limit`, refresh the key TTL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowAdmission {
    pub key: String,
    /// Unique member recorded for this attempt
    pub member: String,
    pub now_ms: i64,
    pub window_ms: i64,
    pub limit: u32,
    /// Store-level TTL applied to the whole window key
    pub key_ttl: Duration,
}

/// Result of a [`WindowAdmission`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOutcome {
    pub admitted: bool,
    /// Entries left in the window after the attempt
    pub count: u64,
    /// Score of the oldest entry still in the window
    pub oldest_ms: Option<i64>,
}

/// Trait for key-value store backends
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a value, `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Set a value with TTL, overwriting any previous value
    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError>;

    /// Whether a live value exists for `key`
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Delete a key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Run one sliding-window admission atomically
    async fn window_admit(&self, admission: &WindowAdmission)
    -> Result<WindowOutcome, StoreError>;

    /// Check connectivity
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Store TTLs are applied with millisecond precision and must be positive
pub(crate) fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}
