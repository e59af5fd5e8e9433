//! In-memory store backend

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use super::{KeyValueStore, WindowAdmission, WindowOutcome};
use crate::application::errors::StoreError;
use crate::clock::{Clock, deadline_millis};

const MIN_TTL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
enum StoredValue {
    Bytes(Vec<u8>),
    /// Ordered by `(score, member)`
    SortedSet(BTreeSet<(i64, String)>),
}

#[derive(Debug, Clone)]
struct StoredEntry {
    value: StoredValue,
    expires_at_ms: i64,
}

impl StoredEntry {
    fn is_live(&self, now_ms: i64) -> bool {
        self.expires_at_ms > now_ms
    }
}

/// In-memory store backend
///
/// Expiry is evaluated against the injected clock; every operation runs under
/// one lock acquisition, which makes `window_admit` atomic per process.
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, StoredEntry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Purge expired keys, returning how many were removed
    pub async fn cleanup(&self) -> usize {
        let now_ms = self.clock.now_millis();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now_ms));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Purged expired in-memory store entries");
        }
        removed
    }

    /// Number of live keys
    pub async fn len(&self) -> usize {
        let now_ms = self.clock.now_millis();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.is_live(now_ms)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let now_ms = self.clock.now_millis();
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(now_ms) => match &entry.value {
                StoredValue::Bytes(bytes) => Ok(Some(bytes.clone())),
                StoredValue::SortedSet(_) => Err(StoreError::UnexpectedResponse {
                    message: format!("WRONGTYPE key {} holds a sorted set", key),
                }),
            },
            _ => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        let now_ms = self.clock.now_millis();
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            StoredEntry {
                value: StoredValue::Bytes(value.to_vec()),
                expires_at_ms: deadline_millis(now_ms, ttl.max(MIN_TTL)),
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now_ms = self.clock.now_millis();
        let entries = self.entries.read().await;
        Ok(entries.get(key).is_some_and(|e| e.is_live(now_ms)))
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let now_ms = self.clock.now_millis();
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some_and(|e| e.is_live(now_ms)))
    }

    async fn window_admit(
        &self,
        admission: &WindowAdmission,
    ) -> Result<WindowOutcome, StoreError> {
        let now_ms = self.clock.now_millis();
        let mut entries = self.entries.write().await;

        let entry = entries
            .entry(admission.key.clone())
            .or_insert_with(|| StoredEntry {
                value: StoredValue::SortedSet(BTreeSet::new()),
                expires_at_ms: 0,
            });
        if !entry.is_live(now_ms) {
            entry.value = StoredValue::SortedSet(BTreeSet::new());
        }

        let StoredValue::SortedSet(window) = &mut entry.value else {
            return Err(StoreError::UnexpectedResponse {
                message: format!("WRONGTYPE key {} does not hold a sorted set", admission.key),
            });
        };

        let member = (admission.now_ms, admission.member.clone());
        window.insert(member.clone());

        let cutoff = admission.now_ms.saturating_sub(admission.window_ms);
        window.retain(|(score, _)| *score > cutoff);

        let mut count = window.len() as u64;
        let admitted = count <= u64::from(admission.limit);
        if !admitted {
            window.remove(&member);
            count -= 1;
        }

        let oldest_ms = window.first().map(|(score, _)| *score);
        entry.expires_at_ms = deadline_millis(now_ms, admission.key_ttl.max(MIN_TTL));

        Ok(WindowOutcome {
            admitted,
            count,
            oldest_ms,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
