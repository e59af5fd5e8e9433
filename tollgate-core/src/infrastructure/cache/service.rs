//! Cache-aside response cache
//!
//! Payloads are stored inside an envelope carrying creation and expiry
//! instants, optionally gzip-compressed behind a `GZIP` marker. Anything that
//! cannot be read back (store error, bad gzip stream, bad JSON, expired
//! envelope) is a miss. Write failures are logged and the fresh value is
//! still returned.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::key::CacheKey;
use super::single_flight::SingleFlight;
use crate::application::errors::GateError;
use crate::clock::{Clock, deadline_millis};
use crate::config::CacheConfig;
use crate::infrastructure::store::KeyValueStore;

const COMPRESSION_MARKER: &[u8; 4] = b"GZIP";

/// Stored form of a cached payload
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    /// Serialized payload, kept verbatim
    data: String,
    created_at_ms: i64,
    expires_at_ms: i64,
}

/// Cache-aside wrapper over the key-value store
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    enabled: bool,
    default_ttl: Duration,
    enable_compression: bool,
    compression_threshold_bytes: u64,
    flights: SingleFlight,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            enabled: config.enabled,
            default_ttl: config.default_ttl(),
            enable_compression: config.enable_compression,
            compression_threshold_bytes: config.compression_threshold_bytes,
            flights: SingleFlight::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Return the cached value for `key`, or compute, store and return it
    ///
    /// Concurrent misses on the same key within this process run `compute`
    /// once; the others reuse its result.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.coalesced(
            key,
            ttl,
            compute,
            |value: &T| serde_json::to_string(value).map_err(|e| e.to_string()),
            |payload: &str| serde_json::from_str(payload).map_err(|e| e.to_string()),
        )
        .await
    }

    /// Like [`get_or_compute`](Self::get_or_compute) for pre-serialized payloads
    ///
    /// Hits return exactly the bytes stored by the miss that populated them.
    pub async fn get_or_compute_payload<E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        self.coalesced(
            key,
            ttl,
            compute,
            |payload: &String| Ok(payload.clone()),
            |payload: &str| Ok(payload.to_string()),
        )
        .await
    }

    /// Delete the entry for `key`, returning whether one existed
    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        match self.store.delete(key.as_str()).await {
            Ok(existed) => {
                debug!(cache_key = %key, existed, "Invalidated cache key");
                existed
            }
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Failed to invalidate cache key");
                false
            }
        }
    }

    async fn coalesced<V, E, F, Fut, Enc, Dec>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        compute: F,
        encode: Enc,
        decode: Dec,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        Enc: Fn(&V) -> Result<String, String>,
        Dec: Fn(&str) -> Result<V, String>,
    {
        if !self.enabled {
            return compute().await;
        }

        if let Some(value) = self.lookup(key, &decode).await {
            return Ok(value);
        }

        let mut flight = self.flights.acquire(key.as_str()).await;
        if let Some(payload) = flight.payload() {
            match decode(payload) {
                Ok(value) => {
                    debug!(cache_key = %key, "Reused coalesced payload");
                    return Ok(value);
                }
                Err(e) => warn!(cache_key = %key, error = %e, "Coalesced payload undecodable"),
            }
        }

        // Another holder may have populated the store while we queued
        if let Some(value) = self.lookup(key, &decode).await {
            return Ok(value);
        }

        let value = compute().await?;

        match encode(&value) {
            Ok(payload) => {
                self.store_payload(key, &payload, ttl).await;
                flight.complete(payload);
            }
            Err(e) => warn!(cache_key = %key, error = %e, "Failed to serialize value for cache"),
        }

        Ok(value)
    }

    /// Read and decode an entry; every failure is reported as a miss
    async fn lookup<V, Dec>(&self, key: &CacheKey, decode: &Dec) -> Option<V>
    where
        Dec: Fn(&str) -> Result<V, String>,
    {
        let raw = match self.store.get(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(cache_key = %key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Cache read failed, computing fresh value");
                return None;
            }
        };

        let envelope = match self.open_envelope(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(
                    cache_key = %key,
                    code = e.code(),
                    error = %e,
                    "Treating corrupt cache entry as a miss"
                );
                return None;
            }
        };

        if self.clock.now_millis() >= envelope.expires_at_ms {
            debug!(cache_key = %key, "Cache entry expired");
            if let Err(e) = self.store.delete(key.as_str()).await {
                warn!(cache_key = %key, error = %e, "Failed to delete expired cache key");
            }
            return None;
        }

        match decode(&envelope.data) {
            Ok(value) => {
                debug!(cache_key = %key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(
                    cache_key = %key,
                    error = %e,
                    "Cached payload undecodable, treating as a miss"
                );
                None
            }
        }
    }

    async fn store_payload(&self, key: &CacheKey, payload: &str, ttl: Duration) {
        let now_ms = self.clock.now_millis();
        let envelope = CacheEnvelope {
            data: payload.to_string(),
            created_at_ms: now_ms,
            expires_at_ms: deadline_millis(now_ms, ttl),
        };

        let bytes = match self.seal_envelope(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        match self.store.set_ex(key.as_str(), &bytes, ttl).await {
            Ok(()) => debug!(
                cache_key = %key,
                ttl_seconds = ttl.as_secs(),
                bytes = bytes.len(),
                "Cached entry"
            ),
            Err(e) => warn!(
                cache_key = %key,
                error = %e,
                "Cache write failed, returning fresh value"
            ),
        }
    }

    fn seal_envelope(&self, envelope: &CacheEnvelope) -> Result<Vec<u8>, std::io::Error> {
        let serialized = serde_json::to_vec(envelope)?;
        if !self.enable_compression || serialized.len() as u64 <= self.compression_threshold_bytes {
            return Ok(serialized);
        }

        let mut encoder = flate2::write::GzEncoder::new(
            COMPRESSION_MARKER.to_vec(),
            flate2::Compression::default(),
        );
        encoder.write_all(&serialized)?;
        encoder.finish()
    }

    fn open_envelope(&self, raw: &[u8]) -> Result<CacheEnvelope, GateError> {
        let corrupt = |message: String| GateError::CacheEntryCorrupt { message };

        let decompressed;
        let json = match raw.strip_prefix(COMPRESSION_MARKER.as_slice()) {
            Some(compressed) => {
                let mut buffer = Vec::new();
                flate2::read::GzDecoder::new(compressed)
                    .read_to_end(&mut buffer)
                    .map_err(|e| corrupt(format!("decompression error: {}", e)))?;
                decompressed = buffer;
                decompressed.as_slice()
            }
            None => raw,
        };

        serde_json::from_slice(json).map_err(|e| corrupt(format!("envelope error: {}", e)))
    }
}
