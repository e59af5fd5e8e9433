//! Sliding Window Rate Limiter
//!
//! Each identity owns an ordered set of request timestamps in the store. A
//! check inserts the current timestamp, prunes everything at or before
//! `now - window`, counts what is left and drops its own entry again when the
//! count exceeds the limit, so rejected attempts never occupy a slot. The
//! whole sequence runs atomically inside the store; concurrent callers are
//! serialized there, not by any in-process lock.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::types::{WindowDecision, window_key};
use crate::application::errors::StoreError;
use crate::clock::{Clock, duration_millis};
use crate::config::RateLimitConfig;
use crate::infrastructure::store::{KeyValueStore, WindowAdmission};

/// Per-identity sliding window limiter
pub struct SlidingWindowLimiter {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    window: Duration,
    max_requests: u32,
    enabled: bool,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowLimiter {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        namespace: impl Into<String>,
        window: Duration,
        max_requests: u32,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            window,
            max_requests,
            enabled: true,
            clock,
        }
    }

    pub fn from_config(
        store: Arc<dyn KeyValueStore>,
        namespace: impl Into<String>,
        config: &RateLimitConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            enabled: config.enabled,
            ..Self::new(store, namespace, config.window(), config.max_requests, clock)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Record one attempt for `identity` and decide whether it is admitted
    pub async fn check(&self, identity: &str) -> Result<WindowDecision, StoreError> {
        if !self.enabled {
            return Ok(WindowDecision::allowed(0, self.max_requests));
        }

        let now_ms = self.clock.now_millis();
        let window_ms = duration_millis(self.window);
        let admission = WindowAdmission {
            key: window_key(&self.namespace, identity),
            member: format!("{}-{}", now_ms, Uuid::new_v4()),
            now_ms,
            window_ms,
            limit: self.max_requests,
            key_ttl: self.window * 2,
        };

        let outcome = self.store.window_admit(&admission).await?;

        if outcome.admitted {
            debug!(
                identity = %identity,
                count = outcome.count,
                limit = self.max_requests,
                "Rate limit check passed"
            );
            return Ok(WindowDecision::allowed(outcome.count, self.max_requests));
        }

        // The oldest entry leaves the window once its score falls to now - window
        let frees_at_ms = outcome.oldest_ms.unwrap_or(now_ms).saturating_add(window_ms);
        let wait_ms = u64::try_from(frees_at_ms.saturating_sub(now_ms)).unwrap_or(0);
        let retry_after_secs = wait_ms.div_ceil(1000).max(1);

        debug!(
            identity = %identity,
            count = outcome.count,
            limit = self.max_requests,
            retry_after_secs,
            "Rate limit exceeded"
        );
        Ok(WindowDecision::blocked(
            outcome.count,
            self.max_requests,
            retry_after_secs,
        ))
    }

    /// Like [`check`](Self::check), but admits the request when the store fails
    pub async fn decide(&self, identity: &str) -> WindowDecision {
        match self.check(identity).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(
                    identity = %identity,
                    error = %e,
                    "Rate limit store unavailable, allowing request"
                );
                WindowDecision::allowed(0, self.max_requests)
            }
        }
    }

    /// Whether a request for `identity` is admitted (fail-open)
    pub async fn allow(&self, identity: &str) -> bool {
        self.decide(identity).await.allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::infrastructure::store::InMemoryStore;

    fn limiter(max_requests: u32) -> (Arc<ManualClock>, SlidingWindowLimiter) {
        let clock = Arc::new(ManualClock::new());
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        let limiter = SlidingWindowLimiter::new(
            store,
            "gate",
            Duration::from_secs(60),
            max_requests,
            clock.clone(),
        );
        (clock, limiter)
    }

    #[tokio::test]
    async fn test_limit_then_reject() {
        let (_clock, limiter) = limiter(3);
        for expected in 1..=3 {
            let decision = limiter.check("alice").await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.count, expected);
        }
        let decision = limiter.check("alice").await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after_secs, Some(60));
    }

    #[tokio::test]
    async fn test_identities_are_independent() {
        let (_clock, limiter) = limiter(1);
        assert!(limiter.allow("alice").await);
        assert!(!limiter.allow("alice").await);
        assert!(limiter.allow("bob").await);
    }

    #[tokio::test]
    async fn test_retry_after_tracks_oldest_entry() {
        let (clock, limiter) = limiter(2);
        assert!(limiter.allow("alice").await);
        clock.advance(Duration::from_secs(20));
        assert!(limiter.allow("alice").await);
        clock.advance(Duration::from_millis(500));

        let decision = limiter.check("alice").await.unwrap();
        assert!(!decision.allowed);
        // Oldest entry frees up 39.5s from now
        assert_eq!(decision.retry_after_secs, Some(40));
    }

    #[tokio::test]
    async fn test_disabled_limiter_admits_everything() {
        let clock = Arc::new(ManualClock::new());
        let config = RateLimitConfig {
            enabled: false,
            window_seconds: 60,
            max_requests: 1,
        };
        let limiter = SlidingWindowLimiter::from_config(
            Arc::new(InMemoryStore::new(clock.clone())),
            "gate",
            &config,
            clock,
        );
        for _ in 0..5 {
            assert!(limiter.allow("alice").await);
        }
    }
}
