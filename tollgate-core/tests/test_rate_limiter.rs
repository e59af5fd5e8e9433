//! Test suite for the sliding-window rate limiter
//!
//! Tests cover:
//! - Window admission and recovery over simulated time
//! - Rejected attempts not consuming quota
//! - Atomicity under concurrent callers
//! - Fail-open behavior when the store is down
//! - Integration with Dragonfly/Redis

mod common;

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use common::*;
use tollgate_core::clock::ManualClock;
use tollgate_core::config::RateLimitConfig;
use tollgate_core::infrastructure::rate_limiter::SlidingWindowLimiter;
use tollgate_core::infrastructure::store::{InMemoryStore, KeyValueStore};

// ============================================================================
// Test Fixtures
// ============================================================================

fn default_limiter() -> (Arc<ManualClock>, Arc<InMemoryStore>, SlidingWindowLimiter) {
    let clock = Arc::new(ManualClock::new());
    let store = Arc::new(InMemoryStore::new(clock.clone()));
    let limiter = SlidingWindowLimiter::from_config(
        store.clone(),
        "gate",
        &RateLimitConfig::default(),
        clock.clone(),
    );
    (clock, store, limiter)
}

// ============================================================================
// Sliding Window Tests
// ============================================================================

mod sliding_window_tests {
    use super::*;

    #[tokio::test]
    async fn test_ten_per_minute_then_recovery() {
        let (clock, _store, limiter) = default_limiter();

        for _ in 0..10 {
            assert!(limiter.allow("identity-1").await);
            clock.advance(Duration::from_millis(50));
        }
        assert!(!limiter.allow("identity-1").await);

        clock.advance(Duration::from_secs(61));
        assert!(limiter.allow("identity-1").await);
    }

    #[tokio::test]
    async fn test_rejected_attempts_do_not_consume_quota() {
        let (clock, _store, limiter) = default_limiter();

        for _ in 0..10 {
            assert!(limiter.allow("identity-1").await);
        }
        // Hammering while blocked must not extend the block
        for _ in 0..25 {
            clock.advance(Duration::from_secs(2));
            assert!(!limiter.allow("identity-1").await);
        }

        // 50s elapsed; the original ten leave the window at the 60s mark
        clock.advance(Duration::from_secs(10));
        let decision = limiter.check("identity-1").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.count, 1);
    }

    #[tokio::test]
    async fn test_window_slides_instead_of_resetting() {
        let (clock, _store, limiter) = default_limiter();

        for _ in 0..5 {
            assert!(limiter.allow("identity-1").await);
        }
        clock.advance(Duration::from_secs(30));
        for _ in 0..5 {
            assert!(limiter.allow("identity-1").await);
        }
        assert!(!limiter.allow("identity-1").await);

        // The first five leave, the last five are still counted
        clock.advance(Duration::from_secs(31));
        let decision = limiter.check("identity-1").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.count, 6);
        assert_eq!(decision.remaining(), 4);
    }

    #[tokio::test]
    async fn test_blocked_decision_reports_retry_after() {
        let (_clock, _store, limiter) = default_limiter();
        for _ in 0..10 {
            limiter.check("identity-1").await.unwrap();
        }
        let decision = limiter.check("identity-1").await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.limit, 10);
        assert_eq!(decision.remaining(), 0);
        assert_eq!(decision.retry_after_secs, Some(60));
    }

    #[tokio::test]
    async fn test_abandoned_window_expires() {
        let (clock, store, limiter) = default_limiter();
        assert!(limiter.allow("identity-1").await);
        assert_eq!(store.len().await, 1);

        clock.advance(Duration::from_secs(120));
        assert!(store.is_empty().await);
    }
}

// ============================================================================
// Concurrency Tests
// ============================================================================

mod concurrency_tests {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_callers_never_exceed_limit() {
        let (_clock, _store, limiter) = default_limiter();
        let limiter = Arc::new(limiter);

        let results = join_all((0..50).map(|_| {
            let limiter = limiter.clone();
            async move { limiter.allow("identity-1").await }
        }))
        .await;

        assert_eq!(results.iter().filter(|admitted| **admitted).count(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks_never_exceed_limit() {
        let (_clock, _store, limiter) = default_limiter();
        let limiter = Arc::new(limiter);

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.allow("identity-1").await })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }
}

// ============================================================================
// Failure Mode Tests
// ============================================================================

mod fail_open_tests {
    use super::*;

    #[tokio::test]
    async fn test_store_outage_admits_requests() {
        let clock = Arc::new(ManualClock::new());
        let store = Arc::new(UnavailableStore::default());
        let limiter = SlidingWindowLimiter::new(
            store.clone(),
            "gate",
            Duration::from_secs(60),
            1,
            clock,
        );

        for _ in 0..5 {
            assert!(limiter.allow("identity-1").await);
        }
        assert!(limiter.check("identity-1").await.is_err());
        assert_eq!(store.calls.load(std::sync::atomic::Ordering::SeqCst), 6);
    }
}

// ============================================================================
// Dragonfly Integration Tests
// ============================================================================

mod dragonfly_tests {
    use super::*;
    use tollgate_core::config::StoreConfig;
    use tollgate_core::infrastructure::store::DragonflyStore;
    use tollgate_core::SystemClock;
    use uuid::Uuid;

    #[tokio::test]
    #[ignore = "requires a running Dragonfly/Redis"]
    async fn test_dragonfly_sliding_window() {
        let store = Arc::new(DragonflyStore::connect(&StoreConfig::default()).await.unwrap());
        let identity = Uuid::new_v4().to_string();
        let limiter = SlidingWindowLimiter::new(
            store.clone(),
            "tollgate-test",
            Duration::from_secs(60),
            10,
            Arc::new(SystemClock),
        );

        let results = join_all((0..15).map(|_| limiter.allow(&identity))).await;
        assert_eq!(results.iter().filter(|admitted| **admitted).count(), 10);

        store
            .delete(&format!("tollgate-test:ratelimit:{}", identity))
            .await
            .unwrap();
    }
}
