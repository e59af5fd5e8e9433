//! Test suite for credential gating
//!
//! Tests cover:
//! - Credential expiry against a simulated clock
//! - Revocation and revocation retention
//! - Check ordering and distinct failure kinds
//! - Role guard decisions
//! - Fail-closed behavior when the store or identity lookup is down

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use tollgate_core::application::errors::GateError;
use tollgate_core::domain::auth::{CredentialKind, Role, RoleSet};
use tollgate_core::infrastructure::auth::{AuthGate, CacheRevocationStore, RevocationStore};
use tollgate_core::infrastructure::store::{InMemoryStore, KeyValueStore};

// ============================================================================
// Expiry
// ============================================================================

mod expiry_tests {
    use super::*;

    #[tokio::test]
    async fn test_access_credential_expires_after_fifteen_minutes() {
        let harness = GateHarness::new();
        let identity = harness.register(Role::User).await;
        let token = harness
            .jwt_service
            .issue(
                identity.to_claims(),
                Duration::from_secs(15 * 60),
                CredentialKind::Access,
            )
            .unwrap();

        harness.clock.advance(Duration::from_secs(14 * 60));
        assert!(harness.gate.authenticate(&token, CredentialKind::Access).await.is_ok());

        harness.clock.advance(Duration::from_secs(61));
        let err = harness
            .gate
            .authenticate(&token, CredentialKind::Access)
            .await
            .unwrap_err();
        assert_eq!(err, GateError::CredentialExpired);
        assert_eq!(err.code(), "CREDENTIAL_EXPIRED");
    }

    #[tokio::test]
    async fn test_expiry_checked_before_revocation() {
        let harness = GateHarness::new();
        let identity = harness.register(Role::User).await;
        let token = harness
            .jwt_service
            .issue(identity.to_claims(), Duration::from_secs(60), CredentialKind::Access)
            .unwrap();
        let jti = harness.jwt_service.verify(&token).unwrap().jti;
        harness.revocations.revoke(&jti).await.unwrap();

        harness.clock.advance(Duration::from_secs(120));
        let err = harness
            .gate
            .authenticate(&token, CredentialKind::Access)
            .await
            .unwrap_err();
        assert_eq!(err, GateError::CredentialExpired);
    }
}

// ============================================================================
// Revocation
// ============================================================================

mod revocation_tests {
    use super::*;

    #[tokio::test]
    async fn test_revoked_credential_rejected_while_signature_valid() {
        let harness = GateHarness::new();
        let identity = harness.register(Role::User).await;
        let token = harness
            .jwt_service
            .issue(identity.to_claims(), Duration::from_secs(900), CredentialKind::Access)
            .unwrap();

        let jti = harness.jwt_service.verify(&token).unwrap().jti;
        assert!(!harness.revocations.is_revoked(&jti).await.unwrap());
        harness.revocations.revoke(&jti).await.unwrap();
        assert!(harness.revocations.is_revoked(&jti).await.unwrap());

        // Signature and expiry are still fine
        assert!(harness.jwt_service.verify(&token).is_ok());
        let err = harness
            .gate
            .authenticate(&token, CredentialKind::Access)
            .await
            .unwrap_err();
        assert_eq!(err, GateError::CredentialRevoked);
    }

    #[tokio::test]
    async fn test_revocation_outlives_credential_until_retention_elapses() {
        let harness = GateHarness::new();
        let identity = harness.register(Role::User).await;
        let token = harness
            .jwt_service
            .issue(identity.to_claims(), Duration::from_secs(60), CredentialKind::Access)
            .unwrap();
        let jti = harness.jwt_service.verify(&token).unwrap().jti;
        harness.revocations.revoke(&jti).await.unwrap();

        // The credential itself expired long ago; the record stays
        harness.clock.advance(Duration::from_secs(3599));
        assert!(harness.revocations.is_revoked(&jti).await.unwrap());

        harness.clock.advance(Duration::from_secs(1));
        assert!(!harness.revocations.is_revoked(&jti).await.unwrap());
    }

    #[tokio::test]
    async fn test_revocation_record_key_and_ttl() {
        let harness = GateHarness::new();
        harness.revocations.revoke("abc").await.unwrap();
        assert_eq!(harness.store.len().await, 1);
        assert_eq!(
            harness.store.get("gate:blocklist:abc").await.unwrap(),
            Some(Vec::new())
        );

        harness.clock.advance(Duration::from_secs(3600));
        assert_eq!(harness.store.cleanup().await, 1);
    }
}

// ============================================================================
// Check ordering
// ============================================================================

mod ordering_tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_is_malformed() {
        let harness = GateHarness::new();
        let err = harness
            .gate
            .authenticate("Bearer nonsense", CredentialKind::Access)
            .await
            .unwrap_err();
        assert_eq!(err, GateError::CredentialMalformed);
    }

    #[tokio::test]
    async fn test_wrong_kind_checked_before_revocation() {
        let harness = GateHarness::new();
        let identity = harness.register(Role::User).await;
        let token = harness
            .jwt_service
            .issue(identity.to_claims(), Duration::from_secs(900), CredentialKind::Refresh)
            .unwrap();
        let jti = harness.jwt_service.verify(&token).unwrap().jti;
        harness.revocations.revoke(&jti).await.unwrap();

        let err = harness
            .gate
            .authenticate(&token, CredentialKind::Access)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GateError::WrongCredentialKind {
                expected: CredentialKind::Access,
                actual: CredentialKind::Refresh,
            }
        );
    }

    #[tokio::test]
    async fn test_revocation_checked_before_identity_lookup() {
        let harness = GateHarness::new();
        let identity = harness.register(Role::User).await;
        let token = harness
            .jwt_service
            .issue(identity.to_claims(), Duration::from_secs(900), CredentialKind::Access)
            .unwrap();
        let jti = harness.jwt_service.verify(&token).unwrap().jti;
        harness.revocations.revoke(&jti).await.unwrap();
        harness.identities.remove(&identity.id).await;

        let err = harness
            .gate
            .authenticate(&token, CredentialKind::Access)
            .await
            .unwrap_err();
        assert_eq!(err, GateError::CredentialRevoked);
    }

    #[tokio::test]
    async fn test_deleted_identity_not_found() {
        let harness = GateHarness::new();
        let identity = harness.register(Role::Admin).await;
        let token = harness
            .jwt_service
            .issue(identity.to_claims(), Duration::from_secs(900), CredentialKind::Access)
            .unwrap();
        harness.identities.remove(&identity.id).await;

        let err = harness
            .gate
            .authenticate(&token, CredentialKind::Access)
            .await
            .unwrap_err();
        assert_eq!(err, GateError::IdentityNotFound);
        assert!(err.is_authentication_failure());
    }
}

// ============================================================================
// Role guard
// ============================================================================

mod role_guard_tests {
    use super::*;

    #[tokio::test]
    async fn test_admin_only_operation() {
        let harness = GateHarness::new();
        let guard = harness.role_guard();
        let admins = RoleSet::from([Role::Admin]);

        let user = harness.register(Role::User).await;
        let user_token = harness
            .jwt_service
            .issue(user.to_claims(), Duration::from_secs(900), CredentialKind::Access)
            .unwrap();
        assert_eq!(
            guard.authorize(&user_token, &admins).await.unwrap_err(),
            GateError::RoleForbidden
        );

        let admin = harness.register(Role::Admin).await;
        let admin_token = harness
            .jwt_service
            .issue(admin.to_claims(), Duration::from_secs(900), CredentialKind::Access)
            .unwrap();
        let authorized = guard.authorize(&admin_token, &admins).await.unwrap();
        assert_eq!(authorized.identity, admin);
    }

    #[tokio::test]
    async fn test_gate_failures_surface_through_role_guard() {
        let harness = GateHarness::new();
        let guard = harness.role_guard();
        let admin = harness.register(Role::Admin).await;
        let token = harness
            .jwt_service
            .issue(admin.to_claims(), Duration::from_secs(900), CredentialKind::Access)
            .unwrap();
        let jti = harness.jwt_service.verify(&token).unwrap().jti;
        harness.revocations.revoke(&jti).await.unwrap();

        assert_eq!(
            guard
                .authorize(&token, &RoleSet::from([Role::Admin]))
                .await
                .unwrap_err(),
            GateError::CredentialRevoked
        );
    }
}

// ============================================================================
// Fail-closed
// ============================================================================

mod fail_closed_tests {
    use super::*;

    #[tokio::test]
    async fn test_store_outage_rejects_credential() {
        let down = Arc::new(UnavailableStore::default());
        let clock = Arc::new(tollgate_core::ManualClock::new());
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        let harness = GateHarness::with_store(clock, store, down.clone());
        let identity = harness.register(Role::User).await;
        let token = harness
            .jwt_service
            .issue(identity.to_claims(), Duration::from_secs(900), CredentialKind::Access)
            .unwrap();

        let err = harness
            .gate
            .authenticate(&token, CredentialKind::Access)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::StoreUnavailable(_)));
        assert_eq!(err.code(), "STORE_UNAVAILABLE");
        assert!(!err.public_message().contains("os error"));
        assert!(down.calls.load(std::sync::atomic::Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn test_identity_lookup_outage_rejects_credential() {
        let harness = GateHarness::new();
        let identity = harness.register(Role::User).await;
        let revocations: Arc<dyn RevocationStore> = Arc::new(CacheRevocationStore::new(
            harness.store.clone(),
            "gate",
            Duration::from_secs(3600),
        ));
        let gate = AuthGate::new(
            (*harness.jwt_service).clone(),
            revocations,
            Arc::new(UnavailableIdentityRepository),
        );
        let token = harness
            .jwt_service
            .issue(identity.to_claims(), Duration::from_secs(900), CredentialKind::Access)
            .unwrap();

        let err = gate
            .authenticate(&token, CredentialKind::Access)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::StoreUnavailable(_)));
    }
}
