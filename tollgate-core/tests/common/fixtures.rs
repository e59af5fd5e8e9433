//! Test fixtures for tollgate-core

use std::sync::Arc;

use tollgate_core::clock::ManualClock;
use tollgate_core::config::Config;
use tollgate_core::domain::auth::{Identity, IdentityId, Role};
use tollgate_core::infrastructure::auth::{AuthGate, CacheRevocationStore, JwtService, RoleGuard};
use tollgate_core::infrastructure::identity::InMemoryIdentityRepository;
use tollgate_core::infrastructure::store::{InMemoryStore, KeyValueStore};

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-characters-long";

/// Configuration with a test secret and otherwise default values
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config
}

pub fn test_identity(role: Role) -> Identity {
    Identity::new(
        IdentityId::generate(),
        format!("{}@example.com", role),
        role,
    )
}

/// Fully wired gate over an in-memory store and a manual clock
pub struct GateHarness {
    pub config: Config,
    pub clock: Arc<ManualClock>,
    pub store: Arc<InMemoryStore>,
    pub jwt_service: Arc<JwtService>,
    pub revocations: Arc<CacheRevocationStore>,
    pub identities: Arc<InMemoryIdentityRepository>,
    pub gate: Arc<AuthGate>,
}

impl GateHarness {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        Self::with_store(clock, store.clone(), store)
    }

    /// Harness whose revocation records go to `revocation_store`
    pub fn with_store(
        clock: Arc<ManualClock>,
        store: Arc<InMemoryStore>,
        revocation_store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let config = test_config();
        let jwt_service = Arc::new(
            JwtService::from_config(&config.auth, clock.clone()).expect("valid test codec"),
        );
        let revocations = Arc::new(CacheRevocationStore::new(
            revocation_store,
            config.store.namespace.clone(),
            config.auth.revocation_retention(),
        ));
        let identities = Arc::new(InMemoryIdentityRepository::new());
        let gate = Arc::new(AuthGate::new(
            (*jwt_service).clone(),
            revocations.clone(),
            identities.clone(),
        ));

        Self {
            config,
            clock,
            store,
            jwt_service,
            revocations,
            identities,
            gate,
        }
    }

    /// Register an identity with the given role
    pub async fn register(&self, role: Role) -> Identity {
        let identity = test_identity(role);
        self.identities.insert(identity.clone()).await;
        identity
    }

    pub fn role_guard(&self) -> RoleGuard {
        RoleGuard::with_membership_policy(self.gate.clone())
    }
}
