//! Gate wiring
//!
//! [`GateServices`] owns every gating component for one host application.
//! The host builds it once, keeps it for as long as it serves requests and
//! drops it on shutdown; nothing here is global.

use std::sync::Arc;

use tollgate_core::application::auth::{
    IssueCredentialsUseCase, LogoutUseCase, RefreshAccessTokenUseCase,
};
use tollgate_core::application::errors::StoreError;
use tollgate_core::clock::{Clock, SystemClock};
use tollgate_core::config::Config;
use tollgate_core::domain::auth::{CredentialError, IIdentityRepository};
use tollgate_core::infrastructure::auth::{AuthGate, CacheRevocationStore, JwtService, RoleGuard};
use tollgate_core::infrastructure::cache::{CacheKeyBuilder, ResponseCache};
use tollgate_core::infrastructure::rate_limiter::SlidingWindowLimiter;
use tollgate_core::infrastructure::store::{DragonflyStore, KeyValueStore};

/// Errors raised while wiring the gate
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to connect to the gate store: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid credential codec configuration: {0}")]
    Codec(#[from] CredentialError),
}

/// Every gating component, sharing one store handle
pub struct GateServices {
    pub config: Arc<Config>,
    pub store: Arc<dyn KeyValueStore>,
    pub gate: Arc<AuthGate>,
    pub role_guard: Arc<RoleGuard>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub cache: Arc<ResponseCache>,
    pub cache_keys: CacheKeyBuilder,
    pub issue_credentials: Arc<IssueCredentialsUseCase>,
    pub refresh: Arc<RefreshAccessTokenUseCase>,
    pub logout: Arc<LogoutUseCase>,
}

impl GateServices {
    /// Connect to Dragonfly and wire every component against it
    pub async fn connect(
        config: &Config,
        identities: Arc<dyn IIdentityRepository>,
    ) -> Result<Self, StartupError> {
        let store = Arc::new(DragonflyStore::connect(&config.store).await?);
        tracing::info!(
            namespace = %config.store.namespace,
            "Gate store connected"
        );
        Self::with_store(config, store, identities, Arc::new(SystemClock))
    }

    /// Wire every component against an already constructed store
    pub fn with_store(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        identities: Arc<dyn IIdentityRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StartupError> {
        let jwt_service = Arc::new(JwtService::from_config(&config.auth, clock.clone())?);

        let revocations = Arc::new(CacheRevocationStore::new(
            store.clone(),
            config.store.namespace.clone(),
            config.auth.revocation_retention(),
        ));
        let gate = Arc::new(AuthGate::new(
            (*jwt_service).clone(),
            revocations,
            identities,
        ));
        let role_guard = Arc::new(RoleGuard::with_membership_policy(gate.clone()));

        let limiter = Arc::new(SlidingWindowLimiter::from_config(
            store.clone(),
            config.store.namespace.clone(),
            &config.rate_limit,
            clock.clone(),
        ));
        let cache = Arc::new(ResponseCache::new(store.clone(), &config.cache, clock));

        Ok(Self {
            config: Arc::new(config.clone()),
            store,
            issue_credentials: Arc::new(IssueCredentialsUseCase::from_config(
                jwt_service,
                &config.auth,
            )),
            refresh: Arc::new(RefreshAccessTokenUseCase::new(
                gate.clone(),
                config.auth.access_token_ttl(),
            )),
            logout: Arc::new(LogoutUseCase::new(gate.clone())),
            gate,
            role_guard,
            limiter,
            cache,
            cache_keys: CacheKeyBuilder::from_config(&config.cache),
        })
    }
}
