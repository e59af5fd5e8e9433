//! Infrastructure Layer - Store backends and the gating components built on them

pub mod auth;
pub mod cache;
pub mod identity;
pub mod rate_limiter;
pub mod store;

pub use auth::{
    AuthGate, Authenticated, CacheRevocationStore, JwtService, RevocationStore, RoleGuard,
};
pub use cache::{CacheKey, CacheKeyBuilder, ResponseCache};
pub use identity::InMemoryIdentityRepository;
pub use rate_limiter::{SlidingWindowLimiter, WindowDecision};
pub use store::{DragonflyStore, InMemoryStore, KeyValueStore};
