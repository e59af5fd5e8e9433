//! Authentication infrastructure

pub mod gate;
pub mod jwt_service;
pub mod role_guard;
pub mod token_blacklist;

pub use gate::{AuthGate, Authenticated};
pub use jwt_service::JwtService;
pub use role_guard::{AuthorizationPolicy, RoleGuard, RoleMembershipPolicy};
pub use token_blacklist::{CacheRevocationStore, RevocationStore};
