//! HTTP boundary for the gate
//!
//! Host applications mount [`auth_routes`] and wrap their own routers with
//! [`middleware::require_access`] or [`middleware::require_roles`].

pub mod auth;
pub mod cache;
pub mod errors;
pub mod extractors;
pub mod middleware;
pub mod models;


use axum::{Router, routing::post};
use std::sync::Arc;

use crate::app::GateServices;

pub use errors::GateRejection;
pub use extractors::{CurrentIdentity, UngatedRoute, bearer_token};
pub use middleware::{RoleRequirement, require_access, require_roles};

/// Credential lifecycle routes: `POST /auth/refresh` and `POST /auth/logout`
pub fn auth_routes(services: Arc<GateServices>) -> Router {
    Router::new()
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .with_state(services)
}
