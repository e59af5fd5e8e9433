//! Gating middleware
//!
//! Both layers authenticate the bearer credential, then charge the admitted
//! identity's sliding window. The [`Authenticated`] result is placed in the
//! request extensions for [`CurrentIdentity`](super::extractors::CurrentIdentity).

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::errors::GateRejection;
use super::extractors::bearer_token;
use crate::app::GateServices;
use tollgate_core::application::errors::GateError;
use tollgate_core::domain::auth::{CredentialKind, RoleSet};
use tollgate_core::infrastructure::auth::Authenticated;

/// State for [`require_roles`]
#[derive(Clone)]
pub struct RoleRequirement {
    pub services: Arc<GateServices>,
    pub roles: RoleSet,
}

impl RoleRequirement {
    pub fn new(services: Arc<GateServices>, roles: RoleSet) -> Self {
        Self { services, roles }
    }
}

/// Admit any identity holding a valid access credential
pub async fn require_access(
    State(services): State<Arc<GateServices>>,
    request: Request,
    next: Next,
) -> Response {
    // Owned so no borrow of the request is held across the await
    let token = match bearer_token(request.headers()) {
        Ok(token) => token.to_owned(),
        Err(e) => return GateRejection(e).into_response(),
    };
    let authenticated = services
        .gate
        .authenticate(&token, CredentialKind::Access)
        .await;

    match authenticated {
        Ok(authenticated) => admit(&services, authenticated, request, next).await,
        Err(e) => GateRejection(e).into_response(),
    }
}

/// Admit identities whose role is in the configured set
pub async fn require_roles(
    State(requirement): State<RoleRequirement>,
    request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Ok(token) => token.to_owned(),
        Err(e) => return GateRejection(e).into_response(),
    };
    let authenticated = requirement
        .services
        .role_guard
        .authorize(&token, &requirement.roles)
        .await;

    match authenticated {
        Ok(authenticated) => admit(&requirement.services, authenticated, request, next).await,
        Err(e) => GateRejection(e).into_response(),
    }
}

async fn admit(
    services: &GateServices,
    authenticated: Authenticated,
    mut request: Request,
    next: Next,
) -> Response {
    let identity_id = authenticated.identity.id.as_str();
    let decision = services.limiter.decide(&identity_id).await;

    if !decision.allowed {
        let retry_after_secs = decision.retry_after_secs.unwrap_or(1);
        tracing::warn!(
            identity_id = %identity_id,
            retry_after = retry_after_secs,
            "Rate limit exceeded"
        );
        return GateRejection(GateError::RateLimited { retry_after_secs }).into_response();
    }

    request.extensions_mut().insert(authenticated);
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining()));
    response
}
