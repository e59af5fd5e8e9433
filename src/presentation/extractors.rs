//! Authentication extractors for Axum

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use super::models::ErrorResponse;
use tollgate_core::application::errors::GateError;
use tollgate_core::domain::auth::Identity;
use tollgate_core::infrastructure::auth::Authenticated;

/// Extract the credential from an `Authorization: Bearer <token>` header
///
/// A missing header, a non-Bearer scheme or an empty token all count as a
/// malformed credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, GateError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(GateError::CredentialMalformed)?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or(GateError::CredentialMalformed)?;

    if token.is_empty() {
        return Err(GateError::CredentialMalformed);
    }
    Ok(token)
}

/// Identity admitted by [`require_access`](super::middleware::require_access)
/// or [`require_roles`](super::middleware::require_roles)
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Authenticated);

impl CurrentIdentity {
    pub fn identity(&self) -> &Identity {
        &self.0.identity
    }
}

/// Rejection for [`CurrentIdentity`] on a route mounted without gating middleware
///
/// This is a host wiring fault, so it is reported as a server error.
#[derive(Debug)]
pub struct UngatedRoute {
    pub path: String,
}

impl IntoResponse for UngatedRoute {
    fn into_response(self) -> Response {
        tracing::error!(path = %self.path, "CurrentIdentity used on an ungated route");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("GATE_NOT_CONFIGURED", "Internal error")),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = UngatedRoute;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Authenticated>()
            .map(|authenticated| Self(authenticated.clone()))
            .ok_or_else(|| UngatedRoute {
                path: parts.uri.path().to_string(),
            })
    }
}
