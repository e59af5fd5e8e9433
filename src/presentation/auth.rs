//! Credential refresh and logout handlers

use axum::{Json, extract::State, http::HeaderMap};
use std::sync::Arc;

use super::errors::GateRejection;
use super::extractors::bearer_token;
use super::models::{LogoutResponse, TokenResponse};
use crate::app::GateServices;

/// Exchange the refresh credential in the `Authorization` header for a new access credential
pub async fn refresh(
    State(services): State<Arc<GateServices>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, GateRejection> {
    let refresh_token = bearer_token(&headers)?;
    let result = services.refresh.execute(refresh_token).await?;

    tracing::debug!(identity_id = %result.identity.id, "Access credential refreshed");
    Ok(Json(TokenResponse::bearer(
        result.access_token,
        result.expires_in,
    )))
}

/// Revoke the access credential in the `Authorization` header
pub async fn logout(
    State(services): State<Arc<GateServices>>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, GateRejection> {
    let access_token = bearer_token(&headers)?;
    let revoked_jti = services.logout.execute(access_token).await?;

    Ok(Json(LogoutResponse {
        message: "Logged out".to_string(),
        revoked_jti,
    }))
}
