//! Credential lifecycle use cases

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::errors::GateError;
use crate::config::AuthConfig;
use crate::domain::auth::{CredentialKind, Identity};
use crate::infrastructure::auth::{AuthGate, JwtService, RevocationStore};

/// Access and refresh credentials issued together
#[derive(Debug, Clone)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access credential lifetime in seconds
    pub expires_in: u64,
}

/// Result of a successful refresh
#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub access_token: String,
    pub expires_in: u64,
    pub identity: Identity,
}

/// Use case for issuing a credential pair to an already-authenticated identity
pub struct IssueCredentialsUseCase {
    jwt_service: Arc<JwtService>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl IssueCredentialsUseCase {
    pub fn new(jwt_service: Arc<JwtService>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            jwt_service,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(jwt_service: Arc<JwtService>, config: &AuthConfig) -> Self {
        Self::new(
            jwt_service,
            config.access_token_ttl(),
            config.refresh_token_ttl(),
        )
    }

    pub fn execute(&self, identity: &Identity) -> Result<CredentialPair, GateError> {
        let claims = identity.to_claims();
        let access_token =
            self.jwt_service
                .issue(claims.clone(), self.access_ttl, CredentialKind::Access)?;
        let refresh_token =
            self.jwt_service
                .issue(claims, self.refresh_ttl, CredentialKind::Refresh)?;

        Ok(CredentialPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl.as_secs(),
        })
    }
}

/// Use case for exchanging a refresh credential for a new access credential
pub struct RefreshAccessTokenUseCase {
    gate: Arc<AuthGate>,
    access_ttl: Duration,
}

impl RefreshAccessTokenUseCase {
    pub fn new(gate: Arc<AuthGate>, access_ttl: Duration) -> Self {
        Self { gate, access_ttl }
    }

    pub async fn execute(&self, refresh_token: &str) -> Result<RefreshResult, GateError> {
        let authenticated = self
            .gate
            .authenticate(refresh_token, CredentialKind::Refresh)
            .await?;

        // The new access credential carries the refresh credential's identity claims
        let access_token = self.gate.codec().issue(
            authenticated.claims.user,
            self.access_ttl,
            CredentialKind::Access,
        )?;

        Ok(RefreshResult {
            access_token,
            expires_in: self.access_ttl.as_secs(),
            identity: authenticated.identity,
        })
    }
}

/// Use case for revoking the presented access credential
pub struct LogoutUseCase {
    gate: Arc<AuthGate>,
}

impl LogoutUseCase {
    pub fn new(gate: Arc<AuthGate>) -> Self {
        Self { gate }
    }

    /// Revoke the credential and return its jti
    pub async fn execute(&self, access_token: &str) -> Result<String, GateError> {
        let authenticated = self
            .gate
            .authenticate(access_token, CredentialKind::Access)
            .await?;
        let jti = authenticated.claims.jti;

        self.gate.revocations().revoke(&jti).await.map_err(|e| {
            warn!(token_jti = %jti, error = %e, "Failed to revoke credential");
            GateError::from(e)
        })?;

        info!(
            identity_id = %authenticated.identity.id,
            token_jti = %jti,
            "Identity logged out"
        );
        Ok(jti)
    }
}
