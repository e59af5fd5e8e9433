//! Credential gate
//!
//! Decides whether a presented credential admits its bearer. The checks run in
//! a fixed order and stop at the first failure:
//!
//! 1. signature, structure and expiry ([`JwtService::verify`])
//! 2. credential kind
//! 3. revocation (fail-closed on store errors)
//! 4. identity resolution

use std::sync::Arc;
use tracing::{debug, warn};

use super::jwt_service::JwtService;
use super::token_blacklist::RevocationStore;
use crate::application::errors::GateError;
use crate::domain::auth::{CredentialClaims, CredentialKind, IIdentityRepository, Identity};

/// A credential that passed the gate, together with its resolved identity
#[derive(Debug, Clone, PartialEq)]
pub struct Authenticated {
    pub identity: Identity,
    pub claims: CredentialClaims,
}

/// Composes the credential codec, the revocation store and identity lookup
pub struct AuthGate {
    codec: JwtService,
    revocations: Arc<dyn RevocationStore>,
    identities: Arc<dyn IIdentityRepository>,
}

impl AuthGate {
    pub fn new(
        codec: JwtService,
        revocations: Arc<dyn RevocationStore>,
        identities: Arc<dyn IIdentityRepository>,
    ) -> Self {
        Self {
            codec,
            revocations,
            identities,
        }
    }

    pub fn codec(&self) -> &JwtService {
        &self.codec
    }

    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        &self.revocations
    }

    /// Admit or reject a presented credential
    pub async fn authenticate(
        &self,
        token: &str,
        required: CredentialKind,
    ) -> Result<Authenticated, GateError> {
        let claims = self.codec.verify(token)?;

        if claims.kind != required {
            debug!(
                token_jti = %claims.jti,
                expected = %required,
                actual = %claims.kind,
                "Credential kind mismatch"
            );
            return Err(GateError::WrongCredentialKind {
                expected: required,
                actual: claims.kind,
            });
        }

        let revoked = self.revocations.is_revoked(&claims.jti).await.map_err(|e| {
            warn!(
                token_jti = %claims.jti,
                error = %e,
                "Revocation check failed, rejecting credential"
            );
            GateError::from(e)
        })?;
        if revoked {
            debug!(token_jti = %claims.jti, "Rejected revoked credential");
            return Err(GateError::CredentialRevoked);
        }

        let identity_id = claims.identity_id().ok_or_else(|| {
            debug!(token_jti = %claims.jti, "Credential carries no identity id");
            GateError::CredentialMalformed
        })?;

        let identity = self
            .identities
            .find_by_id(&identity_id)
            .await
            .map_err(|e| {
                warn!(
                    identity_id = %identity_id,
                    error = %e,
                    "Identity lookup failed, rejecting credential"
                );
                GateError::from(e)
            })?
            .ok_or_else(|| {
                debug!(identity_id = %identity_id, "Credential references unknown identity");
                GateError::IdentityNotFound
            })?;

        debug!(
            identity_id = %identity.id,
            token_jti = %claims.jti,
            "Credential admitted"
        );
        Ok(Authenticated { identity, claims })
    }
}
