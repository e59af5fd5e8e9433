//! JWT service for credential issuance and verification

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::clock::{Clock, duration_secs};
use crate::config::{AuthConfig, validation::SYMMETRIC_ALGORITHMS};
use crate::domain::auth::{ClaimMap, CredentialClaims, CredentialError, CredentialKind};

/// JWT service for issuing and verifying signed credentials
///
/// Verification is pure: signature and structure are checked by
/// `jsonwebtoken`, expiry against the injected clock.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    /// Clock skew tolerated on `exp`, in seconds
    leeway_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl JwtService {
    /// Create a new JWT service
    ///
    /// Only HMAC algorithms are accepted since the key is a shared secret.
    pub fn new(
        secret: &str,
        algorithm: &str,
        leeway: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CredentialError> {
        if !SYMMETRIC_ALGORITHMS.contains(&algorithm) {
            return Err(CredentialError::Signing {
                message: format!("unsupported signing algorithm: {}", algorithm),
            });
        }
        let algorithm: Algorithm = algorithm.parse().map_err(|e: jsonwebtoken::errors::Error| {
            CredentialError::Signing {
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            leeway_seconds: duration_secs(leeway),
            clock,
        })
    }

    pub fn from_config(
        config: &AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CredentialError> {
        Self::new(
            &config.jwt_secret,
            &config.jwt_algorithm,
            Duration::from_secs(config.leeway_seconds),
            clock,
        )
    }

    /// Issue a signed credential carrying `claims`, expiring `ttl` from now
    pub fn issue(
        &self,
        claims: ClaimMap,
        ttl: Duration,
        kind: CredentialKind,
    ) -> Result<String, CredentialError> {
        let now = self.clock.now_secs();
        let credential = CredentialClaims {
            user: claims,
            exp: now.saturating_add(duration_secs(ttl)),
            iat: now,
            jti: Uuid::new_v4().to_string(),
            kind,
        };

        encode(&Header::new(self.algorithm), &credential, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode credential: {}", e);
            CredentialError::Signing {
                message: e.to_string(),
            }
        })
    }

    /// Verify signature, structure and expiry of a credential
    pub fn verify(&self, token: &str) -> Result<CredentialClaims, CredentialError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the injected clock
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<CredentialClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Credential validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => CredentialError::Expired,
                    _ => CredentialError::Malformed,
                }
            })?;

        if self.clock.now_secs() > claims.exp.saturating_add(self.leeway_seconds) {
            tracing::debug!(token_jti = %claims.jti, "Credential expired");
            return Err(CredentialError::Expired);
        }

        Ok(claims)
    }
}
