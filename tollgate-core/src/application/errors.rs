//! Gate error taxonomy
//!
//! Every rejection the gating layer can produce is a distinct [`GateError`]
//! variant with a stable machine-readable code. Store failures are described
//! by [`StoreError`] and never leak past the boundary.

use thiserror::Error;

use crate::domain::auth::{CredentialError, CredentialKind, IdentityRepositoryError};

/// Failures talking to the external key-value store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable during {operation}: {message}")]
    Unavailable {
        operation: &'static str,
        message: String,
    },

    #[error("Store operation {operation} timed out")]
    Timeout { operation: &'static str },

    #[error("Unexpected store response: {message}")]
    UnexpectedResponse { message: String },
}

impl StoreError {
    pub fn unavailable(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            operation,
            message: message.into(),
        }
    }
}

/// Outcome of a rejected gating decision
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Credential is malformed or its signature is invalid")]
    CredentialMalformed,

    #[error("Credential has expired")]
    CredentialExpired,

    #[error("Credential has been revoked")]
    CredentialRevoked,

    #[error("Expected a {expected} credential, got {actual}")]
    WrongCredentialKind {
        expected: CredentialKind,
        actual: CredentialKind,
    },

    #[error("Identity referenced by the credential no longer exists")]
    IdentityNotFound,

    #[error("Role is not permitted to perform this operation")]
    RoleForbidden,

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Backing store unavailable: {0}")]
    StoreUnavailable(StoreError),

    #[error("Cache entry could not be decoded: {message}")]
    CacheEntryCorrupt { message: String },
}

impl GateError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            GateError::CredentialMalformed => "CREDENTIAL_MALFORMED",
            GateError::CredentialExpired => "CREDENTIAL_EXPIRED",
            GateError::CredentialRevoked => "CREDENTIAL_REVOKED",
            GateError::WrongCredentialKind { expected, .. } => match expected {
                CredentialKind::Access => "ACCESS_CREDENTIAL_REQUIRED",
                CredentialKind::Refresh => "REFRESH_CREDENTIAL_REQUIRED",
            },
            GateError::IdentityNotFound => "IDENTITY_NOT_FOUND",
            GateError::RoleForbidden => "ROLE_FORBIDDEN",
            GateError::RateLimited { .. } => "RATE_LIMITED",
            GateError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            GateError::CacheEntryCorrupt { .. } => "CACHE_ENTRY_CORRUPT",
        }
    }

    /// Human message safe to return to callers
    ///
    /// Store failures collapse to a generic retry message.
    pub fn public_message(&self) -> String {
        match self {
            GateError::StoreUnavailable(_) => {
                "Service temporarily unavailable, please try again".to_string()
            }
            GateError::CacheEntryCorrupt { .. } => "Internal error".to_string(),
            GateError::WrongCredentialKind { expected, .. } => {
                format!("Please provide a valid {} credential", expected)
            }
            other => other.to_string(),
        }
    }

    /// Whether the rejection concerns the presented credential or identity
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            GateError::CredentialMalformed
                | GateError::CredentialExpired
                | GateError::CredentialRevoked
                | GateError::WrongCredentialKind { .. }
                | GateError::IdentityNotFound
        )
    }
}

impl From<StoreError> for GateError {
    fn from(error: StoreError) -> Self {
        GateError::StoreUnavailable(error)
    }
}

impl From<CredentialError> for GateError {
    fn from(error: CredentialError) -> Self {
        match error {
            CredentialError::Expired => GateError::CredentialExpired,
            CredentialError::Malformed | CredentialError::Signing { .. } => {
                GateError::CredentialMalformed
            }
        }
    }
}

impl From<IdentityRepositoryError> for GateError {
    fn from(error: IdentityRepositoryError) -> Self {
        match error {
            IdentityRepositoryError::Unavailable { message } => {
                GateError::StoreUnavailable(StoreError::unavailable("identity_lookup", message))
            }
        }
    }
}
