//! Authentication domain errors

use thiserror::Error;

/// Failures while issuing or verifying a credential
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Credential could not be parsed or its signature is invalid")]
    Malformed,

    #[error("Credential has expired")]
    Expired,

    #[error("Credential could not be signed: {message}")]
    Signing { message: String },
}

/// Failures of the external identity store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityRepositoryError {
    #[error("Identity store unavailable: {message}")]
    Unavailable { message: String },
}
