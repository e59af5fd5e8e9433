//! Authentication application layer

pub mod use_cases;

pub use use_cases::{
    CredentialPair, IssueCredentialsUseCase, LogoutUseCase, RefreshAccessTokenUseCase,
    RefreshResult,
};
