//! Domain Layer - Identities, roles and credentials
//!
//! Pure types with no I/O. The identity store itself is an external
//! collaborator reached through [`auth::IIdentityRepository`].

pub mod auth;

pub use auth::*;
