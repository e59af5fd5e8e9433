//! Application Layer - Error taxonomy and credential use cases

pub mod auth;
pub mod errors;

pub use errors::{GateError, StoreError};
