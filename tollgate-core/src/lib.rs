//! Tollgate Core - Request gating primitives for multi-tenant API backends
//!
//! This crate provides the pieces that sit in front of every business handler:
//!
//! # Modules
//!
//! - [`config`] - Strongly-typed configuration with TOML and environment variable support
//! - [`domain`] - Identities, roles, credential kinds and the identity repository seam
//! - [`application`] - Gate error taxonomy and the issue/refresh/logout use cases
//! - [`infrastructure`] - Key-value store backends, credential codec, revocation,
//!   sliding-window limiter and the cache-aside layer
//! - [`clock`] - Injectable time source
//! - [`logging`] - Structured logging with tracing
//!
//! # Architecture
//!
//! ```text
//! tollgate-core/
//! ├── domain/           # Identity, roles, credential kinds
//! ├── application/      # Errors and use cases
//! ├── infrastructure/
//! │   ├── store/        # KeyValueStore: Dragonfly/Redis and in-memory
//! │   ├── auth/         # JwtService, revocation, AuthGate, RoleGuard
//! │   ├── rate_limiter/ # Sliding-window limiter
//! │   └── cache/        # Cache-aside ResponseCache with single-flight
//! └── config/           # Configuration management
//! ```
//!
//! Request flow: `AuthGate`/`RoleGuard` → `SlidingWindowLimiter` (keyed by the
//! resolved identity) → handler, optionally wrapped by `ResponseCache`.
//!
//! # Configuration
//!
//! ```rust,ignore
//! use tollgate_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `TOLLGATE__` prefix with double underscore separators:
//!
//! ```bash
//! TOLLGATE__AUTH__JWT_SECRET=...
//! TOLLGATE__RATE_LIMIT__MAX_REQUESTS=10
//! ```

pub mod application;
pub mod clock;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use application::errors::GateError;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use logging::init_tracing;
