//! Tollgate - request gating for multi-tenant API backends
//!
//! Wires the [`tollgate_core`] components into an axum boundary:
//!
//! - [`app::GateServices`] builds the credential gate, role guard, sliding-window
//!   limiter and response cache over one shared store
//! - [`presentation`] maps gate rejections to HTTP responses and provides the
//!   gating middleware, extractors and credential lifecycle routes
//!
//! ```rust,ignore
//! let config = tollgate::tollgate_core::Config::load()?;
//! tollgate::tollgate_core::init_tracing(&config.logging)?;
//!
//! let services = Arc::new(GateServices::connect(&config, identities).await?);
//! let app = Router::new()
//!     .route("/api/v1/contacts", get(list_contacts))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         services.clone(),
//!         tollgate::presentation::require_access,
//!     ))
//!     .merge(tollgate::presentation::auth_routes(services));
//! ```

pub mod app;
pub mod presentation;

pub use app::{GateServices, StartupError};
pub use tollgate_core;
