//! Rate Limiting Infrastructure
//!
//! Per-identity sliding-window limiting backed by the shared key-value store.
//! Store failures admit the request: the limiter controls cost, not access.

pub mod sliding_window;
pub mod types;

pub use sliding_window::SlidingWindowLimiter;
pub use types::{WindowDecision, window_key};
