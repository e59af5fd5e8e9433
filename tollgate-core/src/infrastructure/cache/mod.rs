//! Cache-aside layer for expensive read paths

pub mod key;
pub mod service;
pub mod single_flight;

pub use key::{CacheKey, CacheKeyBuilder};
pub use service::ResponseCache;
pub use single_flight::SingleFlight;
