//! Rate limiter types

use serde::{Deserialize, Serialize};

/// Store key holding the rate window of one identity
pub fn window_key(namespace: &str, identity: &str) -> String {
    format!("{}:ratelimit:{}", namespace, identity)
}

/// Result of a sliding-window check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDecision {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Admitted requests currently in the window, including this one if allowed
    pub count: u64,
    /// Maximum requests allowed per window
    pub limit: u32,
    /// Seconds until a slot frees up (only set when blocked)
    pub retry_after_secs: Option<u64>,
}

impl WindowDecision {
    pub fn allowed(count: u64, limit: u32) -> Self {
        Self {
            allowed: true,
            count,
            limit,
            retry_after_secs: None,
        }
    }

    pub fn blocked(count: u64, limit: u32, retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            count,
            limit,
            retry_after_secs: Some(retry_after_secs),
        }
    }

    /// Requests left in the current window
    pub fn remaining(&self) -> u64 {
        u64::from(self.limit).saturating_sub(self.count)
    }
}
