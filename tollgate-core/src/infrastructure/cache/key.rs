//! Cache key derivation
//!
//! Keys have the shape `<prefix>:<scope>:<route>?<sorted-query>`, or
//! `<prefix>:<scope>:<identity-id>:<route>?<sorted-query>` for responses
//! that depend on the caller. Query pairs are sorted so that parameter order
//! never changes the key.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::config::CacheConfig;
use crate::domain::auth::IdentityId;

/// Fully derived cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds [`CacheKey`]s from route, query and identity
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    prefix: String,
    max_query_len: usize,
}

impl CacheKeyBuilder {
    pub fn new(prefix: impl Into<String>, max_query_len: usize) -> Self {
        Self {
            prefix: prefix.into(),
            max_query_len,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.key_prefix.clone(), config.max_query_len)
    }

    /// Derive a key from already URL-encoded query pairs
    pub fn build<K, V>(
        &self,
        scope: &str,
        route: &str,
        query: &[(K, V)],
        identity: Option<&IdentityId>,
    ) -> CacheKey
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let normalized = normalize_query(
            query
                .iter()
                .map(|(k, v)| (k.as_ref(), v.as_ref())),
        );
        self.assemble(scope, route, &normalized, identity)
    }

    /// Derive a key from a raw query string such as `b=2&a=1`
    pub fn build_from_query_string(
        &self,
        scope: &str,
        route: &str,
        raw_query: Option<&str>,
        identity: Option<&IdentityId>,
    ) -> CacheKey {
        let normalized = normalize_query(parse_query(raw_query.unwrap_or_default()));
        self.assemble(scope, route, &normalized, identity)
    }

    fn assemble(
        &self,
        scope: &str,
        route: &str,
        normalized_query: &str,
        identity: Option<&IdentityId>,
    ) -> CacheKey {
        let query = if normalized_query.len() > self.max_query_len {
            format!("#{}", query_digest(normalized_query))
        } else {
            normalized_query.to_string()
        };

        let key = match identity {
            Some(id) => format!("{}:{}:{}:{}?{}", self.prefix, scope, id, route, query),
            None => format!("{}:{}:{}?{}", self.prefix, scope, route, query),
        };
        CacheKey(key)
    }
}

/// Split a raw query string into `(key, value)` pairs, skipping empty segments
pub fn parse_query(raw: &str) -> impl Iterator<Item = (&str, &str)> {
    raw.split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.split_once('=').unwrap_or((segment, "")))
}

/// Sort pairs by key then value and join them as `k=v&k=v`
pub fn normalize_query<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
    pairs.sort_unstable();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// SHA-256 hex digest of a normalized query
pub fn query_digest(normalized_query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized_query.as_bytes());
    hex::encode(hasher.finalize())
}
