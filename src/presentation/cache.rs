//! Response caching helpers for handlers

use axum::{
    http::{HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use tollgate_core::domain::auth::Identity;
use tollgate_core::infrastructure::cache::{CacheKey, CacheKeyBuilder, ResponseCache};

/// Cache key for a request, scoped to `identity` when one is given
pub fn cache_key_for(
    builder: &CacheKeyBuilder,
    scope: &str,
    uri: &Uri,
    identity: Option<&Identity>,
) -> CacheKey {
    builder.build_from_query_string(scope, uri.path(), uri.query(), identity.map(|i| &i.id))
}

/// Serve a JSON body from the cache, computing it on a miss
///
/// Hits replay the stored body byte for byte.
pub async fn cached_json<T, E, F, Fut>(
    cache: &ResponseCache,
    key: &CacheKey,
    ttl: Option<Duration>,
    compute: F,
) -> Result<Response, E>
where
    T: Serialize,
    E: From<serde_json::Error>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let ttl = ttl.unwrap_or_else(|| cache.default_ttl());
    let body = cache
        .get_or_compute_payload(key, ttl, || async move {
            let value = compute().await?;
            Ok::<_, E>(serde_json::to_string(&value)?)
        })
        .await?;

    Ok((
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response())
}
