//! Dragonfly/Redis store backend

use async_trait::async_trait;
use redis::RedisResult;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use super::{KeyValueStore, WindowAdmission, WindowOutcome, ttl_millis};
use crate::application::errors::StoreError;
use crate::config::StoreConfig;

/// Insert, prune, count, conditionally drop, refresh TTL; one server-side unit.
///
/// Returns `{admitted, count, oldest}` where `oldest` is -1 for an empty window.
const WINDOW_ADMIT_SCRIPT: &str = r#"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
local member = ARGV[4]
local ttl = tonumber(ARGV[5])

redis.call('ZADD', key, now, member)
redis.call('ZREMRANGEBYSCORE', key, '-inf', now - window)
local count = redis.call('ZCARD', key)
local admitted = 1
if count > limit then
  redis.call('ZREM', key, member)
  count = count - 1
  admitted = 0
end
redis.call('PEXPIRE', key, ttl)

local oldest = -1
local first = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
if first[2] then
  oldest = tonumber(first[2])
end
return {admitted, count, oldest}
"#;

/// Dragonfly/Redis store backend
pub struct DragonflyStore {
    connection_manager: ConnectionManager,
    operation_timeout: Duration,
    window_script: redis::Script,
}

impl DragonflyStore {
    /// Connect to Dragonfly and verify the connection with PING
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            warn!(error = %e, "Failed to create Redis client for gate store");
            StoreError::unavailable("connect", e.to_string())
        })?;

        let connect_timeout = Duration::from_secs(config.connection_timeout_seconds);
        let connection_manager =
            match tokio::time::timeout(connect_timeout, ConnectionManager::new(client)).await {
                Ok(Ok(manager)) => manager,
                Ok(Err(e)) => {
                    warn!(error = %e, "Failed to create connection manager for gate store");
                    return Err(StoreError::unavailable("connect", e.to_string()));
                }
                Err(_) => {
                    warn!(
                        timeout_seconds = config.connection_timeout_seconds,
                        "Timed out connecting to gate store"
                    );
                    return Err(StoreError::Timeout {
                        operation: "connect",
                    });
                }
            };

        let store = Self {
            connection_manager,
            operation_timeout: Duration::from_millis(config.operation_timeout_ms),
            window_script: redis::Script::new(WINDOW_ADMIT_SCRIPT),
        };

        store.ping().await?;
        debug!("Successfully connected to Dragonfly for gate state");

        Ok(store)
    }

    /// Bound a store round-trip by the per-operation timeout
    async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::unavailable(operation, e.to_string())),
            Err(_) => Err(StoreError::Timeout { operation }),
        }
    }
}

#[async_trait]
impl KeyValueStore for DragonflyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.connection_manager.clone();
        self.run(
            "get",
            redis::cmd("GET")
                .arg(key)
                .query_async::<Option<Vec<u8>>>(&mut conn),
        )
        .await
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.connection_manager.clone();
        self.run(
            "set",
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PX")
                .arg(ttl_millis(ttl))
                .query_async::<()>(&mut conn),
        )
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection_manager.clone();
        let count = self
            .run(
                "exists",
                redis::cmd("EXISTS").arg(key).query_async::<i64>(&mut conn),
            )
            .await?;
        Ok(count > 0)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection_manager.clone();
        let removed = self
            .run(
                "delete",
                redis::cmd("DEL").arg(key).query_async::<i64>(&mut conn),
            )
            .await?;
        Ok(removed > 0)
    }

    async fn window_admit(
        &self,
        admission: &WindowAdmission,
    ) -> Result<WindowOutcome, StoreError> {
        let mut conn = self.connection_manager.clone();
        let mut invocation = self.window_script.key(&admission.key);
        invocation
            .arg(admission.now_ms)
            .arg(admission.window_ms)
            .arg(admission.limit)
            .arg(&admission.member)
            .arg(ttl_millis(admission.key_ttl));

        let (admitted, count, oldest): (i64, i64, i64) = self
            .run("window_admit", invocation.invoke_async(&mut conn))
            .await?;

        if count < 0 {
            return Err(StoreError::UnexpectedResponse {
                message: format!("negative window count {}", count),
            });
        }

        Ok(WindowOutcome {
            admitted: admitted == 1,
            count: count as u64,
            oldest_ms: (oldest >= 0).then_some(oldest),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection_manager.clone();
        let reply = self
            .run("ping", redis::cmd("PING").query_async::<String>(&mut conn))
            .await?;
        if reply != "PONG" {
            return Err(StoreError::UnexpectedResponse {
                message: format!("PING returned {}", reply),
            });
        }
        Ok(())
    }
}
