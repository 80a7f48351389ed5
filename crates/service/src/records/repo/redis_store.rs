use std::future::Future;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::records::store::{RecordStore, StoreError};

/// Redis-backed `RecordStore`.
///
/// The connection is opened on first use, so a Redis that is down at startup only fails
/// the requests that need it. `ConnectionManager` reconnects on its own after that.
/// Each call gets one deadline covering the wait for the connection and the command itself.
pub struct RedisStore {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    timeout: Duration,
}

impl RedisStore {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { client, conn: OnceCell::new(), timeout })
    }

    async fn connection(&self) -> redis::RedisResult<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let conn = ConnectionManager::new(self.client.clone()).await?;
                debug!("redis connection established");
                Ok::<_, redis::RedisError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }

    /// Run `op` on a connection, all under the store timeout.
    async fn call<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(ConnectionManager) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        bounded(self.timeout, async move {
            let conn = self.connection().await?;
            op(conn).await
        })
        .await
    }
}

async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => {
            warn!(error = %e, "redis call failed");
            Err(map_redis_error(e, timeout))
        }
        Err(_) => {
            warn!(?timeout, "redis call timed out");
            Err(StoreError::Timeout(timeout))
        }
    }
}

fn map_redis_error(e: redis::RedisError, timeout: Duration) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout(timeout)
    } else if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() {
        StoreError::Connection(e.to_string())
    } else {
        StoreError::Command(e.to_string())
    }
}

#[async_trait::async_trait]
impl RecordStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.call(|mut conn| async move {
            let value: Option<String> = conn.get(key).await?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        self.call(|mut conn| async move {
            let reply: String = redis::cmd("SET").arg(key).arg(value).query_async(&mut conn).await?;
            Ok(reply == "OK")
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        self.call(|mut conn| async move {
            let removed: u64 = conn.del(key).await?;
            Ok(removed)
        })
        .await
    }
}
