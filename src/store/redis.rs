//! Redis implementation of the pool store.
//!
//! Thin mapping of the [`PoolStore`] contract onto Redis set commands
//! (`SADD`/`SREM`/`SPOP`/`SCARD`/`EXISTS`/`DEL`/`KEYS`/`SETNX`) over a
//! multiplexed [`ConnectionManager`].

use std::fmt;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::PoolStore;
use crate::error::IpamError;

/// Redis-backed pool store.
#[derive(Clone)]
pub struct RedisPoolStore {
    conn: ConnectionManager,
}

impl RedisPoolStore {
    /// Wraps an already-established connection manager.
    #[must_use]
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Connects to the Redis server at `url` and probes the connection
    /// with a `PING` so a bad address fails at startup rather than on the
    /// first pool operation.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::StoreUnavailable`] if the server cannot be
    /// reached and [`IpamError::Store`] for any other client error.
    pub async fn connect(url: &str) -> Result<Self, IpamError> {
        let client = redis::Client::open(url).map_err(map_store_err)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(map_store_err)?;
        let store = Self { conn };
        let mut probe = store.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut probe)
            .await
            .map_err(map_store_err)?;
        Ok(store)
    }
}

impl fmt::Debug for RedisPoolStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisPoolStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl PoolStore for RedisPoolStore {
    async fn add(&self, key: &str, members: &[String]) -> Result<u64, IpamError> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        conn.sadd(key, members).await.map_err(map_store_err)
    }

    async fn remove(&self, key: &str, members: &[String]) -> Result<u64, IpamError> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        conn.srem(key, members).await.map_err(map_store_err)
    }

    async fn pop(&self, key: &str) -> Result<Option<String>, IpamError> {
        let mut conn = self.conn.clone();
        conn.spop(key).await.map_err(map_store_err)
    }

    async fn cardinality(&self, key: &str) -> Result<u64, IpamError> {
        let mut conn = self.conn.clone();
        conn.scard(key).await.map_err(map_store_err)
    }

    async fn exists(&self, key: &str) -> Result<bool, IpamError> {
        let mut conn = self.conn.clone();
        conn.exists(key).await.map_err(map_store_err)
    }

    async fn delete(&self, key: &str) -> Result<(), IpamError> {
        let mut conn = self.conn.clone();
        let _: u64 = conn.del(key).await.map_err(map_store_err)?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, IpamError> {
        let mut conn = self.conn.clone();
        conn.keys(pattern).await.map_err(map_store_err)
    }

    async fn claim(&self, key: &str, value: &str) -> Result<bool, IpamError> {
        let mut conn = self.conn.clone();
        conn.set_nx(key, value).await.map_err(map_store_err)
    }
}

/// Maps a redis client error into the gateway taxonomy: connection-class
/// failures become `StoreUnavailable`, everything else `Store`.
fn map_store_err(err: redis::RedisError) -> IpamError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        IpamError::StoreUnavailable(err.to_string())
    } else {
        IpamError::Store(err.to_string())
    }
}
