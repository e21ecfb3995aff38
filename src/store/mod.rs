//! Pool store adapter: the minimal atomic-set interface the pool manager
//! requires from an external key-value store.
//!
//! Correctness under concurrent callers rests entirely on the single-key
//! atomicity of these primitives — in particular [`PoolStore::pop`], which
//! must never hand the same member to two callers. The adapter performs no
//! retries; retry policy, if any, belongs to the calling layer.

pub mod memory;
pub mod redis;

use std::fmt;

use async_trait::async_trait;

pub use memory::MemoryPoolStore;
pub use redis::RedisPoolStore;

use crate::error::IpamError;

/// Atomic set operations over a key-value store.
///
/// Implemented by [`RedisPoolStore`] for production and
/// [`MemoryPoolStore`] for tests and local development.
#[async_trait]
pub trait PoolStore: Send + Sync + fmt::Debug {
    /// Idempotently inserts `members` into the set at `key`. Returns the
    /// number of members that were newly added.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::StoreUnavailable`] on connection failure and
    /// [`IpamError::Store`] on command failure.
    async fn add(&self, key: &str, members: &[String]) -> Result<u64, IpamError>;

    /// Idempotently removes `members` from the set at `key`. Returns the
    /// number of members that were actually removed.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::StoreUnavailable`] on connection failure and
    /// [`IpamError::Store`] on command failure.
    async fn remove(&self, key: &str, members: &[String]) -> Result<u64, IpamError>;

    /// Atomically removes and returns one arbitrary member of the set at
    /// `key`, or `None` if the set is empty or absent. Concurrent callers
    /// never receive the same member.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::StoreUnavailable`] on connection failure and
    /// [`IpamError::Store`] on command failure.
    async fn pop(&self, key: &str) -> Result<Option<String>, IpamError>;

    /// Returns the cardinality of the set at `key` (0 if absent).
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::StoreUnavailable`] on connection failure and
    /// [`IpamError::Store`] on command failure.
    async fn cardinality(&self, key: &str) -> Result<u64, IpamError>;

    /// Returns `true` if `key` exists.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::StoreUnavailable`] on connection failure and
    /// [`IpamError::Store`] on command failure.
    async fn exists(&self, key: &str) -> Result<bool, IpamError>;

    /// Deletes `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::StoreUnavailable`] on connection failure and
    /// [`IpamError::Store`] on command failure.
    async fn delete(&self, key: &str) -> Result<(), IpamError>;

    /// Returns all keys matching `pattern` (`*` wildcard). Used only for
    /// listing known pools.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::StoreUnavailable`] on connection failure and
    /// [`IpamError::Store`] on command failure.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, IpamError>;

    /// Compare-and-set: writes `value` at `key` only if `key` does not
    /// exist. Returns `true` if the claim succeeded. Guards pool creation
    /// against concurrent creators.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::StoreUnavailable`] on connection failure and
    /// [`IpamError::Store`] on command failure.
    async fn claim(&self, key: &str, value: &str) -> Result<bool, IpamError>;
}
