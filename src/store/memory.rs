//! In-memory implementation of the pool store.
//!
//! Backs unit tests and local development without a Redis server, with
//! the same observable contract: sets disappear when their last member is
//! removed, `pop` returns an arbitrary member, and `claim` is first-writer
//! wins.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PoolStore;
use crate::error::IpamError;

#[derive(Debug, Default)]
struct Inner {
    sets: HashMap<String, HashSet<String>>,
    markers: HashMap<String, String>,
}

/// Process-local pool store behind a single [`RwLock`].
#[derive(Debug, Default)]
pub struct MemoryPoolStore {
    inner: RwLock<Inner>,
}

impl MemoryPoolStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PoolStore for MemoryPoolStore {
    async fn add(&self, key: &str, members: &[String]) -> Result<u64, IpamError> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut inner = self.inner.write().await;
        let set = inner.sets.entry(key.to_string()).or_default();
        let mut added = 0u64;
        for member in members {
            if set.insert(member.clone()) {
                added += 1;
            }
        }
        Ok(added)
    }

    async fn remove(&self, key: &str, members: &[String]) -> Result<u64, IpamError> {
        let mut inner = self.inner.write().await;
        let Some(set) = inner.sets.get_mut(key) else {
            return Ok(0);
        };
        let mut removed = 0u64;
        for member in members {
            if set.remove(member) {
                removed += 1;
            }
        }
        if set.is_empty() {
            inner.sets.remove(key);
        }
        Ok(removed)
    }

    async fn pop(&self, key: &str) -> Result<Option<String>, IpamError> {
        let mut inner = self.inner.write().await;
        let Some(set) = inner.sets.get_mut(key) else {
            return Ok(None);
        };
        let member = set.iter().next().cloned();
        if let Some(member) = &member {
            set.remove(member);
            if set.is_empty() {
                inner.sets.remove(key);
            }
        }
        Ok(member)
    }

    async fn cardinality(&self, key: &str) -> Result<u64, IpamError> {
        let inner = self.inner.read().await;
        Ok(inner.sets.get(key).map(|s| s.len() as u64).unwrap_or(0))
    }

    async fn exists(&self, key: &str) -> Result<bool, IpamError> {
        let inner = self.inner.read().await;
        Ok(inner.sets.contains_key(key) || inner.markers.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<(), IpamError> {
        let mut inner = self.inner.write().await;
        inner.sets.remove(key);
        inner.markers.remove(key);
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, IpamError> {
        let inner = self.inner.read().await;
        let mut matched: Vec<String> = inner
            .sets
            .keys()
            .chain(inner.markers.keys())
            .filter(|key| glob_match(pattern, key.as_str()))
            .cloned()
            .collect();
        matched.sort();
        matched.dedup();
        Ok(matched)
    }

    async fn claim(&self, key: &str, value: &str) -> Result<bool, IpamError> {
        let mut inner = self.inner.write().await;
        if inner.markers.contains_key(key) || inner.sets.contains_key(key) {
            return Ok(false);
        }
        inner.markers.insert(key.to_string(), value.to_string());
        Ok(true)
    }
}

/// Minimal `*`-wildcard matcher covering the KEYS patterns the manager
/// issues.
fn glob_match(pattern: &str, candidate: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == candidate;
    }
    let mut segments = pattern.split('*');
    let Some(first) = segments.next() else {
        return false;
    };
    if !candidate.starts_with(first) {
        return false;
    }
    let mut rest = match candidate.get(first.len()..) {
        Some(r) => r,
        None => return false,
    };
    let mut middle: Vec<&str> = segments.collect();
    let tail = if pattern.ends_with('*') {
        None
    } else {
        middle.pop()
    };
    for segment in middle {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(at) => rest = rest.get(at + segment.len()..).unwrap_or(""),
            None => return false,
        }
    }
    match tail {
        Some(suffix) => rest.ends_with(suffix),
        None => true,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn members(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let store = MemoryPoolStore::new();
        let added = store.add("k", &members(&["a", "b"])).await;
        assert_eq!(added.ok(), Some(2));
        let added = store.add("k", &members(&["b", "c"])).await;
        assert_eq!(added.ok(), Some(1));
        assert_eq!(store.cardinality("k").await.ok(), Some(3));
    }

    #[tokio::test]
    async fn remove_reports_removed_count() {
        let store = MemoryPoolStore::new();
        let _ = store.add("k", &members(&["a", "b"])).await;
        let removed = store.remove("k", &members(&["a", "x"])).await;
        assert_eq!(removed.ok(), Some(1));
        assert_eq!(store.cardinality("k").await.ok(), Some(1));
    }

    #[tokio::test]
    async fn empty_set_key_disappears() {
        let store = MemoryPoolStore::new();
        let _ = store.add("k", &members(&["a"])).await;
        assert_eq!(store.exists("k").await.ok(), Some(true));
        let _ = store.remove("k", &members(&["a"])).await;
        assert_eq!(store.exists("k").await.ok(), Some(false));
    }

    #[tokio::test]
    async fn pop_drains_the_set_without_repeats() {
        let store = MemoryPoolStore::new();
        let _ = store.add("k", &members(&["a", "b", "c"])).await;
        let mut seen = Vec::new();
        while let Ok(Some(member)) = store.pop("k").await {
            seen.push(member);
        }
        seen.sort();
        assert_eq!(seen, members(&["a", "b", "c"]));
        assert_eq!(store.pop("k").await.ok(), Some(None));
    }

    #[tokio::test]
    async fn cardinality_of_absent_key_is_zero() {
        let store = MemoryPoolStore::new();
        assert_eq!(store.cardinality("missing").await.ok(), Some(0));
    }

    #[tokio::test]
    async fn delete_removes_sets_and_markers() {
        let store = MemoryPoolStore::new();
        let _ = store.add("k", &members(&["a"])).await;
        let _ = store.claim("m", "1").await;
        let _ = store.delete("k").await;
        let _ = store.delete("m").await;
        assert_eq!(store.exists("k").await.ok(), Some(false));
        assert_eq!(store.exists("m").await.ok(), Some(false));
    }

    #[tokio::test]
    async fn claim_is_first_writer_wins() {
        let store = MemoryPoolStore::new();
        assert_eq!(store.claim("lock", "1").await.ok(), Some(true));
        assert_eq!(store.claim("lock", "2").await.ok(), Some(false));
        let _ = store.delete("lock").await;
        assert_eq!(store.claim("lock", "3").await.ok(), Some(true));
    }

    #[tokio::test]
    async fn keys_matches_suffix_pattern() {
        let store = MemoryPoolStore::new();
        let _ = store.add("10.0.0.0:24:free", &members(&["10.0.0.1"])).await;
        let _ = store.add("10.0.0.0:24:aloc", &members(&["10.0.0.2"])).await;
        let _ = store.add("192.168.1.0:24:free", &members(&["192.168.1.1"])).await;
        let keys = store.keys("*:free").await;
        assert_eq!(
            keys.ok(),
            Some(members(&["10.0.0.0:24:free", "192.168.1.0:24:free"]))
        );
    }

    #[test]
    fn glob_match_covers_edge_shapes() {
        assert!(glob_match("*:free", "10.0.0.0:24:free"));
        assert!(!glob_match("*:free", "10.0.0.0:24:aloc"));
        assert!(glob_match("10.*:free", "10.0.0.0:24:free"));
        assert!(!glob_match("10.*:free", "192.168.1.0:24:free"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exact-not"));
        assert!(glob_match("prefix*", "prefix-and-more"));
    }
}
