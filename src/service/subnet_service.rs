//! Subnet pool service: orchestrates pool lifecycle over the store.
//!
//! All persistent state lives in the key-value store; the service holds
//! no lock of its own. Correctness under concurrent callers rests on the
//! store's single-key atomicity — the creation guard key serializes
//! concurrent creates, and `pop` hands each free address to exactly one
//! caller.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::directory::ReservationSeeder;
use crate::domain::pool::GUARD_SUFFIX;
use crate::domain::{PoolKey, PoolSummary, Subnet};
use crate::error::IpamError;
use crate::store::PoolStore;

/// Members written per store round-trip while populating a pool. Bounds
/// memory for large subnets (a /16 holds 65534 host addresses).
const POPULATE_BATCH: usize = 512;

/// A single pool mutation: reserve `n` addresses or release one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolChange {
    /// Pop this many addresses from the free set into the allocated set.
    Reserve(u64),
    /// Move one address from the allocated set back to the free set.
    Release(Ipv4Addr),
}

impl PoolChange {
    /// Builds a change from the two optional modify arguments, enforcing
    /// that exactly one is given.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::InvalidInput`] when both or neither argument
    /// is present.
    pub fn from_options(
        reserve: Option<u64>,
        release: Option<Ipv4Addr>,
    ) -> Result<Self, IpamError> {
        match (reserve, release) {
            (Some(_), Some(_)) => Err(IpamError::InvalidInput(
                "reserve and release are mutually exclusive".to_string(),
            )),
            (None, None) => Err(IpamError::InvalidInput(
                "specify either reserve or release".to_string(),
            )),
            (Some(count), None) => Ok(Self::Reserve(count)),
            (None, Some(ip)) => Ok(Self::Release(ip)),
        }
    }
}

/// Result of applying a [`PoolChange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolChangeOutcome {
    /// Addresses handed out by a reserve.
    Reserved(Vec<Ipv4Addr>),
    /// Pool state after a release.
    Released(PoolSummary),
}

/// Orchestration layer for all subnet pool operations.
///
/// Stateless coordinator: owns an injected [`PoolStore`] handle and an
/// optional [`ReservationSeeder`] consulted at creation time. Every
/// mutation method follows the pattern: validate → mutate via the store →
/// log → return a typed result.
#[derive(Debug, Clone)]
pub struct SubnetService {
    store: Arc<dyn PoolStore>,
    seeder: Option<ReservationSeeder>,
    strict_release: bool,
}

impl SubnetService {
    /// Creates a new `SubnetService`.
    ///
    /// `seeder` is `None` when directory seeding is disabled. With
    /// `strict_release` set, releasing an address that is not currently
    /// allocated fails instead of injecting it into the free set.
    #[must_use]
    pub fn new(
        store: Arc<dyn PoolStore>,
        seeder: Option<ReservationSeeder>,
        strict_release: bool,
    ) -> Self {
        Self {
            store,
            seeder,
            strict_release,
        }
    }

    /// Creates the pool for `subnet`: claims the creation guard, then
    /// populates the free set with every host address not in
    /// `seed ∪ directory reservations` and persists the allocated set.
    ///
    /// Validation and directory lookups complete before the store is
    /// touched. If population fails partway, all pool keys are deleted
    /// best-effort so no partial pool survives.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::AlreadyExists`] if the pool was already
    /// created, [`IpamError::Config`] if seeding is enabled without a
    /// search base, and store/directory errors otherwise.
    pub async fn create(
        &self,
        subnet: &Subnet,
        dc: Option<&str>,
        seed: &[Ipv4Addr],
    ) -> Result<PoolSummary, IpamError> {
        let key = PoolKey::new(subnet, dc);

        let mut allocated: BTreeSet<Ipv4Addr> = seed.iter().copied().collect();
        if let Some(seeder) = &self.seeder {
            allocated.extend(seeder.seed(subnet).await?);
        }

        if !self.store.claim(key.guard(), "1").await? {
            return Err(IpamError::AlreadyExists(format!("subnet {subnet}")));
        }
        if self.store.exists(key.free()).await? || self.store.exists(key.allocated()).await? {
            let _ = self.store.delete(key.guard()).await;
            return Err(IpamError::AlreadyExists(format!("subnet {subnet}")));
        }

        if let Err(err) = self.populate(subnet, &key, &allocated).await {
            let _ = self.store.delete(key.free()).await;
            let _ = self.store.delete(key.allocated()).await;
            let _ = self.store.delete(key.guard()).await;
            return Err(err);
        }

        let Some(summary) = self.get(subnet, dc).await? else {
            return Err(IpamError::Internal(format!(
                "pool {key} created but not readable"
            )));
        };
        tracing::info!(
            pool = %key,
            free = summary.free,
            allocated = summary.allocated,
            "subnet pool created"
        );
        Ok(summary)
    }

    /// Writes the free and allocated sets for a new pool.
    async fn populate(
        &self,
        subnet: &Subnet,
        key: &PoolKey,
        allocated: &BTreeSet<Ipv4Addr>,
    ) -> Result<(), IpamError> {
        let mut batch: Vec<String> = Vec::with_capacity(POPULATE_BATCH);
        let mut free_total = 0u64;
        for ip in subnet.hosts() {
            if allocated.contains(&ip) {
                continue;
            }
            batch.push(ip.to_string());
            if batch.len() == POPULATE_BATCH {
                free_total += self.store.add(key.free(), &batch).await?;
                batch.clear();
            }
        }
        if !batch.is_empty() {
            free_total += self.store.add(key.free(), &batch).await?;
        }

        // Network and broadcast must never be allocable. The host
        // enumeration already excludes them; this removal re-asserts the
        // invariant against the stored set.
        self.store
            .remove(
                key.free(),
                &[subnet.network().to_string(), subnet.broadcast().to_string()],
            )
            .await?;

        if !allocated.is_empty() {
            let members: Vec<String> = allocated.iter().map(Ipv4Addr::to_string).collect();
            for chunk in members.chunks(POPULATE_BATCH) {
                self.store.add(key.allocated(), chunk).await?;
            }
        }
        tracing::debug!(pool = %key, free = free_total, reserved = allocated.len(), "pool populated");
        Ok(())
    }

    /// Returns the pool summary for `subnet`, or `None` if no pool
    /// exists — an explicit empty result, not an error.
    ///
    /// # Errors
    ///
    /// Returns store errors from the underlying adapter.
    pub async fn get(
        &self,
        subnet: &Subnet,
        dc: Option<&str>,
    ) -> Result<Option<PoolSummary>, IpamError> {
        let key = PoolKey::new(subnet, dc);
        let present = self.store.exists(key.guard()).await?
            || self.store.exists(key.free()).await?
            || self.store.exists(key.allocated()).await?;
        if !present {
            return Ok(None);
        }
        let free = self.store.cardinality(key.free()).await?;
        let allocated = self.store.cardinality(key.allocated()).await?;
        Ok(Some(PoolSummary {
            pool: key.name().to_string(),
            free,
            allocated,
        }))
    }

    /// Returns the identifiers of all known pools.
    ///
    /// # Errors
    ///
    /// Returns store errors from the underlying adapter.
    pub async fn list(&self) -> Result<Vec<String>, IpamError> {
        let keys = self.store.keys(&format!("*{GUARD_SUFFIX}")).await?;
        let mut pools: Vec<String> = keys
            .iter()
            .map(|key| key.strip_suffix(GUARD_SUFFIX).unwrap_or(key).to_string())
            .collect();
        pools.sort();
        Ok(pools)
    }

    /// Applies a reserve-or-release change to the pool.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Self::reserve`] and [`Self::release`].
    pub async fn modify(
        &self,
        subnet: &Subnet,
        dc: Option<&str>,
        change: PoolChange,
    ) -> Result<PoolChangeOutcome, IpamError> {
        match change {
            PoolChange::Reserve(count) => Ok(PoolChangeOutcome::Reserved(
                self.reserve(subnet, dc, count).await?,
            )),
            PoolChange::Release(ip) => Ok(PoolChangeOutcome::Released(
                self.release(subnet, dc, ip).await?,
            )),
        }
    }

    /// Pops `count` addresses from the free set into the allocated set
    /// and returns them.
    ///
    /// The capacity check happens before any pop, so an oversized request
    /// mutates nothing. The pops themselves are sequential single-key
    /// operations; if one fails partway, the addresses already moved are
    /// returned to the free set best-effort before the error surfaces.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::InsufficientFree`] when `count` exceeds the
    /// free cardinality, [`IpamError::InvalidInput`] for a zero count,
    /// and store errors otherwise.
    pub async fn reserve(
        &self,
        subnet: &Subnet,
        dc: Option<&str>,
        count: u64,
    ) -> Result<Vec<Ipv4Addr>, IpamError> {
        if count == 0 {
            return Err(IpamError::InvalidInput(
                "reserve count must be at least 1".to_string(),
            ));
        }
        let key = PoolKey::new(subnet, dc);
        let available = self.store.cardinality(key.free()).await?;
        if count > available {
            return Err(IpamError::InsufficientFree {
                requested: count,
                available,
            });
        }

        let mut moved: Vec<String> = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let popped = match self.store.pop(key.free()).await {
                Ok(Some(member)) => member,
                Ok(None) => {
                    // Free set drained by concurrent callers between the
                    // capacity check and this pop.
                    self.unreserve(&key, &moved, None).await;
                    let available = self.store.cardinality(key.free()).await.unwrap_or(0);
                    return Err(IpamError::InsufficientFree {
                        requested: count,
                        available,
                    });
                }
                Err(err) => {
                    self.unreserve(&key, &moved, None).await;
                    return Err(err);
                }
            };
            if let Err(err) = self
                .store
                .add(key.allocated(), std::slice::from_ref(&popped))
                .await
            {
                self.unreserve(&key, &moved, Some(&popped)).await;
                return Err(err);
            }
            moved.push(popped);
        }

        let mut addresses = Vec::with_capacity(moved.len());
        for member in &moved {
            let ip: Ipv4Addr = member.parse().map_err(|_| {
                IpamError::Store(format!("malformed member {member} in pool {key}"))
            })?;
            addresses.push(ip);
        }
        tracing::info!(pool = %key, count = addresses.len(), "addresses reserved");
        Ok(addresses)
    }

    /// Best-effort rollback of a partially applied reserve: members in
    /// `moved` are taken back out of the allocated set, and both they and
    /// the optional in-flight `limbo` member are re-added to the free
    /// set. Failures here leave leaked addresses and are logged.
    async fn unreserve(&self, key: &PoolKey, moved: &[String], limbo: Option<&String>) {
        let mut back: Vec<String> = moved.to_vec();
        if let Some(member) = limbo {
            back.push(member.clone());
        }
        if back.is_empty() {
            return;
        }
        if !moved.is_empty()
            && let Err(err) = self.store.remove(key.allocated(), moved).await
        {
            tracing::error!(pool = %key, error = %err, "reserve rollback failed; addresses leaked to allocated set");
        }
        if let Err(err) = self.store.add(key.free(), &back).await {
            tracing::error!(pool = %key, error = %err, "reserve rollback failed; addresses leaked out of the pool");
        }
    }

    /// Moves `ip` from the allocated set back to the free set and returns
    /// the resulting pool summary.
    ///
    /// In the default lenient mode prior membership in the allocated set
    /// is not verified, so an address that was never allocated (or lies
    /// outside the subnet) ends up in the free set. With strict release
    /// enabled, a release of an unallocated address fails and the free
    /// set is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::NotFound`] in strict mode when `ip` is not
    /// allocated, and store errors otherwise.
    pub async fn release(
        &self,
        subnet: &Subnet,
        dc: Option<&str>,
        ip: Ipv4Addr,
    ) -> Result<PoolSummary, IpamError> {
        let key = PoolKey::new(subnet, dc);
        let member = ip.to_string();
        let removed = self
            .store
            .remove(key.allocated(), std::slice::from_ref(&member))
            .await?;
        if removed == 0 && self.strict_release {
            return Err(IpamError::NotFound(format!(
                "{ip} is not allocated in pool {key}"
            )));
        }
        self.store
            .add(key.free(), std::slice::from_ref(&member))
            .await?;
        tracing::info!(pool = %key, address = %ip, "address released");
        let Some(summary) = self.get(subnet, dc).await? else {
            return Err(IpamError::Internal(format!(
                "pool {key} unreadable after release"
            )));
        };
        Ok(summary)
    }

    /// Deletes the pool for `subnet` and verifies afterwards that all of
    /// its keys are gone.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::NotFound`] if no pool exists, and
    /// [`IpamError::Internal`] if a key survives the deletion.
    pub async fn delete(&self, subnet: &Subnet, dc: Option<&str>) -> Result<(), IpamError> {
        let key = PoolKey::new(subnet, dc);
        if self.get(subnet, dc).await?.is_none() {
            return Err(IpamError::NotFound(format!("subnet {subnet}")));
        }
        self.store.delete(key.allocated()).await?;
        self.store.delete(key.free()).await?;
        self.store.delete(key.guard()).await?;
        for stale in [key.free(), key.allocated(), key.guard()] {
            if self.store.exists(stale).await? {
                return Err(IpamError::Internal(format!(
                    "pool key {stale} still present after delete"
                )));
            }
        }
        tracing::info!(pool = %key, "subnet pool deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::DirectoryConfig;
    use crate::directory::{DirectoryEntry, ReservationSource};
    use crate::store::MemoryPoolStore;
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn subnet(ip: &str, mask: &str) -> Subnet {
        Subnet::parse(ip, mask, 16)
            .ok()
            .unwrap_or_else(|| panic!("valid subnet"))
    }

    fn addr(s: &str) -> Ipv4Addr {
        s.parse().ok().unwrap_or_else(|| panic!("valid address"))
    }

    fn make_service() -> (Arc<MemoryPoolStore>, SubnetService) {
        let store = Arc::new(MemoryPoolStore::new());
        let service = SubnetService::new(
            Arc::clone(&store) as Arc<dyn PoolStore>,
            None,
            false,
        );
        (store, service)
    }

    fn strict_service() -> SubnetService {
        SubnetService::new(Arc::new(MemoryPoolStore::new()), None, true)
    }

    #[derive(Debug)]
    struct StubSource {
        values: Vec<&'static str>,
    }

    #[async_trait]
    impl ReservationSource for StubSource {
        async fn search(
            &self,
            _base: &str,
            _filter: &str,
            _attributes: &[String],
        ) -> Result<Vec<DirectoryEntry>, IpamError> {
            let mut attrs = HashMap::new();
            attrs.insert(
                "dhcpStatements".to_string(),
                self.values.iter().map(|v| (*v).to_string()).collect(),
            );
            Ok(vec![DirectoryEntry {
                dn: "cn=host,dc=example,dc=org".to_string(),
                attrs,
            }])
        }
    }

    fn seeded_service(values: Vec<&'static str>, search_base: Option<&str>) -> SubnetService {
        let config = DirectoryConfig {
            seeding_enabled: true,
            url: "ldap://localhost:389".to_string(),
            search_base: search_base.map(str::to_string),
            reservation_attribute: "dhcpStatements".to_string(),
            reservation_token: "fixed-address".to_string(),
        };
        let seeder = ReservationSeeder::new(Arc::new(StubSource { values }), config);
        SubnetService::new(Arc::new(MemoryPoolStore::new()), Some(seeder), false)
    }

    #[tokio::test]
    async fn create_slash_30_has_two_free_hosts() {
        let (_, service) = make_service();
        let result = service.create(&subnet("10.0.0.0", "30"), None, &[]).await;
        let Ok(summary) = result else {
            panic!("create failed");
        };
        assert_eq!(summary.pool, "10.0.0.0");
        assert_eq!(summary.free, 2);
        assert_eq!(summary.allocated, 0);
    }

    #[tokio::test]
    async fn create_duplicate_fails_with_already_exists() {
        let (_, service) = make_service();
        let sub = subnet("10.0.0.0", "30");
        let first = service.create(&sub, None, &[]).await;
        assert!(first.is_ok());
        let second = service.create(&sub, None, &[]).await;
        assert!(matches!(second, Err(IpamError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn free_plus_allocated_equals_host_count() {
        let (_, service) = make_service();
        let sub = subnet("172.16.1.0", "24");
        let Ok(created) = service.create(&sub, None, &[]).await else {
            panic!("create failed");
        };
        assert_eq!(created.free + created.allocated, 254);

        let reserved = service.reserve(&sub, None, 10).await;
        assert_eq!(reserved.ok().map(|a| a.len()), Some(10));
        let Ok(Some(after)) = service.get(&sub, None).await else {
            panic!("pool missing");
        };
        assert_eq!(after.free, 244);
        assert_eq!(after.allocated, 10);
        assert_eq!(after.free + after.allocated, 254);
    }

    #[tokio::test]
    async fn reserve_one_then_release_round_trips() {
        let (_, service) = make_service();
        let sub = subnet("10.0.0.0", "30");
        let _ = service.create(&sub, None, &[]).await;

        let Ok(handed) = service.reserve(&sub, None, 1).await else {
            panic!("reserve failed");
        };
        assert_eq!(handed.len(), 1);
        let Some(first) = handed.first().copied() else {
            panic!("empty offer");
        };
        assert!([addr("10.0.0.1"), addr("10.0.0.2")].contains(&first));

        let Ok(Some(mid)) = service.get(&sub, None).await else {
            panic!("pool missing");
        };
        assert_eq!((mid.free, mid.allocated), (1, 1));

        let Ok(after) = service.release(&sub, None, first).await else {
            panic!("release failed");
        };
        assert_eq!((after.free, after.allocated), (2, 0));
    }

    #[tokio::test]
    async fn reserve_more_than_free_fails_without_mutation() {
        let (_, service) = make_service();
        let sub = subnet("10.0.0.0", "30");
        let _ = service.create(&sub, None, &[]).await;

        let result = service.reserve(&sub, None, 3).await;
        assert!(matches!(
            result,
            Err(IpamError::InsufficientFree {
                requested: 3,
                available: 2
            })
        ));
        let Ok(Some(summary)) = service.get(&sub, None).await else {
            panic!("pool missing");
        };
        assert_eq!((summary.free, summary.allocated), (2, 0));
    }

    #[tokio::test]
    async fn reserved_addresses_never_include_network_or_broadcast() {
        let (_, service) = make_service();
        let sub = subnet("192.168.1.0", "29");
        let _ = service.create(&sub, None, &[]).await;
        let Ok(handed) = service.reserve(&sub, None, 6).await else {
            panic!("reserve failed");
        };
        assert!(!handed.contains(&sub.network()));
        assert!(!handed.contains(&sub.broadcast()));
    }

    #[tokio::test]
    async fn reserve_zero_is_invalid() {
        let (_, service) = make_service();
        let sub = subnet("10.0.0.0", "30");
        let _ = service.create(&sub, None, &[]).await;
        let result = service.reserve(&sub, None, 0).await;
        assert!(matches!(result, Err(IpamError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn get_missing_pool_returns_none() {
        let (_, service) = make_service();
        let result = service.get(&subnet("172.16.3.0", "24"), None).await;
        assert_eq!(result.ok(), Some(None));
    }

    #[tokio::test]
    async fn delete_missing_pool_fails_with_not_found() {
        let (_, service) = make_service();
        let result = service.delete(&subnet("172.16.5.0", "24"), None).await;
        assert!(matches!(result, Err(IpamError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_every_pool_key() {
        let (store, service) = make_service();
        let sub = subnet("10.0.0.0", "30");
        let _ = service.create(&sub, None, &[]).await;
        let _ = service.reserve(&sub, None, 1).await;

        let deleted = service.delete(&sub, None).await;
        assert!(deleted.is_ok());

        for key in ["10.0.0.0:30:free", "10.0.0.0:30:aloc", "10.0.0.0:30:lock"] {
            assert_eq!(store.exists(key).await.ok(), Some(false));
        }
        assert_eq!(service.get(&sub, None).await.ok(), Some(None));
    }

    #[tokio::test]
    async fn identifier_is_reusable_after_delete() {
        let (_, service) = make_service();
        let sub = subnet("10.0.0.0", "30");
        let _ = service.create(&sub, None, &[]).await;
        let _ = service.delete(&sub, None).await;
        let again = service.create(&sub, None, &[]).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn dc_prefix_namespaces_the_pool() {
        let (store, service) = make_service();
        let sub = subnet("10.0.0.0", "30");
        let Ok(summary) = service.create(&sub, Some("dc1"), &[]).await else {
            panic!("create failed");
        };
        assert_eq!(summary.pool, "dc110.0.0.0");
        assert_eq!(store.exists("dc1:10.0.0.0:30:free").await.ok(), Some(true));
        // Same subnet without the prefix is a distinct pool.
        assert_eq!(service.get(&sub, None).await.ok(), Some(None));
    }

    #[tokio::test]
    async fn list_returns_pool_identifiers() {
        let (_, service) = make_service();
        let _ = service.create(&subnet("10.0.0.0", "24"), None, &[]).await;
        let _ = service
            .create(&subnet("192.168.1.0", "24"), Some("dc1"), &[])
            .await;
        let pools = service.list().await;
        assert_eq!(
            pools.ok(),
            Some(vec![
                "10.0.0.0:24".to_string(),
                "dc1:192.168.1.0:24".to_string()
            ])
        );
    }

    #[tokio::test]
    async fn explicit_seed_starts_allocated() {
        let (_, service) = make_service();
        let sub = subnet("10.0.0.0", "29");
        let Ok(summary) = service
            .create(&sub, None, &[addr("10.0.0.2"), addr("10.0.0.4")])
            .await
        else {
            panic!("create failed");
        };
        assert_eq!((summary.free, summary.allocated), (4, 2));

        // Seeded addresses are never handed out.
        let Ok(handed) = service.reserve(&sub, None, 4).await else {
            panic!("reserve failed");
        };
        assert!(!handed.contains(&addr("10.0.0.2")));
        assert!(!handed.contains(&addr("10.0.0.4")));
    }

    #[tokio::test]
    async fn directory_seeding_folds_in_subnet_reservations() {
        let service = seeded_service(
            vec![
                "fixed-address 192.168.1.10",
                "fixed-address 192.168.1.20;",
                "fixed-address 10.9.9.9",
                "max-lease-time 7200",
            ],
            Some("ou=dhcp,dc=example,dc=org"),
        );
        let sub = subnet("192.168.1.0", "24");
        let Ok(summary) = service.create(&sub, None, &[]).await else {
            panic!("create failed");
        };
        assert_eq!((summary.free, summary.allocated), (252, 2));
    }

    #[tokio::test]
    async fn seeding_without_search_base_fails_before_any_mutation() {
        let service = seeded_service(vec!["fixed-address 192.168.1.10"], None);
        let sub = subnet("192.168.1.0", "24");
        let result = service.create(&sub, None, &[]).await;
        assert!(matches!(result, Err(IpamError::Config(_))));
        assert_eq!(service.get(&sub, None).await.ok(), Some(None));
    }

    #[tokio::test]
    async fn lenient_release_accepts_unallocated_address() {
        let (_, service) = make_service();
        let sub = subnet("10.0.0.0", "30");
        let _ = service.create(&sub, None, &[]).await;
        // Never allocated, outside the subnet even — the lenient mode
        // still injects it into the free set.
        let result = service.release(&sub, None, addr("172.16.1.2")).await;
        let Ok(summary) = result else {
            panic!("release failed");
        };
        assert_eq!((summary.free, summary.allocated), (3, 0));
    }

    #[tokio::test]
    async fn strict_release_rejects_unallocated_address() {
        let service = strict_service();
        let sub = subnet("10.0.0.0", "30");
        let _ = service.create(&sub, None, &[]).await;
        let result = service.release(&sub, None, addr("10.0.0.1")).await;
        assert!(matches!(result, Err(IpamError::NotFound(_))));
        let Ok(Some(summary)) = service.get(&sub, None).await else {
            panic!("pool missing");
        };
        assert_eq!((summary.free, summary.allocated), (2, 0));
    }

    #[tokio::test]
    async fn strict_release_accepts_allocated_address() {
        let service = strict_service();
        let sub = subnet("10.0.0.0", "30");
        let _ = service.create(&sub, None, &[]).await;
        let Ok(handed) = service.reserve(&sub, None, 1).await else {
            panic!("reserve failed");
        };
        let Some(first) = handed.first().copied() else {
            panic!("empty offer");
        };
        let result = service.release(&sub, None, first).await;
        assert_eq!(
            result.ok().map(|s| (s.free, s.allocated)),
            Some((2, 0))
        );
    }

    #[tokio::test]
    async fn zero_host_pool_is_present_with_empty_sets() {
        let (_, service) = make_service();
        let sub = subnet("10.0.0.0", "31");
        let Ok(summary) = service.create(&sub, None, &[]).await else {
            panic!("create failed");
        };
        assert_eq!((summary.free, summary.allocated), (0, 0));
        // Still distinguishable from an absent pool.
        let Ok(Some(read_back)) = service.get(&sub, None).await else {
            panic!("pool missing");
        };
        assert_eq!(read_back.free, 0);
    }

    #[tokio::test]
    async fn modify_dispatches_reserve_and_release() {
        let (_, service) = make_service();
        let sub = subnet("10.0.0.0", "30");
        let _ = service.create(&sub, None, &[]).await;

        let outcome = service.modify(&sub, None, PoolChange::Reserve(1)).await;
        let Ok(PoolChangeOutcome::Reserved(handed)) = outcome else {
            panic!("expected reserved outcome");
        };
        let Some(first) = handed.first().copied() else {
            panic!("empty offer");
        };

        let outcome = service.modify(&sub, None, PoolChange::Release(first)).await;
        let Ok(PoolChangeOutcome::Released(summary)) = outcome else {
            panic!("expected released outcome");
        };
        assert_eq!((summary.free, summary.allocated), (2, 0));
    }

    #[test]
    fn modify_requires_exactly_one_argument() {
        assert!(matches!(
            PoolChange::from_options(None, None),
            Err(IpamError::InvalidInput(_))
        ));
        assert!(matches!(
            PoolChange::from_options(Some(1), Some(addr("10.0.0.1"))),
            Err(IpamError::InvalidInput(_))
        ));
        assert_eq!(
            PoolChange::from_options(Some(2), None).ok(),
            Some(PoolChange::Reserve(2))
        );
        assert_eq!(
            PoolChange::from_options(None, Some(addr("10.0.0.1"))).ok(),
            Some(PoolChange::Release(addr("10.0.0.1")))
        );
    }
}
