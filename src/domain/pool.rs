//! Pool identity and summary projections.
//!
//! A subnet's free and allocated sets are namespaced in the store under a
//! [`PoolKey`] derived from an optional datacenter prefix plus the network
//! address and prefix length.

use std::fmt;

use serde::Serialize;

use super::Subnet;

/// Store key namespace for one subnet pool.
///
/// Key layout (with `dc = "dc1"`, subnet `10.0.0.0/24`):
///
/// ```text
/// name:      dc110.0.0.0
/// free set:  dc1:10.0.0.0:24:free
/// aloc set:  dc1:10.0.0.0:24:aloc
/// guard key: dc1:10.0.0.0:24:lock
/// ```
///
/// Without a datacenter prefix the leading `dc1:` segment is omitted.
/// The guard key serializes concurrent create calls (claimed once with a
/// compare-and-set before either set is populated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolKey {
    name: String,
    free: String,
    allocated: String,
    guard: String,
}

const FREE_SUFFIX: &str = ":free";
const ALOC_SUFFIX: &str = ":aloc";

/// Suffix of the creation-guard key. Every pool owns exactly one guard,
/// which makes `*:lock` the listing pattern for all known pools.
pub const GUARD_SUFFIX: &str = ":lock";

impl PoolKey {
    /// Derives the pool key for `subnet`, optionally under a datacenter
    /// prefix.
    #[must_use]
    pub fn new(subnet: &Subnet, dc: Option<&str>) -> Self {
        let network = subnet.network();
        let prefix = subnet.prefix_len();
        let (name, stem) = match dc {
            Some(dc) => (format!("{dc}{network}"), format!("{dc}:{network}:{prefix}")),
            None => (network.to_string(), format!("{network}:{prefix}")),
        };
        Self {
            name,
            free: format!("{stem}{FREE_SUFFIX}"),
            allocated: format!("{stem}{ALOC_SUFFIX}"),
            guard: format!("{stem}{GUARD_SUFFIX}"),
        }
    }

    /// Human-facing pool name (`{dc}{network}` or `{network}`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store key of the free-address set.
    #[must_use]
    pub fn free(&self) -> &str {
        &self.free
    }

    /// Store key of the allocated-address set.
    #[must_use]
    pub fn allocated(&self) -> &str {
        &self.allocated
    }

    /// Store key of the creation guard.
    #[must_use]
    pub fn guard(&self) -> &str {
        &self.guard
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Free/allocated cardinality snapshot of one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSummary {
    /// Pool name.
    pub pool: String,
    /// Number of free host addresses.
    pub free: u64,
    /// Number of allocated host addresses.
    pub allocated: u64,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn subnet(ip: &str, mask: &str) -> Subnet {
        Subnet::parse(ip, mask, 16)
            .ok()
            .unwrap_or_else(|| panic!("valid subnet"))
    }

    #[test]
    fn keys_without_dc_prefix() {
        let key = PoolKey::new(&subnet("10.0.0.0", "24"), None);
        assert_eq!(key.name(), "10.0.0.0");
        assert_eq!(key.free(), "10.0.0.0:24:free");
        assert_eq!(key.allocated(), "10.0.0.0:24:aloc");
        assert_eq!(key.guard(), "10.0.0.0:24:lock");
    }

    #[test]
    fn keys_with_dc_prefix() {
        let key = PoolKey::new(&subnet("10.0.0.0", "30"), Some("dc1"));
        assert_eq!(key.name(), "dc110.0.0.0");
        assert_eq!(key.free(), "dc1:10.0.0.0:30:free");
        assert_eq!(key.allocated(), "dc1:10.0.0.0:30:aloc");
        assert_eq!(key.guard(), "dc1:10.0.0.0:30:lock");
    }

    #[test]
    fn key_uses_network_not_given_address() {
        let key = PoolKey::new(&subnet("172.16.1.1", "24"), None);
        assert_eq!(key.name(), "172.16.1.0");
        assert_eq!(key.free(), "172.16.1.0:24:free");
    }

    #[test]
    fn display_is_pool_name() {
        let key = PoolKey::new(&subnet("10.0.0.0", "24"), Some("ams"));
        assert_eq!(key.to_string(), "ams10.0.0.0");
    }
}
