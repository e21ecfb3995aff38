//! Directory reservation seeding.
//!
//! At pool-creation time the gateway can consult an external directory
//! service for addresses already marked as statically reserved, so they
//! start out in the allocated set instead of being handed to callers.
//! Entries are matched on an attribute whose value begins with a known
//! token (by default DHCP `fixed-address` statements).

pub mod ldap;

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;

pub use ldap::LdapDirectory;

use crate::config::DirectoryConfig;
use crate::domain::Subnet;
use crate::error::IpamError;

/// One entry returned by a directory search.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Entry identity (distinguished name).
    pub dn: String,
    /// Attribute values keyed by attribute name.
    pub attrs: HashMap<String, Vec<String>>,
}

/// Source of directory search results.
///
/// Implemented by [`LdapDirectory`] for production; tests substitute a
/// stub.
#[async_trait]
pub trait ReservationSource: Send + Sync + fmt::Debug {
    /// Runs one subtree search under `base` and returns the matching
    /// entries with the requested attributes.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::Directory`] on connection or search failure.
    async fn search(
        &self,
        base: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<Vec<DirectoryEntry>, IpamError>;
}

/// Queries a [`ReservationSource`] for pre-existing static reservations
/// inside a subnet.
#[derive(Debug, Clone)]
pub struct ReservationSeeder {
    source: Arc<dyn ReservationSource>,
    config: DirectoryConfig,
}

impl ReservationSeeder {
    /// Creates a seeder over `source` with the given directory settings.
    #[must_use]
    pub fn new(source: Arc<dyn ReservationSource>, config: DirectoryConfig) -> Self {
        Self { source, config }
    }

    /// Returns the set of reserved addresses found in the directory that
    /// fall inside `subnet`.
    ///
    /// Issues one search filtered to values beginning with the
    /// reservation token (`(<attribute>=<token>*)`); values whose address
    /// is malformed or outside the subnet are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`IpamError::Config`] if no search base is configured, and
    /// [`IpamError::Directory`] if the search itself fails.
    pub async fn seed(&self, subnet: &Subnet) -> Result<BTreeSet<Ipv4Addr>, IpamError> {
        let Some(base) = &self.config.search_base else {
            return Err(IpamError::Config(
                "directory seeding enabled but no search base configured".to_string(),
            ));
        };
        let attribute = &self.config.reservation_attribute;
        let filter = format!("({attribute}={}*)", self.config.reservation_token);
        let entries = self
            .source
            .search(base, &filter, std::slice::from_ref(attribute))
            .await?;

        let mut reserved = BTreeSet::new();
        for entry in &entries {
            for value in entry.attrs.get(attribute).into_iter().flatten() {
                let Some(ip) = parse_reservation(value, &self.config.reservation_token) else {
                    continue;
                };
                if subnet.contains(ip) {
                    reserved.insert(ip);
                }
            }
        }
        tracing::debug!(
            subnet = %subnet,
            found = reserved.len(),
            "reserved addresses found in directory"
        );
        Ok(reserved)
    }
}

/// Extracts the address from a reservation statement such as
/// `fixed-address 10.0.0.5;`. Returns `None` when the value does not
/// start with `token` or the address part does not parse.
fn parse_reservation(value: &str, token: &str) -> Option<Ipv4Addr> {
    let rest = value.strip_prefix(token)?;
    let word = rest.split_whitespace().next()?;
    word.trim_end_matches(';').parse().ok()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct StubSource {
        entries: Vec<DirectoryEntry>,
    }

    #[async_trait]
    impl ReservationSource for StubSource {
        async fn search(
            &self,
            _base: &str,
            _filter: &str,
            _attributes: &[String],
        ) -> Result<Vec<DirectoryEntry>, IpamError> {
            Ok(self.entries.clone())
        }
    }

    fn config(search_base: Option<&str>) -> DirectoryConfig {
        DirectoryConfig {
            seeding_enabled: true,
            url: "ldap://localhost:389".to_string(),
            search_base: search_base.map(str::to_string),
            reservation_attribute: "dhcpStatements".to_string(),
            reservation_token: "fixed-address".to_string(),
        }
    }

    fn entry(values: &[&str]) -> DirectoryEntry {
        let mut attrs = HashMap::new();
        attrs.insert(
            "dhcpStatements".to_string(),
            values.iter().map(|v| (*v).to_string()).collect(),
        );
        DirectoryEntry {
            dn: "cn=host,ou=hosts,dc=example,dc=org".to_string(),
            attrs,
        }
    }

    fn subnet(ip: &str, mask: &str) -> Subnet {
        Subnet::parse(ip, mask, 16)
            .ok()
            .unwrap_or_else(|| panic!("valid subnet"))
    }

    #[test]
    fn parses_fixed_address_statements() {
        let token = "fixed-address";
        assert_eq!(
            parse_reservation("fixed-address 10.0.0.5", token),
            "10.0.0.5".parse().ok()
        );
        assert_eq!(
            parse_reservation("fixed-address 10.0.0.5;", token),
            "10.0.0.5".parse().ok()
        );
        assert_eq!(parse_reservation("default-lease-time 600", token), None);
        assert_eq!(parse_reservation("fixed-address not-an-ip", token), None);
        assert_eq!(parse_reservation("fixed-address", token), None);
    }

    #[tokio::test]
    async fn seed_filters_to_subnet() {
        let source = StubSource {
            entries: vec![
                entry(&["fixed-address 192.168.1.10"]),
                entry(&["fixed-address 192.168.1.20;"]),
                entry(&["fixed-address 10.9.9.9"]),
                entry(&["max-lease-time 7200"]),
            ],
        };
        let seeder = ReservationSeeder::new(Arc::new(source), config(Some("ou=dhcp")));
        let result = seeder.seed(&subnet("192.168.1.0", "24")).await;
        let Ok(reserved) = result else {
            panic!("seed failed");
        };
        let found: Vec<String> = reserved.iter().map(Ipv4Addr::to_string).collect();
        assert_eq!(found, vec!["192.168.1.10", "192.168.1.20"]);
    }

    #[tokio::test]
    async fn seed_without_search_base_is_config_error() {
        let seeder = ReservationSeeder::new(Arc::new(StubSource::default()), config(None));
        let result = seeder.seed(&subnet("192.168.1.0", "24")).await;
        assert!(matches!(result, Err(IpamError::Config(_))));
    }

    #[tokio::test]
    async fn seed_with_no_matches_is_empty() {
        let seeder =
            ReservationSeeder::new(Arc::new(StubSource::default()), config(Some("ou=dhcp")));
        let result = seeder.seed(&subnet("192.168.1.0", "24")).await;
        assert_eq!(result.ok().map(|s| s.len()), Some(0));
    }
}
