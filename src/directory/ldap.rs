//! LDAP implementation of the reservation source.

use async_trait::async_trait;
use ldap3::{LdapConnAsync, Scope, SearchEntry};

use super::{DirectoryEntry, ReservationSource};
use crate::error::IpamError;

/// Directory source backed by an LDAP server.
///
/// Opens a fresh connection per search: seeding runs once per pool
/// creation, so there is nothing to gain from pooling here.
#[derive(Debug, Clone)]
pub struct LdapDirectory {
    url: String,
}

impl LdapDirectory {
    /// Creates a source for the LDAP server at `url`
    /// (e.g. `ldap://localhost:389`).
    #[must_use]
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl ReservationSource for LdapDirectory {
    async fn search(
        &self,
        base: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<Vec<DirectoryEntry>, IpamError> {
        let (conn, mut ldap) = LdapConnAsync::new(&self.url)
            .await
            .map_err(|e| IpamError::Directory(format!("connect to {}: {e}", self.url)))?;
        ldap3::drive!(conn);

        let (results, _res) = ldap
            .search(base, Scope::Subtree, filter, attributes.to_vec())
            .await
            .map_err(|e| IpamError::Directory(format!("search under {base}: {e}")))?
            .success()
            .map_err(|e| IpamError::Directory(format!("search under {base}: {e}")))?;

        let entries = results
            .into_iter()
            .map(SearchEntry::construct)
            .map(|entry| DirectoryEntry {
                dn: entry.dn,
                attrs: entry.attrs,
            })
            .collect();

        let _ = ldap.unbind().await;
        Ok(entries)
    }
}
