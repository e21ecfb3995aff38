//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`) and are resolved exactly once at
//! startup into a typed [`GatewayConfig`].

use std::net::SocketAddr;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Redis connection string for the pool store.
    pub store_url: String,

    /// Smallest prefix length the gateway will enumerate. Subnets with a
    /// numerically smaller prefix (larger networks) are rejected — a /8
    /// enumerates ~16M host addresses.
    pub min_prefix_len: u8,

    /// When set, releasing an address that is not currently allocated
    /// fails with a not-found error instead of silently adding the
    /// address to the free pool.
    pub strict_release: bool,

    /// Directory (LDAP) reservation seeding settings.
    pub directory: DirectoryConfig,
}

/// Settings for the optional directory reservation lookup performed at
/// pool-creation time.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Master switch for directory seeding.
    pub seeding_enabled: bool,

    /// Directory server URL (e.g. `ldap://localhost:389`).
    pub url: String,

    /// Search base DN. Required when seeding is enabled.
    pub search_base: Option<String>,

    /// Attribute holding the reservation statement.
    pub reservation_attribute: String,

    /// Leading token of a reservation statement value
    /// (e.g. `fixed-address` in `fixed-address 10.0.0.5;`).
    pub reservation_token: String,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let store_url = std::env::var("STORE_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string());

        let min_prefix_len = parse_env("IPAM_MIN_PREFIX_LEN", 16);
        let strict_release = parse_env_bool("IPAM_STRICT_RELEASE", false);

        let seeding_enabled = parse_env_bool("DIRECTORY_SEEDING_ENABLED", false);
        let url = std::env::var("DIRECTORY_URL")
            .unwrap_or_else(|_| "ldap://localhost:389".to_string());
        let search_base = std::env::var("DIRECTORY_SEARCH_BASE").ok();
        let reservation_attribute = std::env::var("DIRECTORY_RESERVATION_ATTRIBUTE")
            .unwrap_or_else(|_| "dhcpStatements".to_string());
        let reservation_token = std::env::var("DIRECTORY_RESERVATION_TOKEN")
            .unwrap_or_else(|_| "fixed-address".to_string());

        Ok(Self {
            listen_addr,
            store_url,
            min_prefix_len,
            strict_release,
            directory: DirectoryConfig {
                seeding_enabled,
                url,
                search_base,
                reservation_attribute,
                reservation_token,
            },
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some("true") | Some("TRUE") | Some("1") => true,
        Some("false") | Some("FALSE") | Some("0") => false,
        _ => default,
    }
}
