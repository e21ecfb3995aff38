//! Subnet-pool DTOs for create, get, list and modify operations.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;

/// Subnet mask as given by the client: a plain prefix-length integer or
/// its string form. Keeping the raw string lets validation reject a
/// dotted-decimal mask (`"255.255.255.0"`) with a distinct error instead
/// of a generic parse failure.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum MaskValue {
    /// Prefix length as a JSON number.
    Prefix(u64),
    /// Prefix length as a string — or a dotted-decimal input mistake.
    Text(String),
}

impl fmt::Display for MaskValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(prefix) => write!(f, "{prefix}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Request body for `POST /subnets`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSubnetRequest {
    /// Any address inside the subnet; truncated to the network address.
    pub ip: String,
    /// Subnet mask as a prefix length.
    pub mask: MaskValue,
    /// Optional datacenter prefix namespacing the pool.
    #[serde(default)]
    pub dc: Option<String>,
    /// Addresses to mark as allocated at creation time.
    #[serde(default)]
    pub seed: Vec<String>,
}

/// Response body for `POST /subnets` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateSubnetResponse {
    /// Pool name the subnet was registered under.
    pub pool: String,
    /// Derived network address.
    pub network: String,
    /// Prefix length.
    pub prefix_len: u8,
    /// Number of free host addresses.
    pub free: u64,
    /// Number of allocated host addresses.
    pub allocated: u64,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Single pool detail for `GET /subnets/{ip}/{mask}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubnetDetailResponse {
    /// Pool name.
    pub pool: String,
    /// Derived network address.
    pub network: String,
    /// Prefix length.
    pub prefix_len: u8,
    /// Number of free host addresses.
    pub free: u64,
    /// Number of allocated host addresses.
    pub allocated: u64,
}

/// Paginated list response for `GET /subnets`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubnetListResponse {
    /// Pool identifiers.
    pub data: Vec<String>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Request body for `PATCH /subnets/{ip}/{mask}`. Exactly one of the two
/// fields must be present.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ModifySubnetRequest {
    /// Number of addresses to reserve.
    #[serde(default)]
    pub reserve: Option<u64>,
    /// Address to release back to the free set.
    #[serde(default)]
    pub release: Option<String>,
}

/// Query parameters carrying the optional datacenter prefix.
#[derive(Debug, Clone, Deserialize)]
pub struct DcParams {
    /// Datacenter prefix the pool is namespaced under.
    #[serde(default)]
    pub dc: Option<String>,
}
