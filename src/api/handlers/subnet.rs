//! Subnet pool handlers: create, list, get, modify, delete.

use std::net::Ipv4Addr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CreateSubnetRequest, CreateSubnetResponse, DcParams, ModifySubnetRequest, PaginationMeta,
    PaginationParams, SubnetDetailResponse, SubnetListResponse,
};
use crate::app_state::AppState;
use crate::domain::{PoolKey, Subnet};
use crate::error::{ErrorResponse, IpamError};
use crate::service::{PoolChange, PoolChangeOutcome};

/// `POST /subnets` — Create a subnet pool.
///
/// # Errors
///
/// Returns [`IpamError`] on invalid input, a duplicate pool, or a store
/// failure.
#[utoipa::path(
    post,
    path = "/api/v1/subnets",
    tag = "Subnets",
    summary = "Create a subnet pool",
    description = "Registers a subnet and populates its free-address set with every usable host address. Addresses in `seed` (and, when directory seeding is enabled, addresses with a matching reservation statement in the directory) start out allocated.",
    request_body = CreateSubnetRequest,
    responses(
        (status = 201, description = "Pool created successfully", body = CreateSubnetResponse),
        (status = 400, description = "Invalid address or mask", body = ErrorResponse),
        (status = 409, description = "Pool already exists", body = ErrorResponse),
    )
)]
pub async fn create_subnet(
    State(state): State<AppState>,
    Json(req): Json<CreateSubnetRequest>,
) -> Result<impl IntoResponse, IpamError> {
    let subnet = Subnet::parse(&req.ip, &req.mask.to_string(), state.config.min_prefix_len)?;
    let seed = parse_addresses(&req.seed)?;

    let summary = state
        .subnet_service
        .create(&subnet, req.dc.as_deref(), &seed)
        .await?;

    let response = CreateSubnetResponse {
        pool: summary.pool,
        network: subnet.network().to_string(),
        prefix_len: subnet.prefix_len(),
        free: summary.free,
        allocated: summary.allocated,
        created_at: Utc::now(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /subnets` — List all known pool identifiers with pagination.
///
/// # Errors
///
/// Returns [`IpamError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/subnets",
    tag = "Subnets",
    summary = "List subnet pools",
    description = "Returns a paginated list of all known pool identifiers.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated pool identifier list", body = SubnetListResponse),
    )
)]
pub async fn list_subnets(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, IpamError> {
    let params = params.clamped();
    let pools = state.subnet_service.list().await?;

    let total = pools.len() as u32;
    let per_page = params.per_page;
    let page = params.page;
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };

    let start = ((page - 1) * per_page) as usize;
    let data: Vec<String> = pools
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();

    Ok(Json(SubnetListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /subnets/{ip}/{mask}` — Get pool state.
///
/// # Errors
///
/// Returns [`IpamError::NotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/subnets/{ip}/{mask}",
    tag = "Subnets",
    summary = "Get subnet pool state",
    description = "Returns the free and allocated address counts for one pool.",
    params(
        ("ip" = String, Path, description = "Any address inside the subnet"),
        ("mask" = String, Path, description = "Prefix length"),
        ("dc" = Option<String>, Query, description = "Datacenter prefix"),
    ),
    responses(
        (status = 200, description = "Pool state", body = SubnetDetailResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_subnet(
    State(state): State<AppState>,
    Path((ip, mask)): Path<(String, String)>,
    Query(params): Query<DcParams>,
) -> Result<impl IntoResponse, IpamError> {
    let subnet = Subnet::parse(&ip, &mask, state.config.min_prefix_len)?;
    let summary = state
        .subnet_service
        .get(&subnet, params.dc.as_deref())
        .await?
        .ok_or_else(|| IpamError::NotFound(format!("subnet {subnet}")))?;

    Ok(Json(SubnetDetailResponse {
        pool: summary.pool,
        network: subnet.network().to_string(),
        prefix_len: subnet.prefix_len(),
        free: summary.free,
        allocated: summary.allocated,
    }))
}

/// `PATCH /subnets/{ip}/{mask}` — Reserve or release addresses.
///
/// # Errors
///
/// Returns [`IpamError::InvalidInput`] unless exactly one of `reserve`
/// and `release` is given, and [`IpamError::InsufficientFree`] when the
/// reserve count exceeds the free pool.
#[utoipa::path(
    patch,
    path = "/api/v1/subnets/{ip}/{mask}",
    tag = "Subnets",
    summary = "Reserve or release addresses",
    description = "With `reserve: n`, atomically pops n addresses from the free set and returns them. With `release: ip`, moves the address back to the free set. Exactly one of the two must be given.",
    request_body = ModifySubnetRequest,
    params(
        ("ip" = String, Path, description = "Any address inside the subnet"),
        ("mask" = String, Path, description = "Prefix length"),
        ("dc" = Option<String>, Query, description = "Datacenter prefix"),
    ),
    responses(
        (status = 200, description = "Reserved addresses or post-release pool state", body = serde_json::Value),
        (status = 400, description = "Invalid or conflicting arguments", body = ErrorResponse),
        (status = 422, description = "Not enough free addresses", body = ErrorResponse),
    )
)]
pub async fn modify_subnet(
    State(state): State<AppState>,
    Path((ip, mask)): Path<(String, String)>,
    Query(params): Query<DcParams>,
    Json(req): Json<ModifySubnetRequest>,
) -> Result<impl IntoResponse, IpamError> {
    let subnet = Subnet::parse(&ip, &mask, state.config.min_prefix_len)?;
    let release = req
        .release
        .as_deref()
        .map(parse_address)
        .transpose()?;
    let change = PoolChange::from_options(req.reserve, release)?;

    let outcome = state
        .subnet_service
        .modify(&subnet, params.dc.as_deref(), change)
        .await?;

    let response = match outcome {
        PoolChangeOutcome::Reserved(addresses) => {
            let reserved: Vec<String> = addresses.iter().map(Ipv4Addr::to_string).collect();
            let key = PoolKey::new(&subnet, params.dc.as_deref());
            serde_json::json!({
                "pool": key.name(),
                "reserved": reserved,
            })
        }
        PoolChangeOutcome::Released(summary) => serde_json::json!({
            "pool": summary.pool,
            "free": summary.free,
            "allocated": summary.allocated,
        }),
    };

    Ok(Json(response))
}

/// `DELETE /subnets/{ip}/{mask}` — Destroy a pool.
///
/// # Errors
///
/// Returns [`IpamError::NotFound`] if the pool does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/subnets/{ip}/{mask}",
    tag = "Subnets",
    summary = "Delete a subnet pool",
    description = "Deletes the pool's free and allocated sets and verifies both are gone.",
    params(
        ("ip" = String, Path, description = "Any address inside the subnet"),
        ("mask" = String, Path, description = "Prefix length"),
        ("dc" = Option<String>, Query, description = "Datacenter prefix"),
    ),
    responses(
        (status = 204, description = "Pool deleted"),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn delete_subnet(
    State(state): State<AppState>,
    Path((ip, mask)): Path<(String, String)>,
    Query(params): Query<DcParams>,
) -> Result<impl IntoResponse, IpamError> {
    let subnet = Subnet::parse(&ip, &mask, state.config.min_prefix_len)?;
    state
        .subnet_service
        .delete(&subnet, params.dc.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Subnet pool management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/subnets", post(create_subnet).get(list_subnets))
        .route(
            "/subnets/{ip}/{mask}",
            get(get_subnet).patch(modify_subnet).delete(delete_subnet),
        )
}

/// Parses one dotted-decimal address from request input.
fn parse_address(input: &str) -> Result<Ipv4Addr, IpamError> {
    input
        .trim()
        .parse()
        .map_err(|_| IpamError::InvalidInput(format!("{input} is not a valid IPv4 address")))
}

/// Parses a list of seed addresses from request input.
fn parse_addresses(inputs: &[String]) -> Result<Vec<Ipv4Addr>, IpamError> {
    inputs.iter().map(|input| parse_address(input)).collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_address_rejects_garbage() {
        assert!(parse_address("10.0.0.1").is_ok());
        assert!(matches!(
            parse_address("10.0.0"),
            Err(IpamError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_address("not-an-ip"),
            Err(IpamError::InvalidInput(_))
        ));
    }

    #[test]
    fn parse_addresses_collects_or_fails() {
        let ok = parse_addresses(&["10.0.0.1".to_string(), "10.0.0.2".to_string()]);
        assert_eq!(ok.ok().map(|v| v.len()), Some(2));

        let bad = parse_addresses(&["10.0.0.1".to_string(), "oops".to_string()]);
        assert!(matches!(bad, Err(IpamError::InvalidInput(_))));
    }
}
