//! Gateway error types with HTTP status code mapping.
//!
//! [`IpamError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! The mapping lives here and only here — core pool logic returns typed
//! errors and never encodes status or exit codes itself.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1003,
///     "message": "subnet /8 is larger than the /16 enumeration floor",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server/Store    | 500 / 502 / 503              |
/// | 4000–4999 | Pool Resource   | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum IpamError {
    /// Malformed request input (bad address, bad count, conflicting
    /// modify arguments).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A subnet mask was given in dotted-decimal form where a prefix
    /// length integer is required.
    #[error("subnet mask must be a prefix length between {floor} and 32, not dotted decimal {mask}")]
    DottedDecimalMask {
        /// The dotted-decimal value that was rejected.
        mask: String,
        /// Smallest prefix length the gateway will enumerate.
        floor: u8,
    },

    /// The subnet's prefix length is below the configured enumeration
    /// floor, so its host set is too large to populate.
    #[error("subnet /{prefix} is larger than the /{floor} enumeration floor")]
    SubnetTooLarge {
        /// Requested prefix length.
        prefix: u8,
        /// Smallest prefix length the gateway will enumerate.
        floor: u8,
    },

    /// Pool (or address, in strict release mode) was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Pool has already been created.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Reserve request exceeds the number of free addresses.
    #[error("insufficient free addresses: requested {requested}, available {available}")]
    InsufficientFree {
        /// Number of addresses requested.
        requested: u64,
        /// Number of addresses currently free.
        available: u64,
    },

    /// Invalid or incomplete gateway configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Key-value store command failure.
    #[error("store error: {0}")]
    Store(String),

    /// Key-value store is unreachable.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Directory service search failure.
    #[error("directory error: {0}")]
    Directory(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IpamError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidInput(_) => 1001,
            Self::DottedDecimalMask { .. } => 1002,
            Self::SubnetTooLarge { .. } => 1003,
            Self::NotFound(_) => 2001,
            Self::AlreadyExists(_) => 2002,
            Self::Internal(_) => 3000,
            Self::Store(_) => 3001,
            Self::Config(_) => 3002,
            Self::StoreUnavailable(_) => 3003,
            Self::Directory(_) => 3004,
            Self::InsufficientFree { .. } => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_)
            | Self::DottedDecimalMask { .. }
            | Self::SubnetTooLarge { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::InsufficientFree { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Directory(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) | Self::Store(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for IpamError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
