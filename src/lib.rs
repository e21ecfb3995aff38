//! # ipam-gateway
//!
//! REST API gateway for IPv4 subnet pool management.
//!
//! This crate tracks, per subnet, which host addresses are free and which
//! are allocated, with both sets held as disjoint sets in a Redis
//! key-value store. Callers can create a pool, query its state, atomically
//! reserve one or more addresses, release an address, and destroy the
//! pool. At creation time an external LDAP directory can optionally be
//! consulted for addresses that are already statically reserved.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── SubnetService (service/)
//!     │
//!     ├── Subnet / PoolKey (domain/)
//!     ├── ReservationSeeder (directory/)
//!     │
//!     └── PoolStore → Redis (store/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod directory;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;
