//! Service layer: subnet pool orchestration.

pub mod subnet_service;

pub use subnet_service::{PoolChange, PoolChangeOutcome, SubnetService};
