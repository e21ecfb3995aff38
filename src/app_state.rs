//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::service::SubnetService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Subnet pool service for all business logic.
    pub subnet_service: Arc<SubnetService>,
    /// Gateway configuration resolved at startup.
    pub config: Arc<GatewayConfig>,
}
