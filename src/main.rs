//! ipam-gateway server entry point.
//!
//! Starts the Axum HTTP server over the Redis-backed pool store.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ipam_gateway::api;
use ipam_gateway::app_state::AppState;
use ipam_gateway::config::GatewayConfig;
use ipam_gateway::directory::{LdapDirectory, ReservationSeeder};
use ipam_gateway::service::SubnetService;
use ipam_gateway::store::{PoolStore, RedisPoolStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    let listen_addr = config.listen_addr;
    tracing::info!(addr = %listen_addr, "starting ipam-gateway");

    // Connect the pool store
    let store: Arc<dyn PoolStore> = Arc::new(RedisPoolStore::connect(&config.store_url).await?);
    tracing::info!(url = %config.store_url, "connected to pool store");

    // Directory seeding is optional; when disabled the service never
    // touches the directory.
    let seeder = if config.directory.seeding_enabled {
        let source = Arc::new(LdapDirectory::new(config.directory.url.clone()));
        Some(ReservationSeeder::new(source, config.directory.clone()))
    } else {
        None
    };

    // Build service layer
    let subnet_service = Arc::new(SubnetService::new(store, seeder, config.strict_release));

    // Build application state
    let app_state = AppState {
        subnet_service,
        config: Arc::new(config),
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
