// ============================================================================
// API Gateway Service
// ============================================================================
//
// Single entry point for all client requests. Handles:
// - Simulated identity resolution from the Authorization header
// - Request routing to backend services based on path prefix
// - Reverse proxying with verbatim status/body pass-through
// - Translation of transport failures into structured JSON errors
//
// Stateless; scales horizontally.
//
// ============================================================================

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use portico::config::Config;
use portico::gateway::{route_request, GatewayState};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== API Gateway Starting ===");
    info!("Port: {}", config.port);
    info!("User service: {}", config.backends.user_service_url);
    info!("Product service: {}", config.backends.product_service_url);

    let gateway_state =
        GatewayState::from_config(&config).context("Failed to build gateway state")?;

    // Any method on any path goes through the proxy; health checks bypass it.
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(health_check))
        .route("/health/live", get(health_check))
        .fallback(route_request)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).into_inner())
        .with_state(gateway_state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Failed to parse bind address")?;

    info!("API Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
