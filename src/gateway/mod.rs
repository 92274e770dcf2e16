// ============================================================================
// API Gateway
// ============================================================================
//
// Single entry point for client requests. Per request:
// - resolve the inbound credential to a simulated identity
// - match the path prefix against the backend registry
// - rewrite the path and compose the target URL
// - forward method, body, and synthesized headers to the backend
// - return the backend's status and body verbatim
//
// Routing rules:
// - /api/users/*    → user service    (/users/*)
// - /api/products/* → product service (/products/*)
// - anything else   → 404
//
// ============================================================================

pub mod forwarder;
pub mod registry;
pub mod router;

use crate::config::Config;
use crate::error::GatewayError;
use crate::gateway::forwarder::Forwarder;
use crate::gateway::registry::BackendRegistry;
use crate::identity::{IdentityProvider, StaticTokenIdentity};
use axum::{
    body::Body,
    extract::{Request, State},
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    http::HeaderValue,
    response::Response,
};
use std::sync::Arc;

/// Shared, read-only gateway state. Requests run in independent tasks and
/// share nothing mutable.
pub struct GatewayState {
    pub registry: BackendRegistry,
    pub identity_provider: Box<dyn IdentityProvider>,
    pub forwarder: Forwarder,
}

impl GatewayState {
    /// Standard wiring: route table from config, literal-token identity
    /// simulation, pooled HTTP client with a bounded timeout.
    pub fn from_config(config: &Config) -> Result<Arc<Self>, GatewayError> {
        Ok(Arc::new(Self {
            registry: BackendRegistry::from_config(&config.backends),
            identity_provider: Box::new(StaticTokenIdentity),
            forwarder: Forwarder::new(config.gateway.forward_timeout_secs)?,
        }))
    }
}

/// Proxy any inbound request to the backend selected by its path.
pub async fn route_request(
    State(state): State<Arc<GatewayState>>,
    request: Request,
) -> Result<Response, GatewayError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    let credential = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let identity = state.identity_provider.identify(credential.as_deref());

    let target = router::route(&state.registry, &path, query.as_deref())?;

    tracing::info!(
        method = %method,
        path = %path,
        role = identity.role.as_str(),
        target = %target.url,
        "Routing request"
    );

    let headers = request.headers().clone();
    let body = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| GatewayError::BadRequest(format!("failed to read request body: {}", e)))?;

    let backend = state
        .forwarder
        .forward(method, &target.url, &headers, body, &identity)
        .await?;

    tracing::info!(
        target = %target.url,
        status = backend.status.as_u16(),
        "Response from backend"
    );

    let content_type = backend
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    Response::builder()
        .status(backend.status)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(backend.body))
        .map_err(|e| GatewayError::BadRequest(format!("failed to build response: {}", e)))
}
