use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Routing failures, surfaced to the client as 404.
#[derive(Error, Debug, PartialEq)]
pub enum RouteError {
    #[error("no backend registered for this path")]
    NotFound,
}

/// Outbound proxy failures.
///
/// These are transport-level only; a backend answering with any HTTP status
/// (including 5xx) is a success from the forwarder's point of view and is
/// passed through verbatim. No retry happens at this layer.
#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("backend unreachable: {details}")]
    Unreachable { details: String },

    #[error("backend timed out: {details}")]
    Timeout { details: String },
}

/// Event publishing failures.
///
/// Never surfaced to HTTP clients: the triggering write has already
/// committed and its response is already decided by the time publish runs.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),

    #[error("event serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Consumer-side failures.
#[derive(Error, Debug)]
pub enum ConsumeError {
    /// Payload could not be decoded or misses required fields. The message
    /// is acknowledged and dropped so it is not redelivered forever.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Broker connection lost. Fatal to this process instance; the external
    /// supervisor restarts the worker.
    #[error("broker connection lost: {0}")]
    ConnectionLost(String),
}

/// Errors the gateway reports to its own clients.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Forward(#[from] ForwardError),

    #[error("invalid request: {0}")]
    BadRequest(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Route(RouteError::NotFound) => StatusCode::NOT_FOUND,
            GatewayError::Forward(ForwardError::Unreachable { .. }) => StatusCode::BAD_GATEWAY,
            GatewayError::Forward(ForwardError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            GatewayError::Route(RouteError::NotFound) => {
                json!({ "error": "Endpoint not found in API Gateway" })
            }
            GatewayError::Forward(ForwardError::Unreachable { details }) => json!({
                "error": "Failed to connect to backend service",
                "details": details,
            }),
            GatewayError::Forward(ForwardError::Timeout { details }) => json!({
                "error": "Backend service timed out",
                "details": details,
            }),
            GatewayError::BadRequest(details) => json!({
                "error": "Invalid request",
                "details": details,
            }),
        }
    }

    fn log(&self) {
        match self {
            GatewayError::Route(_) => {
                tracing::warn!(error = %self, "Unknown route");
            }
            GatewayError::Forward(_) => {
                tracing::error!(error = %self, "Failed to reach backend service");
            }
            GatewayError::BadRequest(_) => {
                tracing::debug!(error = %self, "Rejected malformed request");
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        self.log();
        (self.status_code(), Json(self.body())).into_response()
    }
}
