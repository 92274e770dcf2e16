use crate::error::ForwardError;
use crate::identity::Identity;
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderMap, HeaderValue, Method, StatusCode,
};
use bytes::Bytes;
use std::time::Duration;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_ID_HEADER: &str = "x-user-id";

/// Backend response as the gateway hands it back to the client: the exact
/// status code and the exact body, untouched.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub body: Bytes,
    /// Backend Content-Type, when it sent one.
    pub content_type: Option<HeaderValue>,
}

/// Outbound HTTP proxy leg of the gateway.
///
/// One forwarder is shared by all request tasks; `reqwest::Client` pools
/// connections internally. There is no retry policy at this layer —
/// transport failures surface to the client as 502/504 and retrying is
/// the client's concern.
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(timeout_secs: u64) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ForwardError::Unreachable {
                details: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Issue the outbound call and capture the backend's verbatim answer.
    ///
    /// The method and raw body pass through unmodified. Headers are
    /// synthesized by `build_headers`; nothing else from the inbound
    /// request is forwarded.
    pub async fn forward(
        &self,
        method: Method,
        target_url: &str,
        inbound_headers: &HeaderMap,
        body: Bytes,
        identity: &Identity,
    ) -> Result<GatewayResponse, ForwardError> {
        let headers = build_headers(inbound_headers, identity);

        let mut request = self.client.request(method, target_url).headers(headers);
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ForwardError::Timeout {
                    details: e.to_string(),
                }
            } else {
                ForwardError::Unreachable {
                    details: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(|e| ForwardError::Unreachable {
            details: format!("failed to read backend response body: {}", e),
        })?;

        Ok(GatewayResponse {
            status,
            body,
            content_type,
        })
    }
}

/// Headers sent to the backend.
///
/// Content-Type and Accept pass through from the inbound request, both
/// defaulting to `application/json` when absent. `X-User-Role` is always
/// appended; `X-User-Id` only when the identity carries a subject.
pub fn build_headers(inbound: &HeaderMap, identity: &Identity) -> HeaderMap {
    let default_content_type = HeaderValue::from_static(DEFAULT_CONTENT_TYPE);

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        inbound
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| default_content_type.clone()),
    );
    headers.insert(
        ACCEPT,
        inbound
            .get(ACCEPT)
            .cloned()
            .unwrap_or(default_content_type),
    );
    headers.insert(
        USER_ROLE_HEADER,
        HeaderValue::from_static(identity.role.as_str()),
    );
    if let Some(subject_id) = &identity.subject_id {
        // Subject ids are simulator constants or verifier output; an id
        // that is not a valid header value is silently omitted.
        if let Ok(value) = HeaderValue::from_str(subject_id) {
            headers.insert(USER_ID_HEADER, value);
        }
    }

    headers
}
