// Integration tests for the gateway: routing, header propagation, and
// pass-through behavior against an in-process backend service.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use http_body_util::BodyExt;
use portico::config::BackendsConfig;
use portico::gateway::forwarder::Forwarder;
use portico::gateway::registry::{BackendRegistry, Route};
use portico::gateway::{route_request, GatewayState};
use portico::identity::StaticTokenIdentity;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

/// Backend stub that reports what the gateway actually sent it.
async fn echo(request: Request<Body>) -> impl IntoResponse {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();
    let role = header_string(&request, "x-user-role");
    let user_id = header_string(&request, "x-user-id");
    let content_type = header_string(&request, "content-type");

    let body = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap();

    Json(json!({
        "method": method,
        "path": path,
        "query": query,
        "role": role,
        "user_id": user_id,
        "content_type": content_type,
        "body": String::from_utf8_lossy(&body),
    }))
}

fn header_string(request: &Request<Body>, name: &str) -> Value {
    match request.headers().get(name) {
        Some(v) => Value::String(v.to_str().unwrap().to_string()),
        None => Value::Null,
    }
}

async fn spawn_backend(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_echo_backend() -> SocketAddr {
    spawn_backend(Router::new().fallback(echo)).await
}

/// Gateway app wired exactly like the binary, with both route targets
/// pointed at the given backend address.
fn gateway_app(backend: SocketAddr) -> Router {
    let base = format!("http://{}", backend);
    gateway_app_with_registry(BackendRegistry::from_config(&BackendsConfig {
        user_service_url: base.clone(),
        product_service_url: base,
    }))
}

fn gateway_app_with_registry(registry: BackendRegistry) -> Router {
    gateway_app_with_timeout(registry, 5)
}

fn gateway_app_with_timeout(registry: BackendRegistry, timeout_secs: u64) -> Router {
    let state = Arc::new(GatewayState {
        registry,
        identity_provider: Box::new(StaticTokenIdentity),
        forwarder: Forwarder::new(timeout_secs).unwrap(),
    });
    Router::new().fallback(route_request).with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unknown_path_returns_404_with_error_key() {
    let backend = spawn_echo_backend().await;
    let app = gateway_app(backend);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/orders/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Endpoint not found in API Gateway");
}

#[tokio::test]
async fn users_prefix_is_rewritten_once_and_query_preserved() {
    let backend = spawn_echo_backend().await;
    let app = gateway_app(backend);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/1/orders?page=2&sort=name")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["path"], "/users/1/orders");
    assert_eq!(body["query"], "page=2&sort=name");
}

#[tokio::test]
async fn guest_requests_carry_role_but_no_user_id() {
    let backend = spawn_echo_backend().await;
    let app = gateway_app(backend);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/5")
                .header(header::AUTHORIZATION, "Bearer forged-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["role"], "guest");
    assert_eq!(body["user_id"], Value::Null);
}

#[tokio::test]
async fn admin_credential_forwards_role_and_fixed_id() {
    let backend = spawn_echo_backend().await;
    let app = gateway_app(backend);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header(header::AUTHORIZATION, "Bearer admin-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["role"], "admin");
    assert_eq!(body["user_id"], "100");
}

#[tokio::test]
async fn post_body_and_method_pass_through_unmodified() {
    let backend = spawn_echo_backend().await;
    let app = gateway_app(backend);

    let payload = r#"{"name":"A","email":"a@b.com","password":"s3cret"}"#;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/users");
    assert_eq!(body["body"], payload);
    assert_eq!(body["content_type"], "application/json");
}

#[tokio::test]
async fn products_end_to_end_without_credential() {
    let backend = spawn_echo_backend().await;
    let app = gateway_app(backend);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/products/7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["path"], "/products/7");
    assert_eq!(body["role"], "guest");
    assert_eq!(body["user_id"], Value::Null);
}

#[tokio::test]
async fn backend_status_and_body_are_returned_verbatim() {
    // Backend that answers with a non-2xx status and an opaque error body;
    // the gateway must not reinterpret either.
    let app_backend = Router::new().route(
        "/products/7",
        get(|| async {
            (
                StatusCode::IM_A_TEAPOT,
                Json(json!({"error": "backend-specific failure", "code": 77})),
            )
        }),
    );
    let backend = spawn_backend(app_backend).await;
    let app = gateway_app(backend);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/products/7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "backend-specific failure");
    assert_eq!(body["code"], 77);
}

#[tokio::test]
async fn slow_backend_returns_504_with_details() {
    // Backend that answers well past the forwarder's 1s deadline.
    let app_backend = Router::new().route(
        "/users/1",
        get(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            "too late"
        }),
    );
    let backend = spawn_backend(app_backend).await;

    let base = format!("http://{}", backend);
    let app = gateway_app_with_timeout(
        BackendRegistry::new(vec![Route {
            path_prefix: "/api/users".to_string(),
            rewrite_to: "/users".to_string(),
            target_base_url: base,
        }]),
        1,
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Backend service timed out");
    assert!(body["details"].as_str().is_some_and(|d| !d.is_empty()));
}

#[tokio::test]
async fn unreachable_backend_returns_502_with_details() {
    // Grab a port that nothing listens on by binding and dropping.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let base = format!("http://{}", dead_addr);
    let app = gateway_app_with_registry(BackendRegistry::new(vec![Route {
        path_prefix: "/api/users".to_string(),
        rewrite_to: "/users".to_string(),
        target_base_url: base,
    }]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    // Body must be valid JSON with both fields.
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to connect to backend service");
    assert!(body["details"].as_str().is_some_and(|d| !d.is_empty()));
}
