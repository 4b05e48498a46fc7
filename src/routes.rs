use axum::{
    Router,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::handlers::{
    add_to_blacklist_handler, add_to_whitelist_handler, health_handler, metrics_handler,
    remove_from_blacklist_handler, remove_from_whitelist_handler, reset_handler,
    try_auth_handler,
};
use crate::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/try", post(try_auth_handler))
        .route(
            "/blacklist",
            post(add_to_blacklist_handler).delete(remove_from_blacklist_handler),
        )
        .route(
            "/whitelist",
            post(add_to_whitelist_handler).delete(remove_from_whitelist_handler),
        )
        .route("/reset", post(reset_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

// Access log, one line per request
async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let response = next.run(req).await;

    let status = response.status();
    let latency = start.elapsed();
    if status.as_u16() >= 400 && status != StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(?remote, %method, %uri, status = status.as_u16(), ?latency, "request failed");
    } else {
        tracing::info!(?remote, %method, %uri, status = status.as_u16(), ?latency, "request");
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AdmissionEngine;
    use crate::models::ErrorBody;
    use crate::rate_limit::Limits;
    use crate::store::fakes::BrokenStore;
    use crate::store::{MemoryStore, Store};
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, header::CONTENT_TYPE};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn router_with(store: Arc<dyn Store>, limits: Limits) -> Router {
        app(Arc::new(AppState {
            engine: AdmissionEngine::new(store, limits),
        }))
    }

    fn router(n: u64, m: u64, k: u64) -> Router {
        router_with(Arc::new(MemoryStore::new()), Limits { n, m, k })
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn attempt(login: &str, ip: &str) -> Request<Body> {
        json_request(
            Method::POST,
            "/try",
            json!({"login": login, "password": "secret", "ip": ip}),
        )
    }

    async fn send(app: &Router, req: Request<Body>) -> Response {
        app.clone().oneshot(req).await.unwrap()
    }

    async fn error_of(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice::<ErrorBody>(&bytes).unwrap().error
    }

    #[tokio::test]
    async fn admitted_attempt_is_200_with_empty_body() {
        let app = router(10, 100, 100);
        let response = send(&app, attempt("login", "10.0.0.1")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn refused_attempt_is_429() {
        let app = router(2, 100, 100);
        assert_eq!(send(&app, attempt("login", "10.0.0.1")).await.status(), StatusCode::OK);
        assert_eq!(send(&app, attempt("login", "10.0.0.1")).await.status(), StatusCode::OK);
        assert_eq!(
            send(&app, attempt("login", "10.0.0.1")).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[tokio::test]
    async fn blacklist_add_and_remove() {
        let app = router(10, 100, 100);
        let net = json!({"network": "10.0.0.0/24"});

        let response = send(&app, json_request(Method::POST, "/blacklist", net.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            send(&app, attempt("login", "10.0.0.7")).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );

        let response = send(&app, json_request(Method::DELETE, "/blacklist", net)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(send(&app, attempt("login", "10.0.0.7")).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn whitelist_bypasses_limits() {
        let app = router(0, 0, 0);
        assert_eq!(
            send(&app, attempt("login", "10.0.0.7")).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );

        let net = json!({"network": "10.0.0.7"});
        let response = send(&app, json_request(Method::POST, "/whitelist", net.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(send(&app, attempt("login", "10.0.0.7")).await.status(), StatusCode::OK);

        send(&app, json_request(Method::DELETE, "/whitelist", net)).await;
        assert_eq!(
            send(&app, attempt("login", "10.0.0.7")).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[tokio::test]
    async fn reset_lifts_login_and_ip_limits() {
        let app = router(1, 100, 1);
        send(&app, attempt("login", "10.0.0.1")).await;
        assert_eq!(
            send(&app, attempt("login", "10.0.0.1")).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );

        let body = json!({"login": "login", "ip": "10.0.0.1"});
        let response = send(&app, json_request(Method::POST, "/reset", body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(send(&app, attempt("login", "10.0.0.1")).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_address_is_400() {
        let app = router(10, 100, 100);
        let response = send(&app, attempt("login", "172a.162.31.1")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_of(response).await.contains("172a.162.31.1"));

        let net = json!({"network": "10.0.0.0/2a"});
        let response = send(&app, json_request(Method::POST, "/blacklist", net)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_login_or_ip_is_400() {
        let app = router(10, 100, 100);
        assert_eq!(send(&app, attempt("", "10.0.0.1")).await.status(), StatusCode::BAD_REQUEST);

        let body = json!({"login": "login", "password": "secret"});
        let response = send(&app, json_request(Method::POST, "/try", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let app = router(10, 100, 100);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/try")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = send(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!error_of(response).await.is_empty());

        let response = send(&app, json_request(Method::POST, "/whitelist", json!({}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failure_is_500() {
        let app = router_with(Arc::new(BrokenStore), Limits { n: 1, m: 1, k: 1 });

        let response = send(&app, attempt("login", "10.0.0.1")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_of(response).await, "store unavailable: connection refused");

        let body = json!({"login": "login", "ip": "10.0.0.1"});
        let response = send(&app, json_request(Method::POST, "/reset", body)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn failed_attempt_still_records_latency() {
        use crate::metrics::REQUEST_LATENCY;

        let app = router_with(Arc::new(BrokenStore), Limits { n: 1, m: 1, k: 1 });
        let before = REQUEST_LATENCY.get_sample_count();

        let response = send(&app, attempt("login", "10.0.0.1")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(REQUEST_LATENCY.get_sample_count() > before);
    }

    #[tokio::test]
    async fn wrong_method_and_unknown_path() {
        let app = router(10, 100, 100);
        let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

        assert_eq!(send(&app, get("/try")).await.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(send(&app, get("/reset")).await.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(send(&app, get("/nowhere")).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_and_metrics() {
        let app = router(10, 100, 100);
        send(&app, attempt("login", "10.0.0.1")).await;

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = send(&app, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health["status"], "healthy");

        let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = send(&app, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("abf_requests_total"));
        assert!(text.contains("abf_decisions_total"));
    }
}
