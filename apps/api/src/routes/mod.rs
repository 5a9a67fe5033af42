pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::scan::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Scan API
        .route("/api/v1/scan", post(handlers::handle_scan))
        .route(
            "/api/v1/scan/requirements",
            post(handlers::handle_requirements),
        )
        .route("/api/v1/taxonomy", get(handlers::handle_taxonomy))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::scan::classifier::HeadingClassifier;
    use crate::taxonomy::tests::sample_taxonomy;
    use crate::taxonomy::TaxonomyRegistry;

    fn app() -> Router {
        let state = AppState {
            config: Config::from_lookup(|_| None).unwrap(),
            taxonomies: Arc::new(TaxonomyRegistry::new(sample_taxonomy())),
            classifier: Arc::new(HeadingClassifier::new()),
        };
        build_router(state)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn scan_body(options: Value) -> Value {
        json!({
            "resume_text": "React, Node.js, Express, MongoDB.",
            "job_description_text": "Looking for a React + Node developer with AWS experience.",
            "options": options
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_scan_returns_analysis() {
        let (status, body) = send(post_json("/api/v1/scan", scan_body(json!({})))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["taxonomy_version"], "test-1");
        assert_eq!(body["result"]["score"], 43);
        assert_eq!(body["result"]["matches"][1]["match_kind"], "synonym");
        assert_eq!(body["result"]["feedback"][0]["severity"], "critical");
        assert!(body["scan_id"].is_string());
    }

    #[tokio::test]
    async fn test_scan_without_options_uses_defaults() {
        let (status, _) = send(post_json(
            "/api/v1/scan",
            json!({"resume_text": "Rust", "job_description_text": "Rust"}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_scan_empty_resume_is_400() {
        let (status, body) = send(post_json(
            "/api/v1/scan",
            json!({"resume_text": " ", "job_description_text": "Rust"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_INPUT");
    }

    #[tokio::test]
    async fn test_scan_too_large_is_413() {
        let (status, body) = send(post_json(
            "/api/v1/scan",
            scan_body(json!({"max_input_bytes": 10})),
        ))
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "INPUT_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_scan_zero_timeout_is_408() {
        let (status, body) = send(post_json(
            "/api/v1/scan",
            scan_body(json!({"timeout_ms": 0})),
        ))
        .await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["error"]["code"], "TIMEOUT");
    }

    #[tokio::test]
    async fn test_scan_unknown_taxonomy_is_configuration_error() {
        let (status, body) = send(post_json(
            "/api/v1/scan",
            scan_body(json!({"taxonomy_version": "missing"})),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
    }

    #[tokio::test]
    async fn test_scan_malformed_body_is_validation_error() {
        let (status, body) = send(post_json("/api/v1/scan", json!({"resume_text": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_requirements_preview() {
        let (status, body) = send(post_json(
            "/api/v1/scan/requirements",
            json!({"job_description_text": "Requirements\n- Rust\n- k8s"}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["required_skills"][0]["skill"]["id"], "rust");
        assert_eq!(body["required_skills"][1]["jd_form"], "k8s");
        assert_eq!(body["sections"][0]["label"], "requirements");
    }

    #[tokio::test]
    async fn test_requirements_without_skills_is_422() {
        let (status, body) = send(post_json(
            "/api/v1/scan/requirements",
            json!({"job_description_text": "We value kindness."}),
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INSUFFICIENT_DATA");
    }

    #[tokio::test]
    async fn test_taxonomy_listing() {
        let (status, body) = send(
            Request::builder()
                .uri("/api/v1/taxonomy")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["default_version"], "test-1");
        assert_eq!(body["versions"][0]["skills"], 12);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = send(
            Request::builder()
                .uri("/api/v1/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
