use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::scan::error::ScanError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Scan(e) => scan_error_parts(e),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn scan_error_parts(e: &ScanError) -> (StatusCode, &'static str, String) {
    match e {
        ScanError::EmptyInput { .. } => (StatusCode::BAD_REQUEST, "EMPTY_INPUT", e.to_string()),
        ScanError::InputTooLarge { .. } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            "INPUT_TOO_LARGE",
            e.to_string(),
        ),
        ScanError::InsufficientData => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INSUFFICIENT_DATA",
            e.to_string(),
        ),
        ScanError::Timeout { .. } => (StatusCode::REQUEST_TIMEOUT, "TIMEOUT", e.to_string()),
        ScanError::Configuration(msg) => {
            tracing::error!("Configuration error: {msg}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                e.to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::DocumentKind;

    fn status_of(e: ScanError) -> StatusCode {
        AppError::from(e).into_response().status()
    }

    #[test]
    fn test_scan_error_status_codes() {
        assert_eq!(
            status_of(ScanError::EmptyInput {
                kind: DocumentKind::Resume
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ScanError::InputTooLarge {
                kind: DocumentKind::JobDescription,
                size: 10,
                limit: 5
            }),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_of(ScanError::InsufficientData),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ScanError::Timeout {
                stage: crate::scan::error::Stage::Match,
                elapsed_ms: 3
            }),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            status_of(ScanError::Configuration("bad".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = AppError::Internal(anyhow::anyhow!("secret")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(!body.to_string().contains("secret"));
    }
}
