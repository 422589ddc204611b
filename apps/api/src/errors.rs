use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Why a single variant was left out of a `GenerationResult`.
///
/// These never abort the batch. Their `Display` strings are joined into
/// `GenerationResult.error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantRejection {
    #[error("Variant {index}: model returned empty content after sanitization")]
    EmptyContent { index: usize },

    #[error("Variant {index}: truncated to empty content")]
    TruncatedToEmpty { index: usize },

    #[error("Variant {index}: violates persona rule {}", quote_all(.rules))]
    DenylistViolation { index: usize, rules: Vec<String> },
}

fn quote_all(rules: &[String]) -> String {
    rules
        .iter()
        .map(|r| format!("\"{r}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
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
