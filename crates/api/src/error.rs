use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use charstudio_core::error::CoreError;
use charstudio_genai::GenAiError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`GenAiError`] for upstream
/// generation failures. Implements [`IntoResponse`] to produce consistent
/// JSON error responses; no handler error ever becomes a panic.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `charstudio_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A single generation call failed.
    #[error(transparent)]
    Generation(#[from] GenAiError),

    /// Every call of a generation batch failed; carries all causes.
    #[error("All generation attempts failed")]
    AllGenerationsFailed(Vec<GenAiError>),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Generation errors ---
            AppError::Generation(err) => classify_genai_error(err),

            AppError::AllGenerationsFailed(failures) => {
                let reasons: Vec<String> = failures.iter().map(|e| e.to_string()).collect();
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    format!("All generation attempts failed: {}", reasons.join("; ")),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a generation API error into an HTTP status, error code, and
/// message.
///
/// Blocked and empty results keep their upstream message verbatim so the
/// user sees the actual refusal reason.
fn classify_genai_error(err: &GenAiError) -> (StatusCode, &'static str, String) {
    match err {
        GenAiError::MissingApiKey => (
            StatusCode::SERVICE_UNAVAILABLE,
            "MISSING_API_KEY",
            err.to_string(),
        ),
        GenAiError::Blocked { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "CONTENT_BLOCKED",
            err.to_string(),
        ),
        GenAiError::NoImage => (StatusCode::BAD_GATEWAY, "EMPTY_RESULT", err.to_string()),
        GenAiError::Request(inner) => {
            tracing::error!(error = %inner, "Generation transport error");
            (
                StatusCode::BAD_GATEWAY,
                "TRANSPORT_ERROR",
                "The generation service could not be reached".to_string(),
            )
        }
        GenAiError::Api { status, .. } => {
            tracing::error!(error = %err, "Generation API error");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                format!("The generation service returned an error (status {status})"),
            )
        }
    }
}
