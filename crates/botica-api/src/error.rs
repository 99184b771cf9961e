use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use botica_bedrock::error::RecommendError;
use botica_core::error::ValidationError;
use botica_export::error::ExportError;
use botica_storage::error::StorageError;
use serde_json::json;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Validation(ValidationError),
    NotFound(String),
    Conflict(String),
    Configuration(String),
    Upstream { status: Option<u16>, body: String },
    ResponseFormat { raw: String },
    ResponseSchema(ValidationError),
    Timeout,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "validation failed", "details": errors.fields }),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Conflict(msg) => (
                StatusCode::CONFLICT,
                json!({ "error": "constraint violated", "details": msg }),
            ),
            ApiError::Configuration(msg) => {
                tracing::error!(error = %msg, "model provider misconfigured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "model provider is not configured" }),
                )
            }
            ApiError::Upstream { status, body } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "model provider call failed", "status": status, "details": body }),
            ),
            ApiError::ResponseFormat { raw } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "model response is not valid JSON", "raw": raw }),
            ),
            ApiError::ResponseSchema(errors) => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "model response did not match the recommendation schema",
                    "details": errors.fields,
                }),
            ),
            ApiError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                json!({ "error": "model provider timed out" }),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RecommendError> for ApiError {
    fn from(e: RecommendError) -> Self {
        match e {
            RecommendError::InvalidInput(errors) => ApiError::Validation(errors),
            RecommendError::Configuration(msg) => ApiError::Configuration(msg),
            RecommendError::Request(msg) => ApiError::Internal(msg),
            RecommendError::Upstream { status, body } => ApiError::Upstream { status, body },
            RecommendError::ResponseFormat { raw, .. } => ApiError::ResponseFormat { raw },
            RecommendError::ResponseSchema(errors) => ApiError::ResponseSchema(errors),
            RecommendError::Timeout(_) => ApiError::Timeout,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} not found: {id}"))
            }
            StorageError::ConstraintViolation(msg) => ApiError::Conflict(msg),
            StorageError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::UnsupportedFormat(format) => ApiError::BadRequest(format!(
                "unsupported export format {format:?}, expected \"docx\" or \"text\""
            )),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}
