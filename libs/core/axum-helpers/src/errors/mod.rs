pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1008,
///   "error": "CONFLICT",
///   "message": "Username 'alice' already exists"
/// }
/// ```
///
/// `details` is only present for validation failures and maps each field to
/// the rules it broke. Rejected values are never echoed back.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Error type handlers return; domain crates convert their own errors into it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation failed for: {}", invalid_fields(.0))]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// HTTP status and body code for this error
    pub fn classify(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::JsonExtractorRejection(JsonRejection::MissingJsonContentType(_)) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, ErrorCode::InvalidJson)
            }
            AppError::JsonExtractorRejection(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidJson),
            AppError::ValidationError(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::ValidationError)
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
            AppError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::ServiceUnavailable)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        if status.is_server_error() {
            tracing::warn!(error_code = code.code(), "{}", self);
        } else {
            tracing::info!(error_code = code.code(), "{}", self);
        }

        let body = match self {
            AppError::JsonExtractorRejection(e) => ErrorResponse::new(code, e.body_text()),
            AppError::ValidationError(e) => ErrorResponse {
                details: Some(validation_details(&e)),
                ..ErrorResponse::new(code, code.default_message())
            },
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ServiceUnavailable(msg) => ErrorResponse::new(code, msg),
        };

        (status, Json(body)).into_response()
    }
}

/// Sorted, comma-separated names of the fields that failed validation
pub fn invalid_fields(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
    fields.sort_unstable();
    fields.join(", ")
}

/// `{ field: [{code, message, params}] }` without the rejected `value` param.
pub fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    let details = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let rules: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    let params: serde_json::Map<String, serde_json::Value> = err
                        .params
                        .iter()
                        .filter(|(name, _)| *name != "value")
                        .map(|(name, value)| (name.to_string(), value.clone()))
                        .collect();
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(rules))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(details)
}

/// Build an error response outside of `AppError`, e.g. from a fallback.
///
/// ```rust
/// use axum_helpers::errors::{error_response, ErrorCode};
/// use axum::http::StatusCode;
///
/// let response = error_response(
///     StatusCode::BAD_REQUEST,
///     "Invalid input".to_string(),
///     ErrorCode::ValidationError,
/// );
/// assert_eq!(response.status(), StatusCode::BAD_REQUEST);
/// ```
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    (status, Json(ErrorResponse::new(error_code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    #[derive(Validate)]
    struct Login {
        #[validate(length(min = 1, max = 8))]
        password: String,
        #[validate(length(min = 1))]
        username: String,
    }

    fn rejected_login() -> ValidationErrors {
        Login {
            password: "hunter2-is-too-long".to_string(),
            username: String::new(),
        }
        .validate()
        .unwrap_err()
    }

    async fn body_of(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_conflict_body() {
        let response = AppError::Conflict("Username 'alice' already exists".into()).into_response();
        let (status, body) = body_of(response).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let body: ErrorResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(body.code, 1008);
        assert_eq!(body.error, "CONFLICT");
        assert_eq!(body.message, "Username 'alice' already exists");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_service_unavailable_body() {
        let response = AppError::ServiceUnavailable("try later".into()).into_response();
        let (status, body) = body_of(response).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let body: ErrorResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(body.error, "SERVICE_UNAVAILABLE");
        assert_eq!(body.message, "try later");
    }

    #[tokio::test]
    async fn test_bad_request_uses_validation_code() {
        let (status, body) =
            body_of(AppError::BadRequest("roles must not be empty".into()).into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body: ErrorResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(body.error, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_validation_body_lists_rules_without_rejected_value() {
        let (status, body) = body_of(AppError::from(rejected_login()).into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.contains("hunter2"));

        let body: ErrorResponse = serde_json::from_str(&body).unwrap();
        let details = body.details.unwrap();
        assert_eq!(details["password"][0]["code"], "length");
        assert_eq!(details["password"][0]["params"]["max"], 8);
        assert!(details["password"][0]["params"].get("value").is_none());
        assert!(details["username"].is_array());
    }

    #[test]
    fn test_validation_display_names_fields_only() {
        let err = AppError::from(rejected_login());
        assert_eq!(err.to_string(), "Validation failed for: password, username");
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            AppError::NotFound("x".into()).classify(),
            (StatusCode::NOT_FOUND, ErrorCode::NotFound)
        );
        assert_eq!(
            AppError::ServiceUnavailable("x".into()).classify().0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
