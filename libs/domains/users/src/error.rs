use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;
use uuid::Uuid;

/// MongoDB server code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidInput(msg) => AppError::BadRequest(msg),
            UserError::DuplicateUsername(username) => {
                AppError::Conflict(format!("Username '{}' already exists", username))
            }
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::StoreUnavailable(msg) => {
                // Driver details stay in the logs
                tracing::error!("User store unavailable: {}", msg);
                AppError::ServiceUnavailable("User store is temporarily unavailable".to_string())
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::StoreUnavailable(err.to_string())
    }
}

/// Whether a driver error is a unique index violation
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_codes() {
        let cases = [
            (UserError::InvalidInput("roles".into()), StatusCode::BAD_REQUEST),
            (UserError::DuplicateUsername("alice".into()), StatusCode::CONFLICT),
            (UserError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (
                UserError::StoreUnavailable("connection refused".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
