//! Error codes carried in every error body.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
//! assert_eq!(ErrorCode::ValidationError.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Client errors live in 1000-1999, backing-service errors in 5000-5999.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    InvalidUuid,
    InvalidJson,
    NotFound,
    MethodNotAllowed,
    Conflict,
    ServiceUnavailable,
}

impl ErrorCode {
    fn entry(self) -> (&'static str, i32, &'static str) {
        match self {
            Self::ValidationError => ("VALIDATION_ERROR", 1001, "Request validation failed"),
            Self::InvalidUuid => ("INVALID_UUID", 1002, "Invalid UUID format"),
            Self::InvalidJson => ("INVALID_JSON", 1003, "Invalid JSON format"),
            Self::NotFound => ("NOT_FOUND", 1004, "Resource not found"),
            Self::MethodNotAllowed => (
                "METHOD_NOT_ALLOWED",
                1005,
                "The HTTP method is not allowed for this resource",
            ),
            Self::Conflict => ("CONFLICT", 1008, "Resource already exists"),
            Self::ServiceUnavailable => (
                "SERVICE_UNAVAILABLE",
                5002,
                "Service is temporarily unavailable",
            ),
        }
    }

    /// Machine-readable identifier, same as the serde form
    pub fn as_str(&self) -> &'static str {
        self.entry().0
    }

    pub fn code(&self) -> i32 {
        self.entry().1
    }

    /// Message used when the caller has nothing more specific to say
    pub fn default_message(&self) -> &'static str {
        self.entry().2
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorCode; 7] = [
        ErrorCode::ValidationError,
        ErrorCode::InvalidUuid,
        ErrorCode::InvalidJson,
        ErrorCode::NotFound,
        ErrorCode::MethodNotAllowed,
        ErrorCode::Conflict,
        ErrorCode::ServiceUnavailable,
    ];

    #[test]
    fn test_as_str_matches_serde_name() {
        for code in ALL {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
            assert_eq!(code.to_string(), code.as_str());
        }
    }

    #[test]
    fn test_codes_are_unique_and_ranged() {
        let mut seen = std::collections::HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code for {code}");
        }
        assert_eq!(ErrorCode::Conflict.code(), 1008);
        assert_eq!(ErrorCode::ServiceUnavailable.code(), 5002);
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("\"CONFLICT\"").unwrap();
        assert_eq!(code, ErrorCode::Conflict);
    }
}
