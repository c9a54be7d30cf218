//! Error codes carried in every [`ErrorResponse`](super::ErrorResponse).
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::Conflict;
//! assert_eq!(code.as_str(), "CONFLICT");
//! assert_eq!(code.code(), 1008);
//! assert_eq!(code.status().as_u16(), 409);
//! ```

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Client errors are numbered 1000-1999, storage errors 2000-2999.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    /// A request field broke a validation rule
    ValidationError,
    /// Body was not JSON or did not match the expected shape
    JsonExtraction,
    NotFound,
    InternalError,
    /// Credentials did not match a stored user
    Unauthorized,
    /// Request collides with stored state (e.g. a taken username)
    Conflict,
    DatabaseError,
}

impl ErrorCode {
    /// Identifier clients match on; identical to the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Conflict => "CONFLICT",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Stable number for logs and dashboards.
    pub fn code(&self) -> i32 {
        match self {
            Self::BadRequest => 1000,
            Self::ValidationError => 1001,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Unauthorized => 1006,
            Self::Conflict => 1008,
            Self::DatabaseError => 2003,
        }
    }

    /// HTTP status normally sent with this code.
    ///
    /// JSON extraction failures override it with the rejection's own status.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest | Self::ValidationError | Self::JsonExtraction => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::ValidationError => "Request validation failed",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::InternalError => "An internal server error occurred",
            Self::Unauthorized => "Authentication required",
            Self::Conflict => "Resource already exists",
            Self::DatabaseError => "Database error occurred",
        }
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

    const ALL: [ErrorCode; 8] = [
        ErrorCode::BadRequest,
        ErrorCode::ValidationError,
        ErrorCode::JsonExtraction,
        ErrorCode::NotFound,
        ErrorCode::InternalError,
        ErrorCode::Unauthorized,
        ErrorCode::Conflict,
        ErrorCode::DatabaseError,
    ];

    #[test]
    fn test_display_matches_serde() {
        for code in ALL {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code));
        }
    }

    #[test]
    fn test_numeric_codes_are_unique() {
        let mut numbers: Vec<i32> = ALL.iter().map(|c| c.code()).collect();
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), ALL.len());
    }

    #[test]
    fn test_status_classes() {
        for code in ALL {
            let expected_server = matches!(code, ErrorCode::InternalError | ErrorCode::DatabaseError);
            assert_eq!(code.status().is_server_error(), expected_server, "{code}");
        }
        assert_eq!(ErrorCode::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }
}
