use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    /// No record matches the username/password pair. The message never says
    /// which of the two was wrong.
    #[error("Invalid username/password")]
    Authentication,

    #[error("No user found with username {username}")]
    NotFound { username: String },

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Authentication => AppError::Unauthorized(err.to_string()),
            UserError::NotFound { .. } => AppError::NotFound(err.to_string()),
            UserError::DuplicateUsername(_) => AppError::Conflict(err.to_string()),
            UserError::Database(e) => AppError::Database(e),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_messages() {
        assert_eq!(
            UserError::Authentication.to_string(),
            "Invalid username/password"
        );
        assert_eq!(
            UserError::NotFound {
                username: "bob".to_string()
            }
            .to_string(),
            "No user found with username bob"
        );
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (UserError::Authentication, StatusCode::UNAUTHORIZED),
            (
                UserError::NotFound {
                    username: "bob".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                UserError::DuplicateUsername("alice123".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                UserError::Database(DbErr::Custom("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                UserError::Internal("oops".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
