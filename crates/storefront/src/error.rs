//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::commerce::CommerceError;
use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Cart, wishlist, or order operation failed.
    #[error("Commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry. Constraint conflicts and missing
        // rows are client mistakes, not alerts.
        let is_server_error = match &self {
            Self::Internal(_) | Self::Auth(AuthError::Repository(_)) => true,
            Self::Database(err) | Self::Commerce(CommerceError::Repository(err)) => {
                !matches!(err, RepositoryError::Conflict(_) | RepositoryError::NotFound)
            }
            _ => false,
        };
        if is_server_error {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(err) | Self::Commerce(CommerceError::Repository(err)) => match err {
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Commerce(CommerceError::NotAuthenticated) => StatusCode::UNAUTHORIZED,
            Self::Commerce(CommerceError::EmptyCart) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Database(err) | Self::Commerce(CommerceError::Repository(err)) => match err {
                RepositoryError::Conflict(_) => "Conflicts with existing data".to_string(),
                RepositoryError::NotFound => "Not found".to_string(),
                _ => "Internal server error".to_string(),
            },
            Self::Commerce(CommerceError::NotAuthenticated) => "Not logged in".to_string(),
            Self::Commerce(CommerceError::EmptyCart) => "Cart is empty".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    "Invalid credentials".to_string()
                }
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                _ => "Authentication error".to_string(),
            },
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Commerce(CommerceError::NotAuthenticated)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Commerce(CommerceError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn constraint_conflicts_are_client_errors() {
        // An unknown product in a cart write surfaces as a repository
        // conflict; that's the caller's mistake, not a server fault.
        let err = AppError::Commerce(CommerceError::Repository(RepositoryError::Conflict(
            "unknown product: ghost".to_string(),
        )));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let err = AppError::Database(RepositoryError::Conflict("duplicate row".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let err = AppError::Database(RepositoryError::NotFound);
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn auth_repository_failures_are_server_errors() {
        let err = AppError::Auth(AuthError::Repository(RepositoryError::DataCorruption(
            "bad row".to_string(),
        )));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
