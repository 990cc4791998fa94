//! CSRF Error Types
//!
//! This module provides CSRF-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, category::ErrorCategory, kind::ErrorKind};
use thiserror::Error;

/// CSRF-specific result type alias
pub type CsrfResult<T> = Result<T, CsrfError>;

/// Message shown to clients for every validation failure
pub const INVALID_TOKEN_MESSAGE: &str = "invalid CSRF token";

/// CSRF-specific error variants
///
/// The validation variants carry the low-level reason for server logs only.
/// Clients always see the same [`INVALID_TOKEN_MESSAGE`].
#[derive(Debug, Error)]
pub enum CsrfError {
    /// No token cookie on a state-changing request
    #[error("CSRF cookie not found")]
    CookieNotFound,

    /// No lookup rule produced a submitted token
    #[error("CSRF token not found in request")]
    TokenNotFound,

    /// Submitted token differs from the cookie token
    #[error("CSRF token mismatch")]
    TokenMismatch,

    /// Form body could not be buffered for token lookup
    #[error("CSRF form body unreadable: {0}")]
    BodyUnreadable(String),

    /// Secure random source failed while minting
    #[error("CSRF token generation failed: {0}")]
    RandomUnavailable(String),

    /// Token lookup definition is malformed
    #[error("Invalid CSRF token lookup: {0}")]
    InvalidLookup(String),

    /// Configuration rejected at construction
    #[error("Invalid CSRF configuration: {0}")]
    InvalidConfig(String),

    /// A handler asked for the token but the middleware is not installed
    #[error("CSRF context missing from request")]
    ContextMissing,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CsrfError {
    /// Whether this error means the client failed validation
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            CsrfError::CookieNotFound
                | CsrfError::TokenNotFound
                | CsrfError::TokenMismatch
                | CsrfError::BodyUnreadable(_)
        )
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        if self.is_validation_failure() {
            ErrorKind::Forbidden
        } else {
            ErrorKind::InternalServerError
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            CsrfError::TokenMismatch => {
                tracing::warn!(reason = %self, "CSRF token mismatch");
            }
            CsrfError::CookieNotFound | CsrfError::TokenNotFound | CsrfError::BodyUnreadable(_) => {
                tracing::warn!(reason = %self, "CSRF validation failed");
            }
            CsrfError::RandomUnavailable(msg) => {
                tracing::error!(message = %msg, "CSRF token generation failed");
            }
            _ => {
                tracing::error!(error = %self, "CSRF internal error");
            }
        }
    }
}

impl From<platform::crypto::RandomSourceError> for CsrfError {
    fn from(err: platform::crypto::RandomSourceError) -> Self {
        CsrfError::RandomUnavailable(err.to_string())
    }
}

impl From<CsrfError> for AppError {
    fn from(err: CsrfError) -> Self {
        if err.is_validation_failure() {
            AppError::forbidden(INVALID_TOKEN_MESSAGE)
                .with_category(ErrorCategory::Csrf)
                .with_action("Reload the page and submit the form again")
                .with_source(err)
        } else {
            AppError::new(err.kind(), "Internal Server Error").with_source(err)
        }
    }
}

impl IntoResponse for CsrfError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::error::Error;

    #[test]
    fn test_validation_failures_collapse_to_forbidden() {
        for err in [
            CsrfError::CookieNotFound,
            CsrfError::TokenNotFound,
            CsrfError::TokenMismatch,
            CsrfError::BodyUnreadable("length limit exceeded".into()),
        ] {
            let reason = err.to_string();
            let app_err: AppError = err.into();
            assert_eq!(app_err.status_code(), 403);
            assert_eq!(app_err.category(), ErrorCategory::Csrf);
            assert_eq!(app_err.message(), INVALID_TOKEN_MESSAGE);
            assert_eq!(app_err.source().unwrap().to_string(), reason);
        }
    }

    #[test]
    fn test_internal_errors_are_server_errors() {
        for err in [
            CsrfError::RandomUnavailable("no entropy".into()),
            CsrfError::ContextMissing,
            CsrfError::InvalidConfig("token_length".into()),
        ] {
            assert!(!err.is_validation_failure());
            let app_err: AppError = err.into();
            assert_eq!(app_err.status_code(), 500);
            assert_eq!(app_err.category(), ErrorCategory::Internal);
        }
    }

    #[test]
    fn test_error_into_response_status_codes() {
        let test_cases: Vec<(CsrfError, StatusCode)> = vec![
            (CsrfError::CookieNotFound, StatusCode::FORBIDDEN),
            (CsrfError::TokenNotFound, StatusCode::FORBIDDEN),
            (CsrfError::TokenMismatch, StatusCode::FORBIDDEN),
            (
                CsrfError::RandomUnavailable("test".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (CsrfError::ContextMissing, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(CsrfError::CookieNotFound.to_string(), "CSRF cookie not found");
        assert_eq!(
            CsrfError::TokenNotFound.to_string(),
            "CSRF token not found in request"
        );
        assert_eq!(CsrfError::TokenMismatch.to_string(), "CSRF token mismatch");
    }
}
