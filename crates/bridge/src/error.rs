//! Unified error handling for HTTP handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::slack::{TemplateError, VerifyError};

/// Error type returned by the bridge's handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request failed Slack signature verification.
    #[error("Forbidden: {0}")]
    Forbidden(#[from] VerifyError),

    /// Malformed request body.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Template missing or invalid; a configuration problem.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Template(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, "Rejected request");
        }

        let status = match &self {
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Template(_) => "Internal server error".to_string(),
            Self::Forbidden(_) | Self::BadRequest(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}
