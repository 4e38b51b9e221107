//! Handler-boundary errors and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::backend::{BackendError, ValidationError};

/// Errors returned by route handlers.
///
/// The `Display` text is the generic message sent to the browser; backend
/// error bodies only reach the server log.
#[derive(Error, Debug)]
pub enum WebError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Unable to authenticate")]
    Auth(#[source] BackendError),

    #[error("{context}")]
    Backend {
        context: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("Unable to render page")]
    Template(#[from] askama::Error),
}

impl WebError {
    pub fn backend(context: &'static str, source: BackendError) -> Self {
        WebError::Backend { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Validation(_) => StatusCode::BAD_REQUEST,
            WebError::Auth(_) | WebError::Backend { .. } | WebError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match &self {
            WebError::Validation(e) => tracing::warn!(error = %e, "Rejected form submission"),
            WebError::Auth(source) => {
                tracing::error!(error = %source, "Admin authentication failed")
            }
            WebError::Backend { context, source } => {
                tracing::error!(error = %source, "{}", context)
            }
            WebError::Template(e) => tracing::error!(error = %e, "Template rendering failed"),
        }

        (self.status(), self.to_string()).into_response()
    }
}
