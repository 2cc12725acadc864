//! Error responses.
//!
//! # Responsibilities
//! - Map request failures to HTTP status codes
//! - Log every failure once, where it is turned into a response
//!
//! # Design Decisions
//! - Backend failures of every kind collapse to a bare 500; the legacy
//!   API has no way to express which step failed
//! - Malformed bodies keep the extractor's 4xx status, also with an empty body

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::backend::BackendError;

/// Failure of a legacy endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    /// JSON body did not match the endpoint's schema.
    #[error("rejected JSON body: {0}")]
    Json(#[from] JsonRejection),

    /// Form body did not match the endpoint's schema.
    #[error("rejected form body: {0}")]
    Form(#[from] FormRejection),

    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Json(rejection) => rejection.status(),
            ApiError::Form(rejection) => rejection.status(),
            ApiError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Json(_) | ApiError::Form(_) => {
                tracing::warn!(status = %status, reason = %self, "Rejected request body");
            }
            ApiError::Backend(e) => {
                tracing::error!(kind = e.kind(), error = %e, "Request failed");
            }
        }
        status.into_response()
    }
}
