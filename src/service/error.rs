// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// HTTP error type

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use super::webpage::WebpageError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request data")]
    BadRequest(String),

    #[error("Unsupported content type")]
    UnsupportedContentType(String),

    #[error("Message too long")]
    PayloadTooLarge { limit: usize },

    #[error("Not found")]
    NotFound(String),

    #[error("Webpage processing error")]
    Upstream(String),

    #[error("Server error")]
    Internal(String),
}

/// JSON error body: `{ "error": ..., "details": ... }`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::UnsupportedContentType(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> String {
        match self {
            ApiError::BadRequest(details)
            | ApiError::NotFound(details)
            | ApiError::Upstream(details)
            | ApiError::Internal(details) => details.clone(),
            ApiError::UnsupportedContentType(kind) => {
                format!("content type '{}' is not processed by this server", kind)
            }
            ApiError::PayloadTooLarge { limit } => {
                format!("text exceeds the {} character limit", limit)
            }
        }
    }
}

impl From<WebpageError> for ApiError {
    fn from(err: WebpageError) -> Self {
        if err.is_rejected_url() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Upstream(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, details = %self.details(), "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}
