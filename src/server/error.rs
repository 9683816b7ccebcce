//! HTTP error responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// An error rendered as `{"error": ...}`, or as plain text for byte routes.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    plain_text: bool,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            plain_text: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            plain_text: false,
        }
    }

    /// Wrap a failure of `action`. Client errors keep their own message.
    pub fn context(action: &str, err: Error) -> Self {
        if err.is_client_error() {
            return Self::from(err);
        }
        tracing::error!("{}: {}", action, err);
        Self::internal(format!("{}: {}", action, err))
    }

    /// Render as `text/plain` instead of JSON.
    pub fn plain(mut self) -> Self {
        self.plain_text = true;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_client_error() {
            tracing::debug!("Rejected request: {}", err);
            Self::bad_request(err.to_string())
        } else {
            tracing::error!("Request failed: {}", err);
            Self::internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text()).plain()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.plain_text {
            (self.status, self.message).into_response()
        } else {
            (
                self.status,
                Json(ErrorBody {
                    error: self.message,
                }),
            )
                .into_response()
        }
    }
}
