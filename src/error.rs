use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response format for all API errors
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// The same request may succeed if sent again (vendor hiccup, network)
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            retryable: false,
        }
    }

    pub fn with_code(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            retryable: false,
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

/// Trait for errors that can be converted to HTTP responses
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Optional error code for programmatic handling (e.g., "API_ERROR")
    fn error_code(&self) -> Option<&'static str> {
        None
    }

    /// Whether the client should offer a retry
    fn retryable(&self) -> bool {
        false
    }
}

/// Convert any HttpError into an Axum response
pub fn into_response<E: HttpError>(err: E) -> Response {
    let status = err.status_code();
    let code = err.error_code();
    let retryable = err.retryable();
    let message = err.to_string();

    tracing::error!(
        error = %message,
        status = %status,
        code = ?code,
        retryable,
        "API error"
    );

    let body = match code {
        Some(code) => ErrorResponse::with_code(message, code),
        None => ErrorResponse::new(message),
    };

    (status, Json(body.retryable(retryable))).into_response()
}

/// Macro to implement IntoResponse for HttpError types
#[macro_export]
macro_rules! impl_into_response {
    ($error_type:ty) => {
        impl axum::response::IntoResponse for $error_type {
            fn into_response(self) -> axum::response::Response {
                $crate::error::into_response(self)
            }
        }
    };
}
