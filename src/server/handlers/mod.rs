//! HTTP handlers for the server.

pub mod stories;
pub mod templates;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::ArdoiseError;

/// Error response: status plus a JSON `{ "message": ... }` body.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ArdoiseError> for ApiError {
    fn from(err: ArdoiseError) -> Self {
        let status = match err {
            ArdoiseError::Query(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        log::error!("Request failed: {}", err);
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}
