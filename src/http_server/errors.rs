//! HTTP error rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::observability::Logger;
use crate::orchestrator::TableError;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
    /// Every violation of an invalid definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<String>>,
}

impl From<&TableError> for ErrorResponse {
    fn from(err: &TableError) -> Self {
        let violations = match err {
            TableError::InvalidDefinition(errors) => Some(errors.clone()),
            _ => None,
        };
        Self {
            error: err.to_string(),
            code: err.code(),
            status: err.status_code(),
            violations,
        }
    }
}

impl IntoResponse for TableError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            Logger::error(
                "HTTP_REQUEST_FAILED",
                &[("code", self.code()), ("error", &self.to_string())],
            );
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
