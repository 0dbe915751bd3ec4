use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Error payload returned to HTTP clients.
///
/// Shape matches the service's wire contract:
/// `{code, status: "fail", message}` with `allowedValues` attached to
/// enum-validation failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub status: String,
    pub message: String,
    #[serde(rename = "allowedValues", skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
}

/// Unified error taxonomy for the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        allowed_values: Option<Vec<String>>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    // Reserved for explicitly surfaced write conflicts. Partial batch
    // application is reported through updated counts instead (see
    // BatchService::create_batch).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ServiceError::InvalidInput {
            message: message.into(),
            allowed_values: None,
        }
    }

    /// Validation failure for an out-of-enum value, carrying the accepted
    /// values for the client.
    pub fn invalid_enum(message: impl Into<String>, allowed: &[&str]) -> Self {
        ServiceError::InvalidInput {
            message: message.into(),
            allowed_values: Some(allowed.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::StoreError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for HTTP responses. Store and internal failures get
    /// a generic message so implementation details do not leak.
    pub fn response_message(&self) -> String {
        match self {
            Self::StoreError(_) | Self::InternalError(_) => "Internal server error".to_string(),
            Self::InvalidInput { message, .. } => message.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::invalid_input(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let allowed_values = match &self {
            ServiceError::InvalidInput { allowed_values, .. } => allowed_values.clone(),
            _ => None,
        };
        let body = ErrorResponse {
            code: status.as_u16(),
            status: "fail".to_string(),
            message: self.response_message(),
            allowed_values,
        };
        (status, Json(body)).into_response()
    }
}
