use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use streambridge_config::AddonConfigError;
use streambridge_core::BridgeError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<BridgeError> for AppError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::NotFound(msg) => Self::not_found(msg),
            BridgeError::InvalidId(_) | BridgeError::InvalidUrl(_) => {
                Self::bad_request(err.to_string())
            }
            BridgeError::Http(_) | BridgeError::Status { .. } | BridgeError::Decode(_) => {
                tracing::warn!(error = %err, "media server request failed");
                Self::bad_gateway("Media server request failed")
            }
            BridgeError::Unsupported(msg) => Self::bad_request(msg),
        }
    }
}

impl From<AddonConfigError> for AppError {
    fn from(err: AddonConfigError) -> Self {
        Self::bad_request(format!("Invalid addon configuration: {err}"))
    }
}
