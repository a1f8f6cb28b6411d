use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message shown when the upstream gives no usable explanation.
pub const FALLBACK_MESSAGE: &str = "Something went wrong, please try again";

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("A submission is already in progress")]
    Busy,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PortalError {
    /// Upstream rejected the bearer token itself.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, PortalError::Upstream { status: 401 | 403, .. })
    }

    /// Text for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            PortalError::Upstream { message, .. } if !message.trim().is_empty() => message.clone(),
            PortalError::Validation(m) | PortalError::BadRequest(m) => m.clone(),
            PortalError::Busy => self.to_string(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PortalError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PortalError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PortalError::Upstream { status, .. } if (400..500).contains(status) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            PortalError::Upstream { .. } | PortalError::Network(_) | PortalError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
            PortalError::Busy => StatusCode::CONFLICT,
            PortalError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.user_message() }))).into_response()
    }
}

pub type PortalResult<T> = Result<T, PortalError>;
