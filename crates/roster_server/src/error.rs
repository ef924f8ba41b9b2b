use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use roster_core::{RosterError, StoreError};
use serde_json::json;
use thiserror::Error;

/// Generic body for failures the caller cannot act on.
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";
pub const MISSING_FIELDS_MESSAGE: &str = "Name and Roll Number are required.";
pub const NOT_FOUND_MESSAGE: &str = "Student not found.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RosterError> for ApiError {
    fn from(value: RosterError) -> Self {
        match value {
            RosterError::Validation(_) => Self::BadRequest(MISSING_FIELDS_MESSAGE.to_string()),
            RosterError::Storage(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Internal(detail) => {
                error!("event=http_request module=server status=error error={detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Startup failures of the server process.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("invalid configuration for {key}: {message}")]
    Config { key: String, message: String },

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error("failed to open roster store: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
