use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hzc_db::{StorageError, StoreError};
use serde_json::json;
use thiserror::Error;

use crate::translation::TranslationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Storage(e) => Self::Storage(e),
            conflict => Self::Conflict(conflict.to_string()),
        }
    }
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Translation(_) => StatusCode::BAD_GATEWAY,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() && !matches!(self, Self::Translation(_)) {
            tracing::error!("{self}");
            "Internal server error".to_string()
        } else {
            tracing::debug!(%status, "{self}");
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
