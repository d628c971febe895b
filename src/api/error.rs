use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::ApiResponse;
use crate::services::SearchError;

/// Errors a handler can answer with directly, outside the degrade boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("iTunes error: {0}")]
    Catalog(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Validation(msg) => msg.clone(),
            Self::Catalog(msg) => {
                tracing::warn!(error = %msg, "Catalog request failed");
                "iTunes service is unavailable".to_string()
            }
            Self::Database(msg) => {
                tracing::error!(error = %msg, "Store request failed");
                "A database error occurred".to_string()
            }
        };

        (self.status(), Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Catalog(e) => Self::Catalog(e.to_string()),
            SearchError::Validation(msg) => Self::Validation(msg),
            SearchError::Database(msg) => Self::Database(msg),
            e @ SearchError::Persistence { .. } => Self::Database(e.to_string()),
        }
    }
}
