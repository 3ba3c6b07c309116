//! API error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::usecases::SweepError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Sweep(#[from] SweepError),
    #[error("store error: {0:#}")]
    Store(anyhow::Error),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Sweep(SweepError::SweepInProgress) => StatusCode::CONFLICT,
            Self::Sweep(SweepError::EmptyPairUniverse | SweepError::NoState) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Sweep(SweepError::StoreLoad(_)) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
