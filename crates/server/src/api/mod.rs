//! # HTTP API
//!
//! - `duel` - REST endpoints under `/api/v1/duel`
//! - `live` - per-session SSE stream and the `/ws` subscription socket

pub mod duel;
pub mod live;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use devduel_core::error::DuelError;
use serde::Serialize;
use utoipa::ToSchema;

/// JSON error body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error mapped onto a status code
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Duel(DuelError),
}

impl From<DuelError> for ApiError {
    fn from(e: DuelError) -> Self {
        ApiError::Duel(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Duel(e) if e.is_not_found() => (StatusCode::NOT_FOUND, e.to_string()),
            ApiError::Duel(e) => {
                tracing::error!("Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
