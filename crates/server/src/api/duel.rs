//! # Duel API
//!
//! Start a duel, poll it, fetch its result and check collaborator health.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use devduel_core::duel::{DuelResult, DuelStatus, DuelStatusReport};
use devduel_core::events::{EventBus, ProgressEvent};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{live, ApiError};
use crate::SharedState;

/// Two profile URLs to pit against each other
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartDuelRequest {
    pub url1: String,
    pub url2: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StartDuelResponse {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceHealth {
    /// `healthy` or `degraded`
    pub status: String,
    pub services: BTreeMap<String, bool>,
    pub timestamp: String,
}

pub fn duel_routes() -> Router<SharedState> {
    Router::new()
        .route("/start", post(start_duel))
        .route("/health", get(duel_health))
        .route("/:id", get(get_duel))
        .route("/:id/status", get(get_duel_status))
        .route("/:id/events", get(live::duel_events))
}

fn validate_url(field: &str, url: &str) -> Result<(), ApiError> {
    let url = url.trim();
    let lower = url.to_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => Err(ApiError::BadRequest(format!(
            "Invalid URL for {}: {:?}",
            field, url
        ))),
    }
}

/// Create a session and run the duel in the background
#[utoipa::path(
    post,
    path = "/api/v1/duel/start",
    tag = "duel",
    request_body = StartDuelRequest,
    responses(
        (status = 200, description = "Duel started", body = StartDuelResponse),
        (status = 400, description = "Invalid URL", body = super::ErrorResponse)
    )
)]
pub async fn start_duel(
    State(state): State<SharedState>,
    Json(req): Json<StartDuelRequest>,
) -> Result<Json<StartDuelResponse>, ApiError> {
    validate_url("profile 1", &req.url1)?;
    validate_url("profile 2", &req.url2)?;
    let (url1, url2) = (req.url1.trim().to_string(), req.url2.trim().to_string());

    tracing::info!("Starting duel: {} vs {}", url1, url2);
    let session = state.coordinator.create_session(&url1, &url2).await?;

    let id = session.id.clone();
    let coordinator = Arc::clone(&state.coordinator);
    let events = state.events.clone();
    tokio::spawn(async move {
        if let Err(e) = coordinator.run_duel(&url1, &url2, Some(&id)).await {
            tracing::error!(duel_id = %id, "Background duel failed: {}", e);
            events.publish(ProgressEvent::new(&id, DuelStatus::Error, e.to_string(), 0));
        }
    });

    Ok(Json(StartDuelResponse {
        id: session.id,
        status: DuelStatus::Pending.to_string(),
    }))
}

/// Health of the session store and every collaborator
#[utoipa::path(
    get,
    path = "/api/v1/duel/health",
    tag = "duel",
    responses(
        (status = 200, description = "All services healthy", body = ServiceHealth),
        (status = 503, description = "At least one service degraded", body = ServiceHealth)
    )
)]
pub async fn duel_health(State(state): State<SharedState>) -> (StatusCode, Json<ServiceHealth>) {
    let services = state.coordinator.health_check().await;
    let healthy = services.values().all(|ok| *ok);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ServiceHealth {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            services,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}

/// Full duel result
#[utoipa::path(
    get,
    path = "/api/v1/duel/{id}",
    tag = "duel",
    params(("id" = String, Path, description = "Duel session id")),
    responses(
        (status = 200, description = "Duel result"),
        (status = 404, description = "Unknown duel", body = super::ErrorResponse)
    )
)]
pub async fn get_duel(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DuelResult>, ApiError> {
    state
        .coordinator
        .get_result(&id)
        .await?
        .map(Json)
        .ok_or_else(|| devduel_core::error::DuelError::NotFound(id).into())
}

/// Stage, coarse progress and processing log
#[utoipa::path(
    get,
    path = "/api/v1/duel/{id}/status",
    tag = "duel",
    params(("id" = String, Path, description = "Duel session id")),
    responses(
        (status = 200, description = "Duel status"),
        (status = 404, description = "Unknown duel", body = super::ErrorResponse)
    )
)]
pub async fn get_duel_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DuelStatusReport>, ApiError> {
    Ok(Json(state.coordinator.get_status(&id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("p1", "https://github.com/octo").is_ok());
        assert!(validate_url("p1", " HTTP://example.com ").is_ok());
        assert!(validate_url("p1", "").is_err());
        assert!(validate_url("p1", "github.com/octo").is_err());
        assert!(validate_url("p1", "https://").is_err());
        assert!(validate_url("p1", "ftp://example.com").is_err());
    }
}
