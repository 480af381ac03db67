//! DevDuel Server
//!
//! Axum transport for the duel pipeline: REST endpoints, per-session SSE,
//! a subscription WebSocket and a one-shot CLI runner.

mod api;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    http::header,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use clap::{Parser, Subcommand};
use devduel_core::config::DuelConfig;
use devduel_core::duel::DuelCoordinator;
use devduel_core::events::BroadcastEventBus;
use devduel_core::scoring::FighterSlot;
use serde::Serialize;
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::{OpenApi, ToSchema};

/// Application state
pub struct AppState {
    coordinator: Arc<DuelCoordinator>,
    events: BroadcastEventBus,
}

type SharedState = Arc<AppState>;

impl AppState {
    fn from_config(config: &DuelConfig) -> anyhow::Result<Self> {
        let events = BroadcastEventBus::default();
        let coordinator = DuelCoordinator::from_config(config, Arc::new(events.clone()))?;
        Ok(Self {
            coordinator: Arc::new(coordinator),
            events,
        })
    }
}

// === CLI ===

#[derive(Parser)]
#[command(name = "devduel", about = "Pit two public profiles against each other")]
struct Args {
    /// JSON config file, optional
    #[arg(short, long, global = true, default_value = "devduel.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Start the HTTP server
    Serve {
        #[arg(short, long, default_value_t = 3001)]
        port: u16,
    },
    /// Run one duel in-process and print the outcome
    Run { url1: String, url2: String },
}

// === OpenAPI Definition ===

#[derive(Serialize, ToSchema)]
struct RootHealth {
    status: String,
    timestamp: String,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DevDuel API",
        version = "1.0.0",
        description = "Profile roast battles with live progress"
    ),
    paths(
        api::duel::start_duel,
        api::duel::duel_health,
        api::duel::get_duel,
        api::duel::get_duel_status,
        api::live::duel_events,
        health
    ),
    components(
        schemas(
            api::duel::StartDuelRequest,
            api::duel::StartDuelResponse,
            api::duel::ServiceHealth,
            api::ErrorResponse,
            RootHealth
        )
    ),
    tags(
        (name = "duel", description = "Duel lifecycle"),
        (name = "system", description = "Liveness and API description")
    )
)]
struct ApiDoc;

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Server is up", body = RootHealth))
)]
async fn health() -> Json<RootHealth> {
    Json(RootHealth {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn serve_openapi() -> impl IntoResponse {
    let spec = ApiDoc::openapi().to_json().unwrap_or_default();
    ([(header::CONTENT_TYPE, "application/json")], spec)
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .nest("/api/v1/duel", api::duel::duel_routes())
        .route("/api/v1/openapi.json", get(serve_openapi))
        .route("/health", get(health))
        .route("/ws", get(api::live::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn run_server(config: DuelConfig, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("⚔️  DevDuel Server running at http://{}", addr);
    println!("   Duel:      /api/v1/duel/start, /:id, /:id/status, /:id/events");
    println!("   Health:    /health, /api/v1/duel/health");
    println!("   Live:      /ws (WebSocket)");
    println!("   OpenAPI:   /api/v1/openapi.json");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Await a helper task, logging a panic or cancellation instead of propagating it
async fn join_logged(name: &str, handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("{} task failed: {}", name, e);
            false
        }
    }
}

async fn run_once(config: DuelConfig, url1: &str, url2: &str) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let mut rx = state.events.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            println!("[{:>3}%] {:<22} {}", event.progress, event.stage, event.message);
        }
    });

    println!("🥊 {} vs {}", url1, url2);
    let result = state.coordinator.run_duel(url1, url2, None).await;
    drop(state);
    join_logged("event printer", printer).await;
    let result = result?;

    let name = |slot: FighterSlot| {
        let fighter = match slot {
            FighterSlot::First => &result.fighter1,
            FighterSlot::Second => &result.fighter2,
        };
        fighter
            .as_ref()
            .map(|f| f.profile.name.clone())
            .unwrap_or_else(|| format!("Fighter {}", slot.number()))
    };

    if let Some(commentary) = &result.commentary {
        println!("\n{}\n", commentary.introduction);
        for round in &commentary.rounds {
            println!(
                "Round {} | {} ({} dmg)\n  {}\n  > {}",
                round.round_number,
                name(round.attacker),
                round.damage,
                round.roast,
                round.reaction
            );
        }
        println!("\n{}", commentary.verdict);
    }
    println!(
        "\n🏆 Winner: {}",
        result.winner_name.as_deref().unwrap_or("unknown")
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════╗");
    println!("║           DEVDUEL SERVER             ║");
    println!("╚══════════════════════════════════════╝");

    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,devduel_core=debug")),
        )
        .init();

    let args = Args::parse();
    let mut config = DuelConfig::load(&args.config)?;
    config.apply_env(|key| std::env::var(key).ok());

    match args.command {
        Some(CliCommand::Run { url1, url2 }) => run_once(config, &url1, &url2).await,
        Some(CliCommand::Serve { port }) => run_server(config, port).await,
        None => run_server(config, 3001).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    /// Config whose collaborators all point at a closed local port
    fn offline_config() -> DuelConfig {
        let mut config = DuelConfig::default();
        config.github.api_url = "http://127.0.0.1:9".into();
        config.wikipedia.rest_url = "http://127.0.0.1:9".into();
        config.wikipedia.action_url = "http://127.0.0.1:9".into();
        config.bright_data.base_url = "http://127.0.0.1:9".into();
        config.bright_data.api_key = None;
        config
    }

    fn app() -> Router {
        let state = AppState::from_config(&offline_config()).unwrap();
        build_router(Arc::new(state))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_start(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/duel/start")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_join_logged_survives_task_panic() {
        assert!(join_logged("ok", tokio::spawn(async {})).await);
        let crashed = tokio::spawn(async { panic!("printer crashed") });
        assert!(!join_logged("crashed", crashed).await);
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_urls() {
        let response = app()
            .oneshot(post_start(serde_json::json!({
                "url1": "not a url",
                "url2": "https://github.com/octocat"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("profile 1"));

        let response = app()
            .oneshot(post_start(serde_json::json!({ "url1": "", "url2": "" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_start_returns_pending_session() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post_start(serde_json::json!({
                "url1": "https://example.invalid/a",
                "url2": "https://example.invalid/b"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "pending");
        let id = body["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::get(format!("/api/v1/duel/{}/status", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], id);
    }

    #[tokio::test]
    async fn test_unknown_duel_is_404() {
        let app = app();
        for uri in ["/api/v1/duel/missing", "/api/v1/duel/missing/status"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
            let body = json_body(response).await;
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_duel_health_degraded_without_keys() {
        let response = app()
            .oneshot(Request::get("/api/v1/duel/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["services"]["web_capture"], false);
        assert_eq!(body["services"]["session_store"], true);
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let response = app()
            .oneshot(
                Request::get("/api/v1/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["paths"]["/api/v1/duel/start"].is_object());
        assert!(body["paths"]["/api/v1/duel/{id}/events"].is_object());
    }
}
