//! Skirmish Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish_engine::api::{self, websocket::WsState, ConnectionManager};
use skirmish_engine::infrastructure::{
    clock::{SystemClock, SystemRandom},
    config::EngineConfig,
    memory::{InMemoryCatalog, InMemoryCombatSessionRepo, InMemoryDiceRollRepo},
};
use skirmish_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be started from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skirmish_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Skirmish Engine");

    let config = EngineConfig::from_env();

    let catalog = match &config.seed_path {
        Some(path) => Arc::new(InMemoryCatalog::load(path).await?),
        None => {
            tracing::warn!("SKIRMISH_SEED_PATH not set, campaign and character catalogs are empty");
            Arc::new(InMemoryCatalog::new())
        }
    };

    let connections = Arc::new(ConnectionManager::new());

    let app = Arc::new(App::new(
        Arc::new(InMemoryCombatSessionRepo::new()),
        catalog.clone(),
        catalog,
        Arc::new(InMemoryDiceRollRepo::new()),
        connections.clone(),
        Arc::new(SystemClock::new()),
        Arc::new(SystemRandom::new()),
    ));

    let ws_state = Arc::new(WsState {
        app: app.clone(),
        connections,
        channel_buffer: config.ws_channel_buffer,
    });

    // Build router with separate states for HTTP and WebSocket
    let mut router = api::http::routes()
        .with_state(app)
        .route("/ws", get(api::websocket::ws_handler).with_state(ws_state))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(&config.cors_allowed_origins) {
        router = router.layer(cors);
    }

    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    if allowed_origins.is_empty() {
        return None;
    }

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        // Clients send identity headers and JSON bodies, which trigger preflights.
        .allow_headers([
            HeaderName::from_static("x-user-id"),
            HeaderName::from_static("x-user-role"),
            axum::http::header::CONTENT_TYPE,
        ]);

    if allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
