// Web server: Axum backend for the Plat Vlaams chat widget.
//
// POST /api/chat runs the moderation pipeline and, when allowed, the model.
// GET /health is a liveness check. When VLAAMSCODEX_WEB_ROOT points at the
// built website, every other path is served from it; otherwise unknown paths
// get a JSON 404.
//
// Errors always use the `{error:{code,message}}` shape and every JSON
// response is marked `Cache-Control: no-store`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::model::ChatModel;
use crate::moderation::rate_limit::ClientRateLimiter;

pub mod handlers;

/// How often idle rate-limit entries are swept.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub limiter: Arc<ClientRateLimiter>,
    pub model: Arc<dyn ChatModel>,
}

impl AppState {
    pub fn new(config: ServerConfig, model: Arc<dyn ChatModel>) -> Self {
        let limiter = Arc::new(ClientRateLimiter::new(config.rate_limit_per_minute));
        Self {
            config: Arc::new(config),
            limiter,
            model,
        }
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(config: ServerConfig, model: Arc<dyn ChatModel>) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, model);

    let limiter = state.limiter.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            ticker.tick().await;
            let evicted = limiter.evict_idle();
            if evicted > 0 {
                debug!(evicted, remaining = limiter.tracked_clients(), "Evicted idle clients");
            }
        }
    });

    let app = build_router(state);

    info!("VlaamsCodex chat listening on http://{addr}/api/chat");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let web_root = state.config.web_root.clone();

    let router = Router::new()
        .route(
            "/api/chat",
            post(handlers::chat::chat).fallback(method_not_allowed),
        )
        .route("/health", get(health));

    let router = match web_root {
        Some(root) => {
            info!(root = %root.display(), "Serving website files");
            router.fallback_service(ServeDir::new(root))
        }
        None => router.fallback(not_found),
    };

    router
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn method_not_allowed() -> Response {
    api_error(StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED", "Da mag ni.")
}

async fn not_found() -> Response {
    api_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Da bestaat hier ni.")
}

/// JSON body with `Cache-Control: no-store`.
pub fn json_response(status: StatusCode, body: serde_json::Value) -> Response {
    let mut response = (status, axum::Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, code: &str, message: &str) -> Response {
    json_response(
        status,
        serde_json::json!({ "error": { "code": code, "message": message } }),
    )
}
