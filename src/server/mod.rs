//! HTTP server for the PriceLens API and web UI
//!
//! Exposes the health, JSON-analysis and file-analysis endpoints and serves
//! the embedded single-page UI for every other GET path.

pub mod error;
pub mod routes;
pub mod state;
mod static_files;

pub use error::{ApiError, ErrorBody};
pub use state::ServerAppState;

use crate::config::CorsOrigins;
use crate::models::HealthStatus;
use crate::shutdown::ShutdownState;
use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method, StatusCode, Uri,
    },
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer from the configured origins.
///
/// Browsers enforce the result: origins outside the list get no
/// `Access-Control-Allow-Origin` header and their requests are blocked.
pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    match origins {
        CorsOrigins::Any => layer.allow_origin(Any),
        CorsOrigins::List(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match o.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        log::warn!("Ignoring unparseable CORS origin: {}", o);
                        None
                    }
                })
                .collect();
            layer.allow_origin(allowed)
        }
    }
}

/// Build the application router
pub fn build_router(state: ServerAppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let body_limit = DefaultBodyLimit::max(state.config.server.max_upload_bytes);

    Router::new()
        .route("/health", get(health_handler))
        .route("/analyze", post(routes::analyze_handler))
        .route("/analyze-file", post(routes::analyze_file_handler))
        .method_not_allowed_fallback(method_not_allowed_handler)
        .fallback(static_files::serve_static)
        .layer(body_limit)
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until a shutdown is requested
pub async fn run_server(state: ServerAppState, shutdown_state: ShutdownState) -> anyhow::Result<()> {
    let settings = state.config.server.clone();
    let listener = TcpListener::bind((settings.host.as_str(), settings.port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", settings.host, settings.port))?;
    let addr = listener
        .local_addr()
        .context("Failed to read the bound address")?;

    let frontend_status = if static_files::has_embedded_frontend() {
        "Embedded"
    } else {
        "Missing (dist/ was empty at build time)"
    };
    let credential_status = match &state.config.api_key {
        Some(key) => format!("configured ({})", key.masked()),
        None => "NOT configured".to_string(),
    };

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      PriceLens Server                        ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║                                                              ║");
    println!("║  Server URL: http://{:<41}║", addr.to_string());
    println!("║  Model: {:<53}║", state.config.llm.model);
    println!("║  OpenAI key: {:<48}║", credential_status);
    println!("║  CORS Origins: {:<46}║", settings.cors_origins.display());
    println!("║  Frontend: {:<50}║", frontend_status);
    println!("║                                                              ║");
    println!("║  Endpoints:                                                  ║");
    println!("║    GET  /health          - Health check                      ║");
    println!("║    POST /analyze         - Analyze a JSON transcript         ║");
    println!("║    POST /analyze-file    - Analyze an uploaded .txt/.md      ║");
    println!("║                                                              ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    log::info!("Server listening on http://{}", addr);

    let shutdown_signal = async move {
        shutdown_state.wait().await;
        log::info!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")
}

/// Known path, wrong method
async fn method_not_allowed_handler(method: Method, uri: Uri) -> ApiError {
    log::warn!("Rejected {} {}: method not allowed", method, uri.path());
    ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {} is not allowed for {}", method, uri.path()),
    )
}

/// Health check endpoint; never touches the pipeline
async fn health_handler(State(state): State<ServerAppState>) -> Json<HealthStatus> {
    Json(HealthStatus::current(state.openai_configured()))
}
