//! schedlag API server implementation
//!
//! HTTP server using Axum standing in for the upload UI: files are posted as
//! raw bytes, the weekly summary comes back as JSON and the report can be
//! downloaded afterwards.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::config::AnalysisConfig;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// API Server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Directory receiving generated reports
    pub output_dir: PathBuf,
    pub analysis: AnalysisConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            output_dir: std::env::temp_dir(),
            analysis: AnalysisConfig::default(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub output_dir: PathBuf,
    pub analysis: AnalysisConfig,
}

impl AppState {
    pub fn new(output_dir: PathBuf, analysis: AnalysisConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            output_dir,
            analysis,
        }
    }
}

/// Routes and middleware, without binding a socket
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Core API endpoints
        .route("/api/v1/analyze", post(handlers::analyze))
        .route(
            "/api/v1/reports/:run_id/:report_file",
            get(handlers::download_report),
        )
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schedlag=info,schedlag_server=info,tower_http=info".into()),
        )
        .init();

    std::fs::create_dir_all(&config.output_dir)?;
    let state = Arc::new(AppState::new(config.output_dir.clone(), config.analysis));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("📊 schedlag API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/analyze, /api/v1/reports/{{run_id}}/{{report_file}}");
    info!("   Reports: {}", config.output_dir.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("schedlag API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
