// ============================================================
// Layer 1 — Web Presentation Layer
// ============================================================
// Serves the single-page UI and the JSON API behind it:
//
//   GET  /              the page (assets/index.html)
//   GET  /api/health    model status
//   GET  /api/examples  demo reviews for the quick-example buttons
//   POST /api/classify  full analysis as JSON
//   POST /api/report    the report as sentiment_report.json
//
// A model that fails to load does not stop the server: the page
// still renders and shows the load error where results would go.

mod error;
mod handlers;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::application::analyze_use_case::AnalyzeUseCase;
use crate::ml::backend::ComputeBackend;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host:         IpAddr,
    pub port:         u16,
    pub artifact_dir: String,
    pub word_index:   Option<String>,
    pub backend:      ComputeBackend,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Clone)]
pub struct AppState {
    analyzer:   Option<Arc<AnalyzeUseCase>>,
    load_error: Option<String>,
}

impl AppState {
    pub fn ready(analyzer: Arc<AnalyzeUseCase>) -> Self {
        Self { analyzer: Some(analyzer), load_error: None }
    }

    pub fn unavailable(error: impl Into<String>) -> Self {
        Self { analyzer: None, load_error: Some(error.into()) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        .route("/api/examples", get(handlers::examples))
        .route("/api/classify", post(handlers::classify))
        .route("/api/report", post(handlers::report))
        .with_state(state)
}

pub async fn serve(args: impl Into<ServerConfig>) -> Result<()> {
    let config = args.into();

    let load_cfg = config.clone();
    let loaded = tokio::task::spawn_blocking(move || {
        AnalyzeUseCase::from_artifacts(
            &load_cfg.artifact_dir,
            load_cfg.word_index.as_deref(),
            load_cfg.backend,
        )
    })
    .await?;

    let state = match loaded {
        Ok(analyzer) => AppState::ready(Arc::new(analyzer)),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "model not loaded, serving without it");
            AppState::unavailable(format!("Error loading model: {e:#}"))
        }
    };

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind {addr}"))?;
    tracing::info!(%addr, "web UI listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => { sigterm.recv().await; }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
