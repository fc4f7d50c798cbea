pub mod analyze_routes;
pub mod config;

use std::sync::Arc;
use std::time::Duration;

use analysis_orchestrator::AnalysisOrchestrator;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use fundamental_analysis::{FundamentalAnalysisEngine, ScoringConfig};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use yahoo_client::YahooFinanceClient;

pub use analyze_routes::analyze_routes;
pub use config::ServerConfig;

const INTERNAL_ERROR: &str = "Internal server error.";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

/// Envelope for every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error: an HTTP status, the message shown to the client, and the
/// underlying cause for the logs.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    source: Option<anyhow::Error>,
}

impl AppError {
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
        }
    }

    pub fn caused_by(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).caused_by(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let cause = self
            .source
            .as_ref()
            .map(|e| format!("{:#}", e))
            .unwrap_or_default();
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, cause = %cause, "{}", self.message);
        } else {
            tracing::warn!(status = %self.status, cause = %cause, "{}", self.message);
        }

        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(analyze_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Panic hook: log panic info before crashing
    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received, draining connections");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    let scoring = match &config.scoring_config_path {
        Some(path) => {
            tracing::info!("Loading scoring config from {}", path.display());
            ScoringConfig::from_file(path)?
        }
        None => ScoringConfig::standard(),
    };

    let provider = Arc::new(YahooFinanceClient::new(config.yahoo.clone()));
    let orchestrator = Arc::new(
        AnalysisOrchestrator::new(provider, FundamentalAnalysisEngine::with_config(scoring))
            .with_cache_ttl(config.cache_ttl_secs),
    );

    // Periodically drop stale fetched bundles
    if config.cache_ttl_secs > 0 {
        let orchestrator = orchestrator.clone();
        let period = Duration::from_secs(config.cache_ttl_secs as u64);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                orchestrator.evict_expired();
            }
        });
    }

    let app = build_router(AppState { orchestrator });

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        "Fundamental analysis API listening on {} (Yahoo at {}, default suffix {:?})",
        addr,
        config.yahoo.base_url,
        config.yahoo.default_suffix
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
