//! Fundamental analysis routes.

use analysis_core::{AnalysisError, Report};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{ApiResponse, AppError, AppState};

pub const INVALID_SYMBOL: &str = "Missing or invalid stock symbol.";
pub const ANALYSIS_FAILED: &str = "Failed to analyze stock. Please check the symbol and try again.";

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub symbol: Option<String>,
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analyze", post(analyze_symbol))
        .route("/api/analyze/:symbol", get(analyze_symbol_path))
}

/// Map orchestrator errors to HTTP statuses.
fn analysis_err(e: AnalysisError) -> AppError {
    match e {
        AnalysisError::InvalidData(_) => {
            AppError::with_status(StatusCode::BAD_REQUEST, INVALID_SYMBOL).caused_by(e)
        }
        AnalysisError::ReportUnavailable(_) | AnalysisError::ApiError(_) => {
            AppError::with_status(StatusCode::BAD_GATEWAY, ANALYSIS_FAILED).caused_by(e)
        }
        other => AppError::from(other),
    }
}

async fn analyze_symbol(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Report>>, AppError> {
    let symbol = match payload {
        Ok(Json(request)) => request.symbol.unwrap_or_default(),
        Err(rejection) => {
            return Err(AppError::with_status(StatusCode::BAD_REQUEST, INVALID_SYMBOL)
                .caused_by(anyhow::anyhow!("{}", rejection.body_text())));
        }
    };
    run_analysis(&state, &symbol).await
}

async fn analyze_symbol_path(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<Report>>, AppError> {
    run_analysis(&state, &symbol).await
}

async fn run_analysis(state: &AppState, symbol: &str) -> Result<Json<ApiResponse<Report>>, AppError> {
    if symbol.trim().is_empty() {
        return Err(AppError::with_status(StatusCode::BAD_REQUEST, INVALID_SYMBOL));
    }

    let report = state.orchestrator.analyze(symbol).await.map_err(analysis_err)?;
    Ok(Json(ApiResponse::success(report)))
}
