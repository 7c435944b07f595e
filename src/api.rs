use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::AppResult;
use crate::flow::report::truncate;
use crate::services::pipeline::FlowPipeline;

pub struct AppState {
    pub pipeline: Arc<FlowPipeline>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/report", get(get_report))
        .route("/analyze", post(run_analysis))
        .route("/clusters", get(get_clusters))
        .with_state(state)
}

pub async fn run_server(state: Arc<AppState>, bind_addr: &str) -> AppResult<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("🌐 [API] Server listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Deserialize)]
struct DateParams {
    date: Option<String>,
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate, String> {
    match raw {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date `{}`: {}", s, e)),
        None => Ok(Local::now().date_naive()),
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn get_report(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let max_chars = state.pipeline.config().api.max_response_chars;
    match state.pipeline.latest_report_text() {
        Ok(Some(text)) => (StatusCode::OK, truncate(&text, max_chars)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "No report found yet. Run an analysis first.").into_response(),
        Err(e) => {
            error!("❌ [API] Failed to read report: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn run_analysis(State(state): State<Arc<AppState>>, Query(params): Query<DateParams>) -> impl IntoResponse {
    let date = match parse_date(params.date.as_deref()) {
        Ok(d) => d,
        Err(msg) => return (StatusCode::BAD_REQUEST, msg).into_response(),
    };

    match state.pipeline.analyze_day(date, true).await {
        Ok(run) => {
            let max_chars = state.pipeline.config().api.max_response_chars;
            let warnings: Vec<String> = run.warnings.iter().map(|w| w.to_string()).collect();
            Json(json!({
                "status": "success",
                "date": date,
                "tickers": run.report.clusters.len(),
                "total_signals": run.report.total_signals,
                "total_premium": run.report.total_premium,
                "skipped_lines": run.skipped_lines,
                "saved_to": run.saved_to.display().to_string(),
                "warnings": warnings,
                "report": truncate(&run.report.text, max_chars),
            }))
            .into_response()
        }
        Err(e) => {
            error!("❌ [API] Analysis failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": e.to_string()})),
            )
                .into_response()
        }
    }
}

async fn get_clusters(State(state): State<Arc<AppState>>, Query(params): Query<DateParams>) -> impl IntoResponse {
    let date = match parse_date(params.date.as_deref()) {
        Ok(d) => d,
        Err(msg) => return (StatusCode::BAD_REQUEST, msg).into_response(),
    };

    match state.pipeline.clusters_for(date) {
        Ok(clusters) => Json(json!({"date": date, "clusters": clusters})).into_response(),
        Err(e) => {
            error!("❌ [API] Failed to build clusters: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
