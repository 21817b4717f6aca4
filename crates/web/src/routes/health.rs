use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use researchdesk_agent::HealthReport;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct LiveResponse {
    status: &'static str,
    initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    #[serde(flatten)]
    report: HealthReport,
}

pub fn health_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(live))
        .route("/health/ready", get(ready))
}

async fn live(State(state): State<AppState>) -> Json<LiveResponse> {
    let facade = state.facade();
    Json(LiveResponse {
        status: "ok",
        initialized: facade.is_ready(),
        error: facade.init_error().map(|e| e.to_string()),
    })
}

/// Runs a full research query; slow, and spends provider quota
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let report = state.facade().health_check().await;

    if report.healthy {
        (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "healthy",
                report,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "unhealthy",
                report,
            }),
        )
    }
}
