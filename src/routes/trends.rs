//! Cross-provider trend endpoints.

use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use crate::agents::TrendsEnvelope;
use crate::models::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/get_trends", get(get_trends))
        .route("/therapeutic_areas", get(therapeutic_areas))
        .route("/trending_conditions", get(trending_conditions))
        .route("/market_trends", get(market_trends))
        .route("/web_trends/{keyword}", get(web_trends))
        .with_state(state)
}

async fn get_trends(State(state): State<AppState>) -> ResponseJson<TrendsEnvelope> {
    Json(state.master.get_trends().await)
}

async fn therapeutic_areas(State(state): State<AppState>) -> ResponseJson<serde_json::Value> {
    Json(serde_json::json!({
        "therapeutic_areas": state.master.market.get_therapeutic_area_trends(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn trending_conditions(State(state): State<AppState>) -> ResponseJson<serde_json::Value> {
    Json(serde_json::json!({
        "trending_conditions": state.master.clinical.get_trending_conditions(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn market_trends(State(state): State<AppState>) -> ResponseJson<serde_json::Value> {
    Json(serde_json::json!({
        "web_trends": state.master.webintel.get_trending_therapeutic_areas(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn web_trends(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> ResponseJson<serde_json::Value> {
    Json(serde_json::json!(state.master.webintel.search_trends(&keyword)))
}
