use axum::{extract::State, response::Json as ResponseJson, routing::get, Json, Router};

use crate::db;
use crate::models::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn service_info() -> ResponseJson<serde_json::Value> {
    Json(serde_json::json!({
        "service": "Pharma Intelligence API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/api/health",
    }))
}

async fn health_check(State(state): State<AppState>) -> ResponseJson<HealthResponse> {
    let database = match &state.pool {
        Some(pool) => match db::health_check(pool).await {
            Ok(_) => "connected".to_string(),
            Err(_) => "unreachable".to_string(),
        },
        None => "not configured".to_string(),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        service: "pharma-intel".to_string(),
        groq_configured: state.config.llm.groq_api_key.is_some(),
        database,
    })
}
