//! Molecule analysis endpoints: full aggregated analyses plus direct
//! passthroughs to the individual data agents.

use axum::{
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::agents::{AnalysisEnvelope, BatchEnvelope, MoleculeSource};
use crate::models::{AppState, BatchQuery, MoleculeQuery};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query_molecule", post(query_molecule))
        .route("/query_molecule/{name}", get(query_molecule_by_path))
        .route("/batch_analyze", post(batch_analyze))
        .route("/market_data/{name}", get(market_data))
        .route("/clinical_trials/{name}", get(clinical_trials))
        .route("/patent_data/{name}", get(patent_data))
        .route("/freedom_to_operate/{name}", get(freedom_to_operate))
        .route("/web_publications/{name}", get(web_publications))
        .with_state(state)
}

async fn run_analysis(state: &AppState, molecule_name: &str) -> AppResult<AnalysisEnvelope> {
    let envelope = state.master.analyze_molecule(molecule_name).await?;
    state
        .report_cache
        .write()
        .await
        .insert(envelope.molecule.to_lowercase(), envelope.clone());
    Ok(envelope)
}

async fn query_molecule(
    State(state): State<AppState>,
    Json(request): Json<MoleculeQuery>,
) -> AppResult<ResponseJson<AnalysisEnvelope>> {
    info!(molecule = %request.molecule_name, "analysis requested");
    Ok(Json(run_analysis(&state, &request.molecule_name).await?))
}

async fn query_molecule_by_path(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<ResponseJson<AnalysisEnvelope>> {
    Ok(Json(run_analysis(&state, &name).await?))
}

async fn batch_analyze(
    State(state): State<AppState>,
    Json(request): Json<BatchQuery>,
) -> AppResult<ResponseJson<BatchEnvelope>> {
    if request.molecule_names.is_empty() {
        return Err(AppError::InvalidRequest(
            "molecule_names cannot be empty".to_string(),
        ));
    }

    let batch = state.master.batch_analyze(&request.molecule_names).await;

    // Cache the successful slots for later report generation.
    let mut cache = state.report_cache.write().await;
    for outcome in batch.results.values() {
        if let crate::agents::BatchOutcome::Analysis(envelope) = outcome {
            cache.insert(envelope.molecule.to_lowercase(), (**envelope).clone());
        }
    }
    drop(cache);

    Ok(Json(batch))
}

async fn market_data(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ResponseJson<serde_json::Value> {
    Json(serde_json::json!(state.master.market.lookup(&name)))
}

async fn clinical_trials(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ResponseJson<serde_json::Value> {
    Json(serde_json::json!(state.master.clinical.lookup(&name)))
}

async fn patent_data(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ResponseJson<serde_json::Value> {
    Json(serde_json::json!(state.master.patents.lookup(&name)))
}

async fn freedom_to_operate(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ResponseJson<serde_json::Value> {
    Json(serde_json::json!(state.master.patents.get_freedom_to_operate(&name)))
}

#[derive(Debug, Deserialize)]
struct PublicationParams {
    limit: Option<usize>,
}

async fn web_publications(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<PublicationParams>,
) -> ResponseJson<serde_json::Value> {
    let limit = params.limit.unwrap_or(10);
    Json(serde_json::json!(
        state.master.webintel.search_publications(&name, limit)
    ))
}
