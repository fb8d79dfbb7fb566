//! Report endpoints: on-demand JSON/PDF artifacts from the analysis cache,
//! plus persisted reports under `/api/reports`.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::agents::{AnalysisEnvelope, ReportFormat};
use crate::db::DatabaseOperations;
use crate::models::{AppState, Report, ReportCreate, ReportRequest, ReportUpdate, User};
use crate::routes::auth::current_user;
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate_report", post(generate_report))
        .route("/generate_report_pdf/{name}", get(generate_report_pdf))
        .route("/saved_reports", get(saved_reports))
        .route("/api/reports/save", post(save_report))
        .route("/api/reports/user-reports", get(user_reports))
        .route("/api/reports/{id}", get(get_saved_report))
        .route("/api/reports/{id}", put(update_saved_report))
        .route("/api/reports/{id}", delete(delete_saved_report))
        .with_state(state)
}

/// Reuse the cached envelope for a molecule, analyzing from scratch on a miss.
async fn envelope_for(state: &AppState, molecule_name: &str) -> AppResult<AnalysisEnvelope> {
    let key = molecule_name.trim().to_lowercase();
    if let Some(envelope) = state.report_cache.read().await.get(&key) {
        return Ok(envelope.clone());
    }

    let envelope = state.master.analyze_molecule(molecule_name).await?;
    state
        .report_cache
        .write()
        .await
        .insert(key, envelope.clone());
    Ok(envelope)
}

async fn generate_report(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> AppResult<Response> {
    let format: ReportFormat = request.format.parse()?;
    let envelope = envelope_for(&state, &request.molecule_name).await?;
    let bytes = state.master.generate_report(&envelope, format)?;

    info!(molecule = %envelope.molecule, format = %request.format, "report generated");

    match format {
        ReportFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(&bytes)
                .map_err(|e| AppError::Internal(format!("Report decoding failed: {e}")))?;
            Ok(Json(value).into_response())
        }
        ReportFormat::Pdf => Ok(pdf_attachment(&envelope.molecule, bytes)),
    }
}

async fn generate_report_pdf(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Response> {
    let envelope = envelope_for(&state, &name).await?;
    let bytes = state.master.generate_report(&envelope, ReportFormat::Pdf)?;
    Ok(pdf_attachment(&envelope.molecule, bytes))
}

fn pdf_attachment(molecule: &str, bytes: Vec<u8>) -> Response {
    let filename = format!("{}_report.pdf", molecule.replace([' ', '/'], "_"));
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Metadata for every analysis currently held in the in-memory cache.
async fn saved_reports(State(state): State<AppState>) -> ResponseJson<serde_json::Value> {
    let cache = state.report_cache.read().await;
    let mut entries: Vec<serde_json::Value> = cache
        .values()
        .map(|e| {
            serde_json::json!({
                "molecule": e.molecule,
                "timestamp": e.timestamp,
            })
        })
        .collect();
    entries.sort_by(|a, b| a["molecule"].as_str().cmp(&b["molecule"].as_str()));

    Json(serde_json::json!({
        "count": entries.len(),
        "reports": entries,
    }))
}

// Persisted reports

fn require_owner(report: &Report, user: &User) -> AppResult<()> {
    if report.user_id != Some(user.id) {
        return Err(AppError::Forbidden(
            "Report belongs to another user".to_string(),
        ));
    }
    Ok(())
}

async fn save_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ReportCreate>,
) -> AppResult<(StatusCode, ResponseJson<Report>)> {
    let pool = state.pool.as_ref().ok_or(AppError::DatabaseUnavailable)?;

    // Owner is optional: anonymous saves are allowed, but a supplied token
    // must be valid.
    let user_id = if headers.contains_key(axum::http::header::AUTHORIZATION) {
        Some(current_user(&state, &headers).await?.id)
    } else {
        None
    };

    let report =
        DatabaseOperations::insert_report(pool, user_id, &request.molecule_name, &request.data)
            .await?;

    info!(report_id = %report.id, "report saved");
    Ok((StatusCode::CREATED, Json(report)))
}

async fn user_reports(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<ResponseJson<Vec<Report>>> {
    let user = current_user(&state, &headers).await?;
    let pool = state.pool.as_ref().ok_or(AppError::DatabaseUnavailable)?;
    let reports = DatabaseOperations::reports_by_user(pool, user.id).await?;
    Ok(Json(reports))
}

async fn get_saved_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<ResponseJson<Report>> {
    let user = current_user(&state, &headers).await?;
    let pool = state.pool.as_ref().ok_or(AppError::DatabaseUnavailable)?;

    let report = DatabaseOperations::get_report(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {id}")))?;

    // Unowned reports stay readable; foreign-owned ones do not.
    if let Some(owner) = report.user_id {
        if owner != user.id {
            return Err(AppError::Forbidden(
                "Report belongs to another user".to_string(),
            ));
        }
    }
    Ok(Json(report))
}

async fn update_saved_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<ReportUpdate>,
) -> AppResult<ResponseJson<Report>> {
    let user = current_user(&state, &headers).await?;
    let pool = state.pool.as_ref().ok_or(AppError::DatabaseUnavailable)?;

    let report = DatabaseOperations::get_report(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {id}")))?;
    require_owner(&report, &user)?;

    let updated = DatabaseOperations::update_report(pool, id, &request.data).await?;
    Ok(Json(updated))
}

async fn delete_saved_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<ResponseJson<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    let pool = state.pool.as_ref().ok_or(AppError::DatabaseUnavailable)?;

    let report = DatabaseOperations::get_report(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {id}")))?;
    require_owner(&report, &user)?;

    DatabaseOperations::delete_report(pool, id).await?;
    info!(report_id = %id, "report deleted");
    Ok(Json(serde_json::json!({"message": "Report deleted"})))
}
