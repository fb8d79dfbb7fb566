//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/` and `/api/health` - Service info and health checks
//! - `/query_molecule`, `/batch_analyze` - Molecule analysis
//! - `/get_trends` and friends - Cross-provider trend views
//! - `/market_data/{name}` etc. - Direct access to individual agents
//! - `/generate_report`, `/generate_report_pdf/{name}` - Report artifacts
//! - `/api/auth` - Registration, login, token verification
//! - `/api/reports` - Persisted reports (requires a database)

pub mod analysis;
pub mod auth;
pub mod health;
pub mod reports;
pub mod trends;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let router = Router::new()
        .merge(health::router(state.clone()))
        .merge(analysis::router(state.clone()))
        .merge(trends::router(state.clone()))
        .merge(reports::router(state.clone()))
        .merge(auth::router(state));

    apply_cors(router.layer(TraceLayer::new_for_http()))
}
