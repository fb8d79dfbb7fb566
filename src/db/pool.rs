use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Connect to Postgres when a URL is configured. Returns None (and keeps the
/// service up) when the database is absent or unreachable; only the
/// persistence endpoints depend on it.
pub async fn create_pool(config: &DatabaseConfig) -> Option<PgPool> {
    let url = match &config.url {
        Some(url) => url,
        None => {
            warn!("DATABASE_URL not set, saved-report endpoints disabled");
            return None;
        }
    };

    match PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
    {
        Ok(pool) => {
            info!("connected to database");
            Some(pool)
        }
        Err(e) => {
            warn!(error = %e, "database connection failed, saved-report endpoints disabled");
            None
        }
    }
}

pub async fn health_check(pool: &PgPool) -> anyhow::Result<bool> {
    let _result = sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(true)
}
