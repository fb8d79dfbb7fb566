use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::RwLock;
use validator::Validate;

use crate::agents::{AnalysisEnvelope, MasterAgent};
use crate::config::Config;

/// In-memory cache of the most recent analysis per molecule, used by the
/// report endpoints so a PDF can be generated without re-running the agents.
pub type ReportCache = Arc<RwLock<HashMap<String, AnalysisEnvelope>>>;

#[derive(Clone)]
pub struct AppState {
    /// Absent when DATABASE_URL is not configured; persistence endpoints
    /// then answer 503 while the analysis endpoints keep working.
    pub pool: Option<PgPool>,
    pub config: Config,
    pub master: Arc<MasterAgent>,
    pub report_cache: ReportCache,
}

impl AppState {
    pub fn new(pool: Option<PgPool>, config: Config, master: Arc<MasterAgent>) -> Self {
        Self {
            pool,
            config,
            master,
            report_cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

// Note: FromRow is needed for runtime query_as (without DATABASE_URL at compile time)

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Report {
    pub id: uuid::Uuid,
    pub user_id: Option<uuid::Uuid>,
    pub molecule_name: String,
    pub data: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// Request / response payloads

#[derive(Debug, Clone, Deserialize)]
pub struct MoleculeQuery {
    pub molecule_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchQuery {
    pub molecule_names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub molecule_name: String,
    /// "json" or "pdf"; defaults to json.
    #[serde(default = "default_report_format")]
    pub format: String,
}

fn default_report_format() -> String {
    "json".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportCreate {
    pub molecule_name: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportUpdate {
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub groq_configured: bool,
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_drops_password_hash() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn user_serialization_skips_password_hash() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn register_request_validates_email_and_password() {
        let ok = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "longenough".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..ok.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..ok
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn report_request_defaults_to_json() {
        let req: ReportRequest =
            serde_json::from_str(r#"{"molecule_name": "aspirin"}"#).unwrap();
        assert_eq!(req.format, "json");
    }
}
