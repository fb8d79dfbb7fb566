use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Report, User};
use crate::types::AppResult;

pub struct DatabaseOperations;

impl DatabaseOperations {
    // User operations

    pub async fn create_user(
        pool: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn get_user_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    // Saved-report operations

    pub async fn insert_report(
        pool: &PgPool,
        user_id: Option<Uuid>,
        molecule_name: &str,
        data: &serde_json::Value,
    ) -> AppResult<Report> {
        let now = Utc::now();
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (id, user_id, molecule_name, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(molecule_name)
        .bind(data)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(report)
    }

    /// Newest first.
    pub async fn reports_by_user(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(reports)
    }

    pub async fn get_report(pool: &PgPool, id: Uuid) -> AppResult<Option<Report>> {
        let report = sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(report)
    }

    pub async fn update_report(
        pool: &PgPool,
        id: Uuid,
        data: &serde_json::Value,
    ) -> AppResult<Report> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports
            SET data = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(report)
    }

    pub async fn delete_report(pool: &PgPool, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
