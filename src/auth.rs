//! Authentication primitives: bcrypt password hashing and HS256 JWTs.
//!
//! Tokens carry the user id in `sub` plus the email, and expire after the
//! configured number of minutes (24 hours by default).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::types::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {e}")))
}

pub fn create_token(config: &AuthConfig, user_id: Uuid, email: &str) -> AppResult<String> {
    let expiry = Utc::now() + Duration::minutes(config.token_expire_minutes);
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: expiry.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token creation failed: {e}")))
}

/// Validate a token and return its claims. Expired or tampered tokens map to
/// a 401 rather than an internal error.
pub fn verify_token(config: &AuthConfig, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Auth("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            secret: "test-secret".to_string(),
            token_expire_minutes: 60,
        }
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let config = config();
        let user_id = Uuid::new_v4();
        let token = create_token(&config, user_id, "ada@example.com").unwrap();
        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let token = create_token(&config(), Uuid::new_v4(), "ada@example.com").unwrap();
        let other = AuthConfig {
            secret: "different".to_string(),
            token_expire_minutes: 60,
        };
        assert!(matches!(
            verify_token(&other, &token),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = AuthConfig {
            secret: "test-secret".to_string(),
            token_expire_minutes: -5,
        };
        let token = create_token(&config, Uuid::new_v4(), "ada@example.com").unwrap();
        assert!(matches!(
            verify_token(&config, &token),
            Err(AppError::Auth(_))
        ));
    }
}
