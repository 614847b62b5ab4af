use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::errors::AppError;

use super::jwt::create_access_token;
use super::models::{AuthResponse, LoginDto, SignupDto, User};
use super::password::{burn_verification, hash_password, verify_password};

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";

/// Authentication service handling user registration and login logic
pub struct AuthService;

impl AuthService {
    /// Register a new user and return an access token
    pub async fn signup(
        pool: &PgPool,
        auth: &AuthConfig,
        dto: &SignupDto,
    ) -> Result<AuthResponse, AppError> {
        let email = dto.email.trim();

        let existing_user =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;

        if existing_user > 0 {
            return Err(AppError::Conflict(
                "user with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&dto.password)?;

        // The unique index still catches a concurrent signup with the same email
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(&password_hash)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::Conflict("user with this email already exists".to_string()))?;

        info!(user_id = %user.id, "user signed up");

        let token = create_access_token(user.id, auth)?;
        Ok(AuthResponse::new(token, auth.token_ttl_hours, &user))
    }

    /// Authenticate a user by email and password
    pub async fn login(
        pool: &PgPool,
        auth: &AuthConfig,
        dto: &LoginDto,
    ) -> Result<AuthResponse, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(dto.email.trim())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let Some(user) = user else {
            burn_verification(&dto.password);
            return Err(AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        };

        if !verify_password(&dto.password, &user.password_hash)? {
            return Err(AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        let token = create_access_token(user.id, auth)?;
        Ok(AuthResponse::new(token, auth.token_ttl_hours, &user))
    }

    pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
    }
}
