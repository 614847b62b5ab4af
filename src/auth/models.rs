use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ============================================================================
// User Models
// ============================================================================

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Request body for user registration
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupDto {
    /// User's email address
    #[serde(default)]
    #[validate(email(message = "A valid email address is required"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Password (min 6 chars)
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "hunter22")]
    pub password: String,
}

/// Request body for user login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginDto {
    /// User's email address
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "email and password are required"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User's password
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "email and password are required"))]
    #[schema(example = "hunter22")]
    pub password: String,
}

/// User information returned in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    pub id: Uuid,
    /// User's email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// Token Models
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,   // User ID
    pub iat: usize,  // Issued at
    pub exp: usize,  // Expiration
}

/// Response returned by signup and login
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 86400)]
    pub expires_in: u64,
    /// User information
    pub user: UserResponse,
}

impl AuthResponse {
    pub fn new(token: String, token_ttl_hours: i64, user: &User) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in: token_ttl_hours.max(0) as u64 * 60 * 60,
            user: UserResponse::from_user(user),
        }
    }
}
