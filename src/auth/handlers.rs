use actix_web::{get, post, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::config::AuthConfig;
use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;

use super::models::{AuthResponse, LoginDto, SignupDto, UserResponse};
use super::service::AuthService;

/// POST /auth/signup - Register a new user
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Auth",
    request_body = SignupDto,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
#[post("/auth/signup")]
pub async fn signup(
    pool: web::Data<PgPool>,
    auth: web::Data<AuthConfig>,
    body: web::Json<SignupDto>,
) -> Result<HttpResponse, AppError> {
    body.validate().map_err(AppError::from)?;

    let response = AuthService::signup(pool.get_ref(), auth.get_ref(), &body).await?;

    Ok(HttpResponse::Created().json(response))
}

/// POST /auth/login - Authenticate and get a token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    )
)]
#[post("/auth/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    auth: web::Data<AuthConfig>,
    body: web::Json<LoginDto>,
) -> Result<HttpResponse, AppError> {
    body.validate().map_err(AppError::from)?;

    let response = AuthService::login(pool.get_ref(), auth.get_ref(), &body).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /auth/me - Get current user info
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/auth/me")]
pub async fn me(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = AuthService::get_user_by_id(pool.get_ref(), user.user_id).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from_user(&user)))
}
