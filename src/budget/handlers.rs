use actix_web::{get, post, put, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;

use super::models::{BaseIncomeDto, BudgetMonthQuery, BudgetResponse};
use super::service::{current_year_month, BudgetService};

/// GET /budget/current - Budget for the current month
#[utoipa::path(
    get,
    path = "/budget/current",
    tag = "Budget",
    responses(
        (status = 200, description = "Current month's budget", body = BudgetResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/budget/current")]
pub async fn get_current_budget(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (year, month) = current_year_month();
    let response = BudgetService::month_view(pool.get_ref(), auth.user_id, year, month).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /budget?year=YYYY&month=MM - Budget for a specific month
#[utoipa::path(
    get,
    path = "/budget",
    tag = "Budget",
    params(BudgetMonthQuery),
    responses(
        (status = 200, description = "Budget for the requested month", body = BudgetResponse),
        (status = 400, description = "Missing or invalid year/month", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/budget")]
pub async fn get_budget_by_month(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    query: web::Query<BudgetMonthQuery>,
) -> Result<HttpResponse, AppError> {
    let (year, month) = query.parse()?;
    let response = BudgetService::month_view(pool.get_ref(), auth.user_id, year, month).await?;

    Ok(HttpResponse::Ok().json(response))
}

async fn apply_base_income(
    pool: &PgPool,
    auth: AuthenticatedUser,
    body: &BaseIncomeDto,
) -> Result<HttpResponse, AppError> {
    body.validate().map_err(AppError::from)?;

    let budget = BudgetService::set_base_income(pool, auth.user_id, body).await?;

    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    let response = BudgetService::view(&mut conn, &budget).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /budget/base-income - Set the base income of a month
#[utoipa::path(
    post,
    path = "/budget/base-income",
    tag = "Budget",
    request_body = BaseIncomeDto,
    responses(
        (status = 200, description = "Base income set", body = BudgetResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/budget/base-income")]
pub async fn set_base_income(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    body: web::Json<BaseIncomeDto>,
) -> Result<HttpResponse, AppError> {
    apply_base_income(pool.get_ref(), auth, &body).await
}

/// PUT /budget/base-income - Replace the base income of a month
#[utoipa::path(
    put,
    path = "/budget/base-income",
    tag = "Budget",
    request_body = BaseIncomeDto,
    responses(
        (status = 200, description = "Base income replaced", body = BudgetResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[put("/budget/base-income")]
pub async fn replace_base_income(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    body: web::Json<BaseIncomeDto>,
) -> Result<HttpResponse, AppError> {
    apply_base_income(pool.get_ref(), auth, &body).await
}
