use actix_web::{delete, get, post, put, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;

use super::models::{
    FundDto, FundIdPath, FundResponse, FundTransactionPath, MessageResponse, TransactionDto,
};
use super::service::FundService;

/// GET /funds - List all funds of the current user
#[utoipa::path(
    get,
    path = "/funds",
    tag = "Funds",
    responses(
        (status = 200, description = "Funds, newest first", body = Vec<FundResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/funds")]
pub async fn list_funds(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let funds = FundService::list_funds(pool.get_ref(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(funds))
}

/// GET /funds/{fundId} - Get a fund with its transactions
#[utoipa::path(
    get,
    path = "/funds/{fundId}",
    tag = "Funds",
    params(FundIdPath),
    responses(
        (status = 200, description = "Fund found", body = FundResponse),
        (status = 404, description = "Fund not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/funds/{fundId}")]
pub async fn get_fund(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<FundIdPath>,
) -> Result<HttpResponse, AppError> {
    let fund = FundService::get_fund(pool.get_ref(), auth.user_id, path.fund_id).await?;
    Ok(HttpResponse::Ok().json(fund))
}

/// POST /funds - Create a fund
#[utoipa::path(
    post,
    path = "/funds",
    tag = "Funds",
    request_body = FundDto,
    responses(
        (status = 201, description = "Fund created", body = FundResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/funds")]
pub async fn create_fund(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    body: web::Json<FundDto>,
) -> Result<HttpResponse, AppError> {
    body.validate().map_err(AppError::from)?;

    let fund = FundService::create_fund(pool.get_ref(), auth.user_id, &body).await?;
    Ok(HttpResponse::Created().json(fund))
}

/// PUT /funds/{fundId} - Replace a fund's details
#[utoipa::path(
    put,
    path = "/funds/{fundId}",
    tag = "Funds",
    params(FundIdPath),
    request_body = FundDto,
    responses(
        (status = 200, description = "Fund updated", body = FundResponse),
        (status = 400, description = "Validation error or principal below total paid", body = ErrorResponse),
        (status = 404, description = "Fund not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[put("/funds/{fundId}")]
pub async fn update_fund(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<FundIdPath>,
    body: web::Json<FundDto>,
) -> Result<HttpResponse, AppError> {
    body.validate().map_err(AppError::from)?;

    let fund = FundService::update_fund(pool.get_ref(), auth.user_id, path.fund_id, &body).await?;
    Ok(HttpResponse::Ok().json(fund))
}

/// DELETE /funds/{fundId} - Delete a fund and its transactions
#[utoipa::path(
    delete,
    path = "/funds/{fundId}",
    tag = "Funds",
    params(FundIdPath),
    responses(
        (status = 200, description = "Fund deleted", body = MessageResponse),
        (status = 404, description = "Fund not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[delete("/funds/{fundId}")]
pub async fn delete_fund(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<FundIdPath>,
) -> Result<HttpResponse, AppError> {
    FundService::delete_fund(pool.get_ref(), auth.user_id, path.fund_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "fund deleted successfully".to_string(),
    }))
}

/// POST /funds/{fundId}/transactions - Record a repayment
#[utoipa::path(
    post,
    path = "/funds/{fundId}/transactions",
    tag = "Funds",
    params(FundIdPath),
    request_body = TransactionDto,
    responses(
        (status = 201, description = "Repayment recorded, fund returned", body = FundResponse),
        (status = 400, description = "Validation error or amount exceeds outstanding", body = ErrorResponse),
        (status = 404, description = "Fund not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/funds/{fundId}/transactions")]
pub async fn add_transaction(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<FundIdPath>,
    body: web::Json<TransactionDto>,
) -> Result<HttpResponse, AppError> {
    body.validate().map_err(AppError::from)?;

    let fund =
        FundService::add_transaction(pool.get_ref(), auth.user_id, path.fund_id, &body).await?;
    Ok(HttpResponse::Created().json(fund))
}

/// PUT /funds/{fundId}/transactions/{transactionId} - Edit a repayment
#[utoipa::path(
    put,
    path = "/funds/{fundId}/transactions/{transactionId}",
    tag = "Funds",
    params(FundTransactionPath),
    request_body = TransactionDto,
    responses(
        (status = 200, description = "Repayment updated, fund returned", body = FundResponse),
        (status = 400, description = "Validation error or amount exceeds outstanding", body = ErrorResponse),
        (status = 404, description = "Fund or transaction not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[put("/funds/{fundId}/transactions/{transactionId}")]
pub async fn update_transaction(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<FundTransactionPath>,
    body: web::Json<TransactionDto>,
) -> Result<HttpResponse, AppError> {
    body.validate().map_err(AppError::from)?;

    let fund = FundService::update_transaction(
        pool.get_ref(),
        auth.user_id,
        path.fund_id,
        path.transaction_id,
        &body,
    )
    .await?;
    Ok(HttpResponse::Ok().json(fund))
}

/// DELETE /funds/{fundId}/transactions/{transactionId} - Remove a repayment
#[utoipa::path(
    delete,
    path = "/funds/{fundId}/transactions/{transactionId}",
    tag = "Funds",
    params(FundTransactionPath),
    responses(
        (status = 200, description = "Repayment removed, fund returned", body = FundResponse),
        (status = 404, description = "Fund or transaction not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[delete("/funds/{fundId}/transactions/{transactionId}")]
pub async fn delete_transaction(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<FundTransactionPath>,
) -> Result<HttpResponse, AppError> {
    let fund = FundService::delete_transaction(
        pool.get_ref(),
        auth.user_id,
        path.fund_id,
        path.transaction_id,
    )
    .await?;
    Ok(HttpResponse::Ok().json(fund))
}
