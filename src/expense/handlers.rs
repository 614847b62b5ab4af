use actix_web::{delete, post, put, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::budget::models::BudgetResponse;
use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;

use super::models::{CreateExpenseDto, ExpenseIdPath, UpdateExpenseDto};
use super::service::ExpenseService;

/// POST /expenses - Add an expense to a month
#[utoipa::path(
    post,
    path = "/expenses",
    tag = "Expenses",
    request_body = CreateExpenseDto,
    responses(
        (status = 201, description = "Expense added, month's budget returned", body = BudgetResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/expenses")]
pub async fn add_expense(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    body: web::Json<CreateExpenseDto>,
) -> Result<HttpResponse, AppError> {
    body.validate().map_err(AppError::from)?;

    let response = ExpenseService::add_expense(pool.get_ref(), auth.user_id, &body).await?;

    Ok(HttpResponse::Created().json(response))
}

/// PUT /expenses/{expenseId} - Edit an expense
#[utoipa::path(
    put,
    path = "/expenses/{expenseId}",
    tag = "Expenses",
    params(ExpenseIdPath),
    request_body = UpdateExpenseDto,
    responses(
        (status = 200, description = "Expense updated, month's budget returned", body = BudgetResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[put("/expenses/{expenseId}")]
pub async fn update_expense(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<ExpenseIdPath>,
    body: web::Json<UpdateExpenseDto>,
) -> Result<HttpResponse, AppError> {
    body.validate().map_err(AppError::from)?;

    let response =
        ExpenseService::update_expense(pool.get_ref(), auth.user_id, path.expense_id, &body)
            .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /expenses/{expenseId} - Remove an expense
#[utoipa::path(
    delete,
    path = "/expenses/{expenseId}",
    tag = "Expenses",
    params(ExpenseIdPath),
    responses(
        (status = 200, description = "Expense deleted, month's budget returned", body = BudgetResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[delete("/expenses/{expenseId}")]
pub async fn delete_expense(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<ExpenseIdPath>,
) -> Result<HttpResponse, AppError> {
    let response =
        ExpenseService::delete_expense(pool.get_ref(), auth.user_id, path.expense_id).await?;

    Ok(HttpResponse::Ok().json(response))
}
