use actix_web::guard::GuardContext;
use actix_web::http::Method;
use actix_web::{get, web, HttpResponse, Responder};
use sqlx::PgPool;

use crate::errors::{json_error_handler, path_error_handler, query_error_handler};
use crate::{auth, budget, expense, fund};

/// Health check endpoint that verifies database connectivity
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and database are up"),
        (status = 503, description = "Database unreachable")
    )
)]
#[get("/health")]
pub async fn health_check(pool: web::Data<PgPool>) -> impl Responder {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(_) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "database": "disconnected"
        })),
    }
}

/// Extractor settings plus every route that is not rate limited.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .service(health_check)
        .service(auth::me)
        // Budget endpoints (order matters: /budget/current before /budget)
        .service(budget::get_current_budget)
        .service(budget::get_budget_by_month)
        .service(budget::set_base_income)
        .service(budget::replace_base_income)
        // Expense endpoints
        .service(expense::add_expense)
        .service(expense::update_expense)
        .service(expense::delete_expense)
        // Fund endpoints
        .service(fund::list_funds)
        .service(fund::create_fund)
        .service(fund::get_fund)
        .service(fund::update_fund)
        .service(fund::delete_fund)
        .service(fund::add_transaction)
        .service(fund::update_transaction)
        .service(fund::delete_transaction);
}

/// Guard for the rate-limited scope, so that only credential requests reach the limiter.
pub fn is_credentials_request(ctx: &GuardContext<'_>) -> bool {
    ctx.head().method == Method::POST
        && matches!(ctx.head().uri.path(), "/auth/signup" | "/auth/login")
}

/// Credential endpoints; the server mounts these behind the rate limiter.
pub fn configure_credentials(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::signup).service(auth::login);
}
