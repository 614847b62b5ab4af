use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::models::{AuthResponse, LoginDto, SignupDto, UserResponse};
use crate::budget::models::{BaseIncomeDto, BudgetResponse, ExpenseResponse};
use crate::errors::ErrorResponse;
use crate::expense::models::{CreateExpenseDto, UpdateExpenseDto};
use crate::fund::models::{
    FundDto, FundResponse, FundStatus, FundType, MessageResponse, TransactionDto,
    TransactionResponse,
};

/// Security scheme modifier for Bearer token authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token from /auth/signup or /auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Finance Tracker API",
        version = "1.0.0",
        description = "Monthly budgets, expenses and personal funds with partial repayments",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Development server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Signup, login and current user"),
        (name = "Budget", description = "Monthly budgets and base income"),
        (name = "Expenses", description = "Expenses within a monthly budget"),
        (name = "Funds", description = "Money borrowed or given and its repayments")
    ),
    paths(
        crate::routes::health_check,
        // Auth endpoints
        crate::auth::handlers::signup,
        crate::auth::handlers::login,
        crate::auth::handlers::me,
        // Budget endpoints
        crate::budget::handlers::get_current_budget,
        crate::budget::handlers::get_budget_by_month,
        crate::budget::handlers::set_base_income,
        crate::budget::handlers::replace_base_income,
        // Expense endpoints
        crate::expense::handlers::add_expense,
        crate::expense::handlers::update_expense,
        crate::expense::handlers::delete_expense,
        // Fund endpoints
        crate::fund::handlers::list_funds,
        crate::fund::handlers::get_fund,
        crate::fund::handlers::create_fund,
        crate::fund::handlers::update_fund,
        crate::fund::handlers::delete_fund,
        crate::fund::handlers::add_transaction,
        crate::fund::handlers::update_transaction,
        crate::fund::handlers::delete_transaction,
    ),
    components(
        schemas(
            ErrorResponse,
            // Auth schemas
            SignupDto,
            LoginDto,
            UserResponse,
            AuthResponse,
            // Budget schemas
            BudgetResponse,
            ExpenseResponse,
            BaseIncomeDto,
            // Expense schemas
            CreateExpenseDto,
            UpdateExpenseDto,
            // Fund schemas
            FundType,
            FundStatus,
            FundDto,
            TransactionDto,
            FundResponse,
            TransactionResponse,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/health",
            "/auth/signup",
            "/auth/login",
            "/budget/current",
            "/budget",
            "/budget/base-income",
            "/expenses",
            "/expenses/{expenseId}",
            "/funds",
            "/funds/{fundId}",
            "/funds/{fundId}/transactions",
            "/funds/{fundId}/transactions/{transactionId}",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }

    #[test]
    fn test_openapi_has_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
