use chrono::{Datelike, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::models::{BaseIncomeDto, BudgetResponse, Expense, MonthlyBudget};
use crate::errors::AppError;

pub(crate) const BUDGET_COLUMNS: &str =
    "id, user_id, year, month, base_income, created_at, updated_at";

/// Current `(year, month)` in UTC
pub fn current_year_month() -> (i32, i32) {
    let now = Utc::now();
    (now.year(), now.month() as i32)
}

/// Service layer for monthly budget business logic.
pub struct BudgetService;

impl BudgetService {
    /// Fetch the budget for a month, creating an empty one on first access.
    pub async fn get_or_create(
        conn: &mut PgConnection,
        user_id: Uuid,
        year: i32,
        month: i32,
    ) -> Result<MonthlyBudget, AppError> {
        sqlx::query(
            r#"
            INSERT INTO monthly_budgets (user_id, year, month)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, year, month) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(year)
        .bind(month)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        sqlx::query_as::<_, MonthlyBudget>(&format!(
            r#"
            SELECT {BUDGET_COLUMNS}
            FROM monthly_budgets
            WHERE user_id = $1 AND year = $2 AND month = $3
            "#
        ))
        .bind(user_id)
        .bind(year)
        .bind(month)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Set (or replace) the base income of a month, creating the budget if needed.
    pub async fn set_base_income(
        pool: &PgPool,
        user_id: Uuid,
        dto: &BaseIncomeDto,
    ) -> Result<MonthlyBudget, AppError> {
        sqlx::query_as::<_, MonthlyBudget>(&format!(
            r#"
            INSERT INTO monthly_budgets (user_id, year, month, base_income)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, year, month)
            DO UPDATE SET base_income = EXCLUDED.base_income, updated_at = NOW()
            RETURNING {BUDGET_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(dto.year)
        .bind(dto.month)
        .bind(dto.amount)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Expenses of a budget, oldest first.
    pub async fn list_expenses(
        conn: &mut PgConnection,
        budget_id: Uuid,
    ) -> Result<Vec<Expense>, AppError> {
        sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, budget_id, title, amount, created_at
            FROM expenses
            WHERE budget_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(budget_id)
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Bump `updated_at` after an expense change and return the refreshed budget.
    pub async fn touch(
        conn: &mut PgConnection,
        budget_id: Uuid,
    ) -> Result<MonthlyBudget, AppError> {
        sqlx::query_as::<_, MonthlyBudget>(&format!(
            r#"
            UPDATE monthly_budgets
            SET updated_at = NOW()
            WHERE id = $1
            RETURNING {BUDGET_COLUMNS}
            "#
        ))
        .bind(budget_id)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Build the response view: budget, expenses and remaining balance.
    pub async fn view(
        conn: &mut PgConnection,
        budget: &MonthlyBudget,
    ) -> Result<BudgetResponse, AppError> {
        let expenses = Self::list_expenses(conn, budget.id).await?;
        BudgetResponse::new(budget, expenses)
    }

    /// Get-or-create a month and return its view.
    pub async fn month_view(
        pool: &PgPool,
        user_id: Uuid,
        year: i32,
        month: i32,
    ) -> Result<BudgetResponse, AppError> {
        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let budget = Self::get_or_create(&mut conn, user_id, year, month).await?;
        Self::view(&mut conn, &budget).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_year_month_in_range() {
        let (year, month) = current_year_month();
        assert!(year >= 2024);
        assert!((1..=12).contains(&month));
    }
}
