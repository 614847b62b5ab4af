use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::models::{CreateExpenseDto, UpdateExpenseDto};
use crate::budget::models::BudgetResponse;
use crate::budget::service::BudgetService;
use crate::errors::AppError;

fn expense_not_found() -> AppError {
    AppError::NotFound("expense not found or doesn't belong to user".to_string())
}

/// Service layer for expenses. Every mutation returns the owning month's view.
pub struct ExpenseService;

impl ExpenseService {
    /// Add an expense to a month, creating the month's budget on first use.
    pub async fn add_expense(
        pool: &PgPool,
        user_id: Uuid,
        dto: &CreateExpenseDto,
    ) -> Result<BudgetResponse, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let budget = BudgetService::get_or_create(&mut tx, user_id, dto.year, dto.month).await?;

        sqlx::query(
            r#"
            INSERT INTO expenses (budget_id, title, amount)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(budget.id)
        .bind(dto.trimmed_title())
        .bind(dto.amount)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let budget = BudgetService::touch(&mut tx, budget.id).await?;
        let response = BudgetService::view(&mut tx, &budget).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        debug!(budget_id = %budget.id, "expense added");
        Ok(response)
    }

    /// Change an expense's title and amount; ownership is checked through its budget.
    pub async fn update_expense(
        pool: &PgPool,
        user_id: Uuid,
        expense_id: Uuid,
        dto: &UpdateExpenseDto,
    ) -> Result<BudgetResponse, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let budget_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE expenses e
            SET title = $1, amount = $2
            FROM monthly_budgets b
            WHERE e.id = $3 AND e.budget_id = b.id AND b.user_id = $4
            RETURNING e.budget_id
            "#,
        )
        .bind(dto.trimmed_title())
        .bind(dto.amount)
        .bind(expense_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(expense_not_found)?;

        let budget = BudgetService::touch(&mut tx, budget_id).await?;
        let response = BudgetService::view(&mut tx, &budget).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(response)
    }

    /// Remove an expense owned by the user.
    pub async fn delete_expense(
        pool: &PgPool,
        user_id: Uuid,
        expense_id: Uuid,
    ) -> Result<BudgetResponse, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let budget_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            DELETE FROM expenses e
            USING monthly_budgets b
            WHERE e.id = $1 AND e.budget_id = b.id AND b.user_id = $2
            RETURNING e.budget_id
            "#,
        )
        .bind(expense_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(expense_not_found)?;

        let budget = BudgetService::touch(&mut tx, budget_id).await?;
        let response = BudgetService::view(&mut tx, &budget).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(response)
    }
}
