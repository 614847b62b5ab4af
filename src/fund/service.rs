use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use super::models::{
    ensure_payment_fits, ensure_principal_covers, Fund, FundDto, FundResponse, FundTransaction,
    TransactionDto,
};
use crate::errors::AppError;

const FUND_COLUMNS: &str =
    "id, user_id, person_name, fund_type, principal_amount, start_date, notes, created_at, updated_at";

const TRANSACTION_COLUMNS: &str = "id, fund_id, amount, date, note, created_at";

fn fund_not_found() -> AppError {
    AppError::NotFound("fund not found or doesn't belong to user".to_string())
}

fn transaction_not_found() -> AppError {
    AppError::NotFound("transaction not found or doesn't belong to fund".to_string())
}

/// Service layer for funds and their repayment transactions.
///
/// Every write that can move the total paid runs inside a database
/// transaction holding a row lock on the fund, so concurrent repayments
/// are checked against the principal one at a time.
pub struct FundService;

impl FundService {
    /// All funds of a user, newest first, each with its transactions.
    pub async fn list_funds(pool: &PgPool, user_id: Uuid) -> Result<Vec<FundResponse>, AppError> {
        let funds = sqlx::query_as::<_, Fund>(&format!(
            r#"
            SELECT {FUND_COLUMNS}
            FROM funds
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        if funds.is_empty() {
            return Ok(Vec::new());
        }

        let fund_ids: Vec<Uuid> = funds.iter().map(|f| f.id).collect();
        let transactions = sqlx::query_as::<_, FundTransaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM fund_transactions
            WHERE fund_id = ANY($1)
            ORDER BY date ASC, created_at ASC
            "#
        ))
        .bind(&fund_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let mut by_fund: HashMap<Uuid, Vec<FundTransaction>> = HashMap::new();
        for transaction in transactions {
            by_fund
                .entry(transaction.fund_id)
                .or_default()
                .push(transaction);
        }

        Ok(funds
            .into_iter()
            .map(|fund| {
                let transactions = by_fund.remove(&fund.id).unwrap_or_default();
                FundResponse::new(fund, transactions)
            })
            .collect())
    }

    /// A single fund owned by the user.
    pub async fn get_fund(
        pool: &PgPool,
        user_id: Uuid,
        fund_id: Uuid,
    ) -> Result<FundResponse, AppError> {
        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let fund = Self::find_owned(&mut conn, user_id, fund_id, false).await?;
        Self::view(&mut conn, fund).await
    }

    pub async fn create_fund(
        pool: &PgPool,
        user_id: Uuid,
        dto: &FundDto,
    ) -> Result<FundResponse, AppError> {
        let fund_type = dto.parsed_type()?;

        let fund = sqlx::query_as::<_, Fund>(&format!(
            r#"
            INSERT INTO funds (user_id, person_name, fund_type, principal_amount, start_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FUND_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(dto.person_name.trim())
        .bind(fund_type.as_str())
        .bind(dto.principal_amount)
        .bind(dto.start_date.unwrap_or_else(Utc::now))
        .bind(dto.notes())
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(fund_id = %fund.id, fund_type = fund_type.as_str(), "fund created");
        Ok(FundResponse::new(fund, Vec::new()))
    }

    /// Replace a fund's fields. The new principal may not drop below what was already paid.
    pub async fn update_fund(
        pool: &PgPool,
        user_id: Uuid,
        fund_id: Uuid,
        dto: &FundDto,
    ) -> Result<FundResponse, AppError> {
        let fund_type = dto.parsed_type()?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let current = Self::find_owned(&mut tx, user_id, fund_id, true).await?;

        let total_paid = Self::total_paid(&mut tx, fund_id, None).await?;
        if let Err(e) = ensure_principal_covers(dto.principal_amount, total_paid) {
            warn!(%fund_id, %total_paid, "principal update rejected");
            return Err(e);
        }

        let fund = sqlx::query_as::<_, Fund>(&format!(
            r#"
            UPDATE funds
            SET person_name = $1,
                fund_type = $2,
                principal_amount = $3,
                start_date = $4,
                notes = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {FUND_COLUMNS}
            "#
        ))
        .bind(dto.person_name.trim())
        .bind(fund_type.as_str())
        .bind(dto.principal_amount)
        .bind(dto.start_date.unwrap_or(current.start_date))
        .bind(dto.notes())
        .bind(fund_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let response = Self::view(&mut tx, fund).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(response)
    }

    /// Delete a fund; its transactions go with it.
    pub async fn delete_fund(pool: &PgPool, user_id: Uuid, fund_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM funds WHERE id = $1 AND user_id = $2")
            .bind(fund_id)
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(fund_not_found());
        }

        info!(%fund_id, "fund deleted");
        Ok(())
    }

    /// Record a repayment and return the refreshed fund.
    pub async fn add_transaction(
        pool: &PgPool,
        user_id: Uuid,
        fund_id: Uuid,
        dto: &TransactionDto,
    ) -> Result<FundResponse, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let fund = Self::find_owned(&mut tx, user_id, fund_id, true).await?;

        let paid = Self::total_paid(&mut tx, fund_id, None).await?;
        if let Err(e) = ensure_payment_fits(fund.principal_amount, paid, dto.amount) {
            warn!(%fund_id, amount = %dto.amount, "repayment would exceed principal");
            return Err(e);
        }

        sqlx::query(
            r#"
            INSERT INTO fund_transactions (fund_id, amount, date, note)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(fund_id)
        .bind(dto.amount)
        .bind(dto.date.unwrap_or_else(Utc::now))
        .bind(dto.note())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let fund = Self::touch(&mut tx, fund_id).await?;
        let response = Self::view(&mut tx, fund).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(response)
    }

    /// Edit a repayment. The edited amount replaces the old one in the principal check.
    pub async fn update_transaction(
        pool: &PgPool,
        user_id: Uuid,
        fund_id: Uuid,
        transaction_id: Uuid,
        dto: &TransactionDto,
    ) -> Result<FundResponse, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let fund = Self::find_owned(&mut tx, user_id, fund_id, true).await?;

        let existing = sqlx::query_as::<_, FundTransaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM fund_transactions
            WHERE id = $1 AND fund_id = $2
            "#
        ))
        .bind(transaction_id)
        .bind(fund_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(transaction_not_found)?;

        let paid_by_others = Self::total_paid(&mut tx, fund_id, Some(existing.id)).await?;
        if let Err(e) = ensure_payment_fits(fund.principal_amount, paid_by_others, dto.amount) {
            warn!(%fund_id, %transaction_id, amount = %dto.amount, "repayment would exceed principal");
            return Err(e);
        }

        sqlx::query(
            r#"
            UPDATE fund_transactions
            SET amount = $1, date = $2, note = $3
            WHERE id = $4
            "#,
        )
        .bind(dto.amount)
        .bind(dto.date.unwrap_or(existing.date))
        .bind(dto.note())
        .bind(transaction_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let fund = Self::touch(&mut tx, fund_id).await?;
        let response = Self::view(&mut tx, fund).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(response)
    }

    /// Remove a repayment and return the refreshed fund.
    pub async fn delete_transaction(
        pool: &PgPool,
        user_id: Uuid,
        fund_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<FundResponse, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Self::find_owned(&mut tx, user_id, fund_id, true).await?;

        let result = sqlx::query("DELETE FROM fund_transactions WHERE id = $1 AND fund_id = $2")
            .bind(transaction_id)
            .bind(fund_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(transaction_not_found());
        }

        let fund = Self::touch(&mut tx, fund_id).await?;
        let response = Self::view(&mut tx, fund).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(response)
    }

    /// Fetch a fund owned by the user, optionally locking its row for the
    /// rest of the surrounding transaction.
    async fn find_owned(
        conn: &mut PgConnection,
        user_id: Uuid,
        fund_id: Uuid,
        lock: bool,
    ) -> Result<Fund, AppError> {
        let lock_clause = if lock { "FOR UPDATE" } else { "" };

        sqlx::query_as::<_, Fund>(&format!(
            r#"
            SELECT {FUND_COLUMNS}
            FROM funds
            WHERE id = $1 AND user_id = $2
            {lock_clause}
            "#
        ))
        .bind(fund_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(fund_not_found)
    }

    /// Sum of a fund's repayments, optionally leaving one transaction out.
    async fn total_paid(
        conn: &mut PgConnection,
        fund_id: Uuid,
        excluding: Option<Uuid>,
    ) -> Result<Decimal, AppError> {
        sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM fund_transactions
            WHERE fund_id = $1 AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(fund_id)
        .bind(excluding)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    async fn touch(conn: &mut PgConnection, fund_id: Uuid) -> Result<Fund, AppError> {
        sqlx::query_as::<_, Fund>(&format!(
            r#"
            UPDATE funds
            SET updated_at = NOW()
            WHERE id = $1
            RETURNING {FUND_COLUMNS}
            "#
        ))
        .bind(fund_id)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    async fn view(conn: &mut PgConnection, fund: Fund) -> Result<FundResponse, AppError> {
        let transactions = sqlx::query_as::<_, FundTransaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM fund_transactions
            WHERE fund_id = $1
            ORDER BY date ASC, created_at ASC
            "#
        ))
        .bind(fund.id)
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(FundResponse::new(fund, transactions))
    }
}
