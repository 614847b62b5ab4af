use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::amount;
use crate::errors::AppError;

/// Direction of a fund, seen from the account owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FundType {
    /// Money the user borrowed from someone
    Borrowed,
    /// Money the user lent to someone
    Given,
}

impl FundType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundType::Borrowed => "BORROWED",
            FundType::Given => "GIVEN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BORROWED" => Some(FundType::Borrowed),
            "GIVEN" => Some(FundType::Given),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FundStatus {
    Open,
    Paid,
}

/// Repayment state of a fund derived from its principal and transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundBalance {
    pub total_paid: Decimal,
    pub outstanding: Decimal,
    pub status: FundStatus,
}

impl FundBalance {
    pub fn compute<I>(principal: Decimal, payments: I) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        let total_paid = payments
            .into_iter()
            .fold(Decimal::ZERO, |paid, payment| paid.saturating_add(payment));
        let outstanding = principal.saturating_sub(total_paid).max(Decimal::ZERO);
        let status = if outstanding > Decimal::ZERO {
            FundStatus::Open
        } else {
            FundStatus::Paid
        };

        Self {
            total_paid,
            outstanding,
            status,
        }
    }
}

/// Reject a payment that would push the total paid above the principal.
///
/// `paid_so_far` must already exclude the payment being replaced, if any.
pub fn ensure_payment_fits(
    principal: Decimal,
    paid_so_far: Decimal,
    amount: Decimal,
) -> Result<(), AppError> {
    let fits = paid_so_far
        .checked_add(amount)
        .is_some_and(|total| total <= principal);
    if !fits {
        let max_allowed = principal.saturating_sub(paid_so_far).max(Decimal::ZERO);
        return Err(AppError::ValidationError(format!(
            "transaction amount would exceed principal amount. Maximum allowed: {max_allowed:.2}"
        )));
    }
    Ok(())
}

/// Reject a principal lower than what has already been repaid.
pub fn ensure_principal_covers(principal: Decimal, total_paid: Decimal) -> Result<(), AppError> {
    if principal < total_paid {
        return Err(AppError::ValidationError(format!(
            "principal amount cannot be less than total paid ({total_paid:.2})"
        )));
    }
    Ok(())
}

fn validate_fund_type(value: &str) -> Result<(), ValidationError> {
    FundType::parse(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("invalid_fund_type"))
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn validate_principal(amount: &Decimal) -> Result<(), ValidationError> {
    amount::check_positive(amount, "principal amount must be greater than 0")
}

fn validate_transaction_amount(amount: &Decimal) -> Result<(), ValidationError> {
    amount::check_positive(amount, "transaction amount must be greater than 0")
}

/// Empty or whitespace-only notes are stored as NULL
fn normalize_note(note: &Option<String>) -> Option<String> {
    note.as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Database entities
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct Fund {
    pub id: Uuid,
    #[allow(dead_code)] // Used in SQL queries for ownership check
    pub user_id: Uuid,
    pub person_name: String,
    pub fund_type: String,
    pub principal_amount: Decimal,
    pub start_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Fund {
    pub fn get_type(&self) -> FundType {
        FundType::parse(&self.fund_type).unwrap_or(FundType::Borrowed)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FundTransaction {
    pub id: Uuid,
    pub fund_id: Uuid,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating or updating a fund
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundDto {
    #[serde(default)]
    #[validate(
        custom(function = "validate_not_blank", message = "person name is required"),
        length(max = 100, message = "Person name cannot exceed 100 characters")
    )]
    #[schema(example = "Alice")]
    pub person_name: String,

    /// BORROWED or GIVEN
    #[serde(rename = "type", default)]
    #[validate(custom(function = "validate_fund_type", message = "type must be BORROWED or GIVEN"))]
    #[schema(example = "GIVEN")]
    pub fund_type: String,

    #[serde(default)]
    #[validate(custom(function = "validate_principal"))]
    #[schema(value_type = f64, example = 500.0)]
    pub principal_amount: Decimal,

    /// Defaults to now when omitted
    pub start_date: Option<DateTime<Utc>>,

    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    #[schema(example = "Car repair")]
    pub notes: Option<String>,
}

impl FundDto {
    pub fn parsed_type(&self) -> Result<FundType, AppError> {
        FundType::parse(&self.fund_type).ok_or_else(|| {
            AppError::ValidationError("type must be BORROWED or GIVEN".to_string())
        })
    }

    pub fn notes(&self) -> Option<String> {
        normalize_note(&self.notes)
    }
}

/// Request body for recording or editing a repayment
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    #[serde(default)]
    #[validate(custom(function = "validate_transaction_amount"))]
    #[schema(value_type = f64, example = 100.0)]
    pub amount: Decimal,

    /// Defaults to now when omitted
    pub date: Option<DateTime<Utc>>,

    #[validate(length(max = 500, message = "Note cannot exceed 500 characters"))]
    #[schema(example = "First installment")]
    pub note: Option<String>,
}

impl TransactionDto {
    pub fn note(&self) -> Option<String> {
        normalize_note(&self.note)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FundIdPath {
    /// Fund UUID
    pub fund_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FundTransactionPath {
    /// Fund UUID
    pub fund_id: Uuid,
    /// Transaction UUID
    pub transaction_id: Uuid,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    pub fund_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 100.0)]
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<FundTransaction> for TransactionResponse {
    fn from(t: FundTransaction) -> Self {
        Self {
            id: t.id,
            fund_id: t.fund_id,
            amount: t.amount,
            date: t.date,
            note: t.note,
            created_at: t.created_at,
        }
    }
}

/// A fund with its repayments and computed balance
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundResponse {
    pub id: Uuid,
    #[schema(example = "Alice")]
    pub person_name: String,
    #[serde(rename = "type")]
    pub fund_type: FundType,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 500.0)]
    pub principal_amount: Decimal,
    pub start_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 100.0)]
    pub total_paid: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 400.0)]
    pub outstanding: Decimal,
    pub status: FundStatus,
    pub transactions: Vec<TransactionResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FundResponse {
    /// `transactions` must already be sorted by date
    pub fn new(fund: Fund, transactions: Vec<FundTransaction>) -> Self {
        let balance = FundBalance::compute(
            fund.principal_amount,
            transactions.iter().map(|t| t.amount),
        );
        let fund_type = fund.get_type();

        Self {
            id: fund.id,
            person_name: fund.person_name,
            fund_type,
            principal_amount: fund.principal_amount,
            start_date: fund.start_date,
            notes: fund.notes,
            total_paid: balance.total_paid,
            outstanding: balance.outstanding,
            status: balance.status,
            transactions: transactions.into_iter().map(Into::into).collect(),
            created_at: fund.created_at,
            updated_at: fund.updated_at,
        }
    }
}

/// Body returned after deleting a fund
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "fund deleted successfully")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal")
    }

    fn fund(principal: &str) -> Fund {
        Fund {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            person_name: "Alice".to_string(),
            fund_type: "GIVEN".to_string(),
            principal_amount: dec(principal),
            start_date: Utc::now(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payment(fund_id: Uuid, amount: &str) -> FundTransaction {
        FundTransaction {
            id: Uuid::new_v4(),
            fund_id,
            amount: dec(amount),
            date: Utc::now(),
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_balance_without_payments_is_open() {
        let balance = FundBalance::compute(dec("500"), []);
        assert_eq!(balance.total_paid, Decimal::ZERO);
        assert_eq!(balance.outstanding, dec("500"));
        assert_eq!(balance.status, FundStatus::Open);
    }

    #[test]
    fn test_balance_partially_paid() {
        let balance = FundBalance::compute(dec("500"), [dec("100"), dec("150.25")]);
        assert_eq!(balance.total_paid, dec("250.25"));
        assert_eq!(balance.outstanding, dec("249.75"));
        assert_eq!(balance.status, FundStatus::Open);
    }

    #[test]
    fn test_balance_fully_paid() {
        let balance = FundBalance::compute(dec("300"), [dec("100"), dec("200")]);
        assert_eq!(balance.outstanding, Decimal::ZERO);
        assert_eq!(balance.status, FundStatus::Paid);
    }

    #[test]
    fn test_balance_outstanding_never_negative() {
        let balance = FundBalance::compute(dec("100"), [dec("120")]);
        assert_eq!(balance.outstanding, Decimal::ZERO);
        assert_eq!(balance.status, FundStatus::Paid);
    }

    #[test]
    fn test_payment_fits_exactly() {
        assert!(ensure_payment_fits(dec("500"), dec("400"), dec("100")).is_ok());
    }

    #[test]
    fn test_payment_exceeding_principal_reports_maximum() {
        match ensure_payment_fits(dec("500"), dec("400"), dec("100.01")) {
            Err(AppError::ValidationError(msg)) => assert_eq!(
                msg,
                "transaction amount would exceed principal amount. Maximum allowed: 100.00"
            ),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_payment_overflow_reported_as_exceeding() {
        let principal = dec("50000000000000000000000000000");
        let paid = dec("40000000000000000000000000000");
        match ensure_payment_fits(principal, paid, paid) {
            Err(AppError::ValidationError(msg)) => assert_eq!(
                msg,
                "transaction amount would exceed principal amount. \
                 Maximum allowed: 10000000000000000000000000000.00"
            ),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_balance_saturates_instead_of_overflowing() {
        let huge = dec("50000000000000000000000000000");
        let balance = FundBalance::compute(huge, [huge, huge]);
        assert_eq!(balance.outstanding, Decimal::ZERO);
        assert_eq!(balance.status, FundStatus::Paid);
    }

    #[test]
    fn test_amounts_above_cap_rejected() {
        let dto: FundDto = serde_json::from_str(
            r#"{"personName": "Bob", "type": "GIVEN", "principalAmount": "50000000000000000000000000000"}"#,
        )
        .expect("Should deserialize");
        let err = dto.validate().expect_err("principal above the cap");
        assert!(err.to_string().contains("amount cannot exceed 999999999999.99"));

        let dto: TransactionDto = serde_json::from_str(r#"{"amount": "1000000000000"}"#)
            .expect("Should deserialize");
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_replacing_payment_excludes_old_amount() {
        // 500 principal, 450 paid of which 200 is the payment being edited
        let paid_without_edited = dec("450") - dec("200");
        assert!(ensure_payment_fits(dec("500"), paid_without_edited, dec("250")).is_ok());
        assert!(ensure_payment_fits(dec("500"), paid_without_edited, dec("251")).is_err());
    }

    #[test]
    fn test_principal_must_cover_total_paid() {
        assert!(ensure_principal_covers(dec("300"), dec("300")).is_ok());
        match ensure_principal_covers(dec("299.99"), dec("300")) {
            Err(AppError::ValidationError(msg)) => assert_eq!(
                msg,
                "principal amount cannot be less than total paid (300.00)"
            ),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_fund_type_parse() {
        assert_eq!(FundType::parse("BORROWED"), Some(FundType::Borrowed));
        assert_eq!(FundType::parse("GIVEN"), Some(FundType::Given));
        assert_eq!(FundType::parse("given"), None);
        assert_eq!(FundType::Given.as_str(), "GIVEN");
    }

    #[test]
    fn test_fund_dto_validation() {
        let dto: FundDto = serde_json::from_str(
            r#"{"personName": "Bob", "type": "LENT", "principalAmount": 10}"#,
        )
        .expect("Should deserialize");
        let err = dto.validate().expect_err("LENT is not a fund type");
        assert!(err.to_string().contains("type must be BORROWED or GIVEN"));

        let dto: FundDto = serde_json::from_str(
            r#"{"personName": "", "type": "GIVEN", "principalAmount": 10}"#,
        )
        .expect("Should deserialize");
        let err = dto.validate().expect_err("blank name");
        assert!(err.to_string().contains("person name is required"));

        let dto: FundDto =
            serde_json::from_str(r#"{"personName": "Bob", "type": "BORROWED"}"#)
                .expect("Should deserialize");
        let err = dto.validate().expect_err("missing principal");
        assert!(err.to_string().contains("principal amount must be greater than 0"));
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        let dto: FundDto = serde_json::from_str(
            r#"{"personName": "Bob", "type": "GIVEN", "principalAmount": 10, "notes": "  "}"#,
        )
        .expect("Should deserialize");
        assert!(dto.validate().is_ok());
        assert_eq!(dto.notes(), None);
        assert_eq!(dto.parsed_type().ok(), Some(FundType::Given));
    }

    #[test]
    fn test_fund_response_shape() {
        let fund = fund("500");
        let payments = vec![payment(fund.id, "200"), payment(fund.id, "300")];
        let json = serde_json::to_value(FundResponse::new(fund, payments))
            .expect("Should serialize");

        assert_eq!(json["type"], "GIVEN");
        assert_eq!(json["principalAmount"], 500.0);
        assert_eq!(json["totalPaid"], 500.0);
        assert_eq!(json["outstanding"], 0.0);
        assert_eq!(json["status"], "PAID");
        assert_eq!(json["transactions"].as_array().map(Vec::len), Some(2));
        assert!(json.get("notes").is_none());
    }
}
