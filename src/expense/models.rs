use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::amount;

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("title_required"));
    }
    Ok(())
}

fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    amount::check_positive(amount, "title and amount (positive) are required")
}

/// Request body for adding an expense to a month
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseDto {
    #[serde(default)]
    #[validate(
        custom(function = "validate_title", message = "title and amount (positive) are required"),
        length(max = 200, message = "Title cannot exceed 200 characters")
    )]
    #[schema(example = "Groceries")]
    pub title: String,

    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    #[schema(value_type = f64, example = 42.5)]
    pub amount: Decimal,

    #[serde(default)]
    #[validate(range(min = 1, message = "valid year and month are required"))]
    #[schema(example = 2025)]
    pub year: i32,

    #[serde(default)]
    #[validate(range(min = 1, max = 12, message = "valid year and month are required"))]
    #[schema(example = 3)]
    pub month: i32,
}

/// Request body for editing an expense; the month it belongs to never changes
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseDto {
    #[serde(default)]
    #[validate(
        custom(function = "validate_title", message = "title and amount (positive) are required"),
        length(max = 200, message = "Title cannot exceed 200 characters")
    )]
    #[schema(example = "Groceries")]
    pub title: String,

    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    #[schema(value_type = f64, example = 40.0)]
    pub amount: Decimal,
}

impl CreateExpenseDto {
    pub fn trimmed_title(&self) -> &str {
        self.title.trim()
    }
}

impl UpdateExpenseDto {
    pub fn trimmed_title(&self) -> &str {
        self.title.trim()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseIdPath {
    /// Expense UUID
    pub expense_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    const TITLE_AND_AMOUNT: &str = "title and amount (positive) are required";

    fn create(title: &str, amount: &str, year: i32, month: i32) -> CreateExpenseDto {
        CreateExpenseDto {
            title: title.to_string(),
            amount: amount.parse().expect("valid decimal"),
            year,
            month,
        }
    }

    #[test]
    fn test_create_valid() {
        assert!(create("Rent", "900", 2025, 1).validate().is_ok());
    }

    #[test]
    fn test_create_rejects_blank_title_and_non_positive_amount() {
        for dto in [
            create("  ", "10", 2025, 1),
            create("Rent", "0", 2025, 1),
            create("Rent", "-5", 2025, 1),
        ] {
            let err = dto.validate().expect_err("should fail");
            assert!(err.to_string().contains(TITLE_AND_AMOUNT));
        }
    }

    #[test]
    fn test_create_rejects_bad_month() {
        for (year, month) in [(0, 1), (2025, 0), (2025, 13)] {
            let err = create("Rent", "1", year, month)
                .validate()
                .expect_err("should fail");
            assert!(err.to_string().contains("valid year and month are required"));
        }
    }

    #[test]
    fn test_month_error_reported_before_title_error() {
        let err = create(" ", "0", 2025, 13)
            .validate()
            .expect_err("should fail");
        match AppError::from(err) {
            AppError::ValidationError(msg) => assert_eq!(msg, "valid year and month are required"),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = create(" ", "1", 2025, 1).validate().expect_err("should fail");
        match AppError::from(err) {
            AppError::ValidationError(msg) => assert_eq!(msg, TITLE_AND_AMOUNT),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_amount_above_cap_rejected() {
        let err = create("Yacht", "50000000000000000000000000000", 2025, 1)
            .validate()
            .expect_err("should fail");
        assert!(err.to_string().contains("amount cannot exceed 999999999999.99"));
        assert!(create("Yacht", "999999999999.99", 2025, 1).validate().is_ok());
    }

    #[test]
    fn test_missing_fields_default_then_fail_validation() {
        let dto: UpdateExpenseDto =
            serde_json::from_str(r#"{"title": "Coffee"}"#).expect("Should deserialize");
        assert_eq!(dto.amount, Decimal::ZERO);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_amount_accepts_json_numbers() {
        let dto: UpdateExpenseDto = serde_json::from_str(r#"{"title": " Coffee ", "amount": 3.75}"#)
            .expect("Should deserialize");
        assert_eq!(dto.amount, "3.75".parse::<Decimal>().expect("valid decimal"));
        assert_eq!(dto.trimmed_title(), "Coffee");
        assert!(dto.validate().is_ok());
    }
}
