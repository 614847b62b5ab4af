use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::amount;
use crate::errors::AppError;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English name of a 1-based month, `None` outside 1..=12
pub fn month_name(month: i32) -> Option<&'static str> {
    usize::try_from(month)
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|idx| MONTH_NAMES.get(idx).copied())
}

/// Base income minus all expenses; unknown until a base income is set.
pub fn remaining(
    base_income: Option<Decimal>,
    expenses: &[Expense],
) -> Result<Option<Decimal>, AppError> {
    let Some(income) = base_income else {
        return Ok(None);
    };

    expenses
        .iter()
        .try_fold(income, |left, expense| left.checked_sub(expense.amount))
        .map(Some)
        .ok_or_else(|| AppError::ValidationError("budget totals are out of range".to_string()))
}

fn validate_base_income(value: &Decimal) -> Result<(), ValidationError> {
    amount::check_non_negative(value, "amount must be non-negative")
}

/// Database entity for monthly budgets
#[derive(Debug, Clone, FromRow)]
pub struct MonthlyBudget {
    pub id: Uuid,
    #[allow(dead_code)] // Used in SQL queries for ownership check
    pub user_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub base_income: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database entity for expenses
#[derive(Debug, Clone, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub title: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    pub id: Uuid,
    #[schema(example = "Groceries")]
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 42.5)]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Expense> for ExpenseResponse {
    fn from(e: Expense) -> Self {
        Self {
            id: e.id,
            title: e.title,
            amount: e.amount,
            created_at: e.created_at,
        }
    }
}

/// A month's budget with its expenses and computed remaining balance.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    #[schema(example = 2025)]
    pub year: i32,
    /// Month, 1-12
    #[schema(example = 3)]
    pub month: i32,
    #[schema(example = "March")]
    pub month_name: String,
    /// `null` until a base income is set
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>, example = 3000.0)]
    pub base_income: Option<Decimal>,
    pub expenses: Vec<ExpenseResponse>,
    /// baseIncome minus the sum of expenses, `null` without a base income
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>, example = 2957.5)]
    pub remaining: Option<Decimal>,
}

impl BudgetResponse {
    pub fn new(budget: &MonthlyBudget, expenses: Vec<Expense>) -> Result<Self, AppError> {
        let remaining = remaining(budget.base_income, &expenses)?;

        Ok(Self {
            year: budget.year,
            month: budget.month,
            month_name: month_name(budget.month).unwrap_or_default().to_string(),
            base_income: budget.base_income,
            expenses: expenses.into_iter().map(Into::into).collect(),
            remaining,
        })
    }
}

/// Request body for setting a month's base income
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseIncomeDto {
    #[serde(default)]
    #[validate(custom(function = "validate_base_income"))]
    #[schema(value_type = f64, example = 3000.0)]
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

/// Query parameters for looking up a specific month
#[derive(Debug, Deserialize, IntoParams)]
pub struct BudgetMonthQuery {
    /// Four digit year
    #[param(value_type = i32, example = 2025)]
    pub year: Option<String>,
    /// Month, 1-12
    #[param(value_type = i32, example = 3)]
    pub month: Option<String>,
}

impl BudgetMonthQuery {
    /// Parse into `(year, month)`, rejecting missing, non-numeric or out-of-range values.
    pub fn parse(&self) -> Result<(i32, i32), AppError> {
        let (Some(year), Some(month)) = (self.year.as_deref(), self.month.as_deref()) else {
            return Err(AppError::ValidationError(
                "year and month query parameters are required".to_string(),
            ));
        };
        if year.is_empty() || month.is_empty() {
            return Err(AppError::ValidationError(
                "year and month query parameters are required".to_string(),
            ));
        }

        let year: i32 = year
            .trim()
            .parse()
            .map_err(|_| AppError::ValidationError("invalid year parameter".to_string()))?;
        let month: i32 = month
            .trim()
            .parse()
            .map_err(|_| AppError::ValidationError("invalid month parameter".to_string()))?;

        if !(1..=12).contains(&month) {
            return Err(AppError::ValidationError(
                "month must be between 1 and 12".to_string(),
            ));
        }

        Ok((year, month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal")
    }

    fn expense(amount: Decimal) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            budget_id: Uuid::nil(),
            title: "x".to_string(),
            amount,
            created_at: Utc::now(),
        }
    }

    fn query(year: Option<&str>, month: Option<&str>) -> BudgetMonthQuery {
        BudgetMonthQuery {
            year: year.map(str::to_string),
            month: month.map(str::to_string),
        }
    }

    #[test]
    fn test_remaining_without_income_is_none() {
        assert_eq!(remaining(None, &[expense(dec("10"))]).ok(), Some(None));
    }

    #[test]
    fn test_remaining_subtracts_all_expenses() {
        let expenses = [expense(dec("120.50")), expense(dec("79.50"))];
        assert_eq!(
            remaining(Some(dec("1000")), &expenses).ok(),
            Some(Some(dec("800.00")))
        );
    }

    #[test]
    fn test_remaining_can_go_negative() {
        let expenses = [expense(dec("150"))];
        assert_eq!(remaining(Some(dec("100")), &expenses).ok(), Some(Some(dec("-50"))));
    }

    #[test]
    fn test_remaining_with_no_expenses_equals_income() {
        assert_eq!(remaining(Some(dec("0")), &[]).ok(), Some(Some(Decimal::ZERO)));
    }

    #[test]
    fn test_remaining_overflow_is_an_error() {
        let huge = dec("50000000000000000000000000000");
        let expenses = [expense(huge), expense(huge)];
        match remaining(Some(Decimal::ZERO), &expenses) {
            Err(AppError::ValidationError(msg)) => {
                assert_eq!(msg, "budget totals are out of range")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
        assert_eq!(month_name(-1), None);
    }

    #[test]
    fn test_query_parse() {
        assert_eq!(query(Some("2025"), Some("3")).parse().ok(), Some((2025, 3)));

        for (year, month, expected) in [
            (None, Some("3"), "year and month query parameters are required"),
            (Some("2025"), Some(""), "year and month query parameters are required"),
            (Some("abc"), Some("3"), "invalid year parameter"),
            (Some("2025"), Some("march"), "invalid month parameter"),
            (Some("2025"), Some("13"), "month must be between 1 and 12"),
            (Some("2025"), Some("0"), "month must be between 1 and 12"),
        ] {
            match query(year, month).parse() {
                Err(AppError::ValidationError(msg)) => assert_eq!(msg, expected),
                other => panic!("unexpected result for {year:?}/{month:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_base_income_validation() {
        let ok = BaseIncomeDto {
            amount: dec("0"),
            year: 2025,
            month: 12,
        };
        assert!(ok.validate().is_ok());

        let negative = BaseIncomeDto {
            amount: dec("-1"),
            year: 2025,
            month: 1,
        };
        assert!(negative.validate().is_err());

        let too_large = BaseIncomeDto {
            amount: dec("1000000000000"),
            year: 2025,
            month: 1,
        };
        let err = too_large.validate().expect_err("above the cap");
        assert!(err.to_string().contains("amount cannot exceed 999999999999.99"));

        let bad_month = BaseIncomeDto {
            amount: dec("10"),
            year: 2025,
            month: 13,
        };
        let err = bad_month.validate().expect_err("month 13 should fail");
        assert!(err.to_string().contains("valid year and month are required"));
    }

    #[test]
    fn test_budget_response_serializes_numbers() {
        let budget = MonthlyBudget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            year: 2025,
            month: 2,
            base_income: Some(dec("500")),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response =
            BudgetResponse::new(&budget, vec![expense(dec("12.5"))]).expect("Should build");
        let json = serde_json::to_value(&response).expect("Should serialize");

        assert_eq!(json["monthName"], "February");
        assert_eq!(json["baseIncome"], 500.0);
        assert_eq!(json["remaining"], 487.5);
        assert_eq!(json["expenses"][0]["amount"], 12.5);
    }

    #[test]
    fn test_budget_response_null_income() {
        let budget = MonthlyBudget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            year: 2025,
            month: 7,
            base_income: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = BudgetResponse::new(&budget, Vec::new()).expect("Should build");
        let json = serde_json::to_value(response).expect("Should serialize");

        assert!(json["baseIncome"].is_null());
        assert!(json["remaining"].is_null());
        assert_eq!(json["expenses"], serde_json::json!([]));
    }
}
