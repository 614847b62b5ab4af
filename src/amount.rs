use rust_decimal::Decimal;
use std::borrow::Cow;
use validator::ValidationError;

/// Largest monetary amount accepted anywhere: 999,999,999,999.99.
/// Mirrored by the CHECK constraints in the schema.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2);

const TOO_LARGE: &str = "amount cannot exceed 999999999999.99";

fn rejection(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Strictly positive and within [`MAX_AMOUNT`]; `message` is reported when not positive.
pub fn check_positive(amount: &Decimal, message: &'static str) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(rejection("amount_must_be_positive", message));
    }
    if *amount > MAX_AMOUNT {
        return Err(rejection("amount_too_large", TOO_LARGE));
    }
    Ok(())
}

/// Zero or more and within [`MAX_AMOUNT`]; `message` is reported when negative.
pub fn check_non_negative(amount: &Decimal, message: &'static str) -> Result<(), ValidationError> {
    if *amount < Decimal::ZERO {
        return Err(rejection("amount_must_be_non_negative", message));
    }
    if *amount > MAX_AMOUNT {
        return Err(rejection("amount_too_large", TOO_LARGE));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal")
    }

    #[test]
    fn test_max_amount_value() {
        assert_eq!(MAX_AMOUNT, dec("999999999999.99"));
    }

    #[test]
    fn test_check_positive() {
        assert!(check_positive(&dec("0.01"), "positive").is_ok());
        assert!(check_positive(&MAX_AMOUNT, "positive").is_ok());

        let err = check_positive(&Decimal::ZERO, "positive").expect_err("zero");
        assert_eq!(err.message.as_deref(), Some("positive"));

        let err = check_positive(&dec("50000000000000000000000000000"), "positive")
            .expect_err("too large");
        assert_eq!(err.code, "amount_too_large");
        assert_eq!(err.message.as_deref(), Some(TOO_LARGE));
    }

    #[test]
    fn test_check_non_negative() {
        assert!(check_non_negative(&Decimal::ZERO, "non-negative").is_ok());
        assert!(check_non_negative(&dec("-0.01"), "non-negative").is_err());
        assert!(check_non_negative(&dec("1000000000000"), "non-negative").is_err());
    }
}
