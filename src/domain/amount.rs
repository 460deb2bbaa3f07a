//! Amount type
//!
//! Domain primitive for the value moved by a transfer.
//! An `Amount` is validated at construction, so a transfer never sees a
//! zero, negative or over-precise value.

use rust_decimal::Decimal;
use std::fmt;

/// Maximum amount accepted for a single transfer (1 trillion)
const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Maximum decimal places (matches NUMERIC(28,8) in the ledger tables)
pub const MAX_SCALE: u32 = 8;

/// Exclusive upper bound on the magnitude of any stored balance (10^20,
/// the integer range of NUMERIC(28,8))
pub const BALANCE_LIMIT: i128 = 100_000_000_000_000_000_000;

/// Whether `balance` fits the balance columns without rounding or overflow
pub fn is_storable_balance(balance: Decimal) -> bool {
    balance.normalize().scale() <= MAX_SCALE
        && balance.abs() < Decimal::from_i128_with_scale(BALANCE_LIMIT, 0)
}

/// Amount represents a validated, strictly positive monetary value.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Maximum 8 decimal places
/// - Maximum value is 1 trillion
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use money_transfer::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(4000, 2)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(40, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if more than 8 decimal places
    /// - `AmountError::Overflow` if value > 1 trillion
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        // Trailing zeros ("40.000000000") are not extra precision
        let normalized = value.normalize();
        if normalized.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(normalized.scale()));
        }

        if value > Decimal::from(MAX_AMOUNT) {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Whether `balance` covers this amount. Exhausting the balance is allowed.
    pub fn is_covered_by(&self, balance: Decimal) -> bool {
        balance >= self.0
    }

    /// Balance left after taking this amount out of `balance`.
    ///
    /// No sign check: sufficiency is decided by the caller. `None` when the
    /// result would not fit a balance column.
    pub fn debit(&self, balance: Decimal) -> Option<Decimal> {
        balance
            .checked_sub(self.0)
            .filter(|b| is_storable_balance(*b))
    }

    /// Balance after adding this amount to `balance`; `None` when the
    /// result would not fit a balance column.
    pub fn credit(&self, balance: Decimal) -> Option<Decimal> {
        balance
            .checked_add(self.0)
            .filter(|b| is_storable_balance(*b))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(40.00)).unwrap();
        assert_eq!(amount.value(), dec!(40));
    }

    #[test]
    fn test_amount_zero_rejected() {
        let amount = Amount::new(Decimal::ZERO);
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        let amount = Amount::new(dec!(-5));
        assert_eq!(amount, Err(AmountError::NotPositive(dec!(-5))));
    }

    #[test]
    fn test_amount_too_many_decimals() {
        // 0.123456789 has 9 decimal places
        let amount = Amount::new(Decimal::new(123456789, 9));
        assert!(matches!(amount, Err(AmountError::TooManyDecimals(9))));
    }

    #[test]
    fn test_amount_trailing_zeros_are_not_precision() {
        let amount = Amount::new(Decimal::new(40_000_000_000, 9));
        assert!(amount.is_ok());
    }

    #[test]
    fn test_amount_overflow() {
        let amount = Amount::new(dec!(1000000000000.01));
        assert!(matches!(amount, Err(AmountError::Overflow)));

        assert!(Amount::new(dec!(1000000000000)).is_ok());
    }

    #[test]
    fn test_storable_balance_bounds() {
        assert!(is_storable_balance(dec!(0)));
        assert!(is_storable_balance(dec!(-12.5)));
        assert!(is_storable_balance(dec!(99999999999999999999.99999999)));
        assert!(is_storable_balance(dec!(1.123456780000)));

        assert!(!is_storable_balance(dec!(100000000000000000000)));
        assert!(!is_storable_balance(dec!(0.123456789012)));
        assert!(!is_storable_balance(Decimal::MAX));
    }

    #[test]
    fn test_is_covered_by_allows_exact_balance() {
        let amount = Amount::new(dec!(20)).unwrap();
        assert!(amount.is_covered_by(dec!(20)));
        assert!(amount.is_covered_by(dec!(20.01)));
        assert!(!amount.is_covered_by(dec!(19.99)));
    }

    #[test]
    fn test_debit_and_credit() {
        let amount = Amount::new(dec!(40)).unwrap();
        assert_eq!(amount.debit(dec!(100.0)), Some(dec!(60.0)));
        assert_eq!(amount.credit(dec!(10.0)), Some(dec!(50.0)));
    }

    #[test]
    fn test_credit_past_balance_limit() {
        let amount = Amount::new(dec!(1)).unwrap();
        assert_eq!(amount.credit(dec!(99999999999999999999.99999999)), None);
        assert_eq!(amount.credit(Decimal::MAX), None);
    }
}
