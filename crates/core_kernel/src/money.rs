//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//! The portal operates in Naira; other currencies exist for cross-border
//! referral claims.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    NGN,
    USD,
    GBP,
    EUR,
    XOF,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::XOF => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::NGN => "₦",
            Currency::USD => "$",
            Currency::GBP => "£",
            Currency::EUR => "€",
            Currency::XOF => "CFA",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::NGN => "NGN",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
            Currency::EUR => "EUR",
            Currency::XOF => "XOF",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NGN" => Ok(Currency::NGN),
            "USD" => Ok(Currency::USD),
            "GBP" => Ok(Currency::GBP),
            "EUR" => Ok(Currency::EUR),
            "XOF" => Ok(Currency::XOF),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("Division by zero")]
    DivisionByZero,
}

/// A monetary amount with associated currency
///
/// Money uses rust_decimal for precise arithmetic without floating-point
/// errors. Amounts are stored with 4 decimal places internally so that
/// quantity × unit-cost products keep their precision until the final
/// round to currency places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates a Naira amount, the portal's default currency
    pub fn ngn(amount: Decimal) -> Self {
        Self::new(amount, Currency::NGN)
    }

    /// Creates Money from an integer amount in minor units (e.g., kobo)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        let divisor = Decimal::new(10_i64.pow(currency.decimal_places()), 0);
        Self::new(Decimal::new(minor_units, 0) / divisor, currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self {
            amount: self.amount.abs(),
            currency: self.currency,
        }
    }

    /// Rounds to the currency's standard decimal places
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp(self.currency.decimal_places()),
            currency: self.currency,
        }
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount - other.amount, self.currency))
    }

    /// Multiplies by a scalar (e.g., quantity on a claim line)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }

    /// Divides by a scalar (e.g., for group-mean calculations)
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Self::new(self.amount / divisor, self.currency))
    }

    /// Sums an iterator of amounts in the given currency
    ///
    /// Returns an error if any element carries a different currency. An
    /// empty iterator sums to zero.
    pub fn sum<'a, I>(amounts: I, currency: Currency) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        let mut total = Money::zero(currency);
        for amount in amounts {
            total = total.checked_add(amount)?;
        }
        Ok(total)
    }

    /// Signed percentage deviation of this amount from a baseline
    ///
    /// Returns `(self - baseline) / baseline × 100`. Positive means this
    /// amount exceeds the baseline. Used by cost-variance checks against
    /// group means and standard tariffs.
    ///
    /// # Errors
    ///
    /// Returns an error on currency mismatch or a zero baseline.
    pub fn percent_deviation_from(&self, baseline: &Money) -> Result<Decimal, MoneyError> {
        if self.currency != baseline.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                baseline.currency.to_string(),
            ));
        }
        if baseline.amount.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok((self.amount - baseline.amount) / baseline.amount * dec!(100))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.amount,
            dp = dp as usize
        )
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in Money::sub")
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let m = Money::ngn(dec!(45000.50));
        assert_eq!(m.amount(), dec!(45000.50));
        assert_eq!(m.currency(), Currency::NGN);
    }

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(4500050, Currency::NGN);
        assert_eq!(m.amount(), dec!(45000.50));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::ngn(dec!(30000));
        let b = Money::ngn(dec!(12500));

        assert_eq!((a + b).amount(), dec!(42500));
        assert_eq!((a - b).amount(), dec!(17500));
    }

    #[test]
    fn test_currency_mismatch() {
        let ngn = Money::ngn(dec!(100.00));
        let usd = Money::new(dec!(100.00), Currency::USD);

        let result = ngn.checked_add(&usd);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_currency_parses_from_code() {
        assert_eq!("NGN".parse::<Currency>().unwrap(), Currency::NGN);
        assert_eq!("ngn".parse::<Currency>().unwrap(), Currency::NGN);
        assert!(matches!(
            "ZZZ".parse::<Currency>(),
            Err(MoneyError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn test_money_sum() {
        let amounts = vec![
            Money::ngn(dec!(1000)),
            Money::ngn(dec!(2500)),
            Money::ngn(dec!(499.99)),
        ];

        let total = Money::sum(amounts.iter(), Currency::NGN).unwrap();
        assert_eq!(total.amount(), dec!(3999.99));
    }

    #[test]
    fn test_money_sum_empty_is_zero() {
        let none: [Money; 0] = [];
        let total = Money::sum(none.iter(), Currency::NGN).unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn test_percent_deviation_above_baseline() {
        let cost = Money::ngn(dec!(150));
        let baseline = Money::ngn(dec!(100));

        let deviation = cost.percent_deviation_from(&baseline).unwrap();
        assert_eq!(deviation, dec!(50));
    }

    #[test]
    fn test_percent_deviation_below_baseline() {
        let cost = Money::ngn(dec!(40));
        let baseline = Money::ngn(dec!(100));

        let deviation = cost.percent_deviation_from(&baseline).unwrap();
        assert_eq!(deviation, dec!(-60));
    }

    #[test]
    fn test_percent_deviation_zero_baseline() {
        let cost = Money::ngn(dec!(40));
        let baseline = Money::zero(Currency::NGN);

        assert_eq!(
            cost.percent_deviation_from(&baseline),
            Err(MoneyError::DivisionByZero)
        );
    }

    #[test]
    fn test_xof_has_no_minor_unit() {
        let m = Money::new(dec!(1234.56), Currency::XOF);
        assert_eq!(m.round_to_currency().amount(), dec!(1235));
    }
}
