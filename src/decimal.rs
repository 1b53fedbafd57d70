use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

/// decimal places used for every reported monetary amount
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// round a raw decimal to `dp` places, ties to even
pub fn round_half_even(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
}

/// monetary amount, kept at full precision until explicitly rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d)
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str_exact(s)?))
    }

    /// create from integer amount (rupees, dollars, euros)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (paise, cents)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, MONEY_DECIMAL_PLACES))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to specified decimal places, ties to even
    pub fn round_dp(&self, dp: u32) -> Self {
        Money(round_half_even(self.0, dp))
    }

    /// round to the reporting precision
    pub fn round_money(&self) -> Self {
        self.round_dp(MONEY_DECIMAL_PLACES)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// `None` when the sum leaves the representable range
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    pub fn checked_mul(self, factor: Decimal) -> Option<Money> {
        self.0.checked_mul(factor).map(Money)
    }

    /// how many hundreds of principal this amount holds (`amount / 100`)
    pub fn hundreds(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money(self.0 * other)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

/// interest charged per elapsed month, as an amount per 100 units of principal
///
/// a rate of 2 means 2 units of interest per 100 units of principal per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct MonthlyRate(Decimal);

impl MonthlyRate {
    pub const ZERO: MonthlyRate = MonthlyRate(Decimal::ZERO);

    /// create from an amount per 100 per month (e.g. 2 for "2 per 100")
    pub fn per_hundred(d: Decimal) -> Self {
        MonthlyRate(d)
    }

    /// create from a whole amount per 100 per month
    pub fn from_whole(amount: u32) -> Self {
        MonthlyRate(Decimal::from(amount))
    }

    /// get the amount per 100 per month
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for MonthlyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} per 100/month", self.0)
    }
}

impl From<Decimal> for MonthlyRate {
    fn from(d: Decimal) -> Self {
        MonthlyRate::per_hundred(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bankers_rounding() {
        let down = Money::from_str_exact("1.005").unwrap();
        assert_eq!(down.round_money(), Money::from_decimal(dec!(1.00)));

        let up = Money::from_str_exact("1.015").unwrap();
        assert_eq!(up.round_money(), Money::from_decimal(dec!(1.02)));

        let ordinary = Money::from_str_exact("2.376").unwrap();
        assert_eq!(ordinary.round_money().to_string(), "2.38");
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Money::from_minor(12_345), Money::from_decimal(dec!(123.45)));
        assert_eq!(Money::from_minor(100), Money::from_major(1));
    }

    #[test]
    fn test_hundreds() {
        assert_eq!(Money::from_major(10_000).hundreds(), dec!(100));
        assert_eq!(Money::from_major(250).hundreds(), dec!(2.5));
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::from_major(1).is_positive());
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
        assert!(Money::from_major(-1).is_negative());
    }

    #[test]
    fn test_monthly_rate() {
        let rate = MonthlyRate::from_whole(2);
        assert_eq!(rate.as_decimal(), dec!(2));
        assert_eq!(rate.to_string(), "2 per 100/month");
        assert!(MonthlyRate::per_hundred(dec!(-0.5)).is_negative());
    }

    #[test]
    fn test_checked_ops_report_overflow() {
        let huge = Money::from_decimal(Decimal::MAX);
        assert_eq!(huge.checked_add(Money::from_major(1)), None);
        assert_eq!(huge.checked_mul(dec!(2)), None);
        assert_eq!(Money::from_decimal(Decimal::MIN).checked_sub(Money::from_major(1)), None);

        assert_eq!(
            Money::from_major(2).checked_add(Money::from_minor(50)),
            Some(Money::from_decimal(dec!(2.50)))
        );
        assert_eq!(Money::from_major(3).checked_mul(dec!(1.5)), Some(Money::from_decimal(dec!(4.5))));
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [Money::from_major(1), Money::from_minor(50)].into_iter().sum();
        assert_eq!(total, Money::from_decimal(dec!(1.50)));
    }
}
