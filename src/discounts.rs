//! Discounts

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculate a percentage of a minor unit amount, rounded midpoint away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result can't be represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // the underlying Decimal isn't exposed
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Calculate a percentage of an amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result can't be represented.
pub fn percent_of<'a>(
    percent: &Percentage,
    amount: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let minor = percent_of_minor(percent, amount.to_minor_units())?;

    Ok(Money::from_minor(minor, amount.currency()))
}

/// The smaller of two amounts in the same currency.
///
/// # Errors
///
/// Returns [`DiscountError::Money`] if the currencies differ.
pub fn min_amount<'a>(
    left: Money<'a, Currency>,
    right: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    if left.currency() != right.currency() {
        return Err(DiscountError::Money(MoneyError::CurrencyMismatch {
            expected: left.currency().iso_alpha_code,
            actual: right.currency().iso_alpha_code,
        }));
    }

    Ok(if right.to_minor_units() < left.to_minor_units() {
        right
    } else {
        left
    })
}
