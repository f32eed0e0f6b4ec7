//! Prices
//!
//! Parsing of decimal price strings into [`Money`].

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{BRL, Currency, EUR, GBP, USD},
};
use thiserror::Error;

/// Errors raised while parsing prices.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceParseError {
    /// The amount is not a decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The amount can't be represented in minor units.
    #[error("amount out of range: {0}")]
    OutOfRange(String),

    /// The price is not in `AMOUNT CURRENCY` form.
    #[error("expected format 'AMOUNT CURRENCY', got: {0}")]
    InvalidFormat(String),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Look up a supported currency by ISO code.
///
/// # Errors
///
/// Returns [`PriceParseError::UnknownCurrency`] for unsupported codes.
pub fn currency_for(code: &str) -> Result<&'static Currency, PriceParseError> {
    match code {
        "BRL" => Ok(BRL),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        "GBP" => Ok(GBP),
        other => Err(PriceParseError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a decimal amount (e.g. `"199.90"`) in the given currency.
///
/// The amount is rounded to the currency's minor unit, midpoint away from zero.
/// Negative amounts are accepted so variant adjustments can lower a price.
///
/// # Errors
///
/// - [`PriceParseError::InvalidAmount`]: the string is not a decimal number.
/// - [`PriceParseError::OutOfRange`]: the amount overflows minor units.
pub fn parse_amount(
    amount: &str,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PriceParseError> {
    let trimmed = amount.trim();

    let value = trimmed
        .parse::<Decimal>()
        .map_err(|_err| PriceParseError::InvalidAmount(trimmed.to_string()))?;

    let scale = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .ok_or_else(|| PriceParseError::OutOfRange(trimmed.to_string()))?;

    let minor_units = value
        .checked_mul(scale)
        .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| PriceParseError::OutOfRange(trimmed.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse a price string (e.g. `"199.90 BRL"`).
///
/// # Errors
///
/// Returns an error if the string is not in the format `AMOUNT CURRENCY`, if the
/// amount is not a decimal number, or if the currency code is not supported.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, PriceParseError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PriceParseError::InvalidFormat(s.to_string()));
    };

    parse_amount(amount, currency_for(code)?)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_amount_in_minor_units() -> TestResult {
        assert_eq!(parse_amount("199.90", BRL)?, Money::from_minor(19990, BRL));
        assert_eq!(parse_amount("100", BRL)?, Money::from_minor(10000, BRL));
        assert_eq!(parse_amount("-5.50", BRL)?, Money::from_minor(-550, BRL));

        Ok(())
    }

    #[test]
    fn rounds_half_away_from_zero() -> TestResult {
        assert_eq!(parse_amount("0.005", BRL)?, Money::from_minor(1, BRL));
        assert_eq!(parse_amount("0.0049", BRL)?, Money::from_minor(0, BRL));
        assert_eq!(parse_amount("-0.005", BRL)?, Money::from_minor(-1, BRL));

        Ok(())
    }

    #[test]
    fn malformed_amount_is_an_error() {
        assert_eq!(
            parse_amount("12,50", BRL),
            Err(PriceParseError::InvalidAmount("12,50".to_string()))
        );
    }

    #[test]
    fn parse_price_reads_currency() -> TestResult {
        assert_eq!(parse_price("79.90 BRL")?, Money::from_minor(7990, BRL));
        assert_eq!(parse_price("2.50 EUR")?, Money::from_minor(250, EUR));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        assert!(matches!(
            parse_price("79.90BRL"),
            Err(PriceParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_price("79.90 BRL extra"),
            Err(PriceParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        assert_eq!(
            parse_price("1.00 ABC"),
            Err(PriceParseError::UnknownCurrency("ABC".to_string()))
        );
    }
}
