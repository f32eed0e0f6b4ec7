//! Pricing
//!
//! Resolves the price a customer pays for one unit of a product at a point in time:
//! the customer's price list first, then any active promotional price, then the
//! selected variant's adjustment.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    customers::CustomerType,
    products::{Product, ProductId, VariantId},
};

/// Errors that can occur while resolving prices.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The selected variant does not belong to the product.
    #[error("product {product} has no variant {variant}")]
    UnknownVariant {
        /// Product being priced
        product: ProductId,
        /// Requested variant
        variant: VariantId,
    },

    /// The resolved unit price is below zero.
    #[error("product {0} resolves to a negative price")]
    NegativePrice(ProductId),

    /// Line total arithmetic overflowed.
    #[error("price arithmetic overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A resolved unit price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote<'a> {
    list_price: Money<'a, Currency>,
    unit_price: Money<'a, Currency>,
    promotional: bool,
    compare_at_price: Option<Money<'a, Currency>>,
}

impl<'a> PriceQuote<'a> {
    /// Customer price list entry (plus variant adjustment), ignoring promotions.
    #[must_use]
    pub fn list_price(&self) -> Money<'a, Currency> {
        self.list_price
    }

    /// What the customer pays per unit.
    #[must_use]
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// Whether a promotional price was applied.
    #[must_use]
    pub fn is_promotional(&self) -> bool {
        self.promotional
    }

    /// Reference price shown struck through, if the product has one.
    #[must_use]
    pub fn compare_at_price(&self) -> Option<Money<'a, Currency>> {
        self.compare_at_price
    }
}

/// Resolve the unit price of a product for a customer at `now`.
///
/// # Errors
///
/// - [`PricingError::UnknownVariant`]: `variant` is not one of the product's variants.
/// - [`PricingError::NegativePrice`]: a variant adjustment takes the price below zero.
/// - [`PricingError::Money`]: a variant adjustment uses another currency.
pub fn quote<'a>(
    product: &Product<'a>,
    customer: CustomerType,
    now: Timestamp,
    variant: Option<&VariantId>,
) -> Result<PriceQuote<'a>, PricingError> {
    let list_price = product.list_price(customer);

    let (price, promotional) = match product.promotion {
        Some(promotion) if promotion.is_active_at(now) => (promotion.price(), true),
        _ => (list_price, false),
    };

    let (list_price, unit_price) = match variant {
        Some(id) => {
            let adjustment = product
                .variant(id)
                .ok_or_else(|| PricingError::UnknownVariant {
                    product: product.id.clone(),
                    variant: id.clone(),
                })?
                .price_adjustment;

            (list_price.add(adjustment)?, price.add(adjustment)?)
        }
        None => (list_price, price),
    };

    if unit_price.to_minor_units() < 0 {
        return Err(PricingError::NegativePrice(product.id.clone()));
    }

    Ok(PriceQuote {
        list_price,
        unit_price,
        promotional,
        compare_at_price: product.compare_at_price,
    })
}

/// Resolve only the unit price.
///
/// # Errors
///
/// See [`quote`].
pub fn unit_price<'a>(
    product: &Product<'a>,
    customer: CustomerType,
    now: Timestamp,
    variant: Option<&VariantId>,
) -> Result<Money<'a, Currency>, PricingError> {
    quote(product, customer, now, variant).map(|quote| quote.unit_price())
}

/// Multiply a unit price by a quantity.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the total doesn't fit in minor units.
pub fn line_total<'a>(
    unit_price: Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Sum amounts in `currency`.
///
/// # Errors
///
/// Returns a [`MoneyError`] if any amount uses a different currency.
pub fn total_price<'a>(
    amounts: impl IntoIterator<Item = Money<'a, Currency>>,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, MoneyError> {
    amounts
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, amount| acc.add(amount))
}

/// Fraction saved against the compare-at price, for "x% off" badges.
///
/// Returns `None` when there is no compare-at price or it isn't higher than the unit price.
pub fn discount_badge(
    compare_at_price: Option<Money<'_, Currency>>,
    unit_price: Money<'_, Currency>,
) -> Option<Percentage> {
    let compare_minor = compare_at_price?.to_minor_units();
    let unit_minor = unit_price.to_minor_units();

    if compare_minor <= unit_minor {
        return None;
    }

    let saved = Decimal::from_i64(compare_minor.checked_sub(unit_minor)?)?;
    let compare = Decimal::from_i64(compare_minor)?;

    Some(Percentage::from(saved.checked_div(compare)?))
}

/// Reward points earned for `quantity` units.
#[must_use]
pub fn reward_points(product: &Product<'_>, customer: CustomerType, quantity: u32) -> u64 {
    u64::from(product.reward_points.for_customer(customer)).saturating_mul(u64::from(quantity))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{BRL, USD};
    use testresult::TestResult;

    use crate::products::{PromotionalPrice, RewardPoints, Variant};

    use super::*;

    fn ts(s: &str) -> Result<Timestamp, jiff::Error> {
        s.parse()
    }

    fn promoted_product<'a>() -> Result<Product<'a>, Box<dyn std::error::Error>> {
        Ok(
            Product::new("tenis", "Tênis de corrida", Money::from_minor(10000, BRL))
                .with_b2b_price(Money::from_minor(9000, BRL))
                .with_promotion(PromotionalPrice::new(
                    Money::from_minor(8000, BRL),
                    ts("2026-10-01T00:00:00Z")?,
                    ts("2026-10-31T23:59:59Z")?,
                )?),
        )
    }

    #[test]
    fn promotional_price_applies_inside_window() -> TestResult {
        let product = promoted_product()?;
        let quote = quote(&product, CustomerType::B2c, ts("2026-10-16T12:00:00Z")?, None)?;

        assert_eq!(quote.unit_price(), Money::from_minor(8000, BRL));
        assert_eq!(quote.list_price(), Money::from_minor(10000, BRL));
        assert!(quote.is_promotional());

        Ok(())
    }

    #[test]
    fn promotion_overrides_customer_price_list() -> TestResult {
        let product = promoted_product()?;
        let price = unit_price(&product, CustomerType::B2b, ts("2026-10-16T12:00:00Z")?, None)?;

        assert_eq!(price, Money::from_minor(8000, BRL));

        Ok(())
    }

    #[test]
    fn customer_price_list_applies_outside_window() -> TestResult {
        let product = promoted_product()?;
        let now = ts("2026-11-01T00:00:00Z")?;

        let b2b = quote(&product, CustomerType::B2b, now, None)?;
        let b2c = quote(&product, CustomerType::B2c, now, None)?;

        assert_eq!(b2b.unit_price(), Money::from_minor(9000, BRL));
        assert_eq!(b2c.unit_price(), Money::from_minor(10000, BRL));
        assert!(!b2b.is_promotional());

        Ok(())
    }

    #[test]
    fn variant_adjustment_is_added_after_promotion() -> TestResult {
        let product = promoted_product()?.with_variant(Variant {
            id: VariantId::new("44"),
            name: "44".to_string(),
            price_adjustment: Money::from_minor(1500, BRL),
        });

        let quote = quote(
            &product,
            CustomerType::B2c,
            ts("2026-10-16T12:00:00Z")?,
            Some(&VariantId::new("44")),
        )?;

        assert_eq!(quote.unit_price(), Money::from_minor(9500, BRL));
        assert_eq!(quote.list_price(), Money::from_minor(11500, BRL));

        Ok(())
    }

    #[test]
    fn unknown_variant_is_an_error() -> TestResult {
        let product = promoted_product()?;

        let result = quote(
            &product,
            CustomerType::B2c,
            ts("2026-10-16T12:00:00Z")?,
            Some(&VariantId::new("99")),
        );

        assert_eq!(
            result,
            Err(PricingError::UnknownVariant {
                product: ProductId::new("tenis"),
                variant: VariantId::new("99"),
            })
        );

        Ok(())
    }

    #[test]
    fn negative_resolved_price_is_an_error() -> TestResult {
        let product = Product::new("meia", "Meia", Money::from_minor(1000, BRL)).with_variant(
            Variant {
                id: VariantId::new("kids"),
                name: "Infantil".to_string(),
                price_adjustment: Money::from_minor(-1500, BRL),
            },
        );

        let result = quote(
            &product,
            CustomerType::B2c,
            ts("2026-10-16T12:00:00Z")?,
            Some(&VariantId::new("kids")),
        );

        assert_eq!(result, Err(PricingError::NegativePrice(ProductId::new("meia"))));

        Ok(())
    }

    #[test]
    fn line_total_multiplies_quantity() -> TestResult {
        assert_eq!(
            line_total(Money::from_minor(8000, BRL), 2)?,
            Money::from_minor(16000, BRL)
        );

        Ok(())
    }

    #[test]
    fn line_total_overflow_is_an_error() {
        let result = line_total(Money::from_minor(i64::MAX, BRL), 2);

        assert_eq!(result, Err(PricingError::Overflow));
    }

    #[test]
    fn total_price_sums_amounts() -> TestResult {
        let total = total_price(
            [Money::from_minor(100, BRL), Money::from_minor(250, BRL)],
            BRL,
        )?;

        assert_eq!(total, Money::from_minor(350, BRL));

        Ok(())
    }

    #[test]
    fn total_price_rejects_mixed_currencies() {
        let result = total_price(
            [Money::from_minor(100, BRL), Money::from_minor(250, USD)],
            BRL,
        );

        assert!(result.is_err());
    }

    #[test]
    fn discount_badge_compares_against_compare_at_price() {
        let badge = discount_badge(
            Some(Money::from_minor(10000, BRL)),
            Money::from_minor(7500, BRL),
        );

        assert_eq!(badge, Some(Percentage::from(Decimal::new(25, 2))));
        assert_eq!(discount_badge(None, Money::from_minor(7500, BRL)), None);
        assert_eq!(
            discount_badge(
                Some(Money::from_minor(7500, BRL)),
                Money::from_minor(7500, BRL)
            ),
            None
        );
    }

    #[test]
    fn reward_points_scale_with_quantity() {
        let product = Product::new("p", "P", Money::from_minor(100, BRL))
            .with_reward_points(RewardPoints { b2b: 2, b2c: 5 });

        assert_eq!(reward_points(&product, CustomerType::B2c, 3), 15);
        assert_eq!(reward_points(&product, CustomerType::B2b, 3), 6);
    }
}
