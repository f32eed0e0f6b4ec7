//! Coupon Discount Calculation

use rusty_money::{Money, MoneyError, iso::Currency};

use crate::{
    coupons::{Coupon, CouponKind},
    discounts::{DiscountError, min_amount, percent_of},
};

/// Amounts a coupon takes off an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouponDiscount<'a> {
    items: Money<'a, Currency>,
    shipping: Money<'a, Currency>,
}

impl<'a> CouponDiscount<'a> {
    /// Discount on merchandise
    #[must_use]
    pub fn items(&self) -> Money<'a, Currency> {
        self.items
    }

    /// Discount on shipping
    #[must_use]
    pub fn shipping(&self) -> Money<'a, Currency> {
        self.shipping
    }

    /// Combined discount
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the amounts use different currencies.
    pub fn total(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.items.add(self.shipping)
    }
}

/// Calculate a validated coupon's discount.
///
/// `eligible_subtotal` is the merchandise subtotal of the products the coupon covers.
/// Item discounts are capped by the coupon's maximum discount and never exceed the
/// eligible subtotal; free shipping coupons waive `shipping` in full.
///
/// # Errors
///
/// - [`DiscountError::PercentConversion`]: the percentage can't be represented in minor units.
/// - [`DiscountError::Money`]: amounts use different currencies.
pub fn calculate_discount<'a>(
    coupon: &Coupon<'a>,
    eligible_subtotal: Money<'a, Currency>,
    shipping: Money<'a, Currency>,
) -> Result<CouponDiscount<'a>, DiscountError> {
    let zero = Money::from_minor(0, eligible_subtotal.currency());

    let (items, shipping) = match coupon.kind {
        CouponKind::Percentage(percent) => (percent_of(&percent, eligible_subtotal)?, zero),
        CouponKind::FixedAmount(amount) => (amount, zero),
        CouponKind::FreeShipping => (zero, shipping),
    };

    let items = match coupon.maximum_discount {
        Some(maximum) if !matches!(coupon.kind, CouponKind::FreeShipping) => {
            min_amount(items, maximum)?
        }
        _ => items,
    };

    let items = min_amount(items, eligible_subtotal)?;

    let items = if items.to_minor_units() < 0 {
        zero
    } else {
        items
    };

    Ok(CouponDiscount { items, shipping })
}
