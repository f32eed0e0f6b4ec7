//! Coupon Fixtures

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    coupons::{Coupon, CouponCode, CouponKind, CouponScope},
    customers::CustomerId,
    fixtures::FixtureError,
    prices::parse_price,
};

/// Wrapper for coupons and their recorded redemptions in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Coupon definitions
    pub coupons: Vec<CouponFixture>,

    /// Past redemptions, used to seed usage counters
    #[serde(default)]
    pub redemptions: Vec<RedemptionFixture>,
}

/// Coupon type in YAML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponTypeFixture {
    /// Percentage of the eligible subtotal
    Percentage,

    /// Fixed amount off
    FixedAmount,

    /// Waives shipping
    FreeShipping,
}

/// Coupon fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Coupon code
    pub code: String,

    /// Coupon type
    #[serde(rename = "type")]
    pub kind: CouponTypeFixture,

    /// Percentage ("10%" or "0.10") or amount ("25.00 BRL"); unused for free shipping
    #[serde(default)]
    pub value: Option<String>,

    /// Minimum order value
    #[serde(default)]
    pub minimum_order: Option<String>,

    /// Maximum discount
    #[serde(default)]
    pub maximum_discount: Option<String>,

    /// Total redemptions allowed
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Redemptions allowed per customer
    #[serde(default)]
    pub per_customer_limit: Option<u32>,

    /// Validity start
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// Validity end
    #[serde(default)]
    pub ends_at: Option<Timestamp>,

    /// Active flag
    #[serde(default = "active_by_default")]
    pub active: bool,

    /// Products the coupon applies to
    #[serde(default)]
    pub products: Vec<String>,

    /// Categories the coupon applies to
    #[serde(default)]
    pub categories: Vec<String>,

    /// Products the coupon never applies to
    #[serde(default)]
    pub excluded_products: Vec<String>,

    /// Categories the coupon never applies to
    #[serde(default)]
    pub excluded_categories: Vec<String>,
}

/// A recorded coupon use
#[derive(Debug, Deserialize)]
pub struct RedemptionFixture {
    /// Coupon code
    pub code: CouponCode,

    /// Customer who redeemed it
    #[serde(default)]
    pub customer: Option<CustomerId>,

    /// Number of redemptions
    #[serde(default = "one")]
    pub count: u32,
}

fn active_by_default() -> bool {
    true
}

fn one() -> u32 {
    1
}

/// Parse a percentage string (e.g., "15%" or "0.15").
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPercentage`] if the value is not a decimal between 0% and 100%.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();
    let invalid = || FixtureError::InvalidPercentage(trimmed.to_string());

    let fraction = match trimmed.strip_suffix('%') {
        Some(points) => {
            points
                .trim()
                .parse::<Decimal>()
                .map_err(|_err| invalid())?
                / Decimal::ONE_HUNDRED
        }
        None => trimmed.parse::<Decimal>().map_err(|_err| invalid())?,
    };

    if fraction < Decimal::ZERO || fraction > Decimal::ONE {
        return Err(invalid());
    }

    Ok(Percentage::from(fraction))
}

impl CouponFixture {
    fn value(&self) -> Result<&str, FixtureError> {
        self.value
            .as_deref()
            .ok_or_else(|| FixtureError::InvalidCoupon(self.code.clone()))
    }

    /// Build the coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is missing or malformed, or a price can't be parsed.
    pub fn into_coupon(self) -> Result<Coupon<'static>, FixtureError> {
        let kind = match self.kind {
            CouponTypeFixture::Percentage => CouponKind::Percentage(parse_percentage(self.value()?)?),
            CouponTypeFixture::FixedAmount => CouponKind::FixedAmount(parse_price(self.value()?)?),
            CouponTypeFixture::FreeShipping => CouponKind::FreeShipping,
        };

        let scope = CouponScope {
            products: self.products.into_iter().map(Into::into).collect(),
            categories: self.categories.into_iter().map(Into::into).collect(),
            excluded_products: self.excluded_products.into_iter().map(Into::into).collect(),
            excluded_categories: self
                .excluded_categories
                .into_iter()
                .map(Into::into)
                .collect(),
        };

        let mut coupon = Coupon::new(self.code, kind)
            .with_scope(scope)
            .valid_between(self.starts_at, self.ends_at);

        if let Some(minimum) = self.minimum_order {
            coupon = coupon.with_minimum_order(parse_price(&minimum)?);
        }

        if let Some(maximum) = self.maximum_discount {
            coupon = coupon.with_maximum_discount(parse_price(&maximum)?);
        }

        if let Some(limit) = self.usage_limit {
            coupon = coupon.with_usage_limit(limit);
        }

        if let Some(limit) = self.per_customer_limit {
            coupon = coupon.with_per_customer_limit(limit);
        }

        if !self.active {
            coupon = coupon.deactivated();
        }

        Ok(coupon)
    }
}
