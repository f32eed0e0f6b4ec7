//! Coupon Validation

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    catalog::Catalog,
    coupons::{Coupon, CouponBook, CouponError, CouponKind, Redemptions},
    customers::CustomerId,
    products::ProductId,
};

/// Coupon validation input, as sent by the storefront at checkout.
#[derive(Debug, Clone)]
pub struct ValidationRequest<'a> {
    /// Code entered by the customer
    pub code: String,

    /// Order total the minimum order value is checked against
    pub order_total: Money<'a, Currency>,

    /// Products in the order
    pub product_ids: Vec<ProductId>,

    /// Customer placing the order; anonymous orders skip per-customer limits
    pub customer: Option<CustomerId>,
}

/// Validates coupon codes against a tenant's coupons, catalog and usage counters.
#[derive(Debug)]
pub struct CouponValidator<'v, 'a, R: Redemptions> {
    coupons: &'v CouponBook<'a>,
    catalog: &'v Catalog<'a>,
    redemptions: &'v R,
}

impl<'v, 'a, R: Redemptions> CouponValidator<'v, 'a, R> {
    /// Create a validator.
    pub fn new(coupons: &'v CouponBook<'a>, catalog: &'v Catalog<'a>, redemptions: &'v R) -> Self {
        Self {
            coupons,
            catalog,
            redemptions,
        }
    }

    /// Validate a coupon code for an order at `now`.
    ///
    /// Checks run in a fixed order and the first failure is returned: existence, active
    /// flag, validity window, minimum order, global usage, per-customer usage, and finally
    /// whether any ordered product is covered by the coupon's scope.
    ///
    /// # Errors
    ///
    /// Returns the [`CouponError`] for the first check that fails.
    #[tracing::instrument(
        name = "coupons.validate",
        skip_all,
        fields(code = %request.code, products = request.product_ids.len())
    )]
    pub fn validate(
        &self,
        request: &ValidationRequest<'_>,
        now: Timestamp,
    ) -> Result<&'v Coupon<'a>, CouponError> {
        let result = self.check(request, now);

        match &result {
            Ok(coupon) => debug!(kind = coupon.kind.as_str(), "coupon accepted"),
            Err(error) => debug!(%error, "coupon rejected"),
        }

        result
    }

    fn check(
        &self,
        request: &ValidationRequest<'_>,
        now: Timestamp,
    ) -> Result<&'v Coupon<'a>, CouponError> {
        let coupons = self.coupons;

        let coupon = coupons
            .get(&request.code)
            .ok_or_else(|| CouponError::NotFound(request.code.clone()))?;

        if !coupon.active {
            return Err(CouponError::Inactive(coupon.code.clone()));
        }

        if let Some(starts_at) = coupon.starts_at
            && now < starts_at
        {
            return Err(CouponError::NotYetValid {
                code: coupon.code.clone(),
                starts_at,
            });
        }

        if let Some(ends_at) = coupon.ends_at
            && now > ends_at
        {
            return Err(CouponError::Expired {
                code: coupon.code.clone(),
                ends_at,
            });
        }

        if let Some(minimum) = coupon.minimum_order
            && request.order_total.to_minor_units() < minimum.to_minor_units()
        {
            return Err(CouponError::BelowMinimum {
                code: coupon.code.clone(),
                minimum: minimum.to_string(),
                order_total: request.order_total.to_string(),
            });
        }

        if let Some(limit) = coupon.usage_limit
            && self.redemptions.total(&coupon.code) >= limit
        {
            return Err(CouponError::UsageLimitReached(coupon.code.clone()));
        }

        if let (Some(limit), Some(customer)) = (coupon.per_customer_limit, &request.customer)
            && self.redemptions.by_customer(&coupon.code, customer) >= limit
        {
            return Err(CouponError::CustomerLimitReached(coupon.code.clone()));
        }

        if !self.covers_any(coupon, &request.product_ids) {
            return Err(CouponError::NotApplicable(coupon.code.clone()));
        }

        Ok(coupon)
    }

    fn covers_any(&self, coupon: &Coupon<'a>, product_ids: &[ProductId]) -> bool {
        product_ids.iter().any(|id| match self.catalog.get_by_id(id.as_str()) {
            Ok(product) => coupon.scope.covers(product),
            Err(error) => {
                warn!(%error, "ignoring unknown product in coupon validation");
                false
            }
        })
    }
}

/// Coupon details returned to the storefront.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponSummary {
    /// Coupon code
    pub code: String,

    /// `percentage`, `fixed_amount` or `free_shipping`
    #[serde(rename = "type")]
    pub kind: &'static str,

    /// Percentage points or decimal amount; absent for free shipping
    pub value: Option<String>,

    /// Minimum order value as a decimal amount
    pub minimum_order_value: Option<String>,

    /// Maximum discount as a decimal amount
    pub maximum_discount: Option<String>,
}

impl From<&Coupon<'_>> for CouponSummary {
    fn from(coupon: &Coupon<'_>) -> Self {
        let value = match coupon.kind {
            CouponKind::Percentage(percent) => Some(
                ((percent * Decimal::ONE) * Decimal::ONE_HUNDRED)
                    .normalize()
                    .to_string(),
            ),
            CouponKind::FixedAmount(amount) => Some(amount.amount().to_string()),
            CouponKind::FreeShipping => None,
        };

        Self {
            code: coupon.code.to_string(),
            kind: coupon.kind.as_str(),
            value,
            minimum_order_value: coupon
                .minimum_order
                .map(|minimum| minimum.amount().to_string()),
            maximum_discount: coupon
                .maximum_discount
                .map(|maximum| maximum.amount().to_string()),
        }
    }
}

/// Response body for coupon validation requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    /// Whether the coupon can be used
    pub is_valid: bool,

    /// The coupon, when valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<CouponSummary>,

    /// Why the coupon was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResponse {
    /// Build a response from a validation result.
    #[must_use]
    pub fn from_result(result: &Result<&Coupon<'_>, CouponError>) -> Self {
        match result {
            Ok(coupon) => Self {
                is_valid: true,
                coupon: Some(CouponSummary::from(*coupon)),
                error: None,
            },
            Err(error) => Self {
                is_valid: false,
                coupon: None,
                error: Some(error.to_string()),
            },
        }
    }
}
