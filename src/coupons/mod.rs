//! Coupons
//!
//! Code-based discount rules with eligibility constraints.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{discounts::DiscountError, ids::TypedId};

pub mod discount;
pub mod redemptions;
pub mod scope;
pub mod validation;

pub use discount::{CouponDiscount, calculate_discount};
pub use redemptions::{InMemoryRedemptions, Redemptions};
pub use scope::CouponScope;
pub use validation::{CouponSummary, CouponValidator, ValidationRequest, ValidationResponse};

/// Coupon code. Matching is case sensitive.
pub type CouponCode = TypedId<Coupon<'static>>;

/// Errors raised while validating or applying coupons.
#[derive(Debug, Error, PartialEq)]
pub enum CouponError {
    /// No coupon has this code.
    #[error("coupon {0} not found")]
    NotFound(String),

    /// The coupon has been deactivated.
    #[error("coupon {0} is not active")]
    Inactive(CouponCode),

    /// The coupon's validity window hasn't started yet.
    #[error("coupon {code} is not valid before {starts_at}")]
    NotYetValid {
        /// Coupon code
        code: CouponCode,
        /// Window start
        starts_at: Timestamp,
    },

    /// The coupon's validity window has ended.
    #[error("coupon {code} expired at {ends_at}")]
    Expired {
        /// Coupon code
        code: CouponCode,
        /// Window end
        ends_at: Timestamp,
    },

    /// The order total is below the coupon's minimum.
    #[error("coupon {code} requires a minimum order of {minimum}, order total is {order_total}")]
    BelowMinimum {
        /// Coupon code
        code: CouponCode,
        /// Required minimum, formatted
        minimum: String,
        /// Order total, formatted
        order_total: String,
    },

    /// The coupon has been redeemed as many times as allowed.
    #[error("coupon {0} has reached its usage limit")]
    UsageLimitReached(CouponCode),

    /// The customer has redeemed the coupon as many times as allowed.
    #[error("coupon {0} has reached its usage limit for this customer")]
    CustomerLimitReached(CouponCode),

    /// None of the ordered products are covered by the coupon.
    #[error("coupon {0} does not apply to any product in the order")]
    NotApplicable(CouponCode),

    /// A coupon with this code already exists.
    #[error("duplicate coupon code: {0}")]
    DuplicateCode(CouponCode),

    /// Errors bubbled up from discount calculation.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// What a coupon takes off an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouponKind<'a> {
    /// A percentage of the eligible subtotal (e.g. "10% off")
    Percentage(Percentage),

    /// A fixed amount off the eligible subtotal (e.g. "R$20 off")
    FixedAmount(Money<'a, Currency>),

    /// Shipping is free
    FreeShipping,
}

impl CouponKind<'_> {
    /// Stable name used in API payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage(_) => "percentage",
            Self::FixedAmount(_) => "fixed_amount",
            Self::FreeShipping => "free_shipping",
        }
    }
}

/// Coupon
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon<'a> {
    /// Unique, case-sensitive code
    pub code: CouponCode,

    /// Discount type and value
    pub kind: CouponKind<'a>,

    /// Order total required to use the coupon
    pub minimum_order: Option<Money<'a, Currency>>,

    /// Cap on the item discount
    pub maximum_discount: Option<Money<'a, Currency>>,

    /// Total redemptions allowed
    pub usage_limit: Option<u32>,

    /// Redemptions allowed per customer
    pub per_customer_limit: Option<u32>,

    /// Products the coupon applies to
    pub scope: CouponScope,

    /// Start of validity (inclusive)
    pub starts_at: Option<Timestamp>,

    /// End of validity (inclusive)
    pub ends_at: Option<Timestamp>,

    /// Whether the merchant has the coupon switched on
    pub active: bool,
}

impl<'a> Coupon<'a> {
    /// Create an active coupon with no constraints.
    pub fn new(code: impl Into<CouponCode>, kind: CouponKind<'a>) -> Self {
        Self {
            code: code.into(),
            kind,
            minimum_order: None,
            maximum_discount: None,
            usage_limit: None,
            per_customer_limit: None,
            scope: CouponScope::everything(),
            starts_at: None,
            ends_at: None,
            active: true,
        }
    }

    /// Require a minimum order total
    #[must_use]
    pub fn with_minimum_order(mut self, minimum: Money<'a, Currency>) -> Self {
        self.minimum_order = Some(minimum);
        self
    }

    /// Cap the item discount
    #[must_use]
    pub fn with_maximum_discount(mut self, maximum: Money<'a, Currency>) -> Self {
        self.maximum_discount = Some(maximum);
        self
    }

    /// Limit total redemptions
    #[must_use]
    pub fn with_usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Limit redemptions per customer
    #[must_use]
    pub fn with_per_customer_limit(mut self, limit: u32) -> Self {
        self.per_customer_limit = Some(limit);
        self
    }

    /// Restrict the products the coupon applies to
    #[must_use]
    pub fn with_scope(mut self, scope: CouponScope) -> Self {
        self.scope = scope;
        self
    }

    /// Restrict validity to an inclusive window
    #[must_use]
    pub fn valid_between(mut self, starts_at: Option<Timestamp>, ends_at: Option<Timestamp>) -> Self {
        self.starts_at = starts_at;
        self.ends_at = ends_at;
        self
    }

    /// Switch the coupon off
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Every monetary amount the coupon carries.
    pub fn amounts(&self) -> impl Iterator<Item = Money<'a, Currency>> {
        let fixed = match self.kind {
            CouponKind::FixedAmount(amount) => Some(amount),
            CouponKind::Percentage(_) | CouponKind::FreeShipping => None,
        };

        fixed
            .into_iter()
            .chain(self.minimum_order)
            .chain(self.maximum_discount)
    }
}

/// A tenant's coupons, keyed by code.
#[derive(Debug, Default)]
pub struct CouponBook<'a> {
    coupons: FxHashMap<CouponCode, Coupon<'a>>,
}

impl<'a> CouponBook<'a> {
    /// Create an empty coupon book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            coupons: FxHashMap::default(),
        }
    }

    /// Add a coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::DuplicateCode`] if the code is already taken.
    pub fn insert(&mut self, coupon: Coupon<'a>) -> Result<(), CouponError> {
        if self.coupons.contains_key(&coupon.code) {
            return Err(CouponError::DuplicateCode(coupon.code));
        }

        self.coupons.insert(coupon.code.clone(), coupon);

        Ok(())
    }

    /// Look up a coupon by its exact code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Coupon<'a>> {
        self.coupons.get(code)
    }

    /// Iterate over all coupons.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon<'a>> {
        self.coupons.values()
    }

    /// Number of coupons
    #[must_use]
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether there are no coupons
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn lookup_is_case_sensitive() -> TestResult {
        let mut book = CouponBook::new();

        book.insert(Coupon::new("FRETEGRATIS", CouponKind::FreeShipping))?;

        assert!(book.get("FRETEGRATIS").is_some());
        assert!(book.get("fretegratis").is_none());

        Ok(())
    }

    #[test]
    fn duplicate_codes_are_rejected() -> TestResult {
        let mut book = CouponBook::new();

        book.insert(Coupon::new("FRETEGRATIS", CouponKind::FreeShipping))?;

        let result = book.insert(Coupon::new("FRETEGRATIS", CouponKind::FreeShipping));

        assert_eq!(
            result,
            Err(CouponError::DuplicateCode(CouponCode::new("FRETEGRATIS")))
        );
        assert_eq!(book.len(), 1);

        Ok(())
    }

    #[test]
    fn kind_names_match_api_payloads() {
        assert_eq!(
            CouponKind::Percentage(Percentage::from(0.1)).as_str(),
            "percentage"
        );
        assert_eq!(CouponKind::FreeShipping.as_str(), "free_shipping");
    }
}
