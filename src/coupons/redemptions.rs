//! Coupon Redemptions
//!
//! Usage counters consulted when validating global and per-customer coupon limits.

use rustc_hash::FxHashMap;

use crate::{coupons::CouponCode, customers::CustomerId};

/// Source of coupon usage counts.
pub trait Redemptions {
    /// Times the coupon has been redeemed by anyone.
    fn total(&self, code: &CouponCode) -> u32;

    /// Times the coupon has been redeemed by `customer`.
    fn by_customer(&self, code: &CouponCode, customer: &CustomerId) -> u32;
}

/// In-memory redemption counters.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRedemptions {
    totals: FxHashMap<CouponCode, u32>,
    customers: FxHashMap<(CouponCode, CustomerId), u32>,
}

impl InMemoryRedemptions {
    /// Create empty counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a redemption, optionally attributed to a customer.
    pub fn record(&mut self, code: &CouponCode, customer: Option<&CustomerId>) {
        let total = self.totals.entry(code.clone()).or_default();
        *total = total.saturating_add(1);

        if let Some(customer) = customer {
            let count = self
                .customers
                .entry((code.clone(), customer.clone()))
                .or_default();

            *count = count.saturating_add(1);
        }
    }
}

impl Redemptions for InMemoryRedemptions {
    fn total(&self, code: &CouponCode) -> u32 {
        self.totals.get(code).copied().unwrap_or_default()
    }

    fn by_customer(&self, code: &CouponCode, customer: &CustomerId) -> u32 {
        self.customers
            .get(&(code.clone(), customer.clone()))
            .copied()
            .unwrap_or_default()
    }
}
