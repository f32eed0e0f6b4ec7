//! Coupon Scope
//!
//! Which products a coupon discounts. Exclusions always win over inclusions, and a
//! scope with no inclusions covers every product that isn't excluded.

use rustc_hash::FxHashSet;

use crate::products::{CategoryId, Product, ProductId};

/// Product and category sets a coupon applies to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponScope {
    /// Products the coupon applies to. Empty with no categories means "all".
    pub products: FxHashSet<ProductId>,

    /// Categories the coupon applies to.
    pub categories: FxHashSet<CategoryId>,

    /// Products the coupon never applies to.
    pub excluded_products: FxHashSet<ProductId>,

    /// Categories the coupon never applies to.
    pub excluded_categories: FxHashSet<CategoryId>,
}

impl CouponScope {
    /// A scope covering every product.
    #[must_use]
    pub fn everything() -> Self {
        Self::default()
    }

    /// Whether the scope names any products or categories to include.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        !self.products.is_empty() || !self.categories.is_empty()
    }

    /// Whether the coupon applies to `product`.
    #[must_use]
    pub fn covers(&self, product: &Product<'_>) -> bool {
        if self.is_excluded(product) {
            return false;
        }

        if !self.is_restricted() {
            return true;
        }

        self.products.contains(&product.id)
            || product
                .category
                .as_ref()
                .is_some_and(|category| self.categories.contains(category))
    }

    fn is_excluded(&self, product: &Product<'_>) -> bool {
        self.excluded_products.contains(&product.id)
            || product
                .category
                .as_ref()
                .is_some_and(|category| self.excluded_categories.contains(category))
    }
}
