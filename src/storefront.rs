//! Storefront
//!
//! Everything a tenant's checkout needs: identity, catalog, coupons and shipping methods.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    catalog::Catalog,
    coupons::{CouponBook, CouponCode},
    shipping::{ShippingMethod, ShippingMethodId},
    tenants::Tenant,
};

/// Errors related to storefront lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorefrontError {
    /// The storefront has no shipping methods configured.
    #[error("storefront has no shipping methods")]
    NoShippingMethods,

    /// No shipping method has this id.
    #[error("shipping method not found: {0}")]
    UnknownShippingMethod(ShippingMethodId),

    /// A coupon amount is in a currency other than the store currency (coupon, found, expected).
    #[error("coupon {0} uses {1}, but the store uses {2}")]
    CouponCurrencyMismatch(CouponCode, &'static str, &'static str),

    /// A shipping amount is in a currency other than the store currency (method, found, expected).
    #[error("shipping method {0} uses {1}, but the store uses {2}")]
    ShippingCurrencyMismatch(ShippingMethodId, &'static str, &'static str),
}

/// A tenant's store.
#[derive(Debug)]
pub struct Storefront<'a> {
    tenant: Tenant,
    catalog: Catalog<'a>,
    coupons: CouponBook<'a>,
    shipping_methods: SmallVec<[ShippingMethod<'a>; 3]>,
}

impl<'a> Storefront<'a> {
    /// Create a storefront.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::CouponCurrencyMismatch`]: a coupon's fixed amount, minimum order or
    ///   maximum discount isn't in the catalog currency.
    /// - [`StorefrontError::ShippingCurrencyMismatch`]: a shipping fee or free-shipping
    ///   threshold isn't in the catalog currency.
    pub fn new(
        tenant: Tenant,
        catalog: Catalog<'a>,
        coupons: CouponBook<'a>,
        shipping_methods: impl IntoIterator<Item = ShippingMethod<'a>>,
    ) -> Result<Self, StorefrontError> {
        let expected = catalog.currency();

        for coupon in coupons.iter() {
            if let Some(found) = foreign_currency(coupon.amounts(), expected) {
                return Err(StorefrontError::CouponCurrencyMismatch(
                    coupon.code.clone(),
                    found,
                    expected.iso_alpha_code,
                ));
            }
        }

        let shipping_methods: SmallVec<[ShippingMethod<'a>; 3]> =
            shipping_methods.into_iter().collect();

        for method in &shipping_methods {
            if let Some(found) = foreign_currency(method.amounts(), expected) {
                return Err(StorefrontError::ShippingCurrencyMismatch(
                    method.id.clone(),
                    found,
                    expected.iso_alpha_code,
                ));
            }
        }

        Ok(Self {
            tenant,
            catalog,
            coupons,
            shipping_methods,
        })
    }

    /// Store identity
    #[must_use]
    pub fn tenant(&self) -> &Tenant {
        &self.tenant
    }

    /// Product catalog
    #[must_use]
    pub fn catalog(&self) -> &Catalog<'a> {
        &self.catalog
    }

    /// Coupons
    #[must_use]
    pub fn coupons(&self) -> &CouponBook<'a> {
        &self.coupons
    }

    /// Configured shipping methods, in display order
    #[must_use]
    pub fn shipping_methods(&self) -> &[ShippingMethod<'a>] {
        &self.shipping_methods
    }

    /// Store currency
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.catalog.currency()
    }

    /// Find a shipping method by id, or the first configured method when `id` is `None`.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::UnknownShippingMethod`]: no method has the requested id.
    /// - [`StorefrontError::NoShippingMethods`]: no id was requested and none are configured.
    pub fn shipping_method(
        &self,
        id: Option<&ShippingMethodId>,
    ) -> Result<&ShippingMethod<'a>, StorefrontError> {
        match id {
            Some(id) => self
                .shipping_methods
                .iter()
                .find(|method| &method.id == id)
                .ok_or_else(|| StorefrontError::UnknownShippingMethod(id.clone())),
            None => self
                .shipping_methods
                .first()
                .ok_or(StorefrontError::NoShippingMethods),
        }
    }
}

/// ISO code of the first amount not in `expected`.
fn foreign_currency<'a>(
    amounts: impl IntoIterator<Item = Money<'a, Currency>>,
    expected: &Currency,
) -> Option<&'static str> {
    amounts
        .into_iter()
        .find(|amount| amount.currency() != expected)
        .map(|amount| amount.currency().iso_alpha_code)
}
