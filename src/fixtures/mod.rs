//! Fixtures
//!
//! Storefront configuration loaded from YAML sets laid out as
//! `<base>/{tenants,products,coupons,carts}/<set>.yml`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, CatalogError},
    coupons::{CouponBook, CouponError, InMemoryRedemptions},
    fixtures::{
        carts::CartFixture, coupons::CouponsFixture, products::ProductsFixture,
        tenants::TenantFixture,
    },
    prices::PriceParseError,
    products::ProductError,
    shipping::ShippingMethod,
    storefront::{Storefront, StorefrontError},
};

pub mod carts;
pub mod coupons;
pub mod products;
pub mod tenants;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error(transparent)]
    Price(#[from] PriceParseError),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Coupon is missing its value
    #[error("Coupon {0} needs a value")]
    InvalidCoupon(String),

    /// Redemption recorded for a coupon the set doesn't define
    #[error("Redemption for unknown coupon {0}")]
    UnknownCoupon(String),

    /// Invalid product data
    #[error(transparent)]
    Product(#[from] ProductError),

    /// Catalog rejected a product
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Coupon book rejected a coupon
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Cart rejected a line
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Storefront rejected its coupons or shipping methods
    #[error(transparent)]
    Storefront(#[from] StorefrontError),
}

/// A storefront, a cart and redemption history loaded from a fixture set.
#[derive(Debug)]
pub struct Fixture<'a> {
    storefront: Storefront<'a>,
    cart: Cart,
    redemptions: InMemoryRedemptions,
}

impl Fixture<'static> {
    /// Load a complete fixture set from `./fixtures`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::load(Path::new("./fixtures"), name)
    }

    /// Load a complete fixture set (tenant, products, coupons and cart with the same name).
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be read or parsed, or if the
    /// data they hold is inconsistent (currency mismatches, unknown products, ...).
    pub fn load(base_path: &Path, name: &str) -> Result<Self, FixtureError> {
        let tenant: TenantFixture = read(base_path, "tenants", name)?;
        let currency = tenant.currency()?;

        let shipping_methods = tenant
            .shipping
            .into_iter()
            .map(ShippingMethod::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut catalog = Catalog::new(currency);
        let products: ProductsFixture = read(base_path, "products", name)?;

        for (id, product) in products.products {
            catalog.insert(product.into_product(id)?)?;
        }

        let mut coupons = CouponBook::new();
        let mut redemptions = InMemoryRedemptions::new();
        let coupon_fixture: CouponsFixture = read(base_path, "coupons", name)?;

        for coupon in coupon_fixture.coupons {
            coupons.insert(coupon.into_coupon()?)?;
        }

        for redemption in coupon_fixture.redemptions {
            if coupons.get(redemption.code.as_str()).is_none() {
                return Err(FixtureError::UnknownCoupon(redemption.code.to_string()));
            }

            for _ in 0..redemption.count {
                redemptions.record(&redemption.code, redemption.customer.as_ref());
            }
        }

        let mut cart = Cart::new();
        let cart_fixture: CartFixture = read(base_path, "carts", name)?;

        for item in cart_fixture.items {
            let key = catalog.key_for(&item.product)?;

            cart.add(&catalog, key, item.variant.map(Into::into), item.quantity)?;
        }

        debug!(
            set = name,
            products = catalog.len(),
            coupons = coupons.len(),
            lines = cart.len(),
            "fixture loaded"
        );

        Ok(Self {
            storefront: Storefront::new(tenant.tenant, catalog, coupons, shipping_methods)?,
            cart,
            redemptions,
        })
    }
}

impl<'a> Fixture<'a> {
    /// The loaded storefront
    pub fn storefront(&self) -> &Storefront<'a> {
        &self.storefront
    }

    /// The loaded cart
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Mutable access to the loaded cart
    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Recorded coupon redemptions
    pub fn redemptions(&self) -> &InMemoryRedemptions {
        &self.redemptions
    }

    /// Mutable access to recorded coupon redemptions
    pub fn redemptions_mut(&mut self) -> &mut InMemoryRedemptions {
        &mut self.redemptions
    }
}

fn read<T: DeserializeOwned>(base_path: &Path, category: &str, name: &str) -> Result<T, FixtureError> {
    let path = base_path.join(category).join(format!("{name}.yml"));
    let contents = fs::read_to_string(&path).map_err(|source| FixtureError::Io { path, source })?;

    Ok(serde_norway::from_str(&contents)?)
}
