//! Catalog
//!
//! A tenant's products, stored in a [`SlotMap`] and indexed by their storefront id.

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::SlotMap;
use thiserror::Error;

use crate::products::{Product, ProductId, ProductKey};

/// Errors related to catalog construction and lookups.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A product with this id was already inserted.
    #[error("duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    /// A product is priced in a currency other than the catalog currency (product, found, expected).
    #[error("product {0} is priced in {1}, but catalog uses {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// No product with this id exists.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// No product exists for this key.
    #[error("missing product for key {0:?}")]
    MissingProduct(ProductKey),
}

/// Product catalog
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    ids: FxHashMap<ProductId, ProductKey>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: SlotMap::with_key(),
            ids: FxHashMap::default(),
            currency,
        }
    }

    /// Insert a product, returning its key.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::DuplicateProduct`]: a product with the same id already exists.
    /// - [`CatalogError::CurrencyMismatch`]: any of the product's prices use another currency.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        if self.ids.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }

        self.ensure_currency(&product)?;

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.ids.insert(id, key);

        Ok(key)
    }

    /// Get a product by key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingProduct`] if the key is not in this catalog.
    pub fn get(&self, key: ProductKey) -> Result<&Product<'a>, CatalogError> {
        self.products
            .get(key)
            .ok_or(CatalogError::MissingProduct(key))
    }

    /// Resolve a product id to its key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if no product has this id.
    pub fn key_for(&self, id: &str) -> Result<ProductKey, CatalogError> {
        self.ids
            .get(id)
            .copied()
            .ok_or_else(|| CatalogError::ProductNotFound(ProductId::new(id)))
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if no product has this id.
    pub fn get_by_id(&self, id: &str) -> Result<&Product<'a>, CatalogError> {
        self.get(self.key_for(id)?)
    }

    /// Iterate over all products.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products.iter()
    }

    /// Number of products
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Catalog currency
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn ensure_currency(&self, product: &Product<'a>) -> Result<(), CatalogError> {
        let promotion = product.promotion.map(|promotion| promotion.price());
        let variants = product.variants.iter().map(|variant| variant.price_adjustment);

        [product.price]
            .into_iter()
            .chain(product.price_b2b)
            .chain(product.price_b2c)
            .chain(promotion)
            .chain(product.compare_at_price)
            .chain(variants)
            .try_for_each(|price| {
                let currency = price.currency();

                if currency == self.currency {
                    Ok(())
                } else {
                    Err(CatalogError::CurrencyMismatch(
                        product.id.clone(),
                        currency.iso_alpha_code,
                        self.currency.iso_alpha_code,
                    ))
                }
            })
    }
}
