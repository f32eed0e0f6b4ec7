//! Cart

use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError},
    products::{ProductId, ProductKey, VariantId},
};

/// Errors related to cart mutation.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The product has no stock left.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// The selected variant does not belong to the product.
    #[error("product {product} has no variant {variant}")]
    UnknownVariant {
        /// Product being added
        product: ProductId,
        /// Requested variant
        variant: VariantId,
    },

    /// No line exists at this index.
    #[error("cart line {0} not found")]
    LineNotFound(usize),

    /// Errors bubbled up from catalog lookups.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A product (and optional variant) with a quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    product: ProductKey,
    variant: Option<VariantId>,
    quantity: u32,
}

impl CartLine {
    /// Product in this line
    #[must_use]
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Selected variant, if any
    #[must_use]
    pub fn variant(&self) -> Option<&VariantId> {
        self.variant.as_ref()
    }

    /// Quantity, always at least 1
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Shopping cart
#[derive(Debug, Default, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of a product, returning the index of the affected line.
    ///
    /// Adding a product/variant pair that is already in the cart increases that line's
    /// quantity. Quantities are clamped to `[1, stock]`.
    ///
    /// # Errors
    ///
    /// - [`CartError::Catalog`]: the product isn't in the catalog.
    /// - [`CartError::UnknownVariant`]: the variant doesn't belong to the product.
    /// - [`CartError::OutOfStock`]: the product has no stock.
    pub fn add(
        &mut self,
        catalog: &Catalog<'_>,
        product: ProductKey,
        variant: Option<VariantId>,
        quantity: u32,
    ) -> Result<usize, CartError> {
        let details = catalog.get(product)?;

        if let Some(variant) = &variant
            && details.variant(variant).is_none()
        {
            return Err(CartError::UnknownVariant {
                product: details.id.clone(),
                variant: variant.clone(),
            });
        }

        if !details.stock.is_in_stock() {
            return Err(CartError::OutOfStock(details.id.clone()));
        }

        let existing = self
            .lines
            .iter()
            .position(|line| line.product == product && line.variant == variant);

        let (index, requested) = match existing {
            Some(index) => {
                let current = self.get_line(index)?.quantity;

                (index, current.saturating_add(quantity))
            }
            None => {
                self.lines.push(CartLine {
                    product,
                    variant,
                    quantity: 0,
                });

                (self.lines.len() - 1, quantity)
            }
        };

        self.set_quantity(catalog, index, requested)?;

        Ok(index)
    }

    /// Set a line's quantity, clamped to `[1, stock]`. Returns the quantity applied.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`]: no line at `line`.
    /// - [`CartError::Catalog`]: the line's product is no longer in the catalog.
    pub fn set_quantity(
        &mut self,
        catalog: &Catalog<'_>,
        line: usize,
        quantity: u32,
    ) -> Result<u32, CartError> {
        let entry = self
            .lines
            .get_mut(line)
            .ok_or(CartError::LineNotFound(line))?;

        let product = catalog.get(entry.product)?;
        let clamped = product.stock.clamp_quantity(quantity);

        if clamped != quantity {
            debug!(
                product = %product.id,
                requested = quantity,
                applied = clamped,
                "clamped cart quantity"
            );
        }

        entry.quantity = clamped;

        Ok(clamped)
    }

    /// Add one unit to a line, up to the available stock.
    ///
    /// # Errors
    ///
    /// See [`Cart::set_quantity`].
    pub fn increment(&mut self, catalog: &Catalog<'_>, line: usize) -> Result<u32, CartError> {
        let current = self.get_line(line)?.quantity;

        self.set_quantity(catalog, line, current.saturating_add(1))
    }

    /// Remove one unit from a line, never going below one.
    ///
    /// # Errors
    ///
    /// See [`Cart::set_quantity`].
    pub fn decrement(&mut self, catalog: &Catalog<'_>, line: usize) -> Result<u32, CartError> {
        let current = self.get_line(line)?.quantity;

        self.set_quantity(catalog, line, current.saturating_sub(1))
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if there is no line at `line`.
    pub fn remove(&mut self, line: usize) -> Result<CartLine, CartError> {
        if line >= self.lines.len() {
            return Err(CartError::LineNotFound(line));
        }

        Ok(self.lines.remove(line))
    }

    /// Get a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if there is no line at `line`.
    pub fn get_line(&self, line: usize) -> Result<&CartLine, CartError> {
        self.lines.get(line).ok_or(CartError::LineNotFound(line))
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::BRL};
    use testresult::TestResult;

    use crate::products::{Product, Stock, Variant};

    use super::*;

    fn catalog<'a>() -> Result<(Catalog<'a>, ProductKey, ProductKey), CatalogError> {
        let mut catalog = Catalog::new(BRL);

        let limited = catalog.insert(
            Product::new("caneca", "Caneca", Money::from_minor(3990, BRL))
                .with_stock(Stock::Limited(3))
                .with_variant(Variant {
                    id: VariantId::new("azul"),
                    name: "Azul".to_string(),
                    price_adjustment: Money::from_minor(0, BRL),
                }),
        )?;

        let sold_out = catalog.insert(
            Product::new("poster", "Pôster", Money::from_minor(2990, BRL))
                .with_stock(Stock::Limited(0)),
        )?;

        Ok((catalog, limited, sold_out))
    }

    #[test]
    fn add_merges_matching_lines() -> TestResult {
        let (catalog, caneca, _) = catalog()?;
        let mut cart = Cart::new();

        let first = cart.add(&catalog, caneca, None, 1)?;
        let second = cart.add(&catalog, caneca, None, 1)?;

        assert_eq!(first, second);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get_line(0)?.quantity(), 2);

        Ok(())
    }

    #[test]
    fn variants_get_their_own_lines() -> TestResult {
        let (catalog, caneca, _) = catalog()?;
        let mut cart = Cart::new();

        cart.add(&catalog, caneca, None, 1)?;
        cart.add(&catalog, caneca, Some(VariantId::new("azul")), 1)?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_quantity(), 2);

        Ok(())
    }

    #[test]
    fn add_clamps_to_stock() -> TestResult {
        let (catalog, caneca, _) = catalog()?;
        let mut cart = Cart::new();

        cart.add(&catalog, caneca, None, 2)?;
        cart.add(&catalog, caneca, None, 5)?;

        assert_eq!(cart.get_line(0)?.quantity(), 3);

        Ok(())
    }

    #[test]
    fn add_out_of_stock_is_an_error() -> TestResult {
        let (catalog, _, poster) = catalog()?;
        let mut cart = Cart::new();

        let result = cart.add(&catalog, poster, None, 1);

        assert_eq!(result, Err(CartError::OutOfStock(ProductId::new("poster"))));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn add_unknown_variant_is_an_error() -> TestResult {
        let (catalog, caneca, _) = catalog()?;
        let mut cart = Cart::new();

        let result = cart.add(&catalog, caneca, Some(VariantId::new("verde")), 1);

        assert!(matches!(result, Err(CartError::UnknownVariant { .. })));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn quantity_never_leaves_stock_bounds() -> TestResult {
        let (catalog, caneca, _) = catalog()?;
        let mut cart = Cart::new();

        let line = cart.add(&catalog, caneca, None, 1)?;

        assert_eq!(cart.decrement(&catalog, line)?, 1);
        assert_eq!(cart.set_quantity(&catalog, line, 0)?, 1);
        assert_eq!(cart.increment(&catalog, line)?, 2);
        assert_eq!(cart.increment(&catalog, line)?, 3);
        assert_eq!(cart.increment(&catalog, line)?, 3);
        assert_eq!(cart.set_quantity(&catalog, line, 40)?, 3);

        Ok(())
    }

    #[test]
    fn remove_line() -> TestResult {
        let (catalog, caneca, _) = catalog()?;
        let mut cart = Cart::new();

        cart.add(&catalog, caneca, None, 1)?;

        let removed = cart.remove(0)?;

        assert_eq!(removed.product(), caneca);
        assert!(cart.is_empty());
        assert_eq!(cart.remove(0), Err(CartError::LineNotFound(0)));

        Ok(())
    }
}
