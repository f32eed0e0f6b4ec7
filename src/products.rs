//! Products

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{customers::CustomerType, ids::TypedId};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Marker for category identifiers.
#[derive(Debug)]
pub enum Category {}

/// Product identifier
pub type ProductId = TypedId<Product<'static>>;

/// Category identifier
pub type CategoryId = TypedId<Category>;

/// Variant identifier
pub type VariantId = TypedId<Variant<'static>>;

/// Errors raised while constructing product data.
#[derive(Debug, Error, PartialEq)]
pub enum ProductError {
    /// Promotional window ends before it starts.
    #[error("promotional window starts at {starts_at} but ends at {ends_at}")]
    InvalidPromotionWindow {
        /// Window start
        starts_at: Timestamp,
        /// Window end
        ends_at: Timestamp,
    },
}

/// Stock availability for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stock {
    /// A fixed number of units is available.
    Limited(u32),

    /// Stock is not tracked.
    Unlimited,
}

impl Stock {
    /// Units available, or `None` when stock is unlimited.
    #[must_use]
    pub fn available(self) -> Option<u32> {
        match self {
            Self::Limited(available) => Some(available),
            Self::Unlimited => None,
        }
    }

    /// Whether at least one unit can be sold.
    #[must_use]
    pub fn is_in_stock(self) -> bool {
        !matches!(self, Self::Limited(0))
    }

    /// Clamp a requested quantity to `[1, available]`.
    ///
    /// Out-of-stock products clamp to zero.
    #[must_use]
    pub fn clamp_quantity(self, requested: u32) -> u32 {
        let requested = requested.max(1);

        match self {
            Self::Limited(available) => requested.min(available),
            Self::Unlimited => requested,
        }
    }
}

/// Reward points earned per unit, by customer type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardPoints {
    /// Points for business customers
    pub b2b: u32,

    /// Points for retail customers
    pub b2c: u32,
}

impl RewardPoints {
    /// Points per unit for the given customer type.
    #[must_use]
    pub fn for_customer(self, customer: CustomerType) -> u32 {
        match customer {
            CustomerType::B2b => self.b2b,
            CustomerType::B2c => self.b2c,
        }
    }
}

/// An alternate price valid within an inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromotionalPrice<'a> {
    price: Money<'a, Currency>,
    starts_at: Timestamp,
    ends_at: Timestamp,
}

impl<'a> PromotionalPrice<'a> {
    /// Create a promotional price.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InvalidPromotionWindow`] when `starts_at` is after `ends_at`.
    pub fn new(
        price: Money<'a, Currency>,
        starts_at: Timestamp,
        ends_at: Timestamp,
    ) -> Result<Self, ProductError> {
        if starts_at > ends_at {
            return Err(ProductError::InvalidPromotionWindow { starts_at, ends_at });
        }

        Ok(Self {
            price,
            starts_at,
            ends_at,
        })
    }

    /// The promotional price
    #[must_use]
    pub fn price(&self) -> Money<'a, Currency> {
        self.price
    }

    /// Window start (inclusive)
    #[must_use]
    pub fn starts_at(&self) -> Timestamp {
        self.starts_at
    }

    /// Window end (inclusive)
    #[must_use]
    pub fn ends_at(&self) -> Timestamp {
        self.ends_at
    }

    /// Whether `now` falls within `[starts_at, ends_at]`.
    #[must_use]
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.starts_at <= now && now <= self.ends_at
    }
}

/// A selectable product variant (size, colour, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Variant<'a> {
    /// Variant identifier
    pub id: VariantId,

    /// Variant name
    pub name: String,

    /// Amount added to (or, when negative, removed from) the unit price
    pub price_adjustment: Money<'a, Currency>,
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product category
    pub category: Option<CategoryId>,

    /// Base price
    pub price: Money<'a, Currency>,

    /// Price for business customers, if it differs from the base price
    pub price_b2b: Option<Money<'a, Currency>>,

    /// Price for retail customers, if it differs from the base price
    pub price_b2c: Option<Money<'a, Currency>>,

    /// Time-limited promotional price
    pub promotion: Option<PromotionalPrice<'a>>,

    /// Reference "was" price shown struck through
    pub compare_at_price: Option<Money<'a, Currency>>,

    /// Stock availability
    pub stock: Stock,

    /// Reward points earned per unit
    pub reward_points: RewardPoints,

    /// Selectable variants
    pub variants: SmallVec<[Variant<'a>; 2]>,
}

impl<'a> Product<'a> {
    /// Create a product with only a base price, unlimited stock and no variants.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            price,
            price_b2b: None,
            price_b2c: None,
            promotion: None,
            compare_at_price: None,
            stock: Stock::Unlimited,
            reward_points: RewardPoints::default(),
            variants: SmallVec::new(),
        }
    }

    /// Set the category
    #[must_use]
    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the business price
    #[must_use]
    pub fn with_b2b_price(mut self, price: Money<'a, Currency>) -> Self {
        self.price_b2b = Some(price);
        self
    }

    /// Set the retail price
    #[must_use]
    pub fn with_b2c_price(mut self, price: Money<'a, Currency>) -> Self {
        self.price_b2c = Some(price);
        self
    }

    /// Set the promotional price
    #[must_use]
    pub fn with_promotion(mut self, promotion: PromotionalPrice<'a>) -> Self {
        self.promotion = Some(promotion);
        self
    }

    /// Set the compare-at price
    #[must_use]
    pub fn with_compare_at_price(mut self, price: Money<'a, Currency>) -> Self {
        self.compare_at_price = Some(price);
        self
    }

    /// Set the stock
    #[must_use]
    pub fn with_stock(mut self, stock: Stock) -> Self {
        self.stock = stock;
        self
    }

    /// Set the reward points
    #[must_use]
    pub fn with_reward_points(mut self, reward_points: RewardPoints) -> Self {
        self.reward_points = reward_points;
        self
    }

    /// Add a variant
    #[must_use]
    pub fn with_variant(mut self, variant: Variant<'a>) -> Self {
        self.variants.push(variant);
        self
    }

    /// Price list entry for a customer type, before promotions.
    ///
    /// Falls back to the base price when no type-specific price is set.
    #[must_use]
    pub fn list_price(&self, customer: CustomerType) -> Money<'a, Currency> {
        let specific = match customer {
            CustomerType::B2b => self.price_b2b,
            CustomerType::B2c => self.price_b2c,
        };

        specific.unwrap_or(self.price)
    }

    /// Find a variant by id.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&Variant<'a>> {
        self.variants.iter().find(|variant| &variant.id == id)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::BRL;
    use testresult::TestResult;

    use super::*;

    fn ts(s: &str) -> Result<Timestamp, jiff::Error> {
        s.parse()
    }

    #[test]
    fn promotion_window_is_inclusive() -> TestResult {
        let promo = PromotionalPrice::new(
            Money::from_minor(8000, BRL),
            ts("2026-10-01T00:00:00Z")?,
            ts("2026-10-31T23:59:59Z")?,
        )?;

        assert!(promo.is_active_at(ts("2026-10-01T00:00:00Z")?));
        assert!(promo.is_active_at(ts("2026-10-31T23:59:59Z")?));
        assert!(!promo.is_active_at(ts("2026-09-30T23:59:59Z")?));
        assert!(!promo.is_active_at(ts("2026-11-01T00:00:00Z")?));

        Ok(())
    }

    #[test]
    fn promotion_window_rejects_reversed_bounds() -> TestResult {
        let starts_at = ts("2026-10-31T00:00:00Z")?;
        let ends_at = ts("2026-10-01T00:00:00Z")?;

        let result = PromotionalPrice::new(Money::from_minor(100, BRL), starts_at, ends_at);

        assert_eq!(
            result,
            Err(ProductError::InvalidPromotionWindow { starts_at, ends_at })
        );

        Ok(())
    }

    #[test]
    fn clamp_quantity_respects_stock_bounds() {
        assert_eq!(Stock::Limited(5).clamp_quantity(0), 1);
        assert_eq!(Stock::Limited(5).clamp_quantity(3), 3);
        assert_eq!(Stock::Limited(5).clamp_quantity(9), 5);
        assert_eq!(Stock::Unlimited.clamp_quantity(900), 900);
        assert_eq!(Stock::Unlimited.clamp_quantity(0), 1);
        assert_eq!(Stock::Limited(0).clamp_quantity(2), 0);
    }

    #[test]
    fn out_of_stock_is_only_limited_zero() {
        assert!(!Stock::Limited(0).is_in_stock());
        assert!(Stock::Limited(1).is_in_stock());
        assert!(Stock::Unlimited.is_in_stock());
    }

    #[test]
    fn list_price_falls_back_to_base_price() {
        let product = Product::new("p-1", "Caneca", Money::from_minor(5000, BRL))
            .with_b2b_price(Money::from_minor(4000, BRL));

        assert_eq!(
            product.list_price(CustomerType::B2b),
            Money::from_minor(4000, BRL)
        );
        assert_eq!(
            product.list_price(CustomerType::B2c),
            Money::from_minor(5000, BRL)
        );
    }

    #[test]
    fn reward_points_by_customer_type() {
        let points = RewardPoints { b2b: 3, b2c: 7 };

        assert_eq!(points.for_customer(CustomerType::B2b), 3);
        assert_eq!(points.for_customer(CustomerType::B2c), 7);
    }

    #[test]
    fn finds_variants_by_id() {
        let product = Product::new("p-1", "Camiseta", Money::from_minor(5000, BRL)).with_variant(
            Variant {
                id: VariantId::new("gg"),
                name: "GG".to_string(),
                price_adjustment: Money::from_minor(500, BRL),
            },
        );

        assert!(product.variant(&VariantId::new("gg")).is_some());
        assert!(product.variant(&VariantId::new("p")).is_none());
    }
}
