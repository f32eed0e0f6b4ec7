//! Product Fixtures

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    prices::parse_price,
    products::{Product, PromotionalPrice, RewardPoints, Stock, Variant},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product ID -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Category identifier
    #[serde(default)]
    pub category: Option<String>,

    /// Base price (e.g., "100.00 BRL")
    pub price: String,

    /// Business customer price
    #[serde(default)]
    pub price_b2b: Option<String>,

    /// Retail customer price
    #[serde(default)]
    pub price_b2c: Option<String>,

    /// Time-limited promotional price
    #[serde(default)]
    pub promotion: Option<PromotionFixture>,

    /// "Was" price shown struck through
    #[serde(default)]
    pub compare_at_price: Option<String>,

    /// Units in stock; unlimited when omitted
    #[serde(default)]
    pub stock: Option<u32>,

    /// Reward points per unit
    #[serde(default)]
    pub reward_points: Option<RewardPointsFixture>,

    /// Variants
    #[serde(default)]
    pub variants: Vec<VariantFixture>,
}

/// Promotional price fixture
#[derive(Debug, Deserialize)]
pub struct PromotionFixture {
    /// Promotional price
    pub price: String,

    /// Window start (RFC 3339)
    pub starts_at: Timestamp,

    /// Window end (RFC 3339)
    pub ends_at: Timestamp,
}

/// Reward points fixture
#[derive(Debug, Default, Deserialize)]
pub struct RewardPointsFixture {
    /// Points for business customers
    #[serde(default)]
    pub b2b: u32,

    /// Points for retail customers
    #[serde(default)]
    pub b2c: u32,
}

/// Variant fixture
#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    /// Variant identifier
    pub id: String,

    /// Variant name
    pub name: String,

    /// Price adjustment (e.g., "10.00 BRL" or "-5.00 BRL")
    #[serde(default)]
    pub price_adjustment: Option<String>,
}

impl ProductFixture {
    /// Build the product with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if a price can't be parsed or the promotional window is inverted.
    pub fn into_product(self, id: String) -> Result<Product<'static>, FixtureError> {
        let price = parse_price(&self.price)?;
        let mut product = Product::new(id, self.name, price);

        if let Some(category) = self.category {
            product = product.with_category(category);
        }

        if let Some(b2b) = self.price_b2b {
            product = product.with_b2b_price(parse_price(&b2b)?);
        }

        if let Some(b2c) = self.price_b2c {
            product = product.with_b2c_price(parse_price(&b2c)?);
        }

        if let Some(promotion) = self.promotion {
            product = product.with_promotion(PromotionalPrice::new(
                parse_price(&promotion.price)?,
                promotion.starts_at,
                promotion.ends_at,
            )?);
        }

        if let Some(compare_at) = self.compare_at_price {
            product = product.with_compare_at_price(parse_price(&compare_at)?);
        }

        if let Some(stock) = self.stock {
            product = product.with_stock(Stock::Limited(stock));
        }

        if let Some(points) = self.reward_points {
            product = product.with_reward_points(RewardPoints {
                b2b: points.b2b,
                b2c: points.b2c,
            });
        }

        for variant in self.variants {
            let price_adjustment = match variant.price_adjustment {
                Some(adjustment) => parse_price(&adjustment)?,
                None => rusty_money::Money::from_minor(0, price.currency()),
            };

            product = product.with_variant(Variant {
                id: variant.id.into(),
                name: variant.name,
                price_adjustment,
            });
        }

        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::BRL};
    use testresult::TestResult;

    use crate::{customers::CustomerType, products::ProductError};

    use super::*;

    #[test]
    fn product_fixture_builds_full_product() -> TestResult {
        let yaml = r"
products:
  tenis:
    name: Tênis
    category: calcados
    price: 100.00 BRL
    price_b2b: 85.00 BRL
    promotion:
      price: 80.00 BRL
      starts_at: 2026-01-01T00:00:00Z
      ends_at: 2026-12-31T23:59:59Z
    stock: 5
    reward_points:
      b2c: 10
    variants:
      - id: '44'
        name: '44'
        price_adjustment: 5.00 BRL
";

        let fixture: ProductsFixture = serde_norway::from_str(yaml)?;
        let (id, product) = fixture.products.into_iter().next().ok_or("no product")?;
        let product = product.into_product(id)?;

        assert_eq!(product.id.as_str(), "tenis");
        assert_eq!(product.list_price(CustomerType::B2b), Money::from_minor(8500, BRL));
        assert_eq!(product.list_price(CustomerType::B2c), Money::from_minor(10000, BRL));
        assert_eq!(product.stock, Stock::Limited(5));
        assert_eq!(product.reward_points.b2c, 10);
        assert_eq!(product.variants.len(), 1);

        Ok(())
    }

    #[test]
    fn inverted_promotion_window_is_rejected() -> TestResult {
        let yaml = r"
name: Caneca
price: 50.00 BRL
promotion:
  price: 40.00 BRL
  starts_at: 2026-02-01T00:00:00Z
  ends_at: 2026-01-01T00:00:00Z
";

        let fixture: ProductFixture = serde_norway::from_str(yaml)?;
        let result = fixture.into_product("caneca".to_string());

        assert!(matches!(
            result,
            Err(FixtureError::Product(ProductError::InvalidPromotionWindow { .. }))
        ));

        Ok(())
    }
}
