//! Checkout
//!
//! Prices a cart against a storefront: resolves unit prices, picks shipping, validates and
//! applies a coupon, and produces a [`Receipt`].

use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::info;

use crate::{
    cart::Cart,
    catalog::CatalogError,
    coupons::{CouponError, CouponValidator, Redemptions, ValidationRequest, calculate_discount},
    customers::{CustomerId, CustomerType},
    discounts::DiscountError,
    pricing::{PricingError, line_total, quote, reward_points, total_price},
    products::ProductId,
    receipt::{AppliedCoupon, Receipt, ReceiptError, ReceiptLine},
    shipping::ShippingMethodId,
    storefront::{Storefront, StorefrontError},
};

/// Errors that can occur while checking out.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Carts need at least one line to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// Wrapped storefront lookup errors.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// Wrapped catalog lookup errors.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Wrapped pricing errors.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapped coupon validation errors.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Wrapped discount calculation errors.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped receipt errors.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// Wrapped money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Who is checking out, when, and with which options.
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    /// Customer price list to use
    pub customer_type: CustomerType,

    /// Identified customer, for per-customer coupon limits
    pub customer: Option<CustomerId>,

    /// Coupon code entered
    pub coupon: Option<String>,

    /// Selected shipping method; the storefront's first method when unset
    pub shipping_method: Option<ShippingMethodId>,

    /// Instant prices and coupon windows are evaluated at
    pub now: Timestamp,
}

impl CheckoutContext {
    /// Anonymous checkout with the default shipping method and no coupon.
    pub fn new(customer_type: CustomerType, now: Timestamp) -> Self {
        Self {
            customer_type,
            customer: None,
            coupon: None,
            shipping_method: None,
            now,
        }
    }

    /// Identify the customer.
    #[must_use]
    pub fn with_customer(mut self, customer: CustomerId) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Apply a coupon code.
    #[must_use]
    pub fn with_coupon(mut self, code: impl Into<String>) -> Self {
        self.coupon = Some(code.into());
        self
    }

    /// Choose a shipping method.
    #[must_use]
    pub fn with_shipping_method(mut self, id: impl Into<ShippingMethodId>) -> Self {
        self.shipping_method = Some(id.into());
        self
    }
}

/// Price `cart` against `storefront`.
///
/// Shipping is charged on the merchandise subtotal before any coupon. A coupon is validated
/// with the subtotal as its order total; percentage coupons apply to the subtotal of the
/// lines the coupon covers.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] for empty carts, or the first pricing, shipping or
/// coupon error encountered.
#[tracing::instrument(
    name = "checkout",
    skip_all,
    fields(
        store = %storefront.tenant().subdomain,
        customer_type = %context.customer_type,
        lines = cart.len(),
    )
)]
pub fn checkout<'a, R: Redemptions>(
    storefront: &Storefront<'a>,
    cart: &Cart,
    redemptions: &R,
    context: &CheckoutContext,
) -> Result<Receipt<'a>, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let catalog = storefront.catalog();
    let currency = storefront.currency();

    let mut lines: SmallVec<[ReceiptLine<'a>; 8]> = SmallVec::with_capacity(cart.len());
    let mut points = 0u64;

    for cart_line in cart.iter() {
        let product = catalog.get(cart_line.product())?;
        let price = quote(product, context.customer_type, context.now, cart_line.variant())?;

        let variant = cart_line
            .variant()
            .and_then(|id| product.variant(id))
            .map(|variant| variant.name.clone());

        points = points.saturating_add(reward_points(
            product,
            context.customer_type,
            cart_line.quantity(),
        ));

        lines.push(ReceiptLine {
            product: cart_line.product(),
            name: product.name.clone(),
            variant,
            quantity: cart_line.quantity(),
            list_price: price.list_price(),
            unit_price: price.unit_price(),
            line_total: line_total(price.unit_price(), cart_line.quantity())?,
            promotional: price.is_promotional(),
            coupon_eligible: false,
        });
    }

    let subtotal = total_price(lines.iter().map(|line| line.line_total), currency)?;
    let method = storefront.shipping_method(context.shipping_method.as_ref())?;
    let shipping = method.cost_for(subtotal);

    let coupon = match &context.coupon {
        Some(code) => Some(apply_coupon(
            storefront,
            &mut lines,
            redemptions,
            context,
            code,
            subtotal,
            shipping,
        )?),
        None => None,
    };

    let receipt = Receipt::new(lines, method.name.clone(), shipping, coupon, points, currency)?;

    info!(
        subtotal = %receipt.subtotal(),
        shipping = %receipt.shipping(),
        total = %receipt.total(),
        coupon = context.coupon.as_deref().unwrap_or_default(),
        "checkout priced"
    );

    Ok(receipt)
}

fn apply_coupon<'a, R: Redemptions>(
    storefront: &Storefront<'a>,
    lines: &mut [ReceiptLine<'a>],
    redemptions: &R,
    context: &CheckoutContext,
    code: &str,
    subtotal: Money<'a, Currency>,
    shipping: Money<'a, Currency>,
) -> Result<AppliedCoupon<'a>, CheckoutError> {
    let catalog = storefront.catalog();

    let product_ids = lines
        .iter()
        .map(|line| catalog.get(line.product).map(|product| product.id.clone()))
        .collect::<Result<Vec<ProductId>, _>>()?;

    let request = ValidationRequest {
        code: code.to_string(),
        order_total: subtotal,
        product_ids,
        customer: context.customer.clone(),
    };

    let validator = CouponValidator::new(storefront.coupons(), catalog, redemptions);
    let coupon = validator.validate(&request, context.now)?;

    let mut eligible = Money::from_minor(0, storefront.currency());

    for line in lines.iter_mut() {
        if coupon.scope.covers(catalog.get(line.product)?) {
            line.coupon_eligible = true;
            eligible = eligible.add(line.line_total)?;
        }
    }

    let discount = calculate_discount(coupon, eligible, shipping)?;

    Ok(AppliedCoupon {
        code: coupon.code.clone(),
        kind: coupon.kind.as_str(),
        discount,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::BRL;
    use testresult::TestResult;

    use crate::{
        catalog::Catalog,
        coupons::{Coupon, CouponBook, CouponKind, InMemoryRedemptions},
        products::Product,
        shipping::ShippingMethod,
    };

    use super::*;

    fn brl(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, BRL)
    }

    fn storefront() -> TestResult<Storefront<'static>> {
        let mut catalog = Catalog::new(BRL);

        catalog.insert(Product::new("caneca", "Caneca", brl(5000)))?;

        let mut coupons = CouponBook::new();

        coupons.insert(Coupon::new("FRETEGRATIS", CouponKind::FreeShipping))?;

        Ok(Storefront::new(
            serde_norway::from_str("name: Loja\nsubdomain: loja\n")?,
            catalog,
            coupons,
            [ShippingMethod::flat("padrao", "Padrão", brl(1990))],
        )?)
    }

    #[test]
    fn empty_carts_cannot_check_out() -> TestResult {
        let store = storefront()?;
        let context = CheckoutContext::new(CustomerType::B2c, Timestamp::UNIX_EPOCH);

        let result = checkout(&store, &Cart::new(), &InMemoryRedemptions::new(), &context);

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));

        Ok(())
    }

    #[test]
    fn free_shipping_coupon_waives_fee() -> TestResult {
        let store = storefront()?;
        let mut cart = Cart::new();

        cart.add(store.catalog(), store.catalog().key_for("caneca")?, None, 1)?;

        let context =
            CheckoutContext::new(CustomerType::B2c, Timestamp::UNIX_EPOCH).with_coupon("FRETEGRATIS");
        let receipt = checkout(&store, &cart, &InMemoryRedemptions::new(), &context)?;

        assert_eq!(receipt.shipping(), brl(1990));
        assert_eq!(receipt.discount()?, brl(1990));
        assert_eq!(receipt.total(), brl(5000));

        Ok(())
    }
}
