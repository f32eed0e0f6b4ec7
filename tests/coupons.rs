//! Coupon validation and application against the `demo` fixture set.
//!
//! The demo cart totals R$219.90 during the 2026 shoe promotion: R$160.00 of
//! shoes (category `calcados`) and R$59.90 of clothing.

use jiff::Timestamp;
use rusty_money::{Money, iso::BRL};
use serde_json::json;
use testresult::TestResult;

use vitrine::prelude::*;

fn brl(minor: i64) -> Money<'static, rusty_money::iso::Currency> {
    Money::from_minor(minor, BRL)
}

fn context(coupon: &str) -> TestResult<CheckoutContext> {
    let now: Timestamp = "2026-06-15T12:00:00Z".parse()?;

    Ok(CheckoutContext::new(CustomerType::B2c, now).with_coupon(coupon))
}

fn checkout_with(fixture: &Fixture<'static>, context: &CheckoutContext) -> Result<Receipt<'static>, CheckoutError> {
    checkout(
        fixture.storefront(),
        fixture.cart(),
        fixture.redemptions(),
        context,
    )
}

#[test]
fn percentage_coupon_discounts_eligible_subtotal() -> TestResult {
    let fixture = Fixture::from_set("demo")?;
    let receipt = checkout_with(&fixture, &context("BEMVINDO10")?)?;

    // 10% of R$219.90, rounded half away from zero.
    assert_eq!(receipt.discount()?, brl(2199));
    assert_eq!(receipt.total(), brl(19791));

    Ok(())
}

#[test]
fn category_coupon_only_discounts_covered_lines() -> TestResult {
    let fixture = Fixture::from_set("demo")?;
    let receipt = checkout_with(&fixture, &context("CALCADOS15")?)?;

    // 15% of the R$160.00 of shoes.
    assert_eq!(receipt.discount()?, brl(2400));
    assert_eq!(receipt.total(), brl(19590));

    let eligible: Vec<bool> = receipt
        .lines()
        .iter()
        .map(|line| line.coupon_eligible)
        .collect();

    assert_eq!(eligible, [true, false]);

    Ok(())
}

#[test]
fn fixed_amount_coupon_discounts_order() -> TestResult {
    let fixture = Fixture::from_set("demo")?;
    let receipt = checkout_with(&fixture, &context("DESCONTO25")?)?;

    assert_eq!(receipt.discount()?, brl(2500));
    assert_eq!(receipt.total(), brl(19490));
    assert_eq!(
        receipt.coupon().map(|coupon| coupon.kind),
        Some("fixed_amount")
    );

    Ok(())
}

#[test]
fn free_shipping_coupon_waives_shipping() -> TestResult {
    let fixture = Fixture::from_set("demo")?;
    let receipt = checkout_with(&fixture, &context("FRETEGRATIS")?.with_shipping_method("expresso"))?;

    assert_eq!(receipt.shipping(), brl(3490));
    assert_eq!(receipt.discount()?, brl(3490));
    assert_eq!(receipt.total(), brl(21990));

    Ok(())
}

#[test]
fn rejected_coupons_report_why() -> TestResult {
    let fixture = Fixture::from_set("demo")?;

    assert!(matches!(
        checkout_with(&fixture, &context("NAOEXISTE")?),
        Err(CheckoutError::Coupon(CouponError::NotFound(_)))
    ));
    assert!(matches!(
        checkout_with(&fixture, &context("PAUSADO")?),
        Err(CheckoutError::Coupon(CouponError::Inactive(_)))
    ));
    assert!(matches!(
        checkout_with(&fixture, &context("VERAO2025")?),
        Err(CheckoutError::Coupon(CouponError::Expired { .. }))
    ));
    assert!(matches!(
        checkout_with(&fixture, &context("ESGOTADO")?),
        Err(CheckoutError::Coupon(CouponError::UsageLimitReached(_)))
    ));

    Ok(())
}

#[test]
fn codes_are_case_sensitive() -> TestResult {
    let fixture = Fixture::from_set("demo")?;

    assert!(matches!(
        checkout_with(&fixture, &context("bemvindo10")?),
        Err(CheckoutError::Coupon(CouponError::NotFound(_)))
    ));

    Ok(())
}

#[test]
fn per_customer_limit_applies_to_identified_customers() -> TestResult {
    let fixture = Fixture::from_set("demo")?;

    let returning = context("BEMVINDO10")?.with_customer(CustomerId::new("cliente-42"));
    let newcomer = context("BEMVINDO10")?.with_customer(CustomerId::new("cliente-7"));

    assert!(matches!(
        checkout_with(&fixture, &returning),
        Err(CheckoutError::Coupon(CouponError::CustomerLimitReached(_)))
    ));
    assert!(checkout_with(&fixture, &newcomer).is_ok());

    Ok(())
}

#[test]
fn minimum_order_uses_subtotal() -> TestResult {
    let mut fixture = Fixture::from_set("demo")?;

    // Leaves only the R$59.90 shirt.
    fixture.cart_mut().remove(0)?;

    assert!(matches!(
        checkout_with(&fixture, &context("DESCONTO25")?),
        Err(CheckoutError::Coupon(CouponError::BelowMinimum { .. }))
    ));
    assert!(matches!(
        checkout_with(&fixture, &context("CALCADOS15")?),
        Err(CheckoutError::Coupon(CouponError::NotApplicable(_)))
    ));

    Ok(())
}

#[test]
fn recording_redemptions_exhausts_limits() -> TestResult {
    let mut fixture = Fixture::from_set("demo")?;
    let customer = CustomerId::new("cliente-7");

    fixture
        .redemptions_mut()
        .record(&CouponCode::new("BEMVINDO10"), Some(&customer));

    assert!(matches!(
        checkout_with(&fixture, &context("BEMVINDO10")?.with_customer(customer)),
        Err(CheckoutError::Coupon(CouponError::CustomerLimitReached(_)))
    ));

    // Anonymous orders aren't subject to per-customer limits.
    assert!(checkout_with(&fixture, &context("BEMVINDO10")?).is_ok());

    Ok(())
}

#[test]
fn validation_response_serialises_for_storefront() -> TestResult {
    let fixture = Fixture::from_set("demo")?;
    let store = fixture.storefront();

    let request = ValidationRequest {
        code: "BEMVINDO10".to_string(),
        order_total: brl(21990),
        product_ids: vec![ProductId::new("tenis-corrida")],
        customer: None,
    };

    let validator = CouponValidator::new(store.coupons(), store.catalog(), fixture.redemptions());
    let response = ValidationResponse::from_result(&validator.validate(&request, "2026-06-15T12:00:00Z".parse()?));
    let json = serde_json::to_value(&response)?;

    assert_eq!(json.pointer("/isValid"), Some(&json!(true)));
    assert_eq!(json.pointer("/coupon/type"), Some(&json!("percentage")));
    assert_eq!(json.pointer("/coupon/value"), Some(&json!("10")));
    assert_eq!(json.pointer("/coupon/minimumOrderValue"), Some(&json!("100.00")));

    Ok(())
}
