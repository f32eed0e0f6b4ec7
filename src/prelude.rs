//! Vitrine prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    api::{ApiCredentials, CredentialsError, RateLimitError, RateLimitStatus, RateLimitTier, RateLimiter},
    cart::{Cart, CartError, CartLine},
    catalog::{Catalog, CatalogError},
    checkout::{CheckoutContext, CheckoutError, checkout},
    coupons::{
        Coupon, CouponBook, CouponCode, CouponDiscount, CouponError, CouponKind, CouponScope,
        CouponValidator, InMemoryRedemptions, Redemptions, ValidationRequest, ValidationResponse,
        calculate_discount,
    },
    customers::{CustomerId, CustomerType},
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError},
    prices::{PriceParseError, parse_price},
    pricing::{PriceQuote, PricingError, discount_badge, quote, reward_points, unit_price},
    products::{Product, ProductId, ProductKey, PromotionalPrice, RewardPoints, Stock, Variant},
    receipt::{AppliedCoupon, Receipt, ReceiptError, ReceiptLine},
    shipping::{ShippingMethod, ShippingMethodId},
    storefront::{Storefront, StorefrontError},
    tenants::{Subdomain, Tenant},
};
