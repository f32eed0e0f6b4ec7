//! Vitrine
//!
//! Vitrine is the pricing core of a multi-tenant storefront: it resolves B2B/B2C and
//! promotional prices, validates and applies discount coupons, and totals carts with
//! shipping into receipts.

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod coupons;
pub mod customers;
pub mod discounts;
pub mod fixtures;
pub mod ids;
pub mod observability;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod shipping;
pub mod storefront;
pub mod tenants;
