//! Configuration
//!
//! Command line and environment settings for the checkout driver.

use std::path::PathBuf;

use clap::{Args, Parser};
use jiff::Timestamp;

use crate::{
    checkout::CheckoutContext,
    customers::{CustomerId, CustomerType},
};

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    #[default]
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Vitrine checkout configuration
#[derive(Debug, Parser)]
#[command(name = "vitrine", about = "Price a storefront cart", long_about = None)]
pub struct Config {
    /// Fixture set to load
    #[arg(short, long, env = "VITRINE_FIXTURE", default_value = "demo")]
    pub fixture: String,

    /// Directory holding fixture sets
    #[arg(long, env = "VITRINE_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Customer price list (b2b, b2c)
    #[arg(short = 't', long, env = "VITRINE_CUSTOMER_TYPE", default_value = "b2c")]
    pub customer_type: CustomerType,

    /// Customer identifier, for per-customer coupon limits
    #[arg(long, env = "VITRINE_CUSTOMER")]
    pub customer: Option<String>,

    /// Coupon code to apply
    #[arg(short, long, env = "VITRINE_COUPON")]
    pub coupon: Option<String>,

    /// Shipping method identifier; defaults to the store's first method
    #[arg(short, long, env = "VITRINE_SHIPPING")]
    pub shipping: Option<String>,

    /// Point in time to price at (RFC 3339); defaults to now
    #[arg(long, env = "VITRINE_AT")]
    pub at: Option<Timestamp>,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Checkout context for these settings, pricing at `--at` or `now`.
    #[must_use]
    pub fn checkout_context(&self, now: Timestamp) -> CheckoutContext {
        let mut context = CheckoutContext::new(self.customer_type, self.at.unwrap_or(now));

        if let Some(customer) = &self.customer {
            context = context.with_customer(CustomerId::new(customer.as_str()));
        }

        if let Some(coupon) = &self.coupon {
            context = context.with_coupon(coupon.as_str());
        }

        if let Some(shipping) = &self.shipping {
            context = context.with_shipping_method(shipping.as_str());
        }

        context
    }
}
