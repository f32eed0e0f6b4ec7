//! Public integration API plumbing
//!
//! Credential parsing and per-key rate limiting for the storefront's external API.

pub mod credentials;
pub mod rate_limit;

pub use credentials::{ApiCredentials, CredentialsError};
pub use rate_limit::{RateLimitError, RateLimitStatus, RateLimitTier, RateLimiter};
