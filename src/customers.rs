//! Customers

use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

/// Error returned when a customer type string is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown customer type: {0}")]
pub struct UnknownCustomerType(pub String);

/// Customer account type, selecting which price list applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    /// Business customer
    B2b,

    /// Retail customer
    #[default]
    B2c,
}

impl FromStr for CustomerType {
    type Err = UnknownCustomerType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "b2b" => Ok(Self::B2b),
            "b2c" => Ok(Self::B2c),
            _ => Err(UnknownCustomerType(s.to_string())),
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::B2b => f.write_str("b2b"),
            Self::B2c => f.write_str("b2c"),
        }
    }
}

/// Customer identifier, as issued by the storefront backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Create a new customer identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
