//! Tenants

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, de};
use thiserror::Error;

/// Errors raised while validating a subdomain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubdomainError {
    /// Subdomains must be between 1 and 63 characters.
    #[error("subdomain must be 1 to 63 characters, got {0}")]
    Length(usize),

    /// Only lowercase letters, digits and hyphens are allowed.
    #[error("subdomain contains invalid character {0:?}")]
    InvalidCharacter(char),

    /// Subdomains can't start or end with a hyphen.
    #[error("subdomain can't start or end with a hyphen")]
    EdgeHyphen,
}

/// A validated store subdomain (the `loja` in `loja.example.com`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subdomain(String);

impl Subdomain {
    /// Borrow the subdomain as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Subdomain {
    type Err = SubdomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let length = s.chars().count();

        if !(1..=63).contains(&length) {
            return Err(SubdomainError::Length(length));
        }

        if let Some(invalid) = s
            .chars()
            .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '-'))
        {
            return Err(SubdomainError::InvalidCharacter(invalid));
        }

        if s.starts_with('-') || s.ends_with('-') {
            return Err(SubdomainError::EdgeHyphen);
        }

        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Subdomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Subdomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(de::Error::custom)
    }
}

/// A merchant's store identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tenant {
    /// Store name
    pub name: String,

    /// Store subdomain
    pub subdomain: Subdomain,

    /// Store category (fashion, electronics, ...)
    #[serde(default)]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn accepts_valid_subdomains() -> TestResult {
        let subdomain: Subdomain = "loja-da-ana2".parse()?;

        assert_eq!(subdomain.as_str(), "loja-da-ana2");

        Ok(())
    }

    #[test]
    fn rejects_invalid_subdomains() {
        assert_eq!("".parse::<Subdomain>(), Err(SubdomainError::Length(0)));
        assert_eq!(
            "Loja".parse::<Subdomain>(),
            Err(SubdomainError::InvalidCharacter('L'))
        );
        assert_eq!(
            "loja.ana".parse::<Subdomain>(),
            Err(SubdomainError::InvalidCharacter('.'))
        );
        assert_eq!("-loja".parse::<Subdomain>(), Err(SubdomainError::EdgeHyphen));
        assert_eq!(
            "a".repeat(64).parse::<Subdomain>(),
            Err(SubdomainError::Length(64))
        );
    }

    #[test]
    fn tenant_deserialises_and_validates_subdomain() -> TestResult {
        let tenant: Tenant = serde_norway::from_str("name: Loja da Ana\nsubdomain: lojadaana\n")?;

        assert_eq!(tenant.subdomain.as_str(), "lojadaana");
        assert_eq!(tenant.category, None);

        let invalid = serde_norway::from_str::<Tenant>("name: X\nsubdomain: Loja\n");

        assert!(invalid.is_err());

        Ok(())
    }
}
