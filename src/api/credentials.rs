//! API Credentials

use std::fmt;

use thiserror::Error;

/// Errors raised while parsing an `Authorization` header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    /// The header doesn't use the `Bearer` scheme.
    #[error("authorization header must use the Bearer scheme")]
    MissingScheme,

    /// The token isn't `KEY:SECRET`.
    #[error("bearer token must be KEY:SECRET")]
    MissingSeparator,

    /// The key part is empty.
    #[error("API key is empty")]
    EmptyKey,

    /// The secret part is empty.
    #[error("API secret is empty")]
    EmptySecret,
}

/// An API key and secret pair.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    key: String,
    secret: String,
}

impl ApiCredentials {
    /// Parse `Bearer KEY:SECRET`.
    ///
    /// The scheme is matched case-insensitively; the secret may itself contain colons.
    ///
    /// # Errors
    ///
    /// Returns a [`CredentialsError`] describing the first malformed part.
    pub fn from_authorization_header(header: &str) -> Result<Self, CredentialsError> {
        let (scheme, token) = header
            .trim()
            .split_once(' ')
            .ok_or(CredentialsError::MissingScheme)?;

        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(CredentialsError::MissingScheme);
        }

        let (key, secret) = token
            .trim()
            .split_once(':')
            .ok_or(CredentialsError::MissingSeparator)?;

        if key.is_empty() {
            return Err(CredentialsError::EmptyKey);
        }

        if secret.is_empty() {
            return Err(CredentialsError::EmptySecret);
        }

        Ok(Self {
            key: key.to_string(),
            secret: secret.to_string(),
        })
    }

    /// Public API key, used for rate limiting and lookups
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// API secret
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

// Keep secrets out of logs.
impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("key", &self.key)
            .field("secret", &"***")
            .finish()
    }
}
