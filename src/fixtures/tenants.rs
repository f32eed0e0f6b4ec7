//! Tenant Fixtures

use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    prices::{currency_for, parse_price},
    shipping::ShippingMethod,
    tenants::Tenant,
};

/// Wrapper for a tenant definition in YAML
#[derive(Debug, Deserialize)]
pub struct TenantFixture {
    /// Store identity
    #[serde(flatten)]
    pub tenant: Tenant,

    /// Store currency code
    pub currency: String,

    /// Shipping methods, first is the default
    #[serde(default)]
    pub shipping: Vec<ShippingFixture>,
}

/// Shipping method definition from YAML
#[derive(Debug, Deserialize)]
pub struct ShippingFixture {
    /// Method identifier
    pub id: String,

    /// Method name
    pub name: String,

    /// Fee (e.g., "19.90 BRL")
    pub fee: String,

    /// Subtotal at which shipping becomes free (e.g., "199.00 BRL")
    #[serde(default)]
    pub free_above: Option<String>,
}

impl TryFrom<ShippingFixture> for ShippingMethod<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ShippingFixture) -> Result<Self, Self::Error> {
        let method = ShippingMethod::flat(fixture.id, fixture.name, parse_price(&fixture.fee)?);

        Ok(match fixture.free_above {
            Some(threshold) => method.free_above(parse_price(&threshold)?),
            None => method,
        })
    }
}

impl TenantFixture {
    /// Store currency
    ///
    /// # Errors
    ///
    /// Returns an error if the currency code is not supported.
    pub fn currency(&self) -> Result<&'static rusty_money::iso::Currency, FixtureError> {
        Ok(currency_for(&self.currency)?)
    }
}
