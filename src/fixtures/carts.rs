//! Cart Fixtures

use serde::Deserialize;

/// Wrapper for a cart in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines, in order
    pub items: Vec<CartItemFixture>,
}

/// A cart line in YAML
#[derive(Debug, Deserialize)]
pub struct CartItemFixture {
    /// Product identifier
    pub product: String,

    /// Variant identifier
    #[serde(default)]
    pub variant: Option<String>,

    /// Requested quantity
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}
