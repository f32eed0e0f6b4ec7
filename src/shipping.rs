//! Shipping

use rusty_money::{Money, iso::Currency};

use crate::ids::TypedId;

/// Shipping method identifier
pub type ShippingMethodId = TypedId<ShippingMethod<'static>>;

/// A flat-rate shipping method with an optional free-shipping threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingMethod<'a> {
    /// Method identifier
    pub id: ShippingMethodId,

    /// Display name
    pub name: String,

    /// Flat fee charged below the threshold
    pub fee: Money<'a, Currency>,

    /// Order subtotal at or above which shipping is free
    pub free_threshold: Option<Money<'a, Currency>>,
}

impl<'a> ShippingMethod<'a> {
    /// Create a shipping method that always charges `fee`.
    pub fn flat(
        id: impl Into<ShippingMethodId>,
        name: impl Into<String>,
        fee: Money<'a, Currency>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fee,
            free_threshold: None,
        }
    }

    /// Make shipping free for subtotals at or above `threshold`.
    #[must_use]
    pub fn free_above(mut self, threshold: Money<'a, Currency>) -> Self {
        self.free_threshold = Some(threshold);
        self
    }

    /// Fee and threshold amounts.
    pub fn amounts(&self) -> impl Iterator<Item = Money<'a, Currency>> {
        std::iter::once(self.fee).chain(self.free_threshold)
    }

    /// Shipping cost for an order with the given merchandise subtotal.
    ///
    /// Empty orders (zero subtotal) ship for free.
    #[must_use]
    pub fn cost_for(&self, subtotal: Money<'a, Currency>) -> Money<'a, Currency> {
        let subtotal_minor = subtotal.to_minor_units();

        let free = subtotal_minor <= 0
            || self
                .free_threshold
                .is_some_and(|threshold| subtotal_minor >= threshold.to_minor_units());

        if free {
            Money::from_minor(0, self.fee.currency())
        } else {
            self.fee
        }
    }
}
