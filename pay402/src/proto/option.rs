//! Normalized payment choices handed to a payer.

use serde::{Deserialize, Serialize};

/// A currency-agnostic payment choice derived from a [`PaymentAccept`].
///
/// Options are built fresh for every 402 and passed to the payer as a
/// read-only slice.
///
/// [`PaymentAccept`]: super::PaymentAccept
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOption {
    /// Amount to pay, as a decimal string.
    pub amount: String,
    /// Currency symbol or human-readable asset name.
    pub currency: String,
    /// Destination address.
    pub pay_to: String,
}

impl PaymentOption {
    /// Creates a new payment option.
    #[must_use]
    pub fn new(
        amount: impl Into<String>,
        currency: impl Into<String>,
        pay_to: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into(),
            pay_to: pay_to.into(),
        }
    }
}
