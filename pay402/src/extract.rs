//! Payment option extraction from PAY402 challenges.
//!
//! A challenge is recognized by a marker substring in an offer's
//! description. From the first such offer up to two options are derived, in
//! this order:
//!
//! 1. A `PAY` option when the description contains `Send <amount> PAY`.
//! 2. An asset option when the offer carries both `maxAmountRequired` and
//!    `asset`, labelled with `extra.name` or the raw asset identifier.
//!
//! # Amount grammar
//!
//! ```text
//! pay-amount = "Send" 1*WSP amount 1*WSP "PAY" word-boundary
//! amount     = *DIGIT ["."] 1*DIGIT
//! ```
//!
//! `DIGIT` is ASCII `0-9` only. Matching is case-sensitive. Anything else
//! yields no `PAY` option rather than an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::proto::{PaymentAccept, PaymentChallenge, PaymentOption};

/// Marker substring identifying the gas-free PAY402 transfer scheme.
pub const PAY402_MARKER: &str = "PAY402";

/// Currency label of the native PAY token.
pub const PAY_CURRENCY: &str = "PAY";

static PAY_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bSend\s+([0-9]*\.?[0-9]+)\s+PAY\b").expect("PAY amount pattern is valid")
});

/// Parses the `PAY` amount out of a free-text offer description.
///
/// Returns the first amount written as `Send <amount> PAY`, or `None`.
///
/// ```
/// use pay402::extract::parse_pay_amount;
///
/// assert_eq!(parse_pay_amount("Send 0.066 PAY or USDC"), Some("0.066"));
/// assert_eq!(parse_pay_amount("Send 0.066 pay"), None);
/// ```
#[must_use]
pub fn parse_pay_amount(description: &str) -> Option<&str> {
    PAY_AMOUNT
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Derives the ordered payment options offered by a single accept entry.
///
/// Both options share the entry's `payTo` address. The result may be empty.
#[must_use]
pub fn payment_options(accept: &PaymentAccept) -> Vec<PaymentOption> {
    let mut options = Vec::with_capacity(2);

    if let Some(amount) = parse_pay_amount(&accept.description) {
        options.push(PaymentOption::new(amount, PAY_CURRENCY, &accept.pay_to));
    }

    if !accept.max_amount_required.is_empty() && !accept.asset.is_empty() {
        options.push(PaymentOption::new(
            &accept.max_amount_required,
            accept.currency_label(),
            &accept.pay_to,
        ));
    }

    options
}

/// Options selected for payment together with the offer they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPlan<'a> {
    /// The matched offer.
    pub accept: &'a PaymentAccept,
    /// Options derived from the offer, never empty.
    pub options: Vec<PaymentOption>,
}

impl PaymentPlan<'_> {
    /// URL of the resource being paid for.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.accept.resource
    }
}

/// Outcome of inspecting a challenge for a PAY402 offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction<'a> {
    /// No offer carries the marker.
    NoMatch,
    /// An offer carries the marker but yields no usable option.
    NoOptions(&'a PaymentAccept),
    /// An offer carries the marker and yields at least one option.
    Ready(PaymentPlan<'a>),
}

impl<'a> Extraction<'a> {
    /// Returns the plan if one was extracted.
    #[must_use]
    pub fn into_plan(self) -> Option<PaymentPlan<'a>> {
        match self {
            Self::Ready(plan) => Some(plan),
            Self::NoMatch | Self::NoOptions(_) => None,
        }
    }
}

/// Inspects a challenge for an offer whose description contains `marker`.
///
/// Only the first matching offer is considered; later matches are ignored
/// even when the first one yields no options.
#[must_use]
pub fn extract<'a>(challenge: &'a PaymentChallenge, marker: &str) -> Extraction<'a> {
    let Some(accept) = challenge.find_by_marker(marker) else {
        return Extraction::NoMatch;
    };

    let options = payment_options(accept);
    if options.is_empty() {
        #[cfg(feature = "telemetry")]
        tracing::debug!(
            resource = %accept.resource,
            "Matched offer yields no payment options"
        );
        return Extraction::NoOptions(accept);
    }

    Extraction::Ready(PaymentPlan { accept, options })
}
