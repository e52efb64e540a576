//! Wire format types for PAY402 challenges.
//!
//! # Key Types
//!
//! - [`PaymentChallenge`] - HTTP 402 response body
//! - [`PaymentAccept`] - One offer within a challenge
//! - [`PaymentOption`] - Normalized choice passed to a [`Payer`](crate::payer::Payer)
//!
//! # Wire Format
//!
//! All types serialize to JSON using camelCase field names.

mod challenge;
mod lenient;
mod option;

pub use challenge::*;
pub use option::*;
