#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for PAY402 gas-free HTTP 402 payments.
//!
//! A server that supports PAY402 answers a paid request with `402 Payment
//! Required` and a JSON challenge whose offer description carries the
//! `PAY402` marker. This crate decodes that challenge, derives the payment
//! options it offers, and defines the [`Payer`] capability that turns an
//! option into a proof-of-payment token.
//!
//! It is transport-agnostic; the reqwest integration lives in `pay402-http`.
//!
//! # Modules
//!
//! - [`proto`] - Wire format types ([`PaymentChallenge`], [`PaymentAccept`], [`PaymentOption`])
//! - [`extract`] - Marker matching and option extraction
//! - [`payer`] - The [`Payer`] trait and closure adapter
//! - [`error`] - Error types
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod error;
pub mod extract;
pub mod payer;
pub mod proto;

pub use error::{BoxError, PayerError};
pub use extract::{Extraction, PAY402_MARKER, PaymentPlan};
pub use payer::{BoxFuture, Payer};
pub use proto::{PaymentAccept, PaymentChallenge, PaymentOption};
