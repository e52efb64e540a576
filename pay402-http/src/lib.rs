#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport layer for PAY402 payments.
//!
//! Provides a `reqwest` middleware that answers PAY402 `402 Payment
//! Required` challenges by paying through a caller-supplied
//! [`Payer`](pay402::Payer) and retrying the request once with the
//! `x-pay402` proof header. Challenges it does not recognize are passed on
//! untouched to a fallback payment protocol or to the caller.
//!
//! # Modules
//!
//! - [`constants`] — Header names and status codes
//! - [`error`] — Interceptor error types
//! - [`client`] — Handler chain, interceptor middleware and client setup (feature: `client`)
//!
//! # Feature Flags
//!
//! - `client` (default) - reqwest middleware integration
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod constants;
pub mod error;

#[cfg(feature = "client")]
pub mod client;

pub use error::InterceptError;
