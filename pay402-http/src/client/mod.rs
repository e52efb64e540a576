//! Reqwest middleware for automatic PAY402 payment handling.
//!
//! The [`PaymentInterceptor`] intercepts `402 Payment Required` responses.
//! When the challenge advertises the PAY402 gas-free transfer scheme it
//! derives the payment options, asks a [`Payer`](pay402::Payer) for a proof
//! of payment, and retries the request once with the `x-pay402` header.
//! Anything it does not recognize is passed back unchanged.
//!
//! ## Setup
//!
//! A client is set up in two steps: the [`FallbackProtocol`] is installed
//! first, then the interceptor. Because reqwest-middleware runs the
//! last-registered middleware closest to the transport, the interceptor
//! sees every 402 before the fallback does.
//!
//! ```no_run
//! use pay402::payer::from_fn;
//! use pay402::PaymentOption;
//! use pay402_http::client::{PaymentInterceptor, ReqwestWithPay402, ReqwestWithPay402Build};
//!
//! let payer = from_fn(|options: Vec<PaymentOption>, resource: String| async move {
//!     // Transfer using the first option and return the transaction hash.
//!     Ok(format!("0x{}-{}", options.len(), resource.len()))
//! });
//!
//! let client = reqwest::Client::new()
//!     .with_pay402(PaymentInterceptor::new(payer))
//!     .build();
//! ```
//!
//! ## Handler Chain
//!
//! The interceptor consults an ordered [`HandlerChain`]; see
//! [`PaymentInterceptor::with_handler`] to add handlers after the built-in
//! [`Pay402Handler`].

mod chain;
mod fallback;
mod handler;
mod middleware;

pub use chain::*;
pub use fallback::*;
pub use handler::*;
pub use middleware::*;

use reqwest::{Client, ClientBuilder};
use reqwest_middleware as rqm;

/// Installs a fallback protocol and then the interceptor on `client`.
///
/// This is the setup contract in free-function form: the fallback is
/// registered first so that the interceptor evaluates every 402 before it.
/// The same builder is returned for further composition.
///
/// Calling this twice on one builder installs two independent interceptors
/// (and two fallbacks).
pub fn install<S, F>(
    client: rqm::ClientBuilder,
    interceptor: PaymentInterceptor,
    fallback: &F,
    signer: S,
) -> rqm::ClientBuilder
where
    F: FallbackProtocol<S> + ?Sized,
{
    fallback.install(client, signer).with(interceptor)
}

/// Trait for adding PAY402 payment handling to reqwest clients.
///
/// This trait is implemented on [`Client`] and [`ClientBuilder`].
pub trait ReqwestWithPay402<A> {
    /// Adds the PAY402 interceptor, with no fallback protocol.
    ///
    /// Use [`ReqwestWithPay402Builder::with_fallback`] to add one.
    fn with_pay402(self, interceptor: PaymentInterceptor) -> ReqwestWithPay402Builder<A>;
}

impl ReqwestWithPay402<Self> for Client {
    fn with_pay402(self, interceptor: PaymentInterceptor) -> ReqwestWithPay402Builder<Self> {
        ReqwestWithPay402Builder::new(self, interceptor)
    }
}

impl ReqwestWithPay402<Self> for ClientBuilder {
    fn with_pay402(self, interceptor: PaymentInterceptor) -> ReqwestWithPay402Builder<Self> {
        ReqwestWithPay402Builder::new(self, interceptor)
    }
}

/// Builder for creating a reqwest client with the PAY402 interceptor.
#[allow(missing_debug_implementations)] // generic A may not implement Debug
pub struct ReqwestWithPay402Builder<A, F = NoFallback, S = ()> {
    inner: A,
    interceptor: PaymentInterceptor,
    fallback: F,
    signer: S,
}

impl<A> ReqwestWithPay402Builder<A> {
    const fn new(inner: A, interceptor: PaymentInterceptor) -> Self {
        Self {
            inner,
            interceptor,
            fallback: NoFallback,
            signer: (),
        }
    }
}

impl<A, F, S> ReqwestWithPay402Builder<A, F, S> {
    /// Sets the fallback protocol and the signing context handed to it.
    pub fn with_fallback<F2, S2>(
        self,
        fallback: F2,
        signer: S2,
    ) -> ReqwestWithPay402Builder<A, F2, S2>
    where
        F2: FallbackProtocol<S2>,
    {
        ReqwestWithPay402Builder {
            inner: self.inner,
            interceptor: self.interceptor,
            fallback,
            signer,
        }
    }
}

/// Trait for building the final client from a [`ReqwestWithPay402Builder`].
pub trait ReqwestWithPay402Build {
    /// The type returned by [`build`](Self::build)
    type BuildResult;
    /// The type returned by [`builder`](Self::builder)
    type BuilderResult;

    /// Builds the client, consuming the builder.
    fn build(self) -> Self::BuildResult;

    /// Returns the underlying reqwest-middleware builder with the fallback
    /// and interceptor installed.
    fn builder(self) -> Self::BuilderResult;
}

impl<F, S> ReqwestWithPay402Build for ReqwestWithPay402Builder<Client, F, S>
where
    F: FallbackProtocol<S>,
{
    type BuildResult = rqm::ClientWithMiddleware;
    type BuilderResult = rqm::ClientBuilder;

    fn build(self) -> Self::BuildResult {
        self.builder().build()
    }

    fn builder(self) -> Self::BuilderResult {
        install(
            rqm::ClientBuilder::new(self.inner),
            self.interceptor,
            &self.fallback,
            self.signer,
        )
    }
}

impl<F, S> ReqwestWithPay402Build for ReqwestWithPay402Builder<ClientBuilder, F, S>
where
    F: FallbackProtocol<S>,
{
    type BuildResult = Result<rqm::ClientWithMiddleware, reqwest::Error>;
    type BuilderResult = Result<rqm::ClientBuilder, reqwest::Error>;

    fn build(self) -> Self::BuildResult {
        let builder = self.builder()?;
        Ok(builder.build())
    }

    fn builder(self) -> Self::BuilderResult {
        let client = self.inner.build()?;
        Ok(install(
            rqm::ClientBuilder::new(client),
            self.interceptor,
            &self.fallback,
            self.signer,
        ))
    }
}
