//! Fallback payment protocols.
//!
//! A fallback handles the 402 challenges that PAY402 defers, typically a
//! standard x402 client. It is installed on the client *before* the PAY402
//! interceptor: reqwest-middleware runs the last-registered middleware
//! closest to the transport, so the interceptor observes every 402 first
//! and the fallback only sees the responses it passes back unchanged.
//!
//! The signing context `S` is handed to the fallback untouched; this crate
//! never looks inside it.

use std::fmt;

use reqwest_middleware as rqm;

/// Installs a fallback 402 handler on a client.
pub trait FallbackProtocol<S> {
    /// Registers the fallback's middleware on `client` using `signer`.
    fn install(&self, client: rqm::ClientBuilder, signer: S) -> rqm::ClientBuilder;
}

/// No fallback: deferred 402 responses reach the caller unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFallback;

impl<S> FallbackProtocol<S> for NoFallback {
    fn install(&self, client: rqm::ClientBuilder, _signer: S) -> rqm::ClientBuilder {
        client
    }
}

/// Uses an existing middleware as the fallback.
///
/// The middleware already owns whatever signer it needs, so the signing
/// context is ignored. Each installation registers a clone.
#[derive(Clone)]
pub struct MiddlewareFallback<M>(pub M);

impl<M> fmt::Debug for MiddlewareFallback<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MiddlewareFallback")
            .field(&"<middleware>")
            .finish()
    }
}

impl<S, M> FallbackProtocol<S> for MiddlewareFallback<M>
where
    M: rqm::Middleware + Clone,
{
    fn install(&self, client: rqm::ClientBuilder, _signer: S) -> rqm::ClientBuilder {
        client.with(self.0.clone())
    }
}

impl<S, F> FallbackProtocol<S> for F
where
    F: Fn(rqm::ClientBuilder, S) -> rqm::ClientBuilder,
{
    fn install(&self, client: rqm::ClientBuilder, signer: S) -> rqm::ClientBuilder {
        self(client, signer)
    }
}
