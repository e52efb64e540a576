//! Prioritized handling of 402 challenges.
//!
//! The interceptor consults an ordered [`HandlerChain`]. Each
//! [`ChallengeHandler`] pairs a predicate ([`ChallengeHandler::matches`])
//! with an async resolution. Handlers are tried in registration order and
//! the first one that does not [`Resolution::Defer`] decides the outcome.
//! When every handler defers, the original 402 response is returned as-is.

use std::fmt;
use std::sync::Arc;

use http::HeaderMap;
use pay402::{BoxFuture, PaymentChallenge};
use reqwest_middleware as rqm;

/// Outcome of a [`ChallengeHandler`].
#[derive(Debug)]
pub enum Resolution {
    /// Not handled here; the next handler (or the caller) gets the 402.
    Defer,
    /// Retry the original request once with these headers merged in.
    ///
    /// Headers with the same name as an original header replace it; all
    /// other original headers are kept.
    Retry(HeaderMap),
    /// Fail the request with this error instead of returning the 402.
    Fail(rqm::Error),
}

/// A handler for one family of 402 challenges.
pub trait ChallengeHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Returns `true` if this handler wants to look at `challenge`.
    fn matches(&self, challenge: &PaymentChallenge) -> bool;

    /// Resolves a challenge this handler [matched](Self::matches).
    ///
    /// May still return [`Resolution::Defer`] if the challenge turns out to
    /// be unusable.
    fn handle<'a>(&'a self, challenge: &'a PaymentChallenge) -> BoxFuture<'a, Resolution>;
}

/// Ordered list of [`ChallengeHandler`]s, first match wins.
#[derive(Clone, Default)]
pub struct HandlerChain(Vec<Arc<dyn ChallengeHandler>>);

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|handler| handler.name()))
            .finish()
    }
}

impl HandlerChain {
    /// Appends a handler with lower priority than every handler already
    /// in the chain.
    pub fn push<H: ChallengeHandler + 'static>(&mut self, handler: H) {
        self.0.push(Arc::new(handler));
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Names of the registered handlers in priority order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|handler| handler.name())
    }

    /// Runs the chain against `challenge`.
    pub async fn resolve(&self, challenge: &PaymentChallenge) -> Resolution {
        for handler in &self.0 {
            if !handler.matches(challenge) {
                continue;
            }

            #[cfg(feature = "telemetry")]
            tracing::debug!(handler = handler.name(), "Handler matched 402 challenge");

            match handler.handle(challenge).await {
                Resolution::Defer => {
                    #[cfg(feature = "telemetry")]
                    tracing::debug!(handler = handler.name(), "Handler deferred");
                }
                resolution => return resolution,
            }
        }
        Resolution::Defer
    }
}
