//! The PAY402 interceptor middleware.
//!
//! This module provides the [`PaymentInterceptor`], a reqwest middleware that
//! runs 402 responses through a [`HandlerChain`] and retries the request at
//! most once.

use http::{Extensions, StatusCode};
use pay402::{PaymentChallenge, Payer};
use reqwest::{Request, Response, ResponseBuilderExt};
use reqwest_middleware as rqm;
#[cfg(feature = "telemetry")]
use tracing::{debug, info, instrument, trace, warn};

use super::chain::{ChallengeHandler, HandlerChain, Resolution};
use super::handler::Pay402Handler;
use crate::constants::HTTP_STATUS_PAYMENT_REQUIRED;
use crate::error::InterceptError;

/// Reqwest middleware that settles 402 challenges and retries once.
///
/// For every response with status 402 the interceptor:
///
/// 1. Decodes the body as a [`PaymentChallenge`]. Empty or foreign bodies
///    are returned unchanged.
/// 2. Offers the challenge to its handlers in priority order.
/// 3. On [`Resolution::Retry`], merges the headers into a clone of the
///    original request and sends it through the rest of the stack. The
///    retry's outcome, including a second 402, is returned as-is.
/// 4. On [`Resolution::Fail`], fails with the handler's error.
/// 5. When every handler defers, returns the 402 unchanged so an outer
///    fallback middleware or the caller can deal with it.
///
/// Requests whose body cannot be cloned are never paid for, since they
/// could not be retried.
///
/// Installing the interceptor twice on the same client registers two
/// independent instances; nothing deduplicates them.
#[derive(Debug, Clone, Default)]
pub struct PaymentInterceptor {
    handlers: HandlerChain,
}

impl PaymentInterceptor {
    /// Creates an interceptor that pays PAY402 challenges with `payer`.
    #[must_use]
    pub fn new(payer: impl Payer + 'static) -> Self {
        Self::empty().with_handler(Pay402Handler::new(payer))
    }

    /// Creates an interceptor with no handlers. Every 402 is deferred.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends a handler with lower priority than those already registered.
    #[must_use]
    pub fn with_handler(mut self, handler: impl ChallengeHandler + 'static) -> Self {
        self.handlers.push(handler);
        self
    }

    /// The handler chain in priority order.
    #[must_use]
    pub const fn handlers(&self) -> &HandlerChain {
        &self.handlers
    }
}

/// Runs the next middleware or HTTP client with optional telemetry instrumentation.
#[cfg_attr(
    feature = "telemetry",
    instrument(name = "pay402.reqwest.next", skip_all)
)]
async fn run_next(
    next: rqm::Next<'_>,
    req: Request,
    extensions: &mut Extensions,
) -> rqm::Result<Response> {
    next.run(req, extensions).await
}

#[async_trait::async_trait]
impl rqm::Middleware for PaymentInterceptor {
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "pay402.reqwest.handle", skip_all, err)
    )]
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: rqm::Next<'_>,
    ) -> rqm::Result<Response> {
        let retry_req = req.try_clone();
        let res = run_next(next.clone(), req, extensions).await?;

        if res.status().as_u16() != HTTP_STATUS_PAYMENT_REQUIRED || self.handlers.is_empty() {
            #[cfg(feature = "telemetry")]
            trace!(status = ?res.status(), "Not intercepting response");
            return Ok(res);
        }

        #[cfg(feature = "telemetry")]
        info!(url = %res.url(), "Received 402 Payment Required");

        let (res, challenge) = read_challenge(res).await?;
        let Some(challenge) = challenge else {
            #[cfg(feature = "telemetry")]
            debug!("402 body is not a payment challenge, passing through");
            return Ok(res);
        };

        let Some(mut retry) = retry_req else {
            #[cfg(feature = "telemetry")]
            warn!("Request body is not cloneable, cannot pay and retry");
            return Ok(res);
        };

        match self.handlers.resolve(&challenge).await {
            Resolution::Defer => {
                #[cfg(feature = "telemetry")]
                debug!("No handler resolved the challenge, passing through");
                Ok(res)
            }
            Resolution::Fail(err) => Err(err),
            Resolution::Retry(headers) => {
                retry.headers_mut().extend(headers);

                #[cfg(feature = "telemetry")]
                trace!(url = %retry.url(), "Retrying request with proof of payment");

                run_next(next, retry, extensions).await
            }
        }
    }
}

/// Buffers a 402 body and decodes it as a [`PaymentChallenge`].
///
/// Returns an equivalent response carrying the buffered body so that a
/// deferred 402 reaches the caller unchanged, connection info such as
/// `remote_addr()` included.
async fn read_challenge(res: Response) -> rqm::Result<(Response, Option<PaymentChallenge>)> {
    let status: StatusCode = res.status();
    let version = res.version();
    let url = res.url().clone();
    let headers = res.headers().clone();
    let extensions = res.extensions().clone();

    let body = res.bytes().await?;
    let challenge = PaymentChallenge::from_body(&body);

    let mut rebuilt = http::Response::builder()
        .status(status)
        .version(version)
        .url(url)
        .body(body)
        .map_err(|e| rqm::Error::Middleware(InterceptError::Rebuild(e).into()))?;
    *rebuilt.headers_mut() = headers;
    rebuilt.extensions_mut().extend(extensions);

    Ok((Response::from(rebuilt), challenge))
}
