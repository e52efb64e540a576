//! The built-in PAY402 challenge handler.

use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue};
use pay402::extract::{self, Extraction};
use pay402::{BoxFuture, PAY402_MARKER, PaymentChallenge, Payer};
use reqwest_middleware as rqm;
#[cfg(feature = "telemetry")]
use tracing::{debug, info, warn};

use super::chain::{ChallengeHandler, Resolution};
use crate::constants::PAY402_HEADER;
use crate::error::InterceptError;

/// Pays PAY402 challenges through a [`Payer`] and attaches the proof header.
///
/// The handler matches challenges with an offer whose description contains
/// the marker (`PAY402` by default). It then:
///
/// 1. Derives the payment options of the first matching offer, deferring if
///    there are none.
/// 2. Awaits the payer with those options and the offer's resource URL.
/// 3. Asks for a retry carrying `x-pay402: <token>`.
///
/// A payer failure fails the request with the payer's error.
#[derive(Clone)]
pub struct Pay402Handler {
    payer: Arc<dyn Payer>,
    marker: String,
    header_name: HeaderName,
}

impl fmt::Debug for Pay402Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pay402Handler")
            .field("payer", &"<dyn Payer>")
            .field("marker", &self.marker)
            .field("header_name", &self.header_name)
            .finish()
    }
}

impl Pay402Handler {
    /// Creates a handler with the default marker and proof header.
    #[must_use]
    pub fn new(payer: impl Payer + 'static) -> Self {
        Self::from_arc(Arc::new(payer))
    }

    /// Creates a handler sharing an existing payer.
    #[must_use]
    pub fn from_arc(payer: Arc<dyn Payer>) -> Self {
        Self {
            payer,
            marker: PAY402_MARKER.to_owned(),
            header_name: HeaderName::from_static(PAY402_HEADER),
        }
    }

    /// Overrides the description marker that identifies PAY402 offers.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Overrides the header that carries the proof-of-payment token.
    #[must_use]
    pub fn with_header_name(mut self, header_name: HeaderName) -> Self {
        self.header_name = header_name;
        self
    }

    /// The marker this handler matches on.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// The header this handler attaches.
    #[must_use]
    pub const fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    async fn pay(&self, challenge: &PaymentChallenge) -> Resolution {
        let plan = match extract::extract(challenge, &self.marker) {
            Extraction::Ready(plan) => plan,
            Extraction::NoMatch | Extraction::NoOptions(_) => return Resolution::Defer,
        };

        #[cfg(feature = "telemetry")]
        info!(
            resource = %plan.resource(),
            options = plan.options.len(),
            "Paying PAY402 challenge"
        );

        let token = match self.payer.pay(&plan.options, plan.resource()).await {
            Ok(token) => token,
            Err(err) => {
                #[cfg(feature = "telemetry")]
                warn!(error = %err, "Payer failed");
                return Resolution::Fail(rqm::Error::Middleware(err.into()));
            }
        };

        let value = match HeaderValue::from_str(&token) {
            Ok(value) => value,
            Err(err) => {
                return Resolution::Fail(rqm::Error::Middleware(
                    InterceptError::InvalidProofToken(err).into(),
                ));
            }
        };

        #[cfg(feature = "telemetry")]
        debug!(header = %self.header_name, "Attaching proof of payment");

        let mut headers = HeaderMap::new();
        headers.insert(self.header_name.clone(), value);
        Resolution::Retry(headers)
    }
}

impl ChallengeHandler for Pay402Handler {
    fn name(&self) -> &str {
        "pay402"
    }

    fn matches(&self, challenge: &PaymentChallenge) -> bool {
        challenge.find_by_marker(&self.marker).is_some()
    }

    fn handle<'a>(&'a self, challenge: &'a PaymentChallenge) -> BoxFuture<'a, Resolution> {
        Box::pin(self.pay(challenge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay402::payer::from_fn;
    use pay402::{PayerError, PaymentAccept, PaymentOption};
    use serde_json::json;
    use std::sync::Mutex;

    fn challenge(description: &str) -> PaymentChallenge {
        PaymentChallenge {
            x402_version: 1,
            error: String::new(),
            accepts: vec![PaymentAccept {
                scheme: "exact".to_owned(),
                network: "base".to_owned(),
                max_amount_required: "14000".to_owned(),
                resource: "https://api.example.com/premium".to_owned(),
                description: description.to_owned(),
                pay_to: "0x37ff".to_owned(),
                max_timeout_seconds: 60,
                asset: "0x8335".to_owned(),
                extra: Some(json!({ "name": "USD Coin" })),
                ..PaymentAccept::default()
            }],
        }
    }

    type Seen = Arc<Mutex<Vec<(Vec<PaymentOption>, String)>>>;

    fn recording_payer(result: Result<&'static str, &'static str>) -> (Pay402Handler, Seen) {
        let seen: Seen = Arc::default();
        let record = Arc::clone(&seen);
        let payer = from_fn(move |options: Vec<PaymentOption>, resource: String| {
            record.lock().unwrap().push((options, resource));
            async move {
                result
                    .map(str::to_owned)
                    .map_err(PayerError::rejected)
            }
        });
        (Pay402Handler::new(payer), seen)
    }

    #[tokio::test]
    async fn test_pays_and_requests_retry() {
        let (handler, seen) = recording_payer(Ok("0xtxhash"));
        let challenge = challenge("PAY402 enabled. Send 0.066 PAY or USDC.");

        assert!(handler.matches(&challenge));
        let Resolution::Retry(headers) = handler.handle(&challenge).await else {
            panic!("expected retry");
        };
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[PAY402_HEADER], "0xtxhash");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (options, resource) = &seen[0];
        assert_eq!(resource, "https://api.example.com/premium");
        assert_eq!(
            options,
            &vec![
                PaymentOption::new("0.066", "PAY", "0x37ff"),
                PaymentOption::new("14000", "USD Coin", "0x37ff"),
            ]
        );
    }

    #[tokio::test]
    async fn test_unmarked_challenge_is_not_matched() {
        let (handler, seen) = recording_payer(Ok("0xtxhash"));
        let challenge = challenge("Standard x402 payment required.");

        assert!(!handler.matches(&challenge));
        assert!(matches!(handler.handle(&challenge).await, Resolution::Defer));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_defers_without_options() {
        let (handler, seen) = recording_payer(Ok("0xtxhash"));
        let mut challenge = challenge("PAY402 enabled.");
        challenge.accepts[0].asset.clear();

        assert!(handler.matches(&challenge));
        assert!(matches!(handler.handle(&challenge).await, Resolution::Defer));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payer_error_fails_request() {
        let (handler, _) = recording_payer(Err("insufficient PAY balance"));
        let challenge = challenge("PAY402 enabled. Send 1 PAY.");

        let Resolution::Fail(rqm::Error::Middleware(err)) = handler.handle(&challenge).await else {
            panic!("expected middleware failure");
        };
        let payer_err = err.downcast_ref::<PayerError>().unwrap();
        assert_eq!(
            payer_err.to_string(),
            "payment rejected: insufficient PAY balance"
        );
    }

    #[tokio::test]
    async fn test_invalid_token_fails_request() {
        let (handler, _) = recording_payer(Ok("bad\ntoken"));
        let challenge = challenge("PAY402 enabled. Send 1 PAY.");

        let Resolution::Fail(rqm::Error::Middleware(err)) = handler.handle(&challenge).await else {
            panic!("expected middleware failure");
        };
        assert!(matches!(
            err.downcast_ref::<InterceptError>(),
            Some(InterceptError::InvalidProofToken(_))
        ));
    }

    #[tokio::test]
    async fn test_custom_marker_and_header() {
        let (handler, _) = recording_payer(Ok("proof"));
        let handler = handler
            .with_marker("GASLESS")
            .with_header_name(HeaderName::from_static("x-payment-proof"));
        let challenge = challenge("GASLESS transfer. Send 2 PAY.");

        assert_eq!(handler.marker(), "GASLESS");
        let Resolution::Retry(headers) = handler.handle(&challenge).await else {
            panic!("expected retry");
        };
        assert_eq!(headers["x-payment-proof"], "proof");
        assert!(!headers.contains_key(PAY402_HEADER));
    }
}
