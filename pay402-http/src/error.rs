//! Error types for the HTTP interception layer.

/// Errors raised by the interceptor itself.
///
/// Payer failures are not wrapped here; they surface as the
/// [`pay402::PayerError`] returned by the payer.
#[derive(Debug, thiserror::Error)]
pub enum InterceptError {
    /// The payer returned a token that cannot be sent as a header value.
    #[error("proof-of-payment token is not a valid header value: {0}")]
    InvalidProofToken(#[source] http::header::InvalidHeaderValue),

    /// The buffered 402 response could not be reassembled.
    #[error("failed to rebuild 402 response: {0}")]
    Rebuild(#[source] http::Error),
}
