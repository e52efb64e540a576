//! Error types for PAY402 payments.

/// Boxed error type accepted from payer implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a [`Payer`](crate::payer::Payer).
///
/// When a payer fails, this error replaces the original 402 as the outcome of
/// the request. The payer's reason is surfaced as-is.
#[derive(Debug, thiserror::Error)]
pub enum PayerError {
    /// The payer declined or could not complete the payment.
    #[error("payment rejected: {0}")]
    Rejected(String),

    /// An underlying wallet, signer or transport error.
    #[error("{0}")]
    Other(#[source] BoxError),
}

impl PayerError {
    /// Creates a rejection with a human-readable reason.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Wraps an arbitrary error raised while paying.
    #[must_use]
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }
}

impl From<String> for PayerError {
    fn from(reason: String) -> Self {
        Self::Rejected(reason)
    }
}

impl From<&str> for PayerError {
    fn from(reason: &str) -> Self {
        Self::Rejected(reason.to_owned())
    }
}

impl From<BoxError> for PayerError {
    fn from(err: BoxError) -> Self {
        Self::Other(err)
    }
}
