//! HTTP-specific constants for PAY402.

/// Header carrying the proof-of-payment token on the retried request.
pub const PAY402_HEADER: &str = "x-pay402";

/// HTTP 402 Payment Required status code.
pub const HTTP_STATUS_PAYMENT_REQUIRED: u16 = 402;
