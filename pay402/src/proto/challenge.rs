//! HTTP 402 response body types.
//!
//! The layout follows the x402 v1 `PaymentRequired` body: a version number,
//! an optional error message, and a list of accepted payment offers.

use serde::{Deserialize, Serialize};

use super::lenient;

/// HTTP 402 Payment Required response body.
///
/// Servers may offer several payment schemes at once; they are kept in the
/// order the server listed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentChallenge {
    /// Protocol version announced by the server. Accepts a number or a
    /// numeric string.
    #[serde(deserialize_with = "lenient::version")]
    pub x402_version: u32,
    /// Human-readable reason the request was refused.
    #[serde(default)]
    pub error: String,
    /// Offers the server is willing to accept, in server order.
    #[serde(default)]
    pub accepts: Vec<PaymentAccept>,
}

impl PaymentChallenge {
    /// Decodes a challenge from a raw 402 response body.
    ///
    /// Returns `None` for an empty body or a body that is not a challenge.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Option<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        serde_json::from_slice(body).ok()
    }

    /// Returns the first offer whose description contains `marker`.
    #[must_use]
    pub fn find_by_marker(&self, marker: &str) -> Option<&PaymentAccept> {
        self.accepts
            .iter()
            .find(|accept| accept.description.contains(marker))
    }
}

/// One payment offer within a [`PaymentChallenge`].
///
/// String fields default to empty so that partially populated offers still
/// decode; deciding whether an offer is usable is left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAccept {
    /// The payment scheme (e.g., "exact").
    #[serde(default)]
    pub scheme: String,
    /// The network name (e.g., "base").
    #[serde(default)]
    pub network: String,
    /// Amount required, as a decimal string in the asset's own units.
    #[serde(default)]
    pub max_amount_required: String,
    /// URL of the resource being paid for.
    #[serde(default)]
    pub resource: String,
    /// Free-text description of the offer.
    #[serde(default)]
    pub description: String,
    /// MIME type of the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Destination address for the payment.
    #[serde(default)]
    pub pay_to: String,
    /// Advertised validity window in seconds. Informational only; an
    /// unreadable value decodes as zero.
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub max_timeout_seconds: u64,
    /// Asset address or symbol.
    #[serde(default)]
    pub asset: String,
    /// Scheme-specific metadata; may carry a human-readable asset `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
    /// Output schema of the resource. Passed through unread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<serde_json::Value>,
}

impl PaymentAccept {
    /// Human-readable asset name from `extra.name`, if present and a string.
    #[must_use]
    pub fn asset_name(&self) -> Option<&str> {
        self.extra
            .as_ref()
            .and_then(|extra| extra.get("name"))
            .and_then(serde_json::Value::as_str)
    }

    /// Label for the offered asset: `extra.name` when set, otherwise the raw
    /// asset identifier.
    #[must_use]
    pub fn currency_label(&self) -> &str {
        self.asset_name().unwrap_or(&self.asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_wire_body() {
        let body = json!({
            "x402Version": 1,
            "error": "payment required",
            "accepts": [{
                "scheme": "exact",
                "network": "base",
                "maxAmountRequired": "14000",
                "resource": "https://api.example.com/report",
                "description": "Standard x402 payment required.",
                "mimeType": "application/json",
                "payTo": "0x37ff",
                "maxTimeoutSeconds": 60,
                "asset": "0x8335",
                "extra": { "name": "USD Coin", "version": "2" },
                "outputSchema": { "type": "object" }
            }]
        });

        let challenge = PaymentChallenge::from_body(body.to_string().as_bytes()).unwrap();
        assert_eq!(challenge.x402_version, 1);
        assert_eq!(challenge.error, "payment required");
        let accept = &challenge.accepts[0];
        assert_eq!(accept.max_amount_required, "14000");
        assert_eq!(accept.pay_to, "0x37ff");
        assert_eq!(accept.max_timeout_seconds, 60);
        assert_eq!(accept.asset_name(), Some("USD Coin"));
        assert_eq!(accept.output_schema, Some(json!({ "type": "object" })));
    }

    #[test]
    fn test_decodes_loosely_typed_numbers() {
        let decode = |version: serde_json::Value, timeout: serde_json::Value| {
            let body = json!({
                "x402Version": version,
                "accepts": [{ "description": "PAY402", "maxTimeoutSeconds": timeout }]
            });
            PaymentChallenge::from_body(body.to_string().as_bytes())
                .map(|c| (c.x402_version, c.accepts[0].max_timeout_seconds))
        };

        assert_eq!(decode(json!(1), json!("300")), Some((1, 300)));
        assert_eq!(decode(json!("1"), json!(300.0)), Some((1, 300)));
        assert_eq!(decode(json!(1.0), json!("soon")), Some((1, 0)));
        assert_eq!(decode(json!(1), json!(null)), Some((1, 0)));
        assert_eq!(decode(json!("v1"), json!(300)), None);
    }

    #[test]
    fn test_empty_or_foreign_body_is_not_a_challenge() {
        assert!(PaymentChallenge::from_body(b"").is_none());
        assert!(PaymentChallenge::from_body(b"  \n").is_none());
        assert!(PaymentChallenge::from_body(b"<html>402</html>").is_none());
        assert!(PaymentChallenge::from_body(br#"{"detail":"pay up"}"#).is_none());
    }

    #[test]
    fn test_currency_label_falls_back_to_asset() {
        let mut accept = PaymentAccept {
            asset: "0x8335".to_owned(),
            ..PaymentAccept::default()
        };
        assert_eq!(accept.currency_label(), "0x8335");

        accept.extra = Some(json!({ "decimals": 6 }));
        assert_eq!(accept.currency_label(), "0x8335");

        accept.extra = Some(json!({ "name": 42 }));
        assert_eq!(accept.currency_label(), "0x8335");

        accept.extra = Some(json!({ "name": "USD Coin" }));
        assert_eq!(accept.currency_label(), "USD Coin");
    }

    #[test]
    fn test_find_by_marker_returns_first_match() {
        let challenge = PaymentChallenge {
            x402_version: 1,
            error: String::new(),
            accepts: vec![
                PaymentAccept {
                    description: "Standard x402 payment required.".to_owned(),
                    ..PaymentAccept::default()
                },
                PaymentAccept {
                    description: "PAY402 first".to_owned(),
                    pay_to: "first".to_owned(),
                    ..PaymentAccept::default()
                },
                PaymentAccept {
                    description: "PAY402 second".to_owned(),
                    pay_to: "second".to_owned(),
                    ..PaymentAccept::default()
                },
            ],
        };

        let found = challenge.find_by_marker("PAY402").unwrap();
        assert_eq!(found.pay_to, "first");
        assert!(challenge.find_by_marker("pay402").is_none());
    }
}
