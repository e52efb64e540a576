//! Loose numeric decoding for challenge fields.
//!
//! Servers in the wild send numbers as JSON numbers, floats (`300.0`) or
//! strings (`"300"`). A challenge must not be rejected over a field the
//! client never acts on, so these fields accept all three.

use serde::Deserialize;
use serde::de::{Deserializer, Error as _};
use serde_json::Value;

/// Reads a non-negative whole number from a JSON number or numeric string.
///
/// Fractional parts are truncated. Negative, non-finite and non-numeric
/// values yield `None`.
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0).then(|| f.trunc() as u64)
}

/// Decodes `x402Version`. Fails only when the value is not a number at all.
pub(super) fn version<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    as_u64(&value)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| D::Error::custom(format!("invalid x402Version: {value}")))
}

/// Decodes an informational number, falling back to zero when unreadable.
pub(super) fn u64_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_u64(&value).unwrap_or_default())
}
