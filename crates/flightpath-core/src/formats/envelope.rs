//! # Cache Entry Envelope
//!
//! Every value the cache writes to durable storage is wrapped in a JSON
//! envelope carrying its write timestamp and optional TTL:
//!
//! ```json
//! {"value": <any JSON>, "timestamp": 1760000000000, "ttl": 86400000}
//! ```
//!
//! Keeping the timestamp next to the value lets TTL expiry survive a reload.
//!
//! ## Validation
//!
//! Stored blobs are size-checked before parsing, and a blob that parses as
//! JSON but is not an envelope (written by an older client) is accepted as a
//! bare value with no expiry.

use crate::primitives::MAX_STORED_VALUE_BYTES;
use crate::FlightpathError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One cached value with its write time and optional time-to-live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    /// Epoch milliseconds of the write.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl<T> CacheEntry<T> {
    #[must_use]
    pub fn new(value: T, timestamp: u64, ttl: Option<u64>) -> Self {
        Self {
            value,
            timestamp,
            ttl,
        }
    }

    /// Whether the entry is stale at `now_ms`.
    ///
    /// A TTL given at read time takes precedence over the one stored at write
    /// time. Without either, the entry never expires.
    #[must_use]
    pub fn is_expired(&self, now_ms: u64, read_ttl: Option<u64>) -> bool {
        match read_ttl.or(self.ttl) {
            Some(ttl) => now_ms.saturating_sub(self.timestamp) > ttl,
            None => false,
        }
    }
}

/// Serialize an entry for durable storage.
pub fn encode_entry(entry: &CacheEntry<Value>) -> Result<String, FlightpathError> {
    serde_json::to_string(entry).map_err(|e| FlightpathError::SerializationError(e.to_string()))
}

/// Parse a stored blob back into an entry.
///
/// Validates the size limit before any parsing.
pub fn decode_entry(raw: &str) -> Result<CacheEntry<Value>, FlightpathError> {
    if raw.len() > MAX_STORED_VALUE_BYTES {
        return Err(FlightpathError::DeserializationError(format!(
            "stored value of {} bytes exceeds maximum {} bytes",
            raw.len(),
            MAX_STORED_VALUE_BYTES
        )));
    }

    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| FlightpathError::DeserializationError(format!("corrupt JSON: {}", e)))?;

    let is_envelope = parsed
        .as_object()
        .is_some_and(|obj| obj.contains_key("value") && obj.contains_key("timestamp"));

    if is_envelope {
        serde_json::from_value(parsed).map_err(|e| {
            FlightpathError::DeserializationError(format!("malformed cache envelope: {}", e))
        })
    } else {
        Ok(CacheEntry::new(parsed, 0, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_bytes_are_stable() {
        let entry = CacheEntry::new(json!([1, 2]), 42, Some(1000));
        let encoded = encode_entry(&entry).expect("encode");
        assert_eq!(encoded, r#"{"value":[1,2],"timestamp":42,"ttl":1000}"#);
        assert_eq!(decode_entry(&encoded).expect("decode"), entry);
    }

    #[test]
    fn missing_ttl_is_omitted() {
        let entry = CacheEntry::new(json!("x"), 1, None);
        assert_eq!(encode_entry(&entry).expect("encode"), r#"{"value":"x","timestamp":1}"#);
    }

    #[test]
    fn bare_legacy_value_accepted() {
        let entry = decode_entry(r#"[{"questionId":1}]"#).expect("decode");
        assert_eq!(entry.timestamp, 0);
        assert!(entry.ttl.is_none());
        assert!(entry.value.is_array());
    }

    #[test]
    fn corrupt_json_rejected() {
        assert!(matches!(
            decode_entry("{not json"),
            Err(FlightpathError::DeserializationError(_))
        ));
    }

    #[test]
    fn malformed_envelope_rejected() {
        assert!(decode_entry(r#"{"value":1,"timestamp":"yesterday"}"#).is_err());
    }

    #[test]
    fn expiry_prefers_read_ttl() {
        let entry = CacheEntry::new(json!(1), 1_000, Some(100));
        assert!(!entry.is_expired(1_100, None));
        assert!(entry.is_expired(1_101, None));
        assert!(!entry.is_expired(1_101, Some(500)));

        let forever = CacheEntry::new(json!(1), 0, None);
        assert!(!forever.is_expired(u64::MAX, None));
    }
}
