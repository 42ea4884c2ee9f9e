//! Persisted cart snapshot format.
//!
//! The storage slot holds a versioned envelope:
//!
//! ```json
//! {"version": 1, "items": [{"id": "cam1", "name": "...", "price": "1299", "image": "...", "category": "...", "quantity": 2}]}
//! ```
//!
//! Older clients wrote the bare item array with no envelope. That layout is
//! read as version 0 and upgraded in memory; the next write stores it as v1.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use shieldline_core::CartLineItem;

/// Envelope version written by this build.
pub const CURRENT_VERSION: u64 = 1;

/// Version assigned to the unversioned bare-array layout.
pub const LEGACY_VERSION: u64 = 0;

/// Errors decoding a stored snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The payload is not valid JSON or does not match the expected shape.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is JSON but neither an envelope nor an item array.
    #[error("unrecognized snapshot shape: expected an object or array, found {0}")]
    Shape(&'static str),

    /// The envelope was written by a newer or unknown build.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u64),
}

/// A decoded snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Version the payload was written with.
    pub version: u64,
    /// Normalized line items.
    pub items: Vec<CartLineItem>,
}

impl Decoded {
    /// Whether the payload was in an older layout and should be rewritten.
    #[must_use]
    pub const fn needs_upgrade(&self) -> bool {
        self.version < CURRENT_VERSION
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u64,
    items: &'a [CartLineItem],
}

#[derive(Deserialize)]
struct EnvelopeV1 {
    #[serde(default)]
    items: Vec<CartLineItem>,
}

/// Encode line items into the current envelope format.
///
/// # Errors
///
/// Returns `SnapshotError::Json` if serialization fails.
pub fn encode(items: &[CartLineItem]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&EnvelopeRef {
        version: CURRENT_VERSION,
        items,
    })?)
}

/// Decode a stored payload, migrating older layouts.
///
/// # Errors
///
/// Returns `SnapshotError` for invalid JSON, an unknown shape, or an
/// unsupported version.
pub fn decode(raw: &str) -> Result<Decoded, SnapshotError> {
    let value: Value = serde_json::from_str(raw)?;

    let version = match &value {
        Value::Array(_) => LEGACY_VERSION,
        Value::Object(map) => match map.get("version").and_then(Value::as_u64) {
            Some(CURRENT_VERSION) => CURRENT_VERSION,
            Some(other) => return Err(SnapshotError::UnsupportedVersion(other)),
            None => return Err(SnapshotError::Shape("object without a numeric version")),
        },
        Value::Null => return Err(SnapshotError::Shape("null")),
        Value::Bool(_) => return Err(SnapshotError::Shape("boolean")),
        Value::Number(_) => return Err(SnapshotError::Shape("number")),
        Value::String(_) => return Err(SnapshotError::Shape("string")),
    };

    let items = if version == LEGACY_VERSION {
        serde_json::from_value::<Vec<CartLineItem>>(value)?
    } else {
        serde_json::from_value::<EnvelopeV1>(value)?.items
    };

    Ok(Decoded {
        version,
        items: normalize(items),
    })
}

/// Restore cart invariants on externally sourced items.
///
/// Drops zero-quantity entries and merges repeated ids into the first
/// occurrence, keeping the original order otherwise.
#[must_use]
pub fn normalize(items: Vec<CartLineItem>) -> Vec<CartLineItem> {
    let mut out: Vec<CartLineItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            continue;
        }
        if let Some(existing) = out.iter_mut().find(|line| line.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shieldline_core::CartItem;

    use super::*;

    fn line(id: &str, price: &str, quantity: u32) -> CartLineItem {
        CartLineItem::from_item(CartItem::new(id, id, price.parse().unwrap()), quantity)
    }

    #[test]
    fn test_encode_writes_envelope() {
        let encoded = encode(&[line("cam1", "1299", 2)]).unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["items"][0]["id"], "cam1");
        assert_eq!(value["items"][0]["quantity"], 2);
    }

    #[test]
    fn test_decode_current() {
        let items = vec![line("cam1", "1299", 2), line("ext1", "450", 3)];
        let decoded = decode(&encode(&items).unwrap()).unwrap();
        assert_eq!(decoded.version, CURRENT_VERSION);
        assert!(!decoded.needs_upgrade());
        assert_eq!(decoded.items, items);
    }

    #[test]
    fn test_decode_legacy_array() {
        let raw = r#"[{"id":"p1","name":"Keypad","price":100,"image":"/img/k.png","category":"alarms","quantity":2}]"#;
        let decoded = decode(raw).unwrap();
        assert_eq!(decoded.version, LEGACY_VERSION);
        assert!(decoded.needs_upgrade());
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].quantity, 2);
        assert_eq!(decoded.items[0].category, "alarms");
    }

    #[test]
    fn test_decode_legacy_array_with_null_fields() {
        let raw = r#"[{"id":"p1","name":"Keypad","price":100,"image":null,"category":"alarms","quantity":1},{"id":"p2","name":"Siren","price":"250","image":"/img/s.png","category":null,"quantity":2}]"#;
        let decoded = decode(raw).unwrap();
        assert_eq!(decoded.items.len(), 2);
        assert!(decoded.items[0].image.is_empty());
        assert_eq!(decoded.items[0].category, "alarms");
        assert!(decoded.items[1].category.is_empty());
        assert_eq!(decoded.items[1].quantity, 2);
    }

    #[test]
    fn test_decode_envelope_without_items() {
        let decoded = decode(r#"{"version":1}"#).unwrap();
        assert!(decoded.items.is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode("{not json"), Err(SnapshotError::Json(_))));
        assert!(matches!(decode("\"cart\""), Err(SnapshotError::Shape(_))));
        assert!(matches!(decode("null"), Err(SnapshotError::Shape(_))));
        assert!(matches!(
            decode(r#"{"items":[]}"#),
            Err(SnapshotError::Shape(_))
        ));
        assert!(matches!(
            decode(r#"{"version":7,"items":[]}"#),
            Err(SnapshotError::UnsupportedVersion(7))
        ));
        assert!(matches!(
            decode(r#"[{"id":"a","name":"x","price":-5,"quantity":1}]"#),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn test_normalize_merges_and_drops() {
        let items = vec![
            line("a", "1", 1),
            line("b", "2", 0),
            line("c", "3", 2),
            line("a", "1", 4),
        ];
        let normalized = normalize(items);
        let summary: Vec<(&str, u32)> = normalized
            .iter()
            .map(|l| (l.id.as_str(), l.quantity))
            .collect();
        assert_eq!(summary, vec![("a", 5), ("c", 2)]);
    }
}
