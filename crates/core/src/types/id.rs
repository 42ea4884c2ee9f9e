//! Newtype IDs for type-safe entity references.
//!
//! Identifiers come from an external catalog and API, so they are opaque
//! strings to us. Upstream payloads sometimes carry them as JSON numbers;
//! every ID type accepts both and always serializes as a string.

use serde::Deserialize;

/// Macro to define a type-safe, opaque string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain string, `Deserialize` from a string or an integer
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use shieldline_core::define_id;
/// define_id!(SensorId);
/// define_id!(ZoneId);
///
/// let sensor = SensorId::new("s-1");
/// let zone = ZoneId::new("s-1");
///
/// // These are different types, so this won't compile:
/// // let _: SensorId = zone;
/// assert_eq!(sensor.as_str(), zone.as_str());
///
/// let numeric: SensorId = serde_json::from_str("17").unwrap();
/// assert_eq!(numeric.as_str(), "17");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::core::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::core::result::Result<Self, D::Error> {
                <$crate::types::id::RawId as ::serde::Deserialize>::deserialize(deserializer)
                    .map(Self::from)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$crate::types::id::RawId> for $name {
            fn from(raw: $crate::types::id::RawId) -> Self {
                Self(raw.into_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Wire form of an ID before normalization.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl RawId {
    /// Normalize to the canonical string form.
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Signed(n) => n.to_string(),
            Self::Unsigned(n) => n.to_string(),
        }
    }
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(OrderId);
define_id!(ContactId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_string() {
        let id: ProductId = serde_json::from_str("\"cam1\"").unwrap();
        assert_eq!(id.as_str(), "cam1");
    }

    #[test]
    fn test_deserialize_from_number() {
        let id: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(id, ProductId::new("42"));

        let id: ProductId = serde_json::from_str("-7").unwrap();
        assert_eq!(id.as_str(), "-7");
    }

    #[test]
    fn test_serializes_as_string() {
        let id = OrderId::new("665f1c2e9b1d4a0012ab34cd");
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"665f1c2e9b1d4a0012ab34cd\""
        );
    }

    #[test]
    fn test_deserialize_rejects_objects() {
        assert!(serde_json::from_str::<ContactId>("{\"id\":1}").is_err());
    }

    mod downstream {
        // Expands the macro outside the defining module, as other crates do.
        crate::define_id!(ZoneId);
    }

    #[test]
    fn test_macro_ids_deserialize_outside_module() {
        let zone: downstream::ZoneId = serde_json::from_str("12").unwrap();
        assert_eq!(zone.as_str(), "12");

        let zone: downstream::ZoneId = serde_json::from_str("\"north\"").unwrap();
        assert_eq!(zone, downstream::ZoneId::new("north"));
    }

    #[test]
    fn test_display() {
        let id = ContactId::from("c-9");
        assert_eq!(format!("{id}"), "c-9");
    }
}
