//! Strongly-typed identifiers used across the ledger.
//!
//! All identifiers are opaque, caller-assigned strings. They are trimmed on
//! construction and must not be empty. Ordering is ordinal (byte-wise), which
//! is what the canonical movement order tie-break relies on.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

/// Identifier of a location (warehouse, shelf, store, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationId(String);

/// Identifier of a stock movement. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MovementId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create an identifier, trimming surrounding whitespace.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
                let trimmed = raw.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{} cannot be empty", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $t {
            type Error = DomainError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

impl_string_newtype!(ProductId, "ProductId");
impl_string_newtype!(LocationId, "LocationId");
impl_string_newtype!(MovementId, "MovementId");

/// Parse an optional location field where an empty or blank value means "absent".
pub fn optional_location(raw: Option<&str>) -> Option<LocationId> {
    raw.and_then(|s| LocationId::new(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_trimmed() {
        let id = ProductId::new("  P1 ").unwrap();
        assert_eq!(id.as_str(), "P1");
        assert_eq!(id.to_string(), "P1");
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let err = MovementId::new("   ").unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(msg) if msg.contains("MovementId")));
    }

    #[test]
    fn ordering_is_ordinal() {
        let upper = MovementId::new("Z1").unwrap();
        let lower = MovementId::new("a1").unwrap();
        assert!(upper < lower);
    }

    #[test]
    fn blank_location_means_absent() {
        assert_eq!(optional_location(Some("")), None);
        assert_eq!(optional_location(Some("  ")), None);
        assert_eq!(optional_location(None), None);
        assert_eq!(optional_location(Some("L1")), Some(LocationId::new("L1").unwrap()));
    }

    #[test]
    fn deserialization_validates() {
        let ok: LocationId = serde_json::from_str("\"L1\"").unwrap();
        assert_eq!(ok.as_str(), "L1");
        assert!(serde_json::from_str::<LocationId>("\"\"").is_err());
    }
}
