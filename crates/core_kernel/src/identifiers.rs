//! Strongly-typed identifiers for domain entities
//!
//! Using newtype wrappers around UUIDs provides type safety and prevents
//! accidental mixing of different identifier types. New identifiers are
//! time-ordered (UUID v7) by default so that listings sort by creation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new time-ordered identifier (UUID v7)
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates a new random identifier (UUID v4)
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

// Claim domain identifiers
define_id!(ClaimId, "CLM");
define_id!(ClaimItemId, "ITM");

// Batch domain identifiers
define_id!(BatchId, "BTH");

// Organisation identifiers
define_id!(FacilityId, "FAC");
define_id!(TpaId, "TPA");

// Payment domain identifiers
define_id!(ReimbursementId, "RMB");
define_id!(PaymentSummaryId, "PSM");

// Audit domain identifiers
define_id!(ErrorLogId, "ELG");

// Shared identifiers
define_id!(DocumentId, "DOC");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_id_display() {
        let id = ClaimId::new();
        let display = id.to_string();
        assert!(display.starts_with("CLM-"));
    }

    #[test]
    fn test_id_parsing_with_prefix() {
        let original = BatchId::new();
        let parsed: BatchId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_id_parsing_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: FacilityId = uuid.to_string().parse().unwrap();
        assert_eq!(parsed, FacilityId::from(uuid));
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let tpa_id = TpaId::from(uuid);
        let back: Uuid = tpa_id.into();
        assert_eq!(uuid, back);
    }

    #[test]
    fn test_new_ids_are_time_ordered() {
        let first = ClaimId::new();
        let second = ClaimId::new();
        assert!(first <= second);
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = ReimbursementId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}
