//! Strongly-typed ID wrappers for stored records
//!
//! Item and invoice ids are opaque UUIDs assigned at creation. The short form
//! (`itm-1a2b3c4d`) is what the CLI prints; any unambiguous prefix of the
//! UUID is accepted back when looking a record up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Short display form, e.g. `itm-1a2b3c4d`
            pub fn short(&self) -> String {
                format!("{}{}", $display_prefix, &self.0.simple().to_string()[..8])
            }

            /// Check whether `text` names this id, either fully or by prefix
            ///
            /// Accepts the full UUID, the short form, or at least four leading
            /// hex digits of the UUID.
            pub fn matches(&self, text: &str) -> bool {
                let text = text.trim().to_lowercase();
                let text = text.strip_prefix($display_prefix).unwrap_or(text.as_str());
                let text = text.replace('-', "");
                text.len() >= 4 && self.0.simple().to_string().starts_with(&text)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(ItemId, "itm-");
define_id!(InvoiceId, "inv-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form() {
        let id = ItemId::new();
        let short = id.short();
        assert!(short.starts_with("itm-"));
        assert_eq!(short.len(), 12);
    }

    #[test]
    fn test_matches_prefixes() {
        let id: ItemId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert!(id.matches("550e8400-e29b-41d4-a716-446655440000"));
        assert!(id.matches("itm-550e8400"));
        assert!(id.matches("550E"));
        assert!(!id.matches("550"));
        assert!(!id.matches("itm-660e8400"));
    }

    #[test]
    fn test_display_is_full_uuid() {
        let id: InvoiceId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_id_serialization() {
        let id = InvoiceId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: InvoiceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
