//! Type-safe identifier wrappers.
//!
//! Catalog entries (crops, technologies, events, locations) are keyed by
//! stable human-readable slugs such as `"maize"` or `"drip_irrigation"`, so
//! their identifiers wrap a [`String`]. Runtime records (sessions, ledger
//! entries) use UUID v7 (time-ordered) so they sort by creation order.
//!
//! Each identifier is a distinct type so a crop id can never be passed
//! where a technology id is expected.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

/// Generates a newtype wrapper around a catalog slug.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from a slug.
            pub fn new(slug: impl Into<String>) -> Self {
                Self(slug.into())
            }

            /// Borrow the slug.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(slug: &str) -> Self {
                Self(slug.to_owned())
            }
        }
    };
}

define_id! {
    /// Unique identifier for one simulation session.
    SessionId
}

define_id! {
    /// Unique identifier for a ledger entry (one balance mutation).
    LedgerEntryId
}

define_key! {
    /// Key of a crop in the crop catalog (e.g. `"maize"`).
    CropId
}

define_key! {
    /// Key of a technology in the technology tree (e.g. `"drip_irrigation"`).
    TechnologyId
}

define_key! {
    /// Key of an event definition in the event catalog (e.g. `"drought"`).
    EventId
}

define_key! {
    /// Key of a map location with environmental data (e.g. `"brasilia"`).
    LocationId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_unique() {
        let a = LedgerEntryId::new();
        let b = LedgerEntryId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn keys_display_their_slug() {
        let crop = CropId::new("maize");
        assert_eq!(crop.to_string(), "maize");
        assert_eq!(crop.as_str(), "maize");
        assert_eq!(CropId::from("maize"), crop);
    }

    #[test]
    fn keys_serialize_as_plain_strings() {
        let tech = TechnologyId::new("drip_irrigation");
        let json = serde_json::to_string(&tech).unwrap_or_default();
        assert_eq!(json, "\"drip_irrigation\"");

        let back: Result<TechnologyId, _> = serde_json::from_str(&json);
        assert_eq!(back.ok(), Some(tech));
    }
}
