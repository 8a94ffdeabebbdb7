//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Users, catalog entries, and owned buildings each get their own ID type
//! so a building-type ID can never be passed where an owned-building ID is
//! expected. All IDs use UUID v7 (time-ordered) for efficient indexing.
//!
//! User IDs are minted by the external authentication service; the `new()`
//! constructor exists for tests and local play.

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

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Verified identity of a player, issued by the authentication service.
    UserId
}

define_id! {
    /// Unique identifier for a resource type in the catalog.
    ResourceTypeId
}

define_id! {
    /// Unique identifier for a building type in the catalog.
    BuildingTypeId
}

define_id! {
    /// Unique identifier for a building owned by a player.
    BuildingId
}
