//! Results returned by the player-facing game operations.
//!
//! These are the success payloads of harvest, collect, and purchase, plus
//! the read-only probes the UI polls. Failures are not represented here;
//! they travel as typed rejections in `salvage-core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{BuildingId, ResourceTypeId};
use crate::structs::ResourceType;

/// Whether the harvester can be used right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HarvesterStatus {
    /// `true` when a harvest would pass the cooldown gate.
    pub ready: bool,
    /// Whole seconds until the gate opens (0 when ready).
    pub remaining_seconds: u64,
}

impl HarvesterStatus {
    /// A status for a harvester that can be used immediately.
    pub const fn ready() -> Self {
        Self {
            ready: true,
            remaining_seconds: 0,
        }
    }

    /// A status for a harvester that is still cooling down.
    pub const fn cooling_down(remaining_seconds: u64) -> Self {
        Self {
            ready: false,
            remaining_seconds,
        }
    }
}

/// A successful harvest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HarvestOutcome {
    /// The resource that was drawn.
    pub resource: ResourceType,
    /// Units credited to the inventory.
    pub quantity: u64,
    /// Earliest instant the next harvest passes the cooldown gate.
    pub next_harvest_available: DateTime<Utc>,
}

/// Whole units of one resource credited by a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CollectedResource {
    /// The resource credited.
    pub resource_type_id: ResourceTypeId,
    /// Units credited (always at least 1).
    pub quantity: u64,
}

/// A successful collection from an owned building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CollectOutcome {
    /// The building collected from.
    pub building_id: BuildingId,
    /// Resources credited. Resources with nothing whole to credit are omitted.
    pub collected: Vec<CollectedResource>,
    /// The new accrual baseline stored for the building.
    pub last_collection_at: DateTime<Utc>,
}

/// A resource a player is short of for a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Shortfall {
    /// The missing resource.
    pub resource_type_id: ResourceTypeId,
    /// Units the price requires.
    pub required: u64,
    /// Units the player holds.
    pub available: u64,
}

/// Whether a player can pay for a building type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Affordability {
    /// `true` when every cost is covered.
    pub affordable: bool,
    /// Every cost line that is not covered.
    pub shortfalls: Vec<Shortfall>,
}

impl Affordability {
    /// Build an affordability verdict from the uncovered cost lines.
    pub fn from_shortfalls(shortfalls: Vec<Shortfall>) -> Self {
        Self {
            affordable: shortfalls.is_empty(),
            shortfalls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affordability_follows_shortfalls() {
        assert!(Affordability::from_shortfalls(Vec::new()).affordable);

        let short = Affordability::from_shortfalls(vec![Shortfall {
            resource_type_id: ResourceTypeId::new(),
            required: 20,
            available: 3,
        }]);
        assert!(!short.affordable);
        assert_eq!(short.shortfalls.len(), 1);
    }

    #[test]
    fn harvester_status_constructors() {
        assert_eq!(HarvesterStatus::ready().remaining_seconds, 0);
        let cooling = HarvesterStatus::cooling_down(4);
        assert!(!cooling.ready);
        assert_eq!(cooling.remaining_seconds, 4);
    }
}
