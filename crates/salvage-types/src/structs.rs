//! Catalog and per-player records for the Salvage game.
//!
//! Catalog records ([`ResourceType`], [`BuildingType`], [`BuildingCost`],
//! [`ProductionRule`]) are immutable reference data. Player records
//! ([`InventoryEntry`], [`OwnedBuilding`]) are owned by the persistent store;
//! the game logic only ever holds transient copies of them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{BuildingId, BuildingTypeId, ResourceTypeId, UserId};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A kind of resource players can hold (stone, scrap metal, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceType {
    /// Unique resource type identifier.
    pub id: ResourceTypeId,
    /// Stable machine name, unique across the catalog (e.g. `scrap_metal`).
    pub name: String,
    /// Human-readable name shown in the UI.
    pub display_name: String,
    /// Optional flavour text.
    pub description: Option<String>,
    /// Progression tier. Tier 1 resources are the harvestable starters.
    pub tier: u32,
    /// Icon reference resolved by the UI.
    pub icon: Option<String>,
}

/// A kind of building players can buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BuildingType {
    /// Unique building type identifier.
    pub id: BuildingTypeId,
    /// Stable machine name, unique across the catalog (e.g. `stone_quarry`).
    pub name: String,
    /// Human-readable name shown in the UI.
    pub display_name: String,
    /// Optional flavour text.
    pub description: Option<String>,
    /// Progression tier.
    pub tier: u32,
    /// Icon reference resolved by the UI.
    pub icon: Option<String>,
}

/// One resource requirement of a building's purchase price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BuildingCost {
    /// The resource that must be paid.
    pub resource_type_id: ResourceTypeId,
    /// How many units must be paid.
    pub quantity: u64,
}

/// One passive output of a building.
///
/// A building accrues `rate_per_minute` units of the resource for every
/// minute since it was last collected, up to `storage_capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProductionRule {
    /// The resource produced.
    pub resource_type_id: ResourceTypeId,
    /// Units produced per minute (non-negative, may be fractional).
    #[ts(as = "String")]
    pub rate_per_minute: Decimal,
    /// Maximum units held by the building before production stalls.
    pub storage_capacity: u64,
}

/// A building type together with its price and production rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BuildingDetails {
    /// The building type record.
    pub building_type: BuildingType,
    /// Resources required to purchase it. Empty means free.
    pub costs: Vec<BuildingCost>,
    /// Passive outputs. Empty for buildings that produce nothing.
    pub production: Vec<ProductionRule>,
}

/// The full reference catalog: every resource type and building type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// All resource types.
    pub resources: Vec<ResourceType>,
    /// All building types with costs and production.
    pub buildings: Vec<BuildingDetails>,
}

impl Catalog {
    /// Look up a resource type by ID.
    pub fn resource(&self, id: ResourceTypeId) -> Option<&ResourceType> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Look up a resource type by its machine name.
    pub fn resource_by_name(&self, name: &str) -> Option<&ResourceType> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Look up a building type (with costs and production) by ID.
    pub fn building(&self, id: BuildingTypeId) -> Option<&BuildingDetails> {
        self.buildings.iter().find(|b| b.building_type.id == id)
    }

    /// Look up a building type by its machine name.
    pub fn building_by_name(&self, name: &str) -> Option<&BuildingDetails> {
        self.buildings.iter().find(|b| b.building_type.name == name)
    }

    /// All resource types of the given tier, in catalog order.
    pub fn resources_by_tier(&self, tier: u32) -> Vec<ResourceType> {
        self.resources
            .iter()
            .filter(|r| r.tier == tier)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Player state
// ---------------------------------------------------------------------------

/// A player's balance of a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryEntry {
    /// The owning player.
    pub user_id: UserId,
    /// The resource held.
    pub resource_type_id: ResourceTypeId,
    /// Units held. Only whole units are ever stored.
    pub quantity: u64,
}

/// An inventory line joined with its resource type, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryItem {
    /// The resource held.
    pub resource: ResourceType,
    /// Units held.
    pub quantity: u64,
}

/// A building owned by a player.
///
/// At most one exists per `(user_id, building_type_id)`. The only field
/// that changes after purchase is `last_collection_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OwnedBuilding {
    /// Unique owned-building identifier.
    pub id: BuildingId,
    /// The owning player.
    pub user_id: UserId,
    /// What kind of building this is.
    pub building_type_id: BuildingTypeId,
    /// Reserved for upgrades; always 1.
    pub level: u32,
    /// Accrual baseline. Production is computed from this instant.
    pub last_collection_at: DateTime<Utc>,
    /// When the building was purchased.
    pub created_at: DateTime<Utc>,
}

/// Accrued-but-uncollected output of one production rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProductionPreview {
    /// The resource being produced.
    pub resource_type_id: ResourceTypeId,
    /// Units accrued so far, including the fractional part.
    #[ts(as = "String")]
    pub produced: Decimal,
    /// Units produced per minute.
    #[ts(as = "String")]
    pub rate_per_minute: Decimal,
    /// Storage ceiling.
    pub storage_capacity: u64,
    /// Whether accrual has stalled at the storage ceiling.
    pub full: bool,
}

/// An owned building joined with its type and live production preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OwnedBuildingView {
    /// The ownership record.
    pub building: OwnedBuilding,
    /// The building's catalog type.
    pub building_type: BuildingType,
    /// One preview per production rule.
    pub production: Vec<ProductionPreview>,
}
