//! Shared type definitions for the Salvage idle game.
//!
//! This crate is the single source of truth for the records passed between
//! the game logic, the stores, and the HTTP API. Types flow downstream to
//! `TypeScript` via `ts-rs` for the browser UI.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for users, catalog entries, buildings
//! - [`structs`] -- Catalog records and per-player records
//! - [`outcomes`] -- Success payloads of the player-facing operations

pub mod ids;
pub mod outcomes;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use ids::{BuildingId, BuildingTypeId, ResourceTypeId, UserId};
pub use outcomes::{
    Affordability, CollectOutcome, CollectedResource, HarvestOutcome, HarvesterStatus, Shortfall,
};
pub use structs::{
    BuildingCost, BuildingDetails, BuildingType, Catalog, InventoryEntry, InventoryItem,
    OwnedBuilding, OwnedBuildingView, ProductionPreview, ProductionRule, ResourceType,
};
