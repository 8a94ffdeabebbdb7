//! The game backend trait.
//!
//! A [`GameBackend`] owns the persistent state (catalog, inventories,
//! cooldowns, owned buildings) and exposes one method per player-facing
//! operation. Each mutating method is a single atomic unit: either every
//! effect commits or none does.
//!
//! Two implementations exist: [`MemoryBackend`](crate::memory::MemoryBackend)
//! in this crate and `PgBackend` in `salvage-db`. The HTTP layer is generic
//! over the trait, so tests run the full API against the in-memory one.
//!
//! Expected business outcomes come back as [`GameError::Rejected`]; only
//! store faults are [`GameError::Infrastructure`].
//!
//! [`GameError::Rejected`]: crate::error::GameError::Rejected
//! [`GameError::Infrastructure`]: crate::error::GameError::Infrastructure

use std::future::Future;

use chrono::{DateTime, Utc};
use salvage_types::{
    Affordability, BuildingDetails, BuildingId, BuildingTypeId, CollectOutcome, HarvestOutcome,
    HarvesterStatus, InventoryItem, OwnedBuilding, OwnedBuildingView, ResourceType, UserId,
};

use crate::error::GameError;

/// Storage and transaction boundary for every game operation.
///
/// `now` is always supplied by the caller so that a request is evaluated
/// against a single instant.
pub trait GameBackend: Send + Sync + 'static {
    /// All resource types, ordered by tier then name.
    fn resource_types(&self) -> impl Future<Output = Result<Vec<ResourceType>, GameError>> + Send;

    /// All building types with their costs and production rules, ordered by
    /// tier then name.
    fn catalog(&self) -> impl Future<Output = Result<Vec<BuildingDetails>, GameError>> + Send;

    /// The player's non-empty and previously-touched balances, ordered by
    /// tier then name.
    fn inventory(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<InventoryItem>, GameError>> + Send;

    /// Read-only cooldown probe.
    fn harvester_status(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<HarvesterStatus, GameError>> + Send;

    /// Pass the cooldown gate, draw a random starter resource, credit it, and
    /// consume the cooldown.
    ///
    /// Rejects with `CooldownActive` or `NoResourcesAvailable`. A rejected or
    /// failed harvest leaves the cooldown untouched.
    fn harvest(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<HarvestOutcome, GameError>> + Send;

    /// The player's buildings with a live production preview at `now`.
    fn owned_buildings(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<OwnedBuildingView>, GameError>> + Send;

    /// Whether the player can currently pay for `building_type`.
    ///
    /// Rejects with `NotFound` for an unknown type and `AlreadyOwned` when the
    /// player already holds one, so a `true` answer means `purchase` would
    /// succeed against the same state.
    fn can_afford(
        &self,
        user: UserId,
        building_type: BuildingTypeId,
    ) -> impl Future<Output = Result<Affordability, GameError>> + Send;

    /// Debit the building's cost and create the ownership record.
    ///
    /// Rejects with `NotFound`, `AlreadyOwned`, or `InsufficientResources`.
    fn purchase(
        &self,
        user: UserId,
        building_type: BuildingTypeId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<OwnedBuilding, GameError>> + Send;

    /// Settle a building's accrued production into the player's inventory.
    ///
    /// Rejects with `NotFound` if the player owns no building with this ID.
    fn collect(
        &self,
        user: UserId,
        building: BuildingId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<CollectOutcome, GameError>> + Send;
}
