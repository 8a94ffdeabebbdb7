//! Transactional [`GameBackend`] over `PostgreSQL`.
//!
//! Each mutating operation runs in one transaction and takes row locks in
//! a fixed order, so concurrent requests for the same player serialize on
//! exactly the rows they share:
//!
//! - **harvest** locks the player's cooldown row.
//! - **collect** locks the owned-building row.
//! - **purchase** locks the cost resources' inventory rows in ascending
//!   resource-ID order; `UNIQUE (user_id, building_type_id)` settles races
//!   on ownership.
//!
//! Returning early drops the transaction, which rolls it back.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use salvage_core::{GameBackend, GameError, Rejection};
use salvage_economy::{EconomyConfig, HarvestDraw, accrual, affordability, cooldown, harvest};
use salvage_types::{
    Affordability, BuildingDetails, BuildingId, BuildingTypeId, Catalog, CollectOutcome,
    HarvestOutcome, HarvesterStatus, InventoryItem, OwnedBuilding, OwnedBuildingView, ResourceType,
    UserId,
};
use sqlx::pool::PoolConnection;
use sqlx::{Postgres, Transaction};

use crate::building_store::BuildingStore;
use crate::catalog_store::{CatalogStore, SeedReport};
use crate::cooldown_store::CooldownStore;
use crate::error::DbError;
use crate::inventory_store::InventoryStore;
use crate::postgres::PostgresPool;

/// The `PostgreSQL` game backend.
pub struct PgBackend {
    pool: PostgresPool,
    economy: EconomyConfig,
    rng: Mutex<StdRng>,
}

impl PgBackend {
    /// Create a backend with an OS-seeded harvest RNG.
    pub fn new(pool: PostgresPool, economy: EconomyConfig) -> Self {
        Self::with_rng(pool, economy, StdRng::from_os_rng())
    }

    /// Create a backend whose harvest draws are reproducible.
    pub fn with_seed(pool: PostgresPool, economy: EconomyConfig, seed: u64) -> Self {
        Self::with_rng(pool, economy, StdRng::seed_from_u64(seed))
    }

    fn with_rng(pool: PostgresPool, economy: EconomyConfig, rng: StdRng) -> Self {
        Self {
            pool,
            economy,
            rng: Mutex::new(rng),
        }
    }

    /// The pool this backend runs on.
    pub const fn pool(&self) -> &PostgresPool {
        &self.pool
    }

    /// Insert the missing entries of `catalog` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if seeding fails; nothing is inserted then.
    pub async fn seed_catalog(&self, catalog: &Catalog) -> Result<SeedReport, DbError> {
        let mut tx = self.pool.pool().begin().await?;
        let report = CatalogStore::new(&mut tx).seed(catalog).await?;
        tx.commit().await?;
        Ok(report)
    }

    async fn conn(&self) -> Result<PoolConnection<Postgres>, DbError> {
        Ok(self.pool.pool().acquire().await?)
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DbError> {
        Ok(self.pool.pool().begin().await?)
    }

    fn draw(&self, candidates: &[ResourceType]) -> Result<Option<HarvestDraw>, DbError> {
        let mut rng = self.rng.lock().map_err(|_| DbError::RngPoisoned)?;
        Ok(harvest::draw(
            &mut *rng,
            candidates,
            self.economy.harvest_min_quantity,
            self.economy.harvest_max_quantity,
        ))
    }
}

async fn commit(tx: Transaction<'static, Postgres>) -> Result<(), DbError> {
    Ok(tx.commit().await?)
}

impl GameBackend for PgBackend {
    async fn resource_types(&self) -> Result<Vec<ResourceType>, GameError> {
        let mut conn = self.conn().await?;
        Ok(CatalogStore::new(&mut conn).resource_types().await?)
    }

    async fn catalog(&self) -> Result<Vec<BuildingDetails>, GameError> {
        let mut conn = self.conn().await?;
        Ok(CatalogStore::new(&mut conn).buildings().await?)
    }

    async fn inventory(&self, user: UserId) -> Result<Vec<InventoryItem>, GameError> {
        let mut conn = self.conn().await?;
        Ok(InventoryStore::new(&mut conn).list(user).await?)
    }

    async fn harvester_status(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<HarvesterStatus, GameError> {
        let mut conn = self.conn().await?;
        let last = CooldownStore::new(&mut conn).last_harvest(user).await?;
        Ok(cooldown::evaluate(last, now, self.economy.harvest_cooldown()).into())
    }

    async fn harvest(&self, user: UserId, now: DateTime<Utc>) -> Result<HarvestOutcome, GameError> {
        let cooldown_period = self.economy.harvest_cooldown();
        let mut tx = self.begin().await?;

        let last = CooldownStore::new(&mut tx).lock(user).await?;
        if let cooldown::CooldownStatus::CoolingDown { remaining_seconds } =
            cooldown::evaluate(last, now, cooldown_period)
        {
            tracing::debug!(%user, remaining_seconds, "Harvest rejected: cooling down");
            return Err(Rejection::CooldownActive { remaining_seconds }.into());
        }

        let candidates = CatalogStore::new(&mut tx)
            .resource_types_by_tier(self.economy.harvest_tier)
            .await?;
        let draw = self
            .draw(&candidates)?
            .ok_or(Rejection::NoResourcesAvailable)?;

        InventoryStore::new(&mut tx)
            .credit(user, draw.resource.id, draw.quantity)
            .await?;
        CooldownStore::new(&mut tx).set_last_harvest(user, now).await?;
        commit(tx).await?;

        tracing::info!(
            %user,
            resource_type_id = %draw.resource.id,
            quantity = draw.quantity,
            "Harvested"
        );

        Ok(HarvestOutcome {
            resource: draw.resource,
            quantity: draw.quantity,
            next_harvest_available: cooldown::next_available(now, cooldown_period),
        })
    }

    async fn owned_buildings(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<OwnedBuildingView>, GameError> {
        let mut conn = self.conn().await?;
        let owned = BuildingStore::new(&mut conn).list(user).await?;
        if owned.is_empty() {
            return Ok(Vec::new());
        }

        let details: BTreeMap<BuildingTypeId, BuildingDetails> = CatalogStore::new(&mut conn)
            .buildings()
            .await?
            .into_iter()
            .map(|d| (d.building_type.id, d))
            .collect();

        owned
            .into_iter()
            .map(|building| -> Result<OwnedBuildingView, GameError> {
                let details = details
                    .get(&building.building_type_id)
                    .ok_or_else(|| GameError::not_found("Building type"))?;
                Ok(OwnedBuildingView {
                    production: accrual::preview(&building, &details.production, now),
                    building_type: details.building_type.clone(),
                    building,
                })
            })
            .collect()
    }

    async fn can_afford(
        &self,
        user: UserId,
        building_type: BuildingTypeId,
    ) -> Result<Affordability, GameError> {
        let mut conn = self.conn().await?;
        let mut catalog = CatalogStore::new(&mut conn);
        if catalog.building_type(building_type).await?.is_none() {
            return Err(GameError::not_found("Building type"));
        }
        let costs = catalog.building_costs(building_type).await?;

        if BuildingStore::new(&mut conn)
            .owned(user, building_type)
            .await?
            .is_some()
        {
            return Err(Rejection::AlreadyOwned {
                building_type_id: building_type,
            }
            .into());
        }

        let mut inventory = InventoryStore::new(&mut conn);
        let mut held = BTreeMap::new();
        for cost in &costs {
            held.insert(
                cost.resource_type_id,
                inventory.quantity(user, cost.resource_type_id).await?,
            );
        }

        Ok(affordability::check(&costs, |r| {
            held.get(&r).copied().unwrap_or(0)
        }))
    }

    async fn purchase(
        &self,
        user: UserId,
        building_type: BuildingTypeId,
        now: DateTime<Utc>,
    ) -> Result<OwnedBuilding, GameError> {
        let already_owned = || -> GameError {
            Rejection::AlreadyOwned {
                building_type_id: building_type,
            }
            .into()
        };
        let mut tx = self.begin().await?;

        let mut catalog = CatalogStore::new(&mut tx);
        if catalog.building_type(building_type).await?.is_none() {
            return Err(GameError::not_found("Building type"));
        }
        let costs = catalog.building_costs(building_type).await?;

        if BuildingStore::new(&mut tx)
            .owned(user, building_type)
            .await?
            .is_some()
        {
            return Err(already_owned());
        }

        let ordered = affordability::lock_order(&costs);
        let mut inventory = InventoryStore::new(&mut tx);
        let mut held = BTreeMap::new();
        for cost in &ordered {
            held.insert(
                cost.resource_type_id,
                inventory
                    .quantity_for_update(user, cost.resource_type_id)
                    .await?,
            );
        }

        let shortfalls =
            affordability::shortfalls(&costs, |r| held.get(&r).copied().unwrap_or(0));
        if !shortfalls.is_empty() {
            tracing::debug!(%user, %building_type, "Purchase rejected: insufficient resources");
            return Err(Rejection::InsufficientResources { shortfalls }.into());
        }

        for cost in &ordered {
            inventory
                .debit(user, cost.resource_type_id, cost.quantity)
                .await?;
        }

        let building = OwnedBuilding {
            id: BuildingId::new(),
            user_id: user,
            building_type_id: building_type,
            level: 1,
            last_collection_at: now,
            created_at: now,
        };
        if !BuildingStore::new(&mut tx).create(&building).await? {
            return Err(already_owned());
        }
        commit(tx).await?;

        tracing::info!(%user, %building_type, building_id = %building.id, "Building purchased");
        Ok(building)
    }

    async fn collect(
        &self,
        user: UserId,
        building: BuildingId,
        now: DateTime<Utc>,
    ) -> Result<CollectOutcome, GameError> {
        let mut tx = self.begin().await?;

        let owned = BuildingStore::new(&mut tx)
            .by_id_for_update(building, user)
            .await?
            .ok_or_else(|| GameError::not_found("Building"))?;
        let rules = CatalogStore::new(&mut tx)
            .production_rules(owned.building_type_id)
            .await?;

        let settlement = accrual::settle(&owned, &rules, now)?;

        let mut inventory = InventoryStore::new(&mut tx);
        for credit in &settlement.credits {
            inventory
                .credit(user, credit.resource_type_id, credit.quantity)
                .await?;
        }
        BuildingStore::new(&mut tx)
            .update_last_collection(building, settlement.last_collection_at)
            .await?;
        commit(tx).await?;

        tracing::info!(
            %user,
            building_id = %building,
            credited = settlement.credits.len(),
            "Production collected"
        );

        Ok(CollectOutcome {
            building_id: building,
            collected: settlement.credits,
            last_collection_at: settlement.last_collection_at,
        })
    }
}
