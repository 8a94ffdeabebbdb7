//! Process-local game backend.
//!
//! All state lives behind one [`tokio::sync::Mutex`]. Every operation takes
//! the lock once, runs every check before its first mutation, and releases
//! it on return, so operations are serializable and a rejected operation
//! leaves no trace. State is lost on restart; use it for local play and for
//! exercising the HTTP layer in tests.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use salvage_economy::{Balances, EconomyConfig, accrual, affordability, cooldown, harvest, inventory};
use salvage_types::{
    Affordability, BuildingDetails, BuildingId, BuildingTypeId, Catalog, CollectOutcome,
    HarvestOutcome, HarvesterStatus, InventoryItem, OwnedBuilding, OwnedBuildingView, ResourceType,
    ResourceTypeId, UserId,
};
use tokio::sync::Mutex;

use crate::backend::GameBackend;
use crate::error::{GameError, Rejection};

/// Everything the in-memory backend knows.
#[derive(Debug)]
struct MemoryState {
    catalog: Catalog,
    balances: HashMap<UserId, Balances>,
    last_harvest: HashMap<UserId, DateTime<Utc>>,
    buildings: BTreeMap<BuildingId, OwnedBuilding>,
    rng: StdRng,
}

impl MemoryState {
    fn balances(&self, user: UserId) -> Option<&Balances> {
        self.balances.get(&user)
    }

    fn quantity(&self, user: UserId, resource: ResourceTypeId) -> u64 {
        self.balances(user)
            .map_or(0, |b| inventory::quantity(b, resource))
    }

    fn building_details(&self, id: BuildingTypeId) -> Result<&BuildingDetails, GameError> {
        self.catalog
            .building(id)
            .ok_or_else(|| GameError::not_found("Building type"))
    }

    fn owns(&self, user: UserId, building_type: BuildingTypeId) -> bool {
        self.buildings
            .values()
            .any(|b| b.user_id == user && b.building_type_id == building_type)
    }
}

/// A serialized, in-memory [`GameBackend`].
#[derive(Debug)]
pub struct MemoryBackend {
    economy: EconomyConfig,
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    /// Create a backend over `catalog` with an OS-seeded RNG.
    pub fn new(catalog: Catalog, economy: EconomyConfig) -> Self {
        Self::with_rng(catalog, economy, StdRng::from_os_rng())
    }

    /// Create a backend whose harvest draws are reproducible.
    pub fn with_seed(catalog: Catalog, economy: EconomyConfig, seed: u64) -> Self {
        Self::with_rng(catalog, economy, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Catalog, economy: EconomyConfig, rng: StdRng) -> Self {
        Self {
            economy,
            state: Mutex::new(MemoryState {
                catalog,
                balances: HashMap::new(),
                last_harvest: HashMap::new(),
                buildings: BTreeMap::new(),
                rng,
            }),
        }
    }

    /// A copy of the catalog the backend serves.
    pub async fn catalog_snapshot(&self) -> Catalog {
        self.state.lock().await.catalog.clone()
    }

    /// Units of `resource` the player holds.
    pub async fn quantity(&self, user: UserId, resource: ResourceTypeId) -> u64 {
        self.state.lock().await.quantity(user, resource)
    }

    /// Credit the player's inventory directly, outside any game operation.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Rejected`] with `NotFound` for a resource outside
    /// the catalog, or [`GameError::Infrastructure`] on balance overflow.
    pub async fn credit(
        &self,
        user: UserId,
        resource: ResourceTypeId,
        amount: u64,
    ) -> Result<u64, GameError> {
        let mut state = self.state.lock().await;
        if state.catalog.resource(resource).is_none() {
            return Err(GameError::not_found("Resource"));
        }
        let balances = state.balances.entry(user).or_default();
        Ok(inventory::credit(balances, resource, amount)?)
    }
}

impl GameBackend for MemoryBackend {
    async fn resource_types(&self) -> Result<Vec<ResourceType>, GameError> {
        let state = self.state.lock().await;
        let mut resources = state.catalog.resources.clone();
        resources.sort_by(|a, b| (a.tier, &a.name).cmp(&(b.tier, &b.name)));
        Ok(resources)
    }

    async fn catalog(&self) -> Result<Vec<BuildingDetails>, GameError> {
        let state = self.state.lock().await;
        let mut buildings = state.catalog.buildings.clone();
        buildings.sort_by(|a, b| {
            (a.building_type.tier, &a.building_type.name)
                .cmp(&(b.building_type.tier, &b.building_type.name))
        });
        Ok(buildings)
    }

    async fn inventory(&self, user: UserId) -> Result<Vec<InventoryItem>, GameError> {
        let state = self.state.lock().await;
        let Some(balances) = state.balances(user) else {
            return Ok(Vec::new());
        };

        let mut items: Vec<InventoryItem> = balances
            .iter()
            .filter_map(|(id, quantity)| {
                state.catalog.resource(*id).map(|resource| InventoryItem {
                    resource: resource.clone(),
                    quantity: *quantity,
                })
            })
            .collect();
        items.sort_by(|a, b| {
            (a.resource.tier, &a.resource.name).cmp(&(b.resource.tier, &b.resource.name))
        });
        Ok(items)
    }

    async fn harvester_status(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<HarvesterStatus, GameError> {
        let state = self.state.lock().await;
        let last = state.last_harvest.get(&user).copied();
        Ok(cooldown::evaluate(last, now, self.economy.harvest_cooldown()).into())
    }

    async fn harvest(&self, user: UserId, now: DateTime<Utc>) -> Result<HarvestOutcome, GameError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let cooldown_period = self.economy.harvest_cooldown();

        let last = state.last_harvest.get(&user).copied();
        if let cooldown::CooldownStatus::CoolingDown { remaining_seconds } =
            cooldown::evaluate(last, now, cooldown_period)
        {
            tracing::debug!(%user, remaining_seconds, "harvest rejected: cooling down");
            return Err(Rejection::CooldownActive { remaining_seconds }.into());
        }

        let candidates = state.catalog.resources_by_tier(self.economy.harvest_tier);
        let draw = harvest::draw(
            &mut state.rng,
            &candidates,
            self.economy.harvest_min_quantity,
            self.economy.harvest_max_quantity,
        )
        .ok_or(Rejection::NoResourcesAvailable)?;

        let balances = state.balances.entry(user).or_default();
        inventory::credit(balances, draw.resource.id, draw.quantity)?;
        state.last_harvest.insert(user, now);

        tracing::info!(
            %user,
            resource_type_id = %draw.resource.id,
            quantity = draw.quantity,
            "harvested"
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
        let state = self.state.lock().await;
        let mut owned: Vec<&OwnedBuilding> = state
            .buildings
            .values()
            .filter(|b| b.user_id == user)
            .collect();
        owned.sort_by_key(|b| (b.created_at, b.id));

        owned
            .into_iter()
            .map(|building| -> Result<OwnedBuildingView, GameError> {
                let details = state.building_details(building.building_type_id)?;
                Ok(OwnedBuildingView {
                    building: *building,
                    building_type: details.building_type.clone(),
                    production: accrual::preview(building, &details.production, now),
                })
            })
            .collect()
    }

    async fn can_afford(
        &self,
        user: UserId,
        building_type: BuildingTypeId,
    ) -> Result<Affordability, GameError> {
        let state = self.state.lock().await;
        let details = state.building_details(building_type)?;
        if state.owns(user, building_type) {
            return Err(Rejection::AlreadyOwned {
                building_type_id: building_type,
            }
            .into());
        }
        Ok(affordability::check(&details.costs, |r| {
            state.quantity(user, r)
        }))
    }

    async fn purchase(
        &self,
        user: UserId,
        building_type: BuildingTypeId,
        now: DateTime<Utc>,
    ) -> Result<OwnedBuilding, GameError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let costs = state.building_details(building_type)?.costs.clone();
        if state.owns(user, building_type) {
            return Err(Rejection::AlreadyOwned {
                building_type_id: building_type,
            }
            .into());
        }

        let shortfalls = affordability::shortfalls(&costs, |r| state.quantity(user, r));
        if !shortfalls.is_empty() {
            tracing::debug!(%user, %building_type, "purchase rejected: insufficient resources");
            return Err(Rejection::InsufficientResources { shortfalls }.into());
        }

        // Debit a copy so a failure part-way leaves the live balances intact.
        let mut balances = state.balances(user).cloned().unwrap_or_default();
        for cost in affordability::lock_order(&costs) {
            inventory::debit(&mut balances, cost.resource_type_id, cost.quantity)?;
        }

        let building = OwnedBuilding {
            id: BuildingId::new(),
            user_id: user,
            building_type_id: building_type,
            level: 1,
            last_collection_at: now,
            created_at: now,
        };
        state.balances.insert(user, balances);
        state.buildings.insert(building.id, building);

        tracing::info!(%user, %building_type, building_id = %building.id, "building purchased");

        Ok(building)
    }

    async fn collect(
        &self,
        user: UserId,
        building: BuildingId,
        now: DateTime<Utc>,
    ) -> Result<CollectOutcome, GameError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let owned = state
            .buildings
            .get(&building)
            .filter(|b| b.user_id == user)
            .copied()
            .ok_or_else(|| GameError::not_found("Building"))?;
        let rules = state.building_details(owned.building_type_id)?.production.clone();

        let settlement = accrual::settle(&owned, &rules, now)?;

        let mut balances = state.balances(user).cloned().unwrap_or_default();
        for credit in &settlement.credits {
            inventory::credit(&mut balances, credit.resource_type_id, credit.quantity)?;
        }
        state.balances.insert(user, balances);
        if let Some(record) = state.buildings.get_mut(&building) {
            record.last_collection_at = settlement.last_collection_at;
        }

        tracing::info!(
            %user,
            building_id = %building,
            credited = settlement.credits.len(),
            "production collected"
        );

        Ok(CollectOutcome {
            building_id: building,
            collected: settlement.credits,
            last_collection_at: settlement.last_collection_at,
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeDelta;
    use rust_decimal::Decimal;
    use salvage_types::{BuildingType, ProductionRule};

    use super::*;
    use crate::seed::starter_catalog;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap_or_default()
    }

    fn backend() -> MemoryBackend {
        MemoryBackend::with_seed(starter_catalog(), EconomyConfig::default(), 42)
    }

    async fn type_id(backend: &MemoryBackend, name: &str) -> BuildingTypeId {
        let catalog = backend.catalog_snapshot().await;
        catalog
            .building_by_name(name)
            .map(|b| b.building_type.id)
            .unwrap_or_default()
    }

    async fn resource_id(backend: &MemoryBackend, name: &str) -> ResourceTypeId {
        let catalog = backend.catalog_snapshot().await;
        catalog
            .resource_by_name(name)
            .map(|r| r.id)
            .unwrap_or_default()
    }

    fn rejection(err: GameError) -> Rejection {
        match err {
            GameError::Rejected(r) => r,
            GameError::Infrastructure(msg) => panic!("unexpected infrastructure error: {msg}"),
        }
    }

    #[tokio::test]
    async fn harvest_credits_and_starts_cooldown() {
        let backend = backend();
        let user = UserId::new();

        let outcome = backend.harvest(user, t0()).await.unwrap();
        assert!((1..=5).contains(&outcome.quantity));
        assert_eq!(outcome.resource.tier, 1);
        assert_eq!(outcome.next_harvest_available, t0() + TimeDelta::seconds(5));
        assert_eq!(backend.quantity(user, outcome.resource.id).await, outcome.quantity);

        let status = backend.harvester_status(user, t0() + TimeDelta::seconds(1)).await.unwrap();
        assert_eq!(status, HarvesterStatus::cooling_down(4));
    }

    #[tokio::test]
    async fn harvest_during_cooldown_is_rejected_without_effects() {
        let backend = backend();
        let user = UserId::new();
        let first = backend.harvest(user, t0()).await.unwrap();

        let err = backend
            .harvest(user, t0() + TimeDelta::milliseconds(1000))
            .await
            .unwrap_err();
        assert_eq!(rejection(err), Rejection::CooldownActive { remaining_seconds: 4 });
        assert_eq!(backend.quantity(user, first.resource.id).await, first.quantity);

        // The rejected attempt did not restart the cooldown.
        assert!(backend.harvest(user, t0() + TimeDelta::seconds(5)).await.is_ok());
    }

    #[tokio::test]
    async fn harvest_without_tier_one_resources() {
        let backend = MemoryBackend::with_seed(Catalog::default(), EconomyConfig::default(), 1);
        let user = UserId::new();

        let err = backend.harvest(user, t0()).await.unwrap_err();
        assert_eq!(rejection(err), Rejection::NoResourcesAvailable);
        assert!(backend.harvester_status(user, t0()).await.unwrap().ready);
    }

    #[tokio::test]
    async fn cooldowns_are_per_user() {
        let backend = backend();
        let (alice, bob) = (UserId::new(), UserId::new());
        backend.harvest(alice, t0()).await.unwrap();
        assert!(backend.harvest(bob, t0()).await.is_ok());
    }

    #[tokio::test]
    async fn purchase_debits_and_creates() {
        let backend = backend();
        let user = UserId::new();
        let stone = resource_id(&backend, "stone").await;
        let quarry = type_id(&backend, "stone_quarry").await;
        backend.credit(user, stone, 25).await.unwrap();

        let affordability = backend.can_afford(user, quarry).await.unwrap();
        assert!(affordability.affordable);

        let building = backend.purchase(user, quarry, t0()).await.unwrap();
        assert_eq!(building.last_collection_at, t0());
        assert_eq!(building.level, 1);
        assert_eq!(backend.quantity(user, stone).await, 5);

        let err = backend.purchase(user, quarry, t0()).await.unwrap_err();
        assert_eq!(
            rejection(err),
            Rejection::AlreadyOwned { building_type_id: quarry }
        );
        assert_eq!(backend.quantity(user, stone).await, 5);
    }

    #[tokio::test]
    async fn purchase_may_spend_to_exactly_zero() {
        let backend = backend();
        let user = UserId::new();
        let stone = resource_id(&backend, "stone").await;
        let quarry = type_id(&backend, "stone_quarry").await;
        backend.credit(user, stone, 20).await.unwrap();

        backend.purchase(user, quarry, t0()).await.unwrap();
        let items = backend.inventory(user).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 0);
    }

    #[tokio::test]
    async fn unaffordable_purchase_reports_every_shortfall() {
        let backend = backend();
        let user = UserId::new();
        let stone = resource_id(&backend, "stone").await;
        let yard = type_id(&backend, "scrap_yard").await;
        backend.credit(user, stone, 30).await.unwrap();

        let err = backend.purchase(user, yard, t0()).await.unwrap_err();
        let Rejection::InsufficientResources { shortfalls } = rejection(err) else {
            panic!("expected insufficient resources");
        };
        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].required, 10);
        assert_eq!(shortfalls[0].available, 0);
        assert_eq!(backend.quantity(user, stone).await, 30);
        assert!(backend.owned_buildings(user, t0()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn free_building_is_always_affordable() {
        let backend = backend();
        let user = UserId::new();
        let dispenser = type_id(&backend, "resource_dispenser").await;

        assert!(backend.can_afford(user, dispenser).await.unwrap().affordable);
        assert!(backend.purchase(user, dispenser, t0()).await.is_ok());
    }

    #[tokio::test]
    async fn owned_building_is_not_affordable_again() {
        let backend = backend();
        let user = UserId::new();
        let dispenser = type_id(&backend, "resource_dispenser").await;
        backend.purchase(user, dispenser, t0()).await.unwrap();

        let expected = Rejection::AlreadyOwned {
            building_type_id: dispenser,
        };
        assert_eq!(
            rejection(backend.can_afford(user, dispenser).await.unwrap_err()),
            expected
        );
        assert_eq!(
            rejection(backend.purchase(user, dispenser, t0()).await.unwrap_err()),
            expected
        );
        assert!(backend.can_afford(UserId::new(), dispenser).await.unwrap().affordable);
    }

    #[tokio::test]
    async fn harvest_reports_the_resource_icon() {
        let backend = backend();
        let outcome = backend.harvest(UserId::new(), t0()).await.unwrap();
        assert!(outcome.resource.icon.is_some());
    }

    #[tokio::test]
    async fn unknown_building_type_is_not_found() {
        let backend = backend();
        let user = UserId::new();
        let unknown = BuildingTypeId::new();

        assert_eq!(
            rejection(backend.can_afford(user, unknown).await.unwrap_err()),
            Rejection::NotFound { what: "Building type" }
        );
        assert_eq!(
            rejection(backend.purchase(user, unknown, t0()).await.unwrap_err()),
            Rejection::NotFound { what: "Building type" }
        );
    }

    #[tokio::test]
    async fn collect_after_ten_minutes_credits_thirty() {
        let backend = backend();
        let user = UserId::new();
        let stone = resource_id(&backend, "stone").await;
        let quarry = type_id(&backend, "stone_quarry").await;
        backend.credit(user, stone, 20).await.unwrap();
        let building = backend.purchase(user, quarry, t0()).await.unwrap();

        let now = t0() + TimeDelta::minutes(10);
        let outcome = backend.collect(user, building.id, now).await.unwrap();
        assert_eq!(outcome.collected.len(), 1);
        assert_eq!(outcome.collected[0].quantity, 30);
        assert_eq!(outcome.last_collection_at, now);
        assert_eq!(backend.quantity(user, stone).await, 30);
    }

    #[tokio::test]
    async fn early_collect_preserves_progress() {
        let backend = backend();
        let user = UserId::new();
        let stone = resource_id(&backend, "stone").await;
        let scrap = resource_id(&backend, "scrap_metal").await;
        let yard = type_id(&backend, "scrap_yard").await;
        backend.credit(user, stone, 25).await.unwrap();
        backend.credit(user, scrap, 10).await.unwrap();
        let building = backend.purchase(user, yard, t0()).await.unwrap();

        // 10 s at 2/min is a third of a unit: nothing credited, baseline kept.
        let outcome = backend
            .collect(user, building.id, t0() + TimeDelta::seconds(10))
            .await
            .unwrap();
        assert!(outcome.collected.is_empty());
        assert_eq!(outcome.last_collection_at, t0());

        // Another 20 s completes the unit.
        let outcome = backend
            .collect(user, building.id, t0() + TimeDelta::seconds(30))
            .await
            .unwrap();
        assert_eq!(outcome.collected[0].quantity, 1);
        assert_eq!(backend.quantity(user, scrap).await, 1);
    }

    #[tokio::test]
    async fn collect_is_scoped_to_owner() {
        let backend = backend();
        let (owner, other) = (UserId::new(), UserId::new());
        let dispenser = type_id(&backend, "resource_dispenser").await;
        let building = backend.purchase(owner, dispenser, t0()).await.unwrap();

        assert_eq!(
            rejection(backend.collect(other, building.id, t0()).await.unwrap_err()),
            Rejection::NotFound { what: "Building" }
        );
        assert!(backend.collect(owner, building.id, t0()).await.is_ok());
    }

    #[tokio::test]
    async fn owned_buildings_preview_stalls_at_capacity() {
        let backend = backend();
        let user = UserId::new();
        let stone = resource_id(&backend, "stone").await;
        let quarry = type_id(&backend, "stone_quarry").await;
        backend.credit(user, stone, 20).await.unwrap();
        backend.purchase(user, quarry, t0()).await.unwrap();

        let views = backend
            .owned_buildings(user, t0() + TimeDelta::hours(5))
            .await
            .unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].building_type.name, "stone_quarry");
        assert_eq!(views[0].production[0].produced, Decimal::from(300));
        assert!(views[0].production[0].full);
    }

    #[tokio::test]
    async fn concurrent_purchases_spend_once() {
        let backend = Arc::new(backend());
        let user = UserId::new();
        let stone = resource_id(&backend, "stone").await;
        let quarry = type_id(&backend, "stone_quarry").await;
        backend.credit(user, stone, 39).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let backend = Arc::clone(&backend);
                tokio::spawn(async move { backend.purchase(user, quarry, t0()).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(backend.quantity(user, stone).await, 19);
    }

    #[tokio::test]
    async fn concurrent_harvests_pass_gate_once() {
        let backend = Arc::new(backend());
        let user = UserId::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let backend = Arc::clone(&backend);
                tokio::spawn(async move { backend.harvest(user, t0()).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn listings_are_ordered_by_tier_then_name() {
        let backend = backend();
        let names: Vec<String> = backend
            .catalog()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.building_type.name)
            .collect();
        assert_eq!(
            names,
            ["resource_dispenser", "fuel_extractor", "scrap_yard", "stone_quarry"]
        );

        let resources = backend.resource_types().await.unwrap();
        assert_eq!(resources[0].name, "data_fragments");
    }

    #[tokio::test]
    async fn zero_rate_building_never_produces() {
        let resource = ResourceType {
            id: ResourceTypeId::new(),
            name: "dust".to_owned(),
            display_name: "Dust".to_owned(),
            description: None,
            tier: 1,
            icon: None,
        };
        let details = BuildingDetails {
            building_type: BuildingType {
                id: BuildingTypeId::new(),
                name: "idle_shed".to_owned(),
                display_name: "Idle Shed".to_owned(),
                description: None,
                tier: 0,
                icon: None,
            },
            costs: Vec::new(),
            production: vec![ProductionRule {
                resource_type_id: resource.id,
                rate_per_minute: Decimal::ZERO,
                storage_capacity: 100,
            }],
        };
        let shed = details.building_type.id;
        let catalog = Catalog {
            resources: vec![resource],
            buildings: vec![details],
        };
        let backend = MemoryBackend::with_seed(catalog, EconomyConfig::default(), 7);
        let user = UserId::new();
        let building = backend.purchase(user, shed, t0()).await.unwrap();

        let now = t0() + TimeDelta::hours(1);
        let outcome = backend.collect(user, building.id, now).await.unwrap();
        assert!(outcome.collected.is_empty());
        assert_eq!(outcome.last_collection_at, now);
    }
}
