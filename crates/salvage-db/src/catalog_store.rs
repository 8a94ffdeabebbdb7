//! Catalog persistence: resource types, building types, costs, and
//! production rules.
//!
//! The catalog is read-mostly. It is written only by [`CatalogStore::seed`],
//! which matches entries by their unique `name` so running it on every
//! startup is harmless.

use std::collections::BTreeMap;

use salvage_types::{
    BuildingCost, BuildingDetails, BuildingType, BuildingTypeId, Catalog, ProductionRule,
    ResourceType, ResourceTypeId,
};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{DbError, to_i32, to_i64, to_u32, to_u64};

/// Operations on the catalog tables.
pub struct CatalogStore<'c> {
    conn: &'c mut PgConnection,
}

/// How many catalog entries a seeding pass inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Resource types that did not exist yet.
    pub resources_inserted: usize,
    /// Building types that did not exist yet.
    pub buildings_inserted: usize,
}

impl<'c> CatalogStore<'c> {
    /// Create a store bound to a connection or open transaction.
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// All resource types, ordered by tier then name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row is malformed.
    pub async fn resource_types(&mut self) -> Result<Vec<ResourceType>, DbError> {
        let rows = sqlx::query_as::<_, CatalogEntryRow>(
            r"SELECT id, name, display_name, description, tier, icon
              FROM resource_types
              ORDER BY tier, name",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(CatalogEntryRow::into_resource).collect()
    }

    /// Resource types of one tier, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row is malformed.
    pub async fn resource_types_by_tier(&mut self, tier: u32) -> Result<Vec<ResourceType>, DbError> {
        let rows = sqlx::query_as::<_, CatalogEntryRow>(
            r"SELECT id, name, display_name, description, tier, icon
              FROM resource_types
              WHERE tier = $1
              ORDER BY name",
        )
        .bind(to_i32("tier", tier)?)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(CatalogEntryRow::into_resource).collect()
    }

    /// Look up one building type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or the row is malformed.
    pub async fn building_type(
        &mut self,
        id: BuildingTypeId,
    ) -> Result<Option<BuildingType>, DbError> {
        let row = sqlx::query_as::<_, CatalogEntryRow>(
            r"SELECT id, name, display_name, description, tier, icon
              FROM building_types
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(CatalogEntryRow::into_building).transpose()
    }

    /// Cost lines of a building type, ordered by resource ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row is malformed.
    pub async fn building_costs(
        &mut self,
        id: BuildingTypeId,
    ) -> Result<Vec<BuildingCost>, DbError> {
        let rows = sqlx::query_as::<_, CostRow>(
            r"SELECT building_type_id, resource_type_id, quantity
              FROM building_costs
              WHERE building_type_id = $1
              ORDER BY resource_type_id",
        )
        .bind(id.into_inner())
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(CostRow::into_cost).collect()
    }

    /// Production rules of a building type, ordered by resource ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row is malformed.
    pub async fn production_rules(
        &mut self,
        id: BuildingTypeId,
    ) -> Result<Vec<ProductionRule>, DbError> {
        let rows = sqlx::query_as::<_, ProductionRow>(
            r"SELECT building_type_id, resource_type_id, rate_per_minute, storage_capacity
              FROM building_production
              WHERE building_type_id = $1
              ORDER BY resource_type_id",
        )
        .bind(id.into_inner())
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(ProductionRow::into_rule).collect()
    }

    /// Every building type with its costs and production, ordered by tier
    /// then name. Three queries regardless of catalog size.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a query fails or a row is malformed.
    pub async fn buildings(&mut self) -> Result<Vec<BuildingDetails>, DbError> {
        let types = sqlx::query_as::<_, CatalogEntryRow>(
            r"SELECT id, name, display_name, description, tier, icon
              FROM building_types
              ORDER BY tier, name",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        let costs = sqlx::query_as::<_, CostRow>(
            r"SELECT building_type_id, resource_type_id, quantity
              FROM building_costs
              ORDER BY building_type_id, resource_type_id",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        let rules = sqlx::query_as::<_, ProductionRow>(
            r"SELECT building_type_id, resource_type_id, rate_per_minute, storage_capacity
              FROM building_production
              ORDER BY building_type_id, resource_type_id",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        let mut costs_by_type: BTreeMap<Uuid, Vec<BuildingCost>> = BTreeMap::new();
        for row in costs {
            let key = row.building_type_id;
            costs_by_type.entry(key).or_default().push(row.into_cost()?);
        }
        let mut rules_by_type: BTreeMap<Uuid, Vec<ProductionRule>> = BTreeMap::new();
        for row in rules {
            let key = row.building_type_id;
            rules_by_type.entry(key).or_default().push(row.into_rule()?);
        }

        types
            .into_iter()
            .map(|row| -> Result<BuildingDetails, DbError> {
                let key = row.id;
                Ok(BuildingDetails {
                    building_type: row.into_building()?,
                    costs: costs_by_type.remove(&key).unwrap_or_default(),
                    production: rules_by_type.remove(&key).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// The whole catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a query fails or a row is malformed.
    pub async fn load(&mut self) -> Result<Catalog, DbError> {
        Ok(Catalog {
            resources: self.resource_types().await?,
            buildings: self.buildings().await?,
        })
    }

    /// Insert every entry of `catalog` whose name is not already present.
    ///
    /// Existing entries are left untouched, including their costs and
    /// production. Costs and production of a new building are resolved by
    /// resource *name*, so a seed catalog with fresh IDs lines up with the
    /// rows already stored. Run inside a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if a building references a resource
    /// missing from both `catalog` and the database, or [`DbError`] if a
    /// query fails.
    pub async fn seed(&mut self, catalog: &Catalog) -> Result<SeedReport, DbError> {
        let mut report = SeedReport::default();
        let mut stored_ids: BTreeMap<ResourceTypeId, Uuid> = BTreeMap::new();

        for resource in &catalog.resources {
            let inserted = sqlx::query(
                r"INSERT INTO resource_types (id, name, display_name, description, tier, icon)
                  VALUES ($1, $2, $3, $4, $5, $6)
                  ON CONFLICT (name) DO NOTHING",
            )
            .bind(resource.id.into_inner())
            .bind(&resource.name)
            .bind(&resource.display_name)
            .bind(&resource.description)
            .bind(to_i32("tier", resource.tier)?)
            .bind(&resource.icon)
            .execute(&mut *self.conn)
            .await?
            .rows_affected();
            if inserted > 0 {
                report.resources_inserted = report.resources_inserted.saturating_add(1);
            }

            let stored: Uuid = sqlx::query_scalar("SELECT id FROM resource_types WHERE name = $1")
                .bind(&resource.name)
                .fetch_one(&mut *self.conn)
                .await?;
            stored_ids.insert(resource.id, stored);
        }

        for details in &catalog.buildings {
            let building = &details.building_type;
            let inserted: Option<Uuid> = sqlx::query_scalar(
                r"INSERT INTO building_types (id, name, display_name, description, tier, icon)
                  VALUES ($1, $2, $3, $4, $5, $6)
                  ON CONFLICT (name) DO NOTHING
                  RETURNING id",
            )
            .bind(building.id.into_inner())
            .bind(&building.name)
            .bind(&building.display_name)
            .bind(&building.description)
            .bind(to_i32("tier", building.tier)?)
            .bind(&building.icon)
            .fetch_optional(&mut *self.conn)
            .await?;

            let Some(building_id) = inserted else {
                continue;
            };
            report.buildings_inserted = report.buildings_inserted.saturating_add(1);

            for cost in &details.costs {
                let resource = resolve(&stored_ids, cost.resource_type_id, &building.name)?;
                sqlx::query(
                    r"INSERT INTO building_costs (building_type_id, resource_type_id, quantity)
                      VALUES ($1, $2, $3)",
                )
                .bind(building_id)
                .bind(resource)
                .bind(to_i64("quantity", cost.quantity)?)
                .execute(&mut *self.conn)
                .await?;
            }

            for rule in &details.production {
                let resource = resolve(&stored_ids, rule.resource_type_id, &building.name)?;
                sqlx::query(
                    r"INSERT INTO building_production
                        (building_type_id, resource_type_id, rate_per_minute, storage_capacity)
                      VALUES ($1, $2, $3, $4)",
                )
                .bind(building_id)
                .bind(resource)
                .bind(rule.rate_per_minute)
                .bind(to_i64("storage_capacity", rule.storage_capacity)?)
                .execute(&mut *self.conn)
                .await?;
            }
        }

        tracing::info!(
            resources_inserted = report.resources_inserted,
            buildings_inserted = report.buildings_inserted,
            "Catalog seeded"
        );
        Ok(report)
    }
}

fn resolve(
    stored_ids: &BTreeMap<ResourceTypeId, Uuid>,
    id: ResourceTypeId,
    building: &str,
) -> Result<Uuid, DbError> {
    stored_ids.get(&id).copied().ok_or_else(|| {
        DbError::Config(format!(
            "building {building} references resource {id} outside the seed catalog"
        ))
    })
}

/// A row from `resource_types` or `building_types` (same shape).
#[derive(Debug, Clone, sqlx::FromRow)]
struct CatalogEntryRow {
    id: Uuid,
    name: String,
    display_name: String,
    description: Option<String>,
    tier: i32,
    icon: Option<String>,
}

impl CatalogEntryRow {
    fn into_resource(self) -> Result<ResourceType, DbError> {
        Ok(ResourceType {
            id: ResourceTypeId::from(self.id),
            tier: to_u32("tier", self.tier)?,
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            icon: self.icon,
        })
    }

    fn into_building(self) -> Result<BuildingType, DbError> {
        Ok(BuildingType {
            id: BuildingTypeId::from(self.id),
            tier: to_u32("tier", self.tier)?,
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            icon: self.icon,
        })
    }
}

/// A row from `building_costs`.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CostRow {
    building_type_id: Uuid,
    resource_type_id: Uuid,
    quantity: i64,
}

impl CostRow {
    fn into_cost(self) -> Result<BuildingCost, DbError> {
        Ok(BuildingCost {
            resource_type_id: ResourceTypeId::from(self.resource_type_id),
            quantity: to_u64("building_costs.quantity", self.quantity)?,
        })
    }
}

/// A row from `building_production`.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductionRow {
    building_type_id: Uuid,
    resource_type_id: Uuid,
    rate_per_minute: rust_decimal::Decimal,
    storage_capacity: i64,
}

impl ProductionRow {
    fn into_rule(self) -> Result<ProductionRule, DbError> {
        Ok(ProductionRule {
            resource_type_id: ResourceTypeId::from(self.resource_type_id),
            rate_per_minute: self.rate_per_minute,
            storage_capacity: to_u64("storage_capacity", self.storage_capacity)?,
        })
    }
}
