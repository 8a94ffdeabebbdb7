//! Building ownership persistence.
//!
//! `UNIQUE (user_id, building_type_id)` is the final word on single
//! ownership: [`BuildingStore::create`] reports a conflict instead of
//! failing, so a purchase racing another purchase of the same type
//! resolves to `AlreadyOwned`.

use chrono::{DateTime, Utc};
use salvage_types::{BuildingId, BuildingTypeId, OwnedBuilding, UserId};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{DbError, to_i32, to_u32};

/// Operations on the `owned_buildings` table.
pub struct BuildingStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> BuildingStore<'c> {
    /// Create a store bound to a connection or open transaction.
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// The player's building of the given type, if owned.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or the row is malformed.
    pub async fn owned(
        &mut self,
        user: UserId,
        building_type: BuildingTypeId,
    ) -> Result<Option<OwnedBuilding>, DbError> {
        let row = sqlx::query_as::<_, OwnedBuildingRow>(
            r"SELECT id, user_id, building_type_id, level, last_collection_at, created_at
              FROM owned_buildings
              WHERE user_id = $1 AND building_type_id = $2",
        )
        .bind(user.into_inner())
        .bind(building_type.into_inner())
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(OwnedBuildingRow::into_building).transpose()
    }

    /// Look up a building by ID, scoped to its owner, and lock the row until
    /// the enclosing transaction ends. Concurrent collects of one building
    /// queue here.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or the row is malformed.
    pub async fn by_id_for_update(
        &mut self,
        building: BuildingId,
        user: UserId,
    ) -> Result<Option<OwnedBuilding>, DbError> {
        let row = sqlx::query_as::<_, OwnedBuildingRow>(
            r"SELECT id, user_id, building_type_id, level, last_collection_at, created_at
              FROM owned_buildings
              WHERE id = $1 AND user_id = $2
              FOR UPDATE",
        )
        .bind(building.into_inner())
        .bind(user.into_inner())
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(OwnedBuildingRow::into_building).transpose()
    }

    /// All of a player's buildings, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row is malformed.
    pub async fn list(&mut self, user: UserId) -> Result<Vec<OwnedBuilding>, DbError> {
        let rows = sqlx::query_as::<_, OwnedBuildingRow>(
            r"SELECT id, user_id, building_type_id, level, last_collection_at, created_at
              FROM owned_buildings
              WHERE user_id = $1
              ORDER BY created_at, id",
        )
        .bind(user.into_inner())
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(OwnedBuildingRow::into_building).collect()
    }

    /// Insert an ownership record. Returns `false` if the player already
    /// owns a building of this type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the insert fails for another reason.
    pub async fn create(&mut self, building: &OwnedBuilding) -> Result<bool, DbError> {
        let inserted = sqlx::query(
            r"INSERT INTO owned_buildings
                (id, user_id, building_type_id, level, last_collection_at, created_at)
              VALUES ($1, $2, $3, $4, $5, $6)
              ON CONFLICT (user_id, building_type_id) DO NOTHING",
        )
        .bind(building.id.into_inner())
        .bind(building.user_id.into_inner())
        .bind(building.building_type_id.into_inner())
        .bind(to_i32("level", building.level)?)
        .bind(building.last_collection_at)
        .bind(building.created_at)
        .execute(&mut *self.conn)
        .await?
        .rows_affected();

        Ok(inserted == 1)
    }

    /// Store a new collection baseline.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the update fails.
    pub async fn update_last_collection(
        &mut self,
        building: BuildingId,
        at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE owned_buildings SET last_collection_at = $2 WHERE id = $1")
            .bind(building.into_inner())
            .bind(at)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }
}

/// A row from `owned_buildings`.
#[derive(Debug, Clone, sqlx::FromRow)]
struct OwnedBuildingRow {
    id: Uuid,
    user_id: Uuid,
    building_type_id: Uuid,
    level: i32,
    last_collection_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl OwnedBuildingRow {
    fn into_building(self) -> Result<OwnedBuilding, DbError> {
        Ok(OwnedBuilding {
            id: BuildingId::from(self.id),
            user_id: UserId::from(self.user_id),
            building_type_id: BuildingTypeId::from(self.building_type_id),
            level: to_u32("level", self.level)?,
            last_collection_at: self.last_collection_at,
            created_at: self.created_at,
        })
    }
}
