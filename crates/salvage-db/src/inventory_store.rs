//! Per-player inventory persistence.
//!
//! One row per (user, resource type), created lazily on first credit and
//! never deleted. `quantity` is guarded by `CHECK (quantity >= 0)`; debits
//! are additionally guarded in the `WHERE` clause so a short balance is
//! reported instead of raising a constraint violation.

use salvage_types::{InventoryItem, ResourceType, ResourceTypeId, UserId};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{DbError, to_i64, to_u32, to_u64};

/// Operations on the `inventories` table.
pub struct InventoryStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> InventoryStore<'c> {
    /// Create a store bound to a connection or open transaction.
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Units of `resource` held, or 0 without a row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub async fn quantity(&mut self, user: UserId, resource: ResourceTypeId) -> Result<u64, DbError> {
        let row: Option<i64> = sqlx::query_scalar(
            r"SELECT quantity FROM inventories
              WHERE user_id = $1 AND resource_type_id = $2",
        )
        .bind(user.into_inner())
        .bind(resource.into_inner())
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map_or(Ok(0), |q| to_u64("inventories.quantity", q))
    }

    /// Like [`quantity`](Self::quantity), but locks the row until the
    /// enclosing transaction ends. A missing row is not locked; the
    /// `UNIQUE` key still serializes a concurrent first credit.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub async fn quantity_for_update(
        &mut self,
        user: UserId,
        resource: ResourceTypeId,
    ) -> Result<u64, DbError> {
        let row: Option<i64> = sqlx::query_scalar(
            r"SELECT quantity FROM inventories
              WHERE user_id = $1 AND resource_type_id = $2
              FOR UPDATE",
        )
        .bind(user.into_inner())
        .bind(resource.into_inner())
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map_or(Ok(0), |q| to_u64("inventories.quantity", q))
    }

    /// Add `amount` units, creating the row if needed. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or the balance overflows `BIGINT`.
    pub async fn credit(
        &mut self,
        user: UserId,
        resource: ResourceTypeId,
        amount: u64,
    ) -> Result<u64, DbError> {
        let balance: i64 = sqlx::query_scalar(
            r"INSERT INTO inventories (user_id, resource_type_id, quantity)
              VALUES ($1, $2, $3)
              ON CONFLICT (user_id, resource_type_id)
              DO UPDATE SET quantity = inventories.quantity + EXCLUDED.quantity
              RETURNING quantity",
        )
        .bind(user.into_inner())
        .bind(resource.into_inner())
        .bind(to_i64("amount", amount)?)
        .fetch_one(&mut *self.conn)
        .await?;

        tracing::debug!(%user, resource_type_id = %resource, amount, balance, "Inventory credited");
        to_u64("inventories.quantity", balance)
    }

    /// Remove `amount` units. The balance may reach exactly zero.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InsufficientBalance`] if fewer than `amount` units
    /// are held (nothing is changed), or [`DbError`] if a query fails.
    pub async fn debit(
        &mut self,
        user: UserId,
        resource: ResourceTypeId,
        amount: u64,
    ) -> Result<u64, DbError> {
        let amount_i64 = to_i64("amount", amount)?;
        let balance: Option<i64> = sqlx::query_scalar(
            r"UPDATE inventories
              SET quantity = quantity - $3
              WHERE user_id = $1 AND resource_type_id = $2 AND quantity >= $3
              RETURNING quantity",
        )
        .bind(user.into_inner())
        .bind(resource.into_inner())
        .bind(amount_i64)
        .fetch_optional(&mut *self.conn)
        .await?;

        match balance {
            Some(balance) => {
                tracing::debug!(%user, resource_type_id = %resource, amount, balance, "Inventory debited");
                to_u64("inventories.quantity", balance)
            }
            // A zero debit against a missing row is a no-op.
            None if amount == 0 => Ok(0),
            None => Err(DbError::InsufficientBalance {
                resource_type_id: resource,
                requested: amount,
                available: self.quantity(user, resource).await?,
            }),
        }
    }

    /// Every row the player has, joined with its resource type and ordered
    /// by tier then name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row is malformed.
    pub async fn list(&mut self, user: UserId) -> Result<Vec<InventoryItem>, DbError> {
        let rows = sqlx::query_as::<_, InventoryItemRow>(
            r"SELECT r.id, r.name, r.display_name, r.description, r.tier, r.icon, i.quantity
              FROM inventories i
              JOIN resource_types r ON r.id = i.resource_type_id
              WHERE i.user_id = $1
              ORDER BY r.tier, r.name",
        )
        .bind(user.into_inner())
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(InventoryItemRow::into_item).collect()
    }
}

/// An inventory row joined with its resource type.
#[derive(Debug, Clone, sqlx::FromRow)]
struct InventoryItemRow {
    id: Uuid,
    name: String,
    display_name: String,
    description: Option<String>,
    tier: i32,
    icon: Option<String>,
    quantity: i64,
}

impl InventoryItemRow {
    fn into_item(self) -> Result<InventoryItem, DbError> {
        Ok(InventoryItem {
            resource: ResourceType {
                id: ResourceTypeId::from(self.id),
                name: self.name,
                display_name: self.display_name,
                description: self.description,
                tier: to_u32("tier", self.tier)?,
                icon: self.icon,
            },
            quantity: to_u64("inventories.quantity", self.quantity)?,
        })
    }
}
