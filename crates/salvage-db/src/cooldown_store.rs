//! Harvest cooldown persistence: one row per player.

use chrono::{DateTime, Utc};
use salvage_types::UserId;
use sqlx::PgConnection;

use crate::error::DbError;

/// Operations on the `harvest_cooldowns` table.
pub struct CooldownStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> CooldownStore<'c> {
    /// Create a store bound to a connection or open transaction.
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// The player's last harvest, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub async fn last_harvest(&mut self, user: UserId) -> Result<Option<DateTime<Utc>>, DbError> {
        let row: Option<Option<DateTime<Utc>>> = sqlx::query_scalar(
            "SELECT last_harvest_at FROM harvest_cooldowns WHERE user_id = $1",
        )
        .bind(user.into_inner())
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.flatten())
    }

    /// Lock the player's cooldown row for the rest of the transaction and
    /// return the last harvest.
    ///
    /// A placeholder row with a `NULL` timestamp is inserted first so there
    /// is always a row to lock, even before the first harvest. If the
    /// transaction rolls back, so does the placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a query fails.
    pub async fn lock(&mut self, user: UserId) -> Result<Option<DateTime<Utc>>, DbError> {
        sqlx::query(
            r"INSERT INTO harvest_cooldowns (user_id, last_harvest_at)
              VALUES ($1, NULL)
              ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user.into_inner())
        .execute(&mut *self.conn)
        .await?;

        let last: Option<DateTime<Utc>> = sqlx::query_scalar(
            r"SELECT last_harvest_at FROM harvest_cooldowns
              WHERE user_id = $1
              FOR UPDATE",
        )
        .bind(user.into_inner())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(last)
    }

    /// Record a harvest at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub async fn set_last_harvest(&mut self, user: UserId, at: DateTime<Utc>) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO harvest_cooldowns (user_id, last_harvest_at)
              VALUES ($1, $2)
              ON CONFLICT (user_id) DO UPDATE SET last_harvest_at = EXCLUDED.last_harvest_at",
        )
        .bind(user.into_inner())
        .bind(at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }
}
