//! `PostgreSQL` backend for the Salvage idle game.
//!
//! # Architecture
//!
//! ```text
//! HTTP request
//!     |
//!     +-- PgBackend (one transaction per operation)
//!         |-- CatalogStore    (resource/building types, costs, production)
//!         |-- InventoryStore  (per-player balances)
//!         |-- CooldownStore   (last harvest per player)
//!         +-- BuildingStore   (owned buildings)
//! ```
//!
//! Stores borrow a `PgConnection`, so the same store code runs against a
//! pooled connection for reads and an open transaction for writes.
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool, configuration, and migrations
//! - [`backend`] -- [`PgBackend`], the transactional `GameBackend`
//! - [`catalog_store`] -- Catalog reads and idempotent seeding
//! - [`inventory_store`] -- Balance reads, credits, and guarded debits
//! - [`cooldown_store`] -- Harvest cooldown rows
//! - [`building_store`] -- Ownership records
//! - [`error`] -- Shared error types

pub mod backend;
pub mod building_store;
pub mod catalog_store;
pub mod cooldown_store;
pub mod error;
pub mod inventory_store;
pub mod postgres;

// Re-export primary types for convenience.
pub use backend::PgBackend;
pub use building_store::BuildingStore;
pub use catalog_store::{CatalogStore, SeedReport};
pub use cooldown_store::CooldownStore;
pub use error::DbError;
pub use inventory_store::InventoryStore;
pub use postgres::{PostgresConfig, PostgresPool};
