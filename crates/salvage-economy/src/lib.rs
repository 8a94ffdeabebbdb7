//! Economy rules for the Salvage idle game.
//!
//! Everything here is pure: no I/O, no clocks, no locks. The stores in
//! `salvage-core` and `salvage-db` read state, call into these rules, and
//! write the results back inside one transaction.
//!
//! # Modules
//!
//! - [`accrual`] -- Linear production accrual, capacity clamp, and
//!   collection settlement with fractional rollback
//! - [`affordability`] -- Purchase price checks and lock ordering
//! - [`config`] -- Harvester tuning ([`EconomyConfig`])
//! - [`cooldown`] -- The per-player harvest cooldown gate
//! - [`error`] -- Error types ([`EconomyError`])
//! - [`harvest`] -- Uniform random harvest draws
//! - [`inventory`] -- Checked balance arithmetic

pub mod accrual;
pub mod affordability;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod harvest;
pub mod inventory;

// Re-export primary types at crate root for convenience.
pub use accrual::{ProducedAmount, Settlement, compute_production, settle};
pub use config::EconomyConfig;
pub use cooldown::CooldownStatus;
pub use error::EconomyError;
pub use harvest::HarvestDraw;
pub use inventory::Balances;
