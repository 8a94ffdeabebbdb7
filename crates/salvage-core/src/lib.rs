//! Game operations for the Salvage idle game.
//!
//! This crate defines the [`GameBackend`] trait every store implements, the
//! error taxonomy callers match on, and the configuration the server loads.
//! It also ships [`MemoryBackend`], a complete serialized implementation
//! used for local play and for testing the HTTP layer.
//!
//! # Modules
//!
//! - [`backend`] -- The [`GameBackend`] trait
//! - [`clock`] -- Wall-clock abstraction ([`Clock`], [`SystemClock`], [`ManualClock`])
//! - [`config`] -- YAML configuration ([`GameConfig`])
//! - [`error`] -- [`GameError`] and [`Rejection`]
//! - [`memory`] -- The in-memory backend
//! - [`seed`] -- The starter catalog

pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod memory;
pub mod seed;

pub use backend::GameBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BackendKind, ConfigError, GameConfig};
pub use error::{GameError, Rejection};
pub use memory::MemoryBackend;
pub use seed::starter_catalog;
