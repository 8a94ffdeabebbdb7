//! HTTP API for the Salvage idle game.
//!
//! A thin Axum layer over [`salvage_core::GameBackend`]: it extracts the
//! caller's identity, reads the clock, calls one backend operation, and
//! maps the outcome onto a JSON envelope and status code.
//!
//! # Modules
//!
//! - [`auth`] -- Caller identity extractor ([`CurrentUser`](auth::CurrentUser))
//! - [`error`] -- [`ApiError`](error::ApiError) and its HTTP mapping
//! - [`handlers`] -- REST endpoint handlers
//! - [`router`] -- Route table and middleware
//! - [`server`] -- Bind, serve, graceful shutdown
//! - [`state`] -- Shared application state

pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
