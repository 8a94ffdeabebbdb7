//! Server binary for the Salvage idle game.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `SALVAGE_CONFIG` (default `salvage-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the configured backend:
//!    - `postgres`: connect, run migrations, seed the starter catalog
//!    - `memory`: start from the starter catalog
//! 4. Serve the HTTP API until `Ctrl-C`

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use salvage_api::{AppState, ServerConfig, start_server};
use salvage_core::{BackendKind, GameBackend, GameConfig, MemoryBackend, starter_catalog};
use salvage_db::{PgBackend, PostgresConfig, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::LaunchError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "salvage-config.yaml";

#[tokio::main]
async fn main() -> Result<(), LaunchError> {
    let (config, config_found) = load_config()?;
    init_logging(&config);

    info!(
        backend = ?config.database.backend,
        host = %config.server.host,
        port = config.server.port,
        harvest_cooldown_ms = config.economy.harvest_cooldown_ms,
        config_found,
        "salvage-server starting"
    );

    let server = ServerConfig::from(&config.server);
    match config.database.backend {
        BackendKind::Postgres => {
            let pool = PostgresPool::connect(&PostgresConfig::from_section(&config.database)).await?;
            if config.database.run_migrations {
                pool.run_migrations().await?;
            }
            let backend = PgBackend::new(pool.clone(), config.economy.clone());
            if config.database.seed_catalog {
                backend.seed_catalog(&starter_catalog()).await?;
            }
            let result = serve(&server, backend).await;
            pool.close().await;
            result
        }
        BackendKind::Memory => {
            tracing::warn!("Running on the in-memory backend; state is lost on exit");
            let backend = MemoryBackend::new(starter_catalog(), config.economy.clone());
            serve(&server, backend).await
        }
    }
}

async fn serve<B: GameBackend>(server: &ServerConfig, backend: B) -> Result<(), LaunchError> {
    let state = Arc::new(AppState::with_system_clock(Arc::new(backend)));
    start_server(server, state).await?;
    Ok(())
}

/// Load the configuration file, falling back to defaults (plus environment
/// overrides) when it does not exist.
fn load_config() -> Result<(GameConfig, bool), LaunchError> {
    let path = std::env::var("SALVAGE_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        return Ok((GameConfig::from_file(&path)?, true));
    }

    let mut config = GameConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok((config, false))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(config: &GameConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
