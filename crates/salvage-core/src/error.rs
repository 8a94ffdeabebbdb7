//! Outcome taxonomy for the game operations.
//!
//! Every operation returns `Result<T, GameError>`. A [`GameError`] is
//! either a [`Rejection`] -- an expected business outcome the player is
//! shown directly (cooldown active, cannot afford, already owned) -- or an
//! infrastructure fault whose detail stays in the logs.

use salvage_types::{BuildingTypeId, Shortfall};

/// An expected, player-facing reason an operation did not happen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// No verified caller identity was supplied.
    #[error("You must be logged in.")]
    NotAuthenticated,

    /// The referenced resource, building type, or owned building does not exist.
    #[error("{what} not found.")]
    NotFound {
        /// What was looked up (e.g. `"Building"`).
        what: &'static str,
    },

    /// The harvester is still cooling down.
    #[error("Generator is cooling down.")]
    CooldownActive {
        /// Whole seconds until the next harvest is allowed.
        remaining_seconds: u64,
    },

    /// The catalog holds no resources of the harvestable tier.
    #[error("No resources available to harvest.")]
    NoResourcesAvailable,

    /// The player cannot pay for the building.
    #[error("You do not have enough resources to purchase this building.")]
    InsufficientResources {
        /// Every uncovered cost line.
        shortfalls: Vec<Shortfall>,
    },

    /// The player already owns a building of this type.
    #[error("You already own this building.")]
    AlreadyOwned {
        /// The building type that is already owned.
        building_type_id: BuildingTypeId,
    },
}

/// Error returned by every game operation.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// An expected business outcome.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The store was unreachable or a transaction failed.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl GameError {
    /// Shorthand for a [`Rejection::NotFound`].
    pub const fn not_found(what: &'static str) -> Self {
        Self::Rejected(Rejection::NotFound { what })
    }

    /// The rejection, if this is a business outcome.
    pub const fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            Self::Infrastructure(_) => None,
        }
    }
}

impl From<salvage_economy::EconomyError> for GameError {
    fn from(err: salvage_economy::EconomyError) -> Self {
        match err {
            salvage_economy::EconomyError::InsufficientResource {
                resource,
                requested,
                available,
            } => Self::Rejected(Rejection::InsufficientResources {
                shortfalls: vec![Shortfall {
                    resource_type_id: resource,
                    required: requested,
                    available,
                }],
            }),
            other => Self::Infrastructure(other.to_string()),
        }
    }
}
