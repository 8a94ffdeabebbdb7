//! REST endpoint handlers for the game API.
//!
//! Every handler is generic over the [`GameBackend`], reads `now` once from
//! the shared clock, and wraps its result in the [`ApiResponse`] envelope.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/api/catalog/resources` | All resource types |
//! | `GET` | `/api/catalog/buildings` | Building shop with costs and production |
//! | `GET` | `/api/inventory` | Player inventory |
//! | `GET` | `/api/harvester` | Cooldown countdown |
//! | `POST` | `/api/harvester/harvest` | Harvest a random starter resource |
//! | `GET` | `/api/buildings` | Owned buildings with production preview |
//! | `GET` | `/api/shop/{building_type_id}/affordability` | Affordability probe |
//! | `POST` | `/api/shop/{building_type_id}/purchase` | Buy a building |
//! | `POST` | `/api/buildings/{building_id}/collect` | Collect production |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use salvage_core::GameBackend;
use salvage_types::{
    Affordability, BuildingDetails, BuildingId, BuildingTypeId, CollectOutcome, HarvestOutcome,
    HarvesterStatus, InventoryItem, OwnedBuilding, OwnedBuildingView, ResourceType,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Envelope of every successful response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Player-facing summary, for mutating endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data,
        })
    }

    fn with_message(message: String, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message),
            data,
        })
    }
}

/// Result type of every handler.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(s).map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}

// ---------------------------------------------------------------------------
// Health and catalog
// ---------------------------------------------------------------------------

/// Liveness probe. Does not touch the backend.
pub async fn health() -> Json<ApiResponse<&'static str>> {
    ApiResponse::data("ok")
}

/// List every resource type.
pub async fn list_resources<B: GameBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> ApiResult<Vec<ResourceType>> {
    Ok(ApiResponse::data(state.backend.resource_types().await?))
}

/// List every building type with its costs and production.
pub async fn list_buildings<B: GameBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> ApiResult<Vec<BuildingDetails>> {
    Ok(ApiResponse::data(state.backend.catalog().await?))
}

// ---------------------------------------------------------------------------
// Inventory and harvester
// ---------------------------------------------------------------------------

/// The caller's inventory.
pub async fn inventory<B: GameBackend>(
    State(state): State<Arc<AppState<B>>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<InventoryItem>> {
    Ok(ApiResponse::data(state.backend.inventory(user).await?))
}

/// The caller's harvester cooldown.
pub async fn harvester_status<B: GameBackend>(
    State(state): State<Arc<AppState<B>>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<HarvesterStatus> {
    let now = state.now();
    Ok(ApiResponse::data(
        state.backend.harvester_status(user, now).await?,
    ))
}

/// Harvest a random starter resource.
pub async fn harvest<B: GameBackend>(
    State(state): State<Arc<AppState<B>>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<HarvestOutcome> {
    let now = state.now();
    let outcome = state.backend.harvest(user, now).await?;
    let message = format!(
        "Harvested {}x {}!",
        outcome.quantity, outcome.resource.display_name
    );
    Ok(ApiResponse::with_message(message, outcome))
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// The caller's buildings with live production.
pub async fn owned_buildings<B: GameBackend>(
    State(state): State<Arc<AppState<B>>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<OwnedBuildingView>> {
    let now = state.now();
    Ok(ApiResponse::data(
        state.backend.owned_buildings(user, now).await?,
    ))
}

/// Whether the caller can buy a building type right now.
pub async fn affordability<B: GameBackend>(
    State(state): State<Arc<AppState<B>>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Affordability> {
    let building_type = BuildingTypeId::from(parse_uuid(&id)?);
    Ok(ApiResponse::data(
        state.backend.can_afford(user, building_type).await?,
    ))
}

/// Buy a building.
pub async fn purchase<B: GameBackend>(
    State(state): State<Arc<AppState<B>>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<OwnedBuilding> {
    let building_type = BuildingTypeId::from(parse_uuid(&id)?);
    let now = state.now();
    let building = state.backend.purchase(user, building_type, now).await?;

    // The purchase has committed; a failed name lookup only degrades the message.
    let display_name = state
        .backend
        .catalog()
        .await
        .ok()
        .and_then(|catalog| {
            catalog
                .into_iter()
                .find(|d| d.building_type.id == building_type)
        })
        .map_or_else(|| "building".to_owned(), |d| d.building_type.display_name);
    Ok(ApiResponse::with_message(
        format!("Successfully purchased {display_name}!"),
        building,
    ))
}

/// Collect a building's accrued production.
pub async fn collect<B: GameBackend>(
    State(state): State<Arc<AppState<B>>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<CollectOutcome> {
    let building = BuildingId::from(parse_uuid(&id)?);
    let now = state.now();
    let outcome = state.backend.collect(user, building, now).await?;

    let message = if outcome.collected.is_empty() {
        "Nothing to collect yet."
    } else {
        "Resources collected!"
    };
    Ok(ApiResponse::with_message(message.to_owned(), outcome))
}
