//! Integration tests for the game API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` over the
//! in-memory backend and a manual clock. No TCP server, no database.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeDelta};
use salvage_api::auth::USER_ID_HEADER;
use salvage_api::{AppState, build_router};
use salvage_core::{ManualClock, MemoryBackend, starter_catalog};
use salvage_economy::EconomyConfig;
use salvage_types::UserId;
use serde_json::Value;
use tower::ServiceExt;

struct Harness {
    router: Router,
    backend: Arc<MemoryBackend>,
    clock: ManualClock,
}

fn harness() -> Harness {
    let backend = Arc::new(MemoryBackend::with_seed(
        starter_catalog(),
        EconomyConfig::default(),
        42,
    ));
    let start = DateTime::from_timestamp(1_767_225_600, 0).unwrap();
    let clock = ManualClock::new(start);
    let state = Arc::new(AppState::new(Arc::clone(&backend), Arc::new(clock.clone())));
    Harness {
        router: build_router(state),
        backend,
        clock,
    }
}

impl Harness {
    async fn send(&self, method: &str, path: &str, user: Option<UserId>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(path);
        if let Some(user) = user {
            request = request.header(USER_ID_HEADER, user.to_string());
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, body_to_json(response.into_body()).await)
    }

    async fn building_type_id(&self, name: &str) -> String {
        let catalog = self.backend.catalog_snapshot().await;
        catalog
            .building_by_name(name)
            .map(|b| b.building_type.id.to_string())
            .unwrap()
    }

    async fn grant(&self, user: UserId, resource: &str, amount: u64) {
        let catalog = self.backend.catalog_snapshot().await;
        let id = catalog.resource_by_name(resource).map(|r| r.id).unwrap();
        self.backend.credit(user, id, amount).await.unwrap();
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Health, identity, catalog
// =============================================================================

#[tokio::test]
async fn health_needs_no_identity() {
    let h = harness();
    let (status, body) = h.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "ok");
}

#[tokio::test]
async fn player_routes_require_identity() {
    let h = harness();
    let (status, body) = h.send("GET", "/api/inventory", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 401);
    assert_eq!(body["error"], "You must be logged in.");
}

#[tokio::test]
async fn malformed_identity_is_rejected() {
    let h = harness();
    let request = Request::get("/api/harvester")
        .header(USER_ID_HEADER, "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn catalog_lists_starter_content() {
    let h = harness();
    let (status, body) = h.send("GET", "/api/catalog/buildings", None).await;
    assert_eq!(status, StatusCode::OK);
    let buildings = body["data"].as_array().unwrap();
    assert_eq!(buildings.len(), 4);
    assert_eq!(buildings[0]["building_type"]["name"], "resource_dispenser");

    let (status, body) = h.send("GET", "/api/catalog/resources", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
}

// =============================================================================
// Harvester
// =============================================================================

#[tokio::test]
async fn harvest_then_cooldown() {
    let h = harness();
    let user = UserId::new();

    let (status, body) = h.send("GET", "/api/harvester", Some(user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ready"], true);

    let (status, body) = h.send("POST", "/api/harvester/harvest", Some(user)).await;
    assert_eq!(status, StatusCode::OK);
    let quantity = body["data"]["quantity"].as_u64().unwrap();
    assert!((1..=5).contains(&quantity));
    let display_name = body["data"]["resource"]["display_name"].as_str().unwrap();
    assert!(body["data"]["resource"]["icon"].is_string());
    assert_eq!(
        body["message"],
        format!("Harvested {quantity}x {display_name}!")
    );

    h.clock.advance(TimeDelta::seconds(1));
    let (status, body) = h.send("POST", "/api/harvester/harvest", Some(user)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["remaining_seconds"], 4);
    assert_eq!(body["error"], "Generator is cooling down.");

    let (_, body) = h.send("GET", "/api/harvester", Some(user)).await;
    assert_eq!(body["data"]["ready"], false);
    assert_eq!(body["data"]["remaining_seconds"], 4);

    h.clock.advance(TimeDelta::seconds(4));
    let (status, _) = h.send("POST", "/api/harvester/harvest", Some(user)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = h.send("GET", "/api/inventory", Some(user)).await;
    let total: u64 = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["quantity"].as_u64().unwrap())
        .sum();
    assert!((2..=10).contains(&total));
}

// =============================================================================
// Shop
// =============================================================================

#[tokio::test]
async fn purchase_requires_resources() {
    let h = harness();
    let user = UserId::new();
    let yard = h.building_type_id("scrap_yard").await;

    let (status, body) = h
        .send("GET", &format!("/api/shop/{yard}/affordability"), Some(user))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["affordable"], false);
    assert_eq!(body["data"]["shortfalls"].as_array().unwrap().len(), 2);

    let (status, body) = h
        .send("POST", &format!("/api/shop/{yard}/purchase"), Some(user))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["shortfalls"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn purchase_once_then_conflict() {
    let h = harness();
    let user = UserId::new();
    let quarry = h.building_type_id("stone_quarry").await;
    h.grant(user, "stone", 20).await;

    let (status, body) = h
        .send("POST", &format!("/api/shop/{quarry}/purchase"), Some(user))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level"], 1);
    assert_eq!(body["message"], "Successfully purchased Stone Quarry!");

    let (status, body) = h
        .send("POST", &format!("/api/shop/{quarry}/purchase"), Some(user))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "You already own this building.");

    let (status, _) = h
        .send("GET", &format!("/api/shop/{quarry}/affordability"), Some(user))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = h.send("GET", "/api/inventory", Some(user)).await;
    assert_eq!(body["data"][0]["quantity"], 0);
}

#[tokio::test]
async fn unknown_building_type_is_not_found() {
    let h = harness();
    let user = UserId::new();
    let unknown = UserId::new();
    let (status, body) = h
        .send("GET", &format!("/api/shop/{unknown}/affordability"), Some(user))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Building type not found.");
}

#[tokio::test]
async fn malformed_path_id_is_bad_request() {
    let h = harness();
    let user = UserId::new();
    let (status, body) = h
        .send("POST", "/api/shop/quarry/purchase", Some(user))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

// =============================================================================
// Buildings
// =============================================================================

#[tokio::test]
async fn collect_accrued_production() {
    let h = harness();
    let user = UserId::new();
    let quarry = h.building_type_id("stone_quarry").await;
    h.grant(user, "stone", 20).await;
    let (_, body) = h
        .send("POST", &format!("/api/shop/{quarry}/purchase"), Some(user))
        .await;
    let building_id = body["data"]["id"].as_str().unwrap().to_owned();

    h.clock.advance(TimeDelta::minutes(10));
    let (status, body) = h.send("GET", "/api/buildings", Some(user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["building_type"]["name"], "stone_quarry");
    assert_eq!(body["data"][0]["production"][0]["full"], false);

    let (status, body) = h
        .send("POST", &format!("/api/buildings/{building_id}/collect"), Some(user))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["collected"][0]["quantity"], 30);
    assert_eq!(body["message"], "Resources collected!");

    let (_, body) = h
        .send("POST", &format!("/api/buildings/{building_id}/collect"), Some(user))
        .await;
    assert_eq!(body["message"], "Nothing to collect yet.");
}

#[tokio::test]
async fn collect_of_someone_elses_building_is_not_found() {
    let h = harness();
    let (owner, other) = (UserId::new(), UserId::new());
    let dispenser = h.building_type_id("resource_dispenser").await;
    let (_, body) = h
        .send("POST", &format!("/api/shop/{dispenser}/purchase"), Some(owner))
        .await;
    let building_id = body["data"]["id"].as_str().unwrap().to_owned();

    let (status, body) = h
        .send("POST", &format!("/api/buildings/{building_id}/collect"), Some(other))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Building not found.");
}
