//! The starter catalog.
//!
//! Four tier-1 resources and four buildings. The resource dispenser is a
//! free tier-0 placeholder with no production; the other three each cost
//! starter resources and produce one of them. Stores insert this catalog
//! at startup when it is missing, matching entries by name so reseeding is
//! idempotent.

use rust_decimal::Decimal;
use salvage_types::{
    BuildingCost, BuildingDetails, BuildingType, BuildingTypeId, Catalog, ProductionRule,
    ResourceType, ResourceTypeId,
};

/// Build the starter catalog with freshly generated IDs.
pub fn starter_catalog() -> Catalog {
    let stone = resource(
        "stone",
        "Stone",
        "Rough stone quarried from the ground. Foundation of construction.",
        "Mountain",
    );
    let scrap = resource(
        "scrap_metal",
        "Scrap Metal",
        "Salvaged metal pieces. Can be refined into useful materials.",
        "Wrench",
    );
    let fuel = resource(
        "raw_fuel",
        "Raw Fuel",
        "Unrefined energy source. Volatile but abundant.",
        "Fuel",
    );
    let data = resource(
        "data_fragments",
        "Data Fragments",
        "Corrupted data shards. Contain traces of valuable information.",
        "Binary",
    );

    let buildings = vec![
        building(
            ("resource_dispenser", "Resource Dispenser"),
            "Basic resource generator for starting players",
            "PackageOpen",
            0,
            Vec::new(),
            Vec::new(),
        ),
        building(
            ("stone_quarry", "Stone Quarry"),
            "Extracts stone from bedrock",
            "Mountain",
            1,
            vec![cost(stone.id, 20)],
            vec![rule(stone.id, 3, 300)],
        ),
        building(
            ("scrap_yard", "Scrap Yard"),
            "Processes scrap metal from salvage",
            "Wrench",
            1,
            vec![cost(stone.id, 25), cost(scrap.id, 10)],
            vec![rule(scrap.id, 2, 200)],
        ),
        building(
            ("fuel_extractor", "Fuel Extractor"),
            "Extracts and refines raw fuel",
            "Fuel",
            1,
            vec![cost(stone.id, 30), cost(scrap.id, 15)],
            vec![rule(fuel.id, 2, 250)],
        ),
    ];

    Catalog {
        resources: vec![stone, scrap, fuel, data],
        buildings,
    }
}

fn resource(name: &str, display_name: &str, description: &str, icon: &str) -> ResourceType {
    ResourceType {
        id: ResourceTypeId::new(),
        name: name.to_owned(),
        display_name: display_name.to_owned(),
        description: Some(description.to_owned()),
        tier: 1,
        icon: Some(icon.to_owned()),
    }
}

fn building(
    (name, display_name): (&str, &str),
    description: &str,
    icon: &str,
    tier: u32,
    costs: Vec<BuildingCost>,
    production: Vec<ProductionRule>,
) -> BuildingDetails {
    BuildingDetails {
        building_type: BuildingType {
            id: BuildingTypeId::new(),
            name: name.to_owned(),
            display_name: display_name.to_owned(),
            description: Some(description.to_owned()),
            tier,
            icon: Some(icon.to_owned()),
        },
        costs,
        production,
    }
}

const fn cost(resource_type_id: ResourceTypeId, quantity: u64) -> BuildingCost {
    BuildingCost {
        resource_type_id,
        quantity,
    }
}

fn rule(resource_type_id: ResourceTypeId, rate: i64, storage_capacity: u64) -> ProductionRule {
    ProductionRule {
        resource_type_id,
        rate_per_minute: Decimal::from(rate),
        storage_capacity,
    }
}
