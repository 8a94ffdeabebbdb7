//! Random starter-resource draws for the harvester.
//!
//! A harvest picks one resource uniformly among the harvestable tier and a
//! quantity uniformly from an inclusive range. The RNG is passed in so the
//! stores can share one and tests can seed it.

use rand::Rng;
use salvage_types::ResourceType;

/// A resource and quantity drawn by the harvester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestDraw {
    /// The resource drawn.
    pub resource: ResourceType,
    /// Units drawn.
    pub quantity: u64,
}

/// Draw one harvest.
///
/// `candidates` should already be filtered to the harvestable tier. Returns
/// `None` when there is nothing to draw from. The quantity is drawn from
/// `min_quantity..=max_quantity`; a reversed range draws `min_quantity`.
pub fn draw<R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &[ResourceType],
    min_quantity: u64,
    max_quantity: u64,
) -> Option<HarvestDraw> {
    if candidates.is_empty() {
        return None;
    }

    let index = rng.random_range(0..candidates.len());
    let resource = candidates.get(index)?.clone();
    let quantity = if max_quantity > min_quantity {
        rng.random_range(min_quantity..=max_quantity)
    } else {
        min_quantity
    };

    tracing::trace!(resource = %resource.name, quantity, "harvest drawn");

    Some(HarvestDraw { resource, quantity })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use salvage_types::ResourceTypeId;

    use super::*;

    fn resource(name: &str) -> ResourceType {
        ResourceType {
            id: ResourceTypeId::new(),
            name: name.to_owned(),
            display_name: name.to_owned(),
            description: None,
            tier: 1,
            icon: None,
        }
    }

    #[test]
    fn empty_candidates_draw_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(draw(&mut rng, &[], 1, 5).is_none());
    }

    #[test]
    fn quantity_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let candidates = [resource("stone")];
        for _ in 0..500 {
            let drawn = draw(&mut rng, &candidates, 1, 5).map(|d| d.quantity);
            assert!(matches!(drawn, Some(1..=5)), "out of range: {drawn:?}");
        }
    }

    #[test]
    fn every_candidate_and_quantity_is_reachable() {
        let mut rng = StdRng::seed_from_u64(1234);
        let candidates = [resource("stone"), resource("scrap_metal"), resource("raw_fuel")];
        let mut names = BTreeSet::new();
        let mut quantities = BTreeSet::new();
        for _ in 0..1000 {
            if let Some(d) = draw(&mut rng, &candidates, 1, 5) {
                names.insert(d.resource.name);
                quantities.insert(d.quantity);
            }
        }
        assert_eq!(names.len(), 3);
        assert_eq!(quantities, (1..=5).collect::<BTreeSet<u64>>());
    }

    #[test]
    fn degenerate_range_draws_minimum() {
        let mut rng = StdRng::seed_from_u64(9);
        let candidates = [resource("stone")];
        assert_eq!(draw(&mut rng, &candidates, 3, 3).map(|d| d.quantity), Some(3));
        assert_eq!(draw(&mut rng, &candidates, 4, 2).map(|d| d.quantity), Some(4));
    }

    #[test]
    fn same_seed_same_draws() {
        let candidates = [resource("stone"), resource("data_fragments")];
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(draw(&mut a, &candidates, 1, 5), draw(&mut b, &candidates, 1, 5));
        }
    }
}
