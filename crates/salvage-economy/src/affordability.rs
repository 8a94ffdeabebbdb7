//! Purchase affordability checks.
//!
//! A building is affordable when the player holds at least the required
//! quantity of every cost resource. A building with no cost lines is free.

use salvage_types::{Affordability, BuildingCost, ResourceTypeId, Shortfall};

/// Every cost line the player cannot cover.
///
/// `balance` returns the player's current quantity of a resource (0 when
/// they hold none).
pub fn shortfalls<F>(costs: &[BuildingCost], mut balance: F) -> Vec<Shortfall>
where
    F: FnMut(ResourceTypeId) -> u64,
{
    costs
        .iter()
        .filter_map(|cost| {
            let available = balance(cost.resource_type_id);
            (available < cost.quantity).then_some(Shortfall {
                resource_type_id: cost.resource_type_id,
                required: cost.quantity,
                available,
            })
        })
        .collect()
}

/// Affordability verdict for a cost list.
pub fn check<F>(costs: &[BuildingCost], balance: F) -> Affordability
where
    F: FnMut(ResourceTypeId) -> u64,
{
    Affordability::from_shortfalls(shortfalls(costs, balance))
}

/// Cost lines in ascending resource order.
///
/// Stores lock inventory rows in this order so that concurrent purchases
/// for the same player cannot deadlock.
pub fn lock_order(costs: &[BuildingCost]) -> Vec<BuildingCost> {
    let mut ordered = costs.to_vec();
    ordered.sort_by_key(|c| c.resource_type_id);
    ordered
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn cost(resource: ResourceTypeId, quantity: u64) -> BuildingCost {
        BuildingCost {
            resource_type_id: resource,
            quantity,
        }
    }

    #[test]
    fn empty_cost_list_is_always_affordable() {
        let verdict = check(&[], |_| 0);
        assert!(verdict.affordable);
        assert!(verdict.shortfalls.is_empty());
    }

    #[test]
    fn exact_balance_is_affordable() {
        let stone = ResourceTypeId::new();
        let wallet = BTreeMap::from([(stone, 20_u64)]);
        let verdict = check(&[cost(stone, 20)], |r| wallet.get(&r).copied().unwrap_or(0));
        assert!(verdict.affordable);
    }

    #[test]
    fn reports_every_missing_line() {
        let stone = ResourceTypeId::new();
        let scrap = ResourceTypeId::new();
        let fuel = ResourceTypeId::new();
        let wallet = BTreeMap::from([(stone, 30_u64), (scrap, 4_u64)]);
        let costs = [cost(stone, 25), cost(scrap, 10), cost(fuel, 1)];

        let missing = shortfalls(&costs, |r| wallet.get(&r).copied().unwrap_or(0));
        assert_eq!(missing.len(), 2);
        assert_eq!(
            missing.first(),
            Some(&Shortfall {
                resource_type_id: scrap,
                required: 10,
                available: 4,
            })
        );
        assert_eq!(missing.get(1).map(|s| s.available), Some(0));
    }

    #[test]
    fn lock_order_is_ascending() {
        let a = ResourceTypeId::new();
        let b = ResourceTypeId::new();
        let ordered = lock_order(&[cost(b, 1), cost(a, 2)]);
        let ids: Vec<_> = ordered.iter().map(|c| c.resource_type_id).collect();
        assert_eq!(ids, vec![a.min(b), a.max(b)]);
    }
}
