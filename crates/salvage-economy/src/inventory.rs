//! Balance arithmetic for a single player's inventory.
//!
//! Balances are whole units keyed by resource type. Credits and debits use
//! checked arithmetic -- no silent overflows, no negative balances. An entry
//! is created lazily on first credit and kept (possibly at zero) afterwards.

use std::collections::BTreeMap;

use salvage_types::ResourceTypeId;

use crate::error::EconomyError;

/// A player's balances, keyed by resource type.
pub type Balances = BTreeMap<ResourceTypeId, u64>;

/// Units of `resource` held (0 when there is no entry).
pub fn quantity(balances: &Balances, resource: ResourceTypeId) -> u64 {
    balances.get(&resource).copied().unwrap_or(0)
}

/// Add `amount` units of `resource`.
///
/// # Errors
///
/// Returns [`EconomyError::ArithmeticOverflow`] if the balance would exceed `u64`.
pub fn credit(
    balances: &mut Balances,
    resource: ResourceTypeId,
    amount: u64,
) -> Result<u64, EconomyError> {
    let entry = balances.entry(resource).or_insert(0);
    *entry = entry
        .checked_add(amount)
        .ok_or_else(|| EconomyError::ArithmeticOverflow {
            context: format!("credit of {amount} to {resource}"),
        })?;
    Ok(*entry)
}

/// Remove `amount` units of `resource`.
///
/// The balance may reach exactly zero; the entry is kept.
///
/// # Errors
///
/// Returns [`EconomyError::InsufficientResource`] if fewer than `amount`
/// units are held. The balance is left unchanged.
pub fn debit(
    balances: &mut Balances,
    resource: ResourceTypeId,
    amount: u64,
) -> Result<u64, EconomyError> {
    let current = quantity(balances, resource);
    let remaining = current
        .checked_sub(amount)
        .ok_or(EconomyError::InsufficientResource {
            resource,
            requested: amount,
            available: current,
        })?;
    balances.insert(resource, remaining);
    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_of_absent_resource_is_zero() {
        assert_eq!(quantity(&Balances::new(), ResourceTypeId::new()), 0);
    }

    #[test]
    fn credit_creates_and_stacks() {
        let mut balances = Balances::new();
        let stone = ResourceTypeId::new();
        assert_eq!(credit(&mut balances, stone, 3).ok(), Some(3));
        assert_eq!(credit(&mut balances, stone, 4).ok(), Some(7));
        assert_eq!(quantity(&balances, stone), 7);
    }

    #[test]
    fn credit_overflow_is_rejected() {
        let mut balances = Balances::new();
        let stone = ResourceTypeId::new();
        balances.insert(stone, u64::MAX);
        assert!(credit(&mut balances, stone, 1).is_err());
        assert_eq!(quantity(&balances, stone), u64::MAX);
    }

    #[test]
    fn debit_to_exactly_zero_keeps_entry() {
        let mut balances = Balances::new();
        let stone = ResourceTypeId::new();
        balances.insert(stone, 20);
        assert_eq!(debit(&mut balances, stone, 20).ok(), Some(0));
        assert_eq!(balances.get(&stone).copied(), Some(0));
    }

    #[test]
    fn debit_insufficient_leaves_balance_unchanged() {
        let mut balances = Balances::new();
        let stone = ResourceTypeId::new();
        balances.insert(stone, 3);
        let result = debit(&mut balances, stone, 5);
        assert!(matches!(
            result,
            Err(EconomyError::InsufficientResource {
                requested: 5,
                available: 3,
                ..
            })
        ));
        assert_eq!(quantity(&balances, stone), 3);
    }

    #[test]
    fn debit_absent_resource_fails() {
        let mut balances = Balances::new();
        assert!(debit(&mut balances, ResourceTypeId::new(), 1).is_err());
        assert!(balances.is_empty());
    }
}
