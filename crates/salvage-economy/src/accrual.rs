//! Passive production accrual and collection settlement.
//!
//! A building accrues each of its outputs linearly from its
//! `last_collection_at` baseline:
//!
//! ```text
//! produced = min(elapsed_minutes * rate_per_minute, storage_capacity)
//! ```
//!
//! Production is computed on demand from wall-clock time; nothing ticks.
//! Once a rule reaches its storage capacity it stalls until collected.
//!
//! # Settlement
//!
//! Inventories hold whole units only. Collecting credits `floor(produced)`
//! of every output and keeps the fractional remainder by moving the
//! baseline back instead of storing it:
//!
//! ```text
//! owed_minutes(rule)  = fraction(rule) / rate_per_minute(rule)
//! last_collection_at  = now - max(owed_minutes over all rules)
//! ```
//!
//! Taking the maximum keeps the largest remainder intact. Outputs with a
//! smaller remainder are re-granted a few seconds of production they have
//! already been paid for; the error is bounded by one unit per output.
//!
//! Time is measured in microseconds (the resolution of `TIMESTAMPTZ`) and
//! all arithmetic is [`Decimal`] -- no floating point. Multiplying before
//! dividing keeps exact cases exact (20 s at 3/min is exactly 1 unit).

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use salvage_types::{
    CollectedResource, OwnedBuilding, ProductionPreview, ProductionRule, ResourceTypeId,
};

use crate::error::EconomyError;

/// Microseconds in one minute.
pub const MICROS_PER_MINUTE: i64 = 60_000_000;

/// Accrued output of one production rule at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducedAmount {
    /// The resource produced.
    pub resource_type_id: ResourceTypeId,
    /// Units accrued, including the fractional part.
    pub amount: Decimal,
    /// The rule's rate, carried along for the remainder conversion.
    pub rate_per_minute: Decimal,
    /// The rule's storage ceiling.
    pub storage_capacity: u64,
}

impl ProducedAmount {
    /// Whether accrual has stalled at the storage ceiling.
    pub fn is_full(&self) -> bool {
        self.amount >= Decimal::from(self.storage_capacity)
    }
}

/// The result of collecting a building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Whole units to credit, sorted by resource ID. Zero credits are omitted.
    pub credits: Vec<CollectedResource>,
    /// The baseline to store for the building.
    pub last_collection_at: DateTime<Utc>,
}

/// Microseconds from `since` to `now`, clamped at zero.
///
/// A baseline in the future (clock skew) counts as no time elapsed.
pub fn elapsed_micros(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(since)
        .num_microseconds()
        .map_or(i64::MAX, |us| us.max(0))
}

/// Units a single rule has accrued after `elapsed_us` microseconds.
///
/// Never negative, never above `storage_capacity`. A rate of zero (or a
/// malformed negative rate) produces nothing. Overflow only happens for
/// absurd elapsed times, which are past the ceiling anyway.
pub fn produced_amount(rule: &ProductionRule, elapsed_us: i64) -> Decimal {
    let capacity = Decimal::from(rule.storage_capacity);
    if rule.rate_per_minute <= Decimal::ZERO || elapsed_us <= 0 {
        return Decimal::ZERO;
    }

    Decimal::from(elapsed_us)
        .checked_mul(rule.rate_per_minute)
        .and_then(|v| v.checked_div(Decimal::from(MICROS_PER_MINUTE)))
        .map_or(capacity, |v| v.min(capacity))
}

/// Compute what a building has accrued for each of its rules at `now`.
pub fn compute_production(
    building: &OwnedBuilding,
    rules: &[ProductionRule],
    now: DateTime<Utc>,
) -> Vec<ProducedAmount> {
    let elapsed_us = elapsed_micros(building.last_collection_at, now);
    rules
        .iter()
        .map(|rule| ProducedAmount {
            resource_type_id: rule.resource_type_id,
            amount: produced_amount(rule, elapsed_us),
            rate_per_minute: rule.rate_per_minute,
            storage_capacity: rule.storage_capacity,
        })
        .collect()
}

/// Live production preview for display.
pub fn preview(
    building: &OwnedBuilding,
    rules: &[ProductionRule],
    now: DateTime<Utc>,
) -> Vec<ProductionPreview> {
    compute_production(building, rules, now)
        .into_iter()
        .map(|p| ProductionPreview {
            resource_type_id: p.resource_type_id,
            produced: p.amount,
            rate_per_minute: p.rate_per_minute,
            storage_capacity: p.storage_capacity,
            full: p.is_full(),
        })
        .collect()
}

/// Settle a collection: split accrued output into whole credits and a
/// rolled-back baseline that carries the fractional remainder forward.
///
/// The returned baseline is never earlier than the building's current one.
///
/// # Errors
///
/// Returns [`EconomyError::ArithmeticOverflow`] if a conversion overflows.
pub fn settle(
    building: &OwnedBuilding,
    rules: &[ProductionRule],
    now: DateTime<Utc>,
) -> Result<Settlement, EconomyError> {
    let mut credits = Vec::new();
    let mut max_owed_us = Decimal::ZERO;

    for produced in compute_production(building, rules, now) {
        let whole = produced.amount.floor();
        let fraction = produced
            .amount
            .checked_sub(whole)
            .ok_or_else(|| overflow("fractional production"))?;

        if whole > Decimal::ZERO {
            let quantity = whole
                .to_u64()
                .ok_or_else(|| overflow("whole production to u64"))?;
            credits.push(CollectedResource {
                resource_type_id: produced.resource_type_id,
                quantity,
            });
        }

        if fraction > Decimal::ZERO && produced.rate_per_minute > Decimal::ZERO {
            let owed_us = fraction
                .checked_mul(Decimal::from(MICROS_PER_MINUTE))
                .and_then(|v| v.checked_div(produced.rate_per_minute))
                .ok_or_else(|| overflow("time owed for remainder"))?;
            max_owed_us = max_owed_us.max(owed_us);
        }
    }

    let owed_us = max_owed_us
        .round()
        .to_i64()
        .ok_or_else(|| overflow("time owed to i64"))?;
    let rolled_back = now
        .checked_sub_signed(TimeDelta::microseconds(owed_us))
        .ok_or_else(|| overflow("baseline rollback"))?;

    credits.sort();

    Ok(Settlement {
        credits,
        last_collection_at: rolled_back.max(building.last_collection_at),
    })
}

fn overflow(context: &str) -> EconomyError {
    EconomyError::ArithmeticOverflow {
        context: context.to_owned(),
    }
}
