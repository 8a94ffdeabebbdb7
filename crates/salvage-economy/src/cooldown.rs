//! The harvest cooldown gate.
//!
//! Each player has at most one timestamp: the instant of their last
//! successful harvest. A harvest is allowed when no timestamp exists or
//! when at least `cooldown` has passed since it. Otherwise the gate reports
//! the whole seconds remaining, rounded up.
//!
//! Evaluation is pure. Making check-and-set atomic per player is the
//! store's job; see the backends in `salvage-core` and `salvage-db`.

use chrono::{DateTime, TimeDelta, Utc};
use salvage_types::HarvesterStatus;

/// Milliseconds in one second.
const MILLIS_PER_SECOND: i64 = 1000;

/// Verdict of the cooldown gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    /// The harvester may be used now.
    Ready,
    /// The harvester is still cooling down.
    CoolingDown {
        /// Whole seconds left, rounded up. Always at least 1.
        remaining_seconds: u64,
    },
}

impl CooldownStatus {
    /// Whether a harvest would pass the gate.
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl From<CooldownStatus> for HarvesterStatus {
    fn from(status: CooldownStatus) -> Self {
        match status {
            CooldownStatus::Ready => Self::ready(),
            CooldownStatus::CoolingDown { remaining_seconds } => {
                Self::cooling_down(remaining_seconds)
            }
        }
    }
}

/// Evaluate the gate for a player whose last harvest was `last_harvest_at`.
///
/// Elapsed time is clamped at zero, so a timestamp in the future never
/// reports more than the full cooldown.
pub fn evaluate(
    last_harvest_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    cooldown: TimeDelta,
) -> CooldownStatus {
    let Some(last) = last_harvest_at else {
        return CooldownStatus::Ready;
    };

    let elapsed = now.signed_duration_since(last).max(TimeDelta::zero());
    if elapsed >= cooldown {
        return CooldownStatus::Ready;
    }

    let remaining_ms = cooldown
        .checked_sub(&elapsed)
        .map_or(0, |d| d.num_milliseconds());
    CooldownStatus::CoolingDown {
        remaining_seconds: ceil_seconds(remaining_ms),
    }
}

/// Earliest instant the next harvest passes the gate after one at `now`.
pub fn next_available(now: DateTime<Utc>, cooldown: TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(cooldown).unwrap_or(now)
}

/// `ceil(ms / 1000)`, floored at 1 for any positive remainder.
fn ceil_seconds(remaining_ms: i64) -> u64 {
    let whole = remaining_ms.div_euclid(MILLIS_PER_SECOND);
    let partial = i64::from(remaining_ms.rem_euclid(MILLIS_PER_SECOND) > 0);
    u64::try_from(whole.saturating_add(partial)).unwrap_or(0).max(1)
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap_or_default()
    }

    fn five_seconds() -> TimeDelta {
        TimeDelta::milliseconds(5000)
    }

    #[test]
    fn first_harvest_is_ready() {
        assert_eq!(evaluate(None, t0(), five_seconds()), CooldownStatus::Ready);
    }

    #[test]
    fn one_second_later_reports_four_remaining() {
        let status = evaluate(
            Some(t0()),
            t0() + TimeDelta::milliseconds(1000),
            five_seconds(),
        );
        assert_eq!(status, CooldownStatus::CoolingDown { remaining_seconds: 4 });
    }

    #[test]
    fn partial_seconds_round_up() {
        let status = evaluate(
            Some(t0()),
            t0() + TimeDelta::milliseconds(1200),
            five_seconds(),
        );
        assert_eq!(status, CooldownStatus::CoolingDown { remaining_seconds: 4 });

        let almost = evaluate(
            Some(t0()),
            t0() + TimeDelta::milliseconds(4999),
            five_seconds(),
        );
        assert_eq!(almost, CooldownStatus::CoolingDown { remaining_seconds: 1 });
    }

    #[test]
    fn exactly_at_cooldown_is_ready() {
        let status = evaluate(
            Some(t0()),
            t0() + TimeDelta::milliseconds(5000),
            five_seconds(),
        );
        assert!(status.is_ready());
        assert!(evaluate(Some(t0()), t0() + TimeDelta::minutes(2), five_seconds()).is_ready());
    }

    #[test]
    fn future_timestamp_never_exceeds_full_cooldown() {
        let status = evaluate(Some(t0() + TimeDelta::minutes(10)), t0(), five_seconds());
        assert_eq!(status, CooldownStatus::CoolingDown { remaining_seconds: 5 });
    }

    #[test]
    fn zero_cooldown_disables_the_gate() {
        assert!(evaluate(Some(t0()), t0(), TimeDelta::zero()).is_ready());
    }

    #[test]
    fn status_converts_for_display() {
        let status: HarvesterStatus = CooldownStatus::CoolingDown { remaining_seconds: 3 }.into();
        assert!(!status.ready);
        assert_eq!(status.remaining_seconds, 3);
        assert!(HarvesterStatus::from(CooldownStatus::Ready).ready);
    }

    #[test]
    fn next_available_adds_cooldown() {
        assert_eq!(next_available(t0(), five_seconds()), t0() + five_seconds());
    }
}
