//! Accumulator effects of ledger appends and reversals.
//!
//! A client stores two accumulators: `total_hours` (cumulative contracted
//! hours) and `hours_logged` (cumulative consumed hours). Every ledger
//! entry touches exactly one of them, selected by its kind:
//!
//! - WORK entries add their magnitude to `hours_logged`
//! - REFILL entries add their magnitude to `total_hours`
//!
//! The remaining balance is always derived as `total_hours - hours_logged`
//! and never stored. Reversal is the exact negation of the forward effect,
//! so replaying the surviving entries from zero reproduces the stored
//! accumulators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::EntryKind;

/// The accumulator column a delta applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accumulator {
    /// Cumulative contracted hours; grows through refills.
    TotalHours,
    /// Cumulative consumed hours; grows through work logging.
    HoursLogged,
}

/// A relative adjustment to a single accumulator.
///
/// The store applies this as `column = column + delta` in one atomic
/// arithmetic update; it is never computed read-modify-write in
/// application memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDelta {
    /// Which accumulator to adjust.
    pub accumulator: Accumulator,
    /// Signed magnitude of the adjustment.
    pub delta: Decimal,
}

impl BalanceDelta {
    /// Returns the exact inverse adjustment.
    #[must_use]
    pub fn inverted(self) -> Self {
        Self {
            accumulator: self.accumulator,
            delta: -self.delta,
        }
    }
}

/// Computes the accumulator effect of appending an entry.
///
/// The match is exhaustive over `EntryKind`, so adding a kind without
/// deciding its balance effect fails to compile.
#[must_use]
pub fn forward_effect(kind: EntryKind, hours: Decimal) -> BalanceDelta {
    match kind {
        EntryKind::Work => BalanceDelta {
            accumulator: Accumulator::HoursLogged,
            delta: hours,
        },
        EntryKind::Refill => BalanceDelta {
            accumulator: Accumulator::TotalHours,
            delta: hours,
        },
    }
}

/// Computes the accumulator effect of reversing (deleting) an entry.
///
/// Reversal is the unique inverse of append: it undoes exactly the
/// adjustment the original append applied.
#[must_use]
pub fn reverse_effect(kind: EntryKind, hours: Decimal) -> BalanceDelta {
    forward_effect(kind, hours).inverted()
}

/// Derives the remaining retainer balance.
#[must_use]
pub fn remaining_balance(total_hours: Decimal, hours_logged: Decimal) -> Decimal {
    total_hours - hours_logged
}

/// Accumulator pair produced by replaying ledger entries from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayedTotals {
    /// Replayed `total_hours` (excluding the creation-time seed).
    pub total_hours: Decimal,
    /// Replayed `hours_logged`.
    pub hours_logged: Decimal,
}

impl ReplayedTotals {
    /// Applies a single delta to the matching accumulator.
    pub fn apply(&mut self, delta: BalanceDelta) {
        match delta.accumulator {
            Accumulator::TotalHours => self.total_hours += delta.delta,
            Accumulator::HoursLogged => self.hours_logged += delta.delta,
        }
    }
}

/// Replays a sequence of surviving entries from zero.
///
/// The result must equal the stored accumulators (minus the client's
/// creation-time `initial_hours` seed on `total_hours`) after any
/// sequence of committed appends and reversals.
pub fn replay<I>(entries: I) -> ReplayedTotals
where
    I: IntoIterator<Item = (EntryKind, Decimal)>,
{
    let mut totals = ReplayedTotals::default();
    for (kind, hours) in entries {
        totals.apply(forward_effect(kind, hours));
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(EntryKind::Work, Accumulator::HoursLogged)]
    #[case(EntryKind::Refill, Accumulator::TotalHours)]
    fn test_each_kind_owns_one_accumulator(
        #[case] kind: EntryKind,
        #[case] accumulator: Accumulator,
    ) {
        let effect = forward_effect(kind, dec!(2.5));
        assert_eq!(effect.accumulator, accumulator);
        assert_eq!(effect.delta, dec!(2.5));
    }

    #[test]
    fn test_reverse_is_negation() {
        let fwd = forward_effect(EntryKind::Work, dec!(3));
        let rev = reverse_effect(EntryKind::Work, dec!(3));
        assert_eq!(rev.accumulator, fwd.accumulator);
        assert_eq!(rev.delta, -fwd.delta);
    }

    #[test]
    fn test_remaining_balance() {
        assert_eq!(remaining_balance(dec!(10), dec!(4)), dec!(6));
        // Overconsumption is representable; the ledger does not clamp.
        assert_eq!(remaining_balance(dec!(2), dec!(5)), dec!(-3));
    }

    #[test]
    fn test_scenario_replay() {
        // Created with 10 purchased hours (seed, not an entry),
        // work 4 -> balance 6, refill 2 -> balance 8.
        let seed = dec!(10);
        let totals = replay([
            (EntryKind::Work, dec!(4)),
            (EntryKind::Refill, dec!(2)),
        ]);
        assert_eq!(
            remaining_balance(seed + totals.total_hours, totals.hours_logged),
            dec!(8)
        );
    }

    fn hours_strategy() -> impl Strategy<Value = Decimal> {
        // Positive magnitudes with two fractional digits, as stored.
        (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn kind_strategy() -> impl Strategy<Value = EntryKind> {
        prop_oneof![Just(EntryKind::Work), Just(EntryKind::Refill)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Appending then reversing any entry leaves both accumulators
        /// exactly where they started.
        #[test]
        fn prop_reversal_is_true_inverse(
            kind in kind_strategy(),
            hours in hours_strategy(),
            entries in proptest::collection::vec((kind_strategy(), hours_strategy()), 0..20),
        ) {
            let before = replay(entries.clone());

            let mut after = before;
            after.apply(forward_effect(kind, hours));
            after.apply(reverse_effect(kind, hours));

            prop_assert_eq!(after, before);
        }

        /// A forward effect always carries the positive stored magnitude;
        /// sign lives in the dispatch, never in the value.
        #[test]
        fn prop_forward_delta_is_positive(
            kind in kind_strategy(),
            hours in hours_strategy(),
        ) {
            let effect = forward_effect(kind, hours);
            prop_assert!(effect.delta > Decimal::ZERO);
            prop_assert_eq!(effect.delta, hours);
        }

        /// Replay equals the fold of individual effects regardless of
        /// entry order within each accumulator.
        #[test]
        fn prop_replay_matches_manual_fold(
            entries in proptest::collection::vec((kind_strategy(), hours_strategy()), 0..30),
        ) {
            let replayed = replay(entries.clone());

            let mut expected_total = Decimal::ZERO;
            let mut expected_logged = Decimal::ZERO;
            for (kind, hours) in entries {
                match kind {
                    EntryKind::Refill => expected_total += hours,
                    EntryKind::Work => expected_logged += hours,
                }
            }

            prop_assert_eq!(replayed.total_hours, expected_total);
            prop_assert_eq!(replayed.hours_logged, expected_logged);
        }

        /// Reversing every entry of any committed sequence returns both
        /// accumulators to zero.
        #[test]
        fn prop_full_reversal_returns_to_zero(
            entries in proptest::collection::vec((kind_strategy(), hours_strategy()), 0..30),
        ) {
            let mut totals = replay(entries.clone());
            for (kind, hours) in entries {
                totals.apply(reverse_effect(kind, hours));
            }
            prop_assert_eq!(totals, ReplayedTotals::default());
        }
    }
}
