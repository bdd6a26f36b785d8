//! Row-level conflict resolution over three candidate values.
//!
//! A combined row holds one candidate per source table for a single target
//! namespace. The decision is a table keyed by which slots are missing:
//!
//! ```text
//! missing slots   present values         action                  conflict
//! -------------   --------------------   ---------------------   --------
//! all three       -                      none                    no
//! two             one value              fill both               no
//! one             equal                  fill                    no
//! one             different              fill with most trusted  yes
//! none            all equal / 2 of 3     none                    no
//! none            pairwise different     none                    yes
//! ```
//!
//! "Most trusted" follows a [`TrustOrder`]; the default is table order.

use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// One candidate per source table, in table order.
pub type Slots = [Option<String>; 3];

/// Source precedence used when present values disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustOrder([usize; 3]);

impl TrustOrder {
    /// `slots[0]` is the most trusted table. Must be a permutation of `0..3`.
    pub fn new(slots: [usize; 3]) -> Result<Self> {
        let mut seen = [false; 3];
        for &slot in &slots {
            if slot >= 3 || seen[slot] {
                return Err(ReconcileError::TrustOrder(format!(
                    "{slots:?} is not a permutation of the three tables"
                )));
            }
            seen[slot] = true;
        }
        Ok(Self(slots))
    }

    pub fn slots(&self) -> [usize; 3] {
        self.0
    }

    /// Most trusted slot holding a value.
    pub fn first_present(&self, slots: &Slots) -> Option<usize> {
        self.0.iter().copied().find(|&i| slots[i].is_some())
    }
}

impl Default for TrustOrder {
    fn default() -> Self {
        Self([0, 1, 2])
    }
}

/// Which decision-table row applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No slot has a value.
    Empty,
    /// A single value was copied into the two missing slots.
    Propagated,
    /// Two agreeing values filled the third slot.
    Agreed,
    /// All three present and equal.
    Consistent,
    /// All three present, two agree.
    Majority,
    /// Two present values disagree; the missing slot got the most trusted one.
    ConflictFilled,
    /// All three present and pairwise different.
    ConflictUnresolved,
}

impl Outcome {
    pub fn is_conflict(self) -> bool {
        matches!(self, Outcome::ConflictFilled | Outcome::ConflictUnresolved)
    }

    fn fills(self) -> bool {
        matches!(
            self,
            Outcome::Propagated | Outcome::Agreed | Outcome::ConflictFilled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub slots: Slots,
    pub outcome: Outcome,
    /// Value this row contributes to the fill dictionary: the majority value,
    /// else the most trusted one, else `None`.
    pub value: Option<String>,
}

/// Resolve one combined row.
pub fn resolve(mut slots: Slots, trust: &TrustOrder) -> Resolution {
    let missing = slots
        .iter()
        .enumerate()
        .fold(0u8, |mask, (i, s)| if s.is_none() { mask | 1 << i } else { mask });

    let outcome = match missing {
        0b111 => Outcome::Empty,
        0b011 | 0b101 | 0b110 => Outcome::Propagated,
        0b001 => pair_outcome(&slots, 1, 2),
        0b010 => pair_outcome(&slots, 0, 2),
        0b100 => pair_outcome(&slots, 0, 1),
        _ => match (slots[0] == slots[1], slots[0] == slots[2], slots[1] == slots[2]) {
            (true, true, _) => Outcome::Consistent,
            (false, false, false) => Outcome::ConflictUnresolved,
            _ => Outcome::Majority,
        },
    };

    if outcome.fills() {
        let fill = trust.first_present(&slots).and_then(|i| slots[i].clone());
        for slot in slots.iter_mut().filter(|s| s.is_none()) {
            slot.clone_from(&fill);
        }
    }

    let value = resolved_value(&slots, trust);
    Resolution {
        slots,
        outcome,
        value,
    }
}

fn pair_outcome(slots: &Slots, a: usize, b: usize) -> Outcome {
    if slots[a] == slots[b] {
        Outcome::Agreed
    } else {
        Outcome::ConflictFilled
    }
}

fn resolved_value(slots: &Slots, trust: &TrustOrder) -> Option<String> {
    let majority = if slots[0].is_some() && (slots[0] == slots[1] || slots[0] == slots[2]) {
        Some(0)
    } else if slots[1].is_some() && slots[1] == slots[2] {
        Some(1)
    } else {
        None
    };
    majority
        .or_else(|| trust.first_present(slots))
        .and_then(|i| slots[i].clone())
}

// ============================================================================
// Tallies
// ============================================================================

/// Outcome counts for one (anchor, target) pair. Summable, so parallel
/// resolution can reduce per-row tallies without shared state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub rows: usize,
    pub empty: usize,
    pub propagated: usize,
    pub agreed: usize,
    pub consistent: usize,
    pub majority: usize,
    pub conflict_filled: usize,
    pub conflict_unresolved: usize,
}

impl OutcomeCounts {
    pub fn of(outcome: Outcome) -> Self {
        let mut counts = Self {
            rows: 1,
            ..Self::default()
        };
        match outcome {
            Outcome::Empty => counts.empty = 1,
            Outcome::Propagated => counts.propagated = 1,
            Outcome::Agreed => counts.agreed = 1,
            Outcome::Consistent => counts.consistent = 1,
            Outcome::Majority => counts.majority = 1,
            Outcome::ConflictFilled => counts.conflict_filled = 1,
            Outcome::ConflictUnresolved => counts.conflict_unresolved = 1,
        }
        counts
    }

    pub fn conflicts(&self) -> usize {
        self.conflict_filled + self.conflict_unresolved
    }
}

impl Add for OutcomeCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            rows: self.rows + rhs.rows,
            empty: self.empty + rhs.empty,
            propagated: self.propagated + rhs.propagated,
            agreed: self.agreed + rhs.agreed,
            consistent: self.consistent + rhs.consistent,
            majority: self.majority + rhs.majority,
            conflict_filled: self.conflict_filled + rhs.conflict_filled,
            conflict_unresolved: self.conflict_unresolved + rhs.conflict_unresolved,
        }
    }
}

impl AddAssign for OutcomeCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(values: [Option<&str>; 3]) -> Slots {
        values.map(|v| v.map(str::to_string))
    }

    fn run(values: [Option<&str>; 3]) -> Resolution {
        resolve(slots(values), &TrustOrder::default())
    }

    #[test]
    fn test_all_missing_stays_missing() {
        let r = run([None, None, None]);
        assert_eq!(r.outcome, Outcome::Empty);
        assert_eq!(r.slots, slots([None, None, None]));
        assert_eq!(r.value, None);
    }

    #[test]
    fn test_single_value_propagates() {
        let r = run([None, Some("C00031"), None]);
        assert_eq!(r.outcome, Outcome::Propagated);
        assert_eq!(r.slots, slots([Some("C00031"); 3]));
        assert!(!r.outcome.is_conflict());
    }

    #[test]
    fn test_two_agree_fill_third() {
        let r = run([Some("HMDB0000122"), None, Some("HMDB0000122")]);
        assert_eq!(r.outcome, Outcome::Agreed);
        assert_eq!(r.slots, slots([Some("HMDB0000122"); 3]));
    }

    #[test]
    fn test_two_disagree_fill_with_first() {
        let r = run([None, Some("5793"), Some("64689")]);
        assert_eq!(r.outcome, Outcome::ConflictFilled);
        assert!(r.outcome.is_conflict());
        assert_eq!(r.slots, slots([Some("5793"), Some("5793"), Some("64689")]));
        assert_eq!(r.value.as_deref(), Some("5793"));
    }

    #[test]
    fn test_trust_order_changes_tie_break() {
        let trust = TrustOrder::new([2, 1, 0]).unwrap();
        let r = resolve(slots([None, Some("5793"), Some("64689")]), &trust);
        assert_eq!(r.slots[0].as_deref(), Some("64689"));
        assert_eq!(r.value.as_deref(), Some("64689"));
    }

    #[test]
    fn test_majority_leaves_minority_untouched() {
        let r = run([Some("C00031"), Some("C00221"), Some("C00221")]);
        assert_eq!(r.outcome, Outcome::Majority);
        assert_eq!(r.slots[0].as_deref(), Some("C00031"));
        assert_eq!(r.value.as_deref(), Some("C00221"));
    }

    #[test]
    fn test_pairwise_different_is_informational_conflict() {
        let input = slots([Some("a"), Some("b"), Some("c")]);
        let r = resolve(input.clone(), &TrustOrder::default());
        assert_eq!(r.outcome, Outcome::ConflictUnresolved);
        assert_eq!(r.slots, input);
        assert_eq!(r.value.as_deref(), Some("a"));
    }

    #[test]
    fn test_every_missing_mask_is_covered() {
        // After resolution a row is either fully missing or fully present.
        for mask in 0u8..8 {
            let values = [0, 1, 2].map(|i| (mask & (1 << i) == 0).then(|| format!("v{i}")));
            let r = resolve(values, &TrustOrder::default());
            let present = r.slots.iter().filter(|s| s.is_some()).count();
            assert!(present == 0 || present == 3, "mask {mask:03b}");
            assert_eq!(r.outcome.is_conflict(), mask.count_ones() <= 1);
        }
    }

    #[test]
    fn test_trust_order_must_be_permutation() {
        assert!(TrustOrder::new([0, 0, 1]).is_err());
        assert!(TrustOrder::new([0, 1, 3]).is_err());
    }

    #[test]
    fn test_counts_sum() {
        let total = OutcomeCounts::of(Outcome::Agreed)
            + OutcomeCounts::of(Outcome::ConflictFilled)
            + OutcomeCounts::of(Outcome::ConflictUnresolved);
        assert_eq!(total.rows, 3);
        assert_eq!(total.conflicts(), 2);
    }
}
