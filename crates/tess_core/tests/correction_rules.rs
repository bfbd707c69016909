//! Property-based tests for the per-pass correction rules.
//!
//! Every property is checked for all four rule functions, which differ only
//! in the orientation used to place corrections.

use proptest::prelude::*;
use tess_core::correction::{
    Correction, CorrectionFrame, Flag, Orientation, Outcomes, RuleOutcome, correct_column_x,
    correct_column_z, correct_row_x, correct_row_z,
};

type Rule = fn(Flag, &Outcomes, &mut CorrectionFrame) -> RuleOutcome;

/// The four rules with the orientation each one places corrections in.
const RULES: [(Rule, Orientation); 4] = [
    (correct_row_z, Orientation::Row),
    (correct_row_x, Orientation::Row),
    (correct_column_z, Orientation::Column),
    (correct_column_x, Orientation::Column),
];

fn outcomes_from_mask(mask: u8) -> Outcomes {
    [mask & 1, (mask >> 1) & 1, (mask >> 2) & 1, (mask >> 3) & 1]
}

/// All six patterns with exactly two disagreements.
fn two_of_four() -> impl Strategy<Value = Outcomes> {
    prop::sample::select(vec![0b0011u8, 0b0101, 0b0110, 0b1001, 0b1010, 0b1100])
        .prop_map(outcomes_from_mask)
}

/// A single odd outcome at `k`, as a lone 1 or a lone 0.
fn lone(k: usize, inverted: bool) -> Outcomes {
    let mut outcomes = if inverted { [1; 4] } else { [0; 4] };
    outcomes[k] ^= 1;
    outcomes
}

/// A frame with some pre-existing corrections.
fn prior_frame() -> impl Strategy<Value = CorrectionFrame> {
    prop::collection::vec(0usize..16, 0..6).prop_map(|cells| {
        let mut frame = CorrectionFrame::new();
        for c in cells {
            frame.increment(c);
        }
        frame
    })
}

fn incremented_cells(before: &CorrectionFrame, after: &CorrectionFrame) -> Vec<usize> {
    (0..16)
        .filter(|&q| after.count(q) != before.count(q))
        .collect()
}

proptest! {
    /// Silent outcomes with no pending flag change nothing.
    #[test]
    fn prop_silent_unflagged_is_noop(all_ones in any::<bool>(), frame in prior_frame()) {
        let outcomes = if all_ones { [1; 4] } else { [0; 4] };
        for (rule, _) in RULES {
            let mut f = frame;
            let out = rule(Flag::Clear, &outcomes, &mut f);
            prop_assert_eq!(out, RuleOutcome::Accepted { flag: Flag::Clear, correction: Correction::None });
            prop_assert_eq!(f, frame);
        }
    }

    /// Silent outcomes drop a pending flag without correcting.
    #[test]
    fn prop_silent_flagged_clears(flag in 0u8..4, all_ones in any::<bool>(), frame in prior_frame()) {
        let outcomes = if all_ones { [1; 4] } else { [0; 4] };
        for (rule, _) in RULES {
            let mut f = frame;
            let out = rule(Flag::Pending(flag), &outcomes, &mut f);
            prop_assert_eq!(out, RuleOutcome::Accepted { flag: Flag::Clear, correction: Correction::None });
            prop_assert_eq!(f, frame);
        }
    }

    /// A lone odd outcome raises a flag at its index.
    #[test]
    fn prop_single_outcome_raises_flag(k in 0usize..4, inverted in any::<bool>()) {
        let outcomes = lone(k, inverted);
        for (rule, _) in RULES {
            let mut f = CorrectionFrame::new();
            let out = rule(Flag::Clear, &outcomes, &mut f);
            prop_assert_eq!(out, RuleOutcome::Accepted { flag: Flag::Pending(k as u8), correction: Correction::None });
            prop_assert!(f.is_trivial());
        }
    }

    /// A pending flag plus a lone odd outcome corrects exactly one cell.
    #[test]
    fn prop_flag_completion_corrects_one_cell(
        flag in 0u8..4,
        k in 0usize..4,
        inverted in any::<bool>(),
        frame in prior_frame(),
    ) {
        let outcomes = lone(k, inverted);
        for (rule, orientation) in RULES {
            let mut f = frame;
            let out = rule(Flag::Pending(flag), &outcomes, &mut f);
            let target = match orientation {
                Orientation::Row => 4 * k + flag as usize,
                Orientation::Column => 4 * flag as usize + k,
            };
            prop_assert_eq!(out, RuleOutcome::Accepted { flag: Flag::Clear, correction: Correction::Single(target) });
            prop_assert_eq!(incremented_cells(&frame, &f), vec![target]);
            prop_assert_eq!(f.count(target), frame.count(target) + 1);
        }
    }

    /// Two disagreements with no flag reject, leaving the frame untouched.
    #[test]
    fn prop_unflagged_pair_rejects(outcomes in two_of_four(), frame in prior_frame()) {
        for (rule, _) in RULES {
            let mut f = frame;
            prop_assert_eq!(rule(Flag::Clear, &outcomes, &mut f), RuleOutcome::Rejected);
            prop_assert_eq!(f, frame);
        }
    }

    /// With a flag, only the two half-line patterns correct a pair.
    #[test]
    fn prop_flagged_pair_policy(flag in 0u8..4, outcomes in two_of_four(), frame in prior_frame()) {
        let accepted_pattern = outcomes == [0, 0, 1, 1] || outcomes == [1, 1, 0, 0];
        for (rule, orientation) in RULES {
            let mut f = frame;
            let out = rule(Flag::Pending(flag), &outcomes, &mut f);
            if accepted_pattern {
                let (a, b) = orientation.pair_targets(flag);
                prop_assert_eq!(out, RuleOutcome::Accepted { flag: Flag::Clear, correction: Correction::Pair(a, b) });
                let mut expected = vec![a, b];
                expected.sort_unstable();
                prop_assert_eq!(incremented_cells(&frame, &f), expected);
            } else {
                prop_assert_eq!(out, RuleOutcome::Rejected);
                prop_assert_eq!(f, frame);
            }
        }
    }
}

#[test]
fn pair_targets_are_first_two_cells_of_flagged_line() {
    for flag in 0..4u8 {
        let f = flag as usize;
        // Row pass: the flag names a column, its first two cells are rows 0 and 1.
        assert_eq!(Orientation::Row.pair_targets(flag), (f, 4 + f));
        // Column pass: the flag names a row.
        assert_eq!(Orientation::Column.pair_targets(flag), (4 * f, 4 * f + 1));
    }
}
