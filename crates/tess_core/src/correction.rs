//! Correction rules of the row/column flag decoder.
//!
//! Each pass of a round looks at four stabilizer outcomes of one Pauli type
//! (the four rows or the four columns). A single disagreeing check cannot
//! locate an error on its own: it names a row (or column) and raises a
//! flag, and the orthogonal pass that follows names the column (or row) and
//! completes the correction. The X and Z tracks run independently, each
//! with its own flag and its own frame.
//!
//! The rule functions are named after the pass they run in and the frame
//! they update. `correct_row_z` consumes X-stabilizer outcomes of the row
//! pass and writes the Z frame; `correct_column_x` consumes Z-stabilizer
//! outcomes of the column pass and writes the X frame, and so on.

use tess_common::layout::{DATA_QUBITS, GRID_SIDE};

/// Four stabilizer outcomes of one pass, one per row or column.
pub type Outcomes = [u8; 4];

/// Pending single-error hypothesis carried between passes.
///
/// `Pending(k)` means the previous pass saw exactly one odd check, at index
/// `k`, and waits for the orthogonal pass to name the other coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Flag {
    #[default]
    Clear,
    Pending(u8),
}

impl Flag {
    /// Integer encoding of the flag: -1 when clear, 0..=3 when pending.
    pub fn index(self) -> i8 {
        match self {
            Flag::Clear => -1,
            Flag::Pending(k) => k as i8,
        }
    }

    /// Inverse of [`Flag::index`]. Returns `None` outside -1..=3.
    pub fn from_index(index: i8) -> Option<Self> {
        match index {
            -1 => Some(Flag::Clear),
            0..=3 => Some(Flag::Pending(index as u8)),
            _ => None,
        }
    }
}

/// The pass a rule runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Row pass. A pending flag names a column raised by the previous
    /// column pass; the outcomes name the row.
    Row,
    /// Column pass. A pending flag names a row raised by the preceding row
    /// pass; the outcomes name the column.
    Column,
}

impl Orientation {
    /// Frame position completed by a single odd check at index `k` while
    /// `flag` is pending.
    pub fn single_target(self, flag: u8, k: u8) -> usize {
        let (flag, k) = (flag as usize, k as usize);
        match self {
            Orientation::Row => GRID_SIDE * k + flag,
            Orientation::Column => GRID_SIDE * flag + k,
        }
    }

    /// The first two positions of the flagged line, corrected together on
    /// a `[0,0,1,1]` or `[1,1,0,0]` pattern.
    pub fn pair_targets(self, flag: u8) -> (usize, usize) {
        let flag = flag as usize;
        match self {
            Orientation::Row => (flag, GRID_SIDE + flag),
            Orientation::Column => (GRID_SIDE * flag, GRID_SIDE * flag + 1),
        }
    }
}

/// Correction applied by one rule step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Correction {
    None,
    Single(usize),
    Pair(usize, usize),
}

/// Result of one rule step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleOutcome {
    /// The outcomes are inconsistent with a single correctable error.
    Rejected,
    /// The step succeeded, leaving `flag` for the next pass and having
    /// applied `correction` to the frame.
    Accepted { flag: Flag, correction: Correction },
}

/// Per-qubit correction counters for one Pauli type.
///
/// Only the parity of each counter is meaningful; the raw counts are kept
/// for inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CorrectionFrame {
    counts: [u32; DATA_QUBITS],
}

impl CorrectionFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of correction on qubit `q`.
    pub fn increment(&mut self, q: usize) {
        self.counts[q] = self.counts[q].wrapping_add(1);
    }

    /// Raw correction count on qubit `q`.
    pub fn count(&self, q: usize) -> u32 {
        self.counts[q]
    }

    /// Effective correction on qubit `q` (the count modulo 2).
    pub fn bit(&self, q: usize) -> u8 {
        (self.counts[q] & 1) as u8
    }

    pub fn counts(&self) -> &[u32; DATA_QUBITS] {
        &self.counts
    }

    /// True when no qubit carries an odd number of corrections.
    pub fn is_trivial(&self) -> bool {
        self.counts.iter().all(|c| c & 1 == 0)
    }

    pub fn apply(&mut self, correction: Correction) {
        match correction {
            Correction::None => {}
            Correction::Single(q) => self.increment(q),
            Correction::Pair(a, b) => {
                self.increment(a);
                self.increment(b);
            }
        }
    }
}

/// Index of the single odd outcome: the lone 1 when `sum == 1`, the lone 0
/// when `sum == 3`.
fn odd_one_out(outcomes: &Outcomes, sum: u8) -> u8 {
    let needle = if sum == 1 { 1 } else { 0 };
    outcomes
        .iter()
        .position(|&b| b == needle)
        .map_or(0, |i| i as u8)
}

/// Decides one rule step without touching any frame.
///
/// Outcomes must be 0/1 values.
pub fn plan(orientation: Orientation, flag: Flag, outcomes: &Outcomes) -> RuleOutcome {
    let sum: u8 = outcomes.iter().sum();
    match flag {
        Flag::Clear => match sum {
            1 | 3 => RuleOutcome::Accepted {
                flag: Flag::Pending(odd_one_out(outcomes, sum)),
                correction: Correction::None,
            },
            2 => RuleOutcome::Rejected,
            _ => RuleOutcome::Accepted {
                flag: Flag::Clear,
                correction: Correction::None,
            },
        },
        Flag::Pending(f) => {
            let correction = match sum {
                1 | 3 => Correction::Single(orientation.single_target(f, odd_one_out(outcomes, sum))),
                2 if *outcomes == [0, 0, 1, 1] || *outcomes == [1, 1, 0, 0] => {
                    let (a, b) = orientation.pair_targets(f);
                    Correction::Pair(a, b)
                }
                2 => return RuleOutcome::Rejected,
                // An uncorroborated flag is dropped, not carried further.
                _ => Correction::None,
            };
            RuleOutcome::Accepted {
                flag: Flag::Clear,
                correction,
            }
        }
    }
}

/// Runs one rule step, applying its correction to `frame` on success.
///
/// On rejection the frame is left untouched.
pub fn step(
    orientation: Orientation,
    flag: Flag,
    outcomes: &Outcomes,
    frame: &mut CorrectionFrame,
) -> RuleOutcome {
    let outcome = plan(orientation, flag, outcomes);
    if let RuleOutcome::Accepted { correction, .. } = outcome {
        frame.apply(correction);
    }
    outcome
}

/// Row pass, X-stabilizer outcomes, Z frame.
pub fn correct_row_z(flag_x: Flag, meas_x: &Outcomes, frame_z: &mut CorrectionFrame) -> RuleOutcome {
    step(Orientation::Row, flag_x, meas_x, frame_z)
}

/// Row pass, Z-stabilizer outcomes, X frame.
pub fn correct_row_x(flag_z: Flag, meas_z: &Outcomes, frame_x: &mut CorrectionFrame) -> RuleOutcome {
    step(Orientation::Row, flag_z, meas_z, frame_x)
}

/// Column pass, X-stabilizer outcomes, Z frame.
pub fn correct_column_z(
    flag_x: Flag,
    meas_x: &Outcomes,
    frame_z: &mut CorrectionFrame,
) -> RuleOutcome {
    step(Orientation::Column, flag_x, meas_x, frame_z)
}

/// Column pass, Z-stabilizer outcomes, X frame.
pub fn correct_column_x(
    flag_z: Flag,
    meas_z: &Outcomes,
    frame_x: &mut CorrectionFrame,
) -> RuleOutcome {
    step(Orientation::Column, flag_z, meas_z, frame_x)
}
