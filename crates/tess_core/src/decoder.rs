use crate::QecError;
use crate::correction::{
    CorrectionFrame, Flag, Outcomes, RuleOutcome, correct_column_x, correct_column_z,
    correct_row_x, correct_row_z,
};
use tess_common::layout::{MEASUREMENTS_PER_PASS, MEASUREMENTS_PER_ROUND, shot_len};

/// The four rule applications of a round, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    RowZ,
    RowX,
    ColumnZ,
    ColumnX,
}

impl Pass {
    pub const ALL: [Pass; 4] = [Pass::RowZ, Pass::RowX, Pass::ColumnZ, Pass::ColumnX];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Where a shot was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rejection {
    pub round: usize,
    pub pass: Pass,
}

/// Classification of one shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    Rejected(Rejection),
    Accepted {
        frame_x: CorrectionFrame,
        frame_z: CorrectionFrame,
    },
}

impl DecodeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DecodeOutcome::Accepted { .. })
    }
}

/// Splits one 8-bit pass block into X outcomes (even positions) and Z
/// outcomes (odd positions).
fn split_pass(block: &[u8]) -> (Outcomes, Outcomes) {
    let mut meas_x = [0u8; 4];
    let mut meas_z = [0u8; 4];
    for (i, pair) in block.chunks_exact(2).enumerate() {
        meas_x[i] = pair[0];
        meas_z[i] = pair[1];
    }
    (meas_x, meas_z)
}

/// Two-pass flag decoder for a fixed experiment layout.
///
/// A shot record holds `measurement_offset` leading encoding bits, then 16
/// bits per round (8 row-stabilizer outcomes followed by 8 column-stabilizer
/// outcomes, each stabilizer contributing its X outcome then its Z outcome),
/// then the 16 logical-measurement bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotDecoder {
    rounds: usize,
    measurement_offset: usize,
}

impl ShotDecoder {
    pub fn new(rounds: usize, measurement_offset: usize) -> Self {
        Self {
            rounds,
            measurement_offset,
        }
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn measurement_offset(&self) -> usize {
        self.measurement_offset
    }

    /// Length every shot record must have.
    pub fn expected_len(&self) -> usize {
        shot_len(self.rounds, self.measurement_offset)
    }

    /// Decodes one shot record.
    ///
    /// Flags start clear and frames start at zero. Rounds are processed in
    /// order, and within a round the row-Z, row-X, column-Z and column-X
    /// rules run in that order. The first rejecting rule ends decoding.
    ///
    /// # Errors
    ///
    /// `ShotLengthMismatch` when the record does not match the configured
    /// layout, `InvalidBit` when it holds a value other than 0 or 1.
    pub fn decode(&self, shot: &[u8]) -> Result<DecodeOutcome, QecError> {
        let expected = self.expected_len();
        if shot.len() != expected {
            return Err(QecError::ShotLengthMismatch {
                expected,
                actual: shot.len(),
            });
        }
        if let Some(index) = shot.iter().position(|&b| b > 1) {
            return Err(QecError::InvalidBit {
                index,
                value: shot[index],
            });
        }

        let mut flag_x = Flag::Clear;
        let mut flag_z = Flag::Clear;
        let mut frame_x = CorrectionFrame::new();
        let mut frame_z = CorrectionFrame::new();

        for round in 0..self.rounds {
            let base = round * MEASUREMENTS_PER_ROUND + self.measurement_offset;
            let row_block = &shot[base..base + MEASUREMENTS_PER_PASS];
            let column_block = &shot[base + MEASUREMENTS_PER_PASS..base + MEASUREMENTS_PER_ROUND];

            let (meas_x_rows, meas_z_rows) = split_pass(row_block);
            let (meas_x_cols, meas_z_cols) = split_pass(column_block);

            // X-stabilizer outcomes carry flag_x and correct Z; Z-stabilizer
            // outcomes carry flag_z and correct X.
            let steps: [(Pass, &Outcomes); 4] = [
                (Pass::RowZ, &meas_x_rows),
                (Pass::RowX, &meas_z_rows),
                (Pass::ColumnZ, &meas_x_cols),
                (Pass::ColumnX, &meas_z_cols),
            ];

            for (pass, outcomes) in steps {
                let outcome = match pass {
                    Pass::RowZ => correct_row_z(flag_x, outcomes, &mut frame_z),
                    Pass::RowX => correct_row_x(flag_z, outcomes, &mut frame_x),
                    Pass::ColumnZ => correct_column_z(flag_x, outcomes, &mut frame_z),
                    Pass::ColumnX => correct_column_x(flag_z, outcomes, &mut frame_x),
                };
                match outcome {
                    RuleOutcome::Rejected => {
                        log::trace!("shot rejected at round {round}, pass {pass:?}");
                        return Ok(DecodeOutcome::Rejected(Rejection { round, pass }));
                    }
                    RuleOutcome::Accepted { flag, .. } => match pass {
                        Pass::RowZ | Pass::ColumnZ => flag_x = flag,
                        Pass::RowX | Pass::ColumnX => flag_z = flag,
                    },
                }
            }
        }

        Ok(DecodeOutcome::Accepted { frame_x, frame_z })
    }
}

/// Decodes one shot record with the given layout.
pub fn decode(
    shot: &[u8],
    rounds: usize,
    measurement_offset: usize,
) -> Result<DecodeOutcome, QecError> {
    ShotDecoder::new(rounds, measurement_offset).decode(shot)
}
