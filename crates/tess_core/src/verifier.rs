//! Final-state verification of the two [[8,3,2]] color-code blocks.
//!
//! The logical readout splits the tesseract into two [[8,3,2]] blocks with
//! transversal CNOTs from row 1 to row 4 and from row 2 to row 3, then reads
//! the top block (qubits 0..8) in the X basis and the bottom block (qubits
//! 8..16) in the Z basis. Decoding succeeded when fixed pairs of readout
//! bits agree.

use crate::QecError;
use crate::correction::CorrectionFrame;
use core::str::FromStr;
use tess_common::layout::TAIL_LEN;

/// Which parity checks are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckMode {
    /// Only Z3 and Z5. Used when the prepared state makes X-basis
    /// information meaningless (the |++0000> encoding).
    TwoCheck,
    /// X4, X6, Z3 and Z5.
    FourCheck,
}

impl CheckMode {
    pub fn max_checks(self) -> usize {
        match self {
            CheckMode::TwoCheck => 2,
            CheckMode::FourCheck => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CheckMode::TwoCheck => "two-check",
            CheckMode::FourCheck => "four-check",
        }
    }
}

impl FromStr for CheckMode {
    type Err = QecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two-check" => Ok(CheckMode::TwoCheck),
            "four-check" => Ok(CheckMode::FourCheck),
            _ => Err(QecError::InvalidMode),
        }
    }
}

/// Parities of the logical readout. Each is 0 when the pair agrees.
///
/// `x2` and `z1` belong to gauge operators. They are measured but never
/// scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parities {
    pub x2: u8,
    pub x4: u8,
    pub x6: u8,
    pub z1: u8,
    pub z3: u8,
    pub z5: u8,
}

impl Parities {
    pub fn from_tail(tail: &[u8; TAIL_LEN]) -> Self {
        Self {
            x2: tail[0] ^ tail[4],
            x4: tail[0] ^ tail[3],
            x6: tail[0] ^ tail[1],
            z1: tail[13] ^ tail[9],
            z3: tail[13] ^ tail[14],
            z5: tail[13] ^ tail[12],
        }
    }

    /// Number of scored checks that hold in `mode`.
    pub fn successful_checks(&self, mode: CheckMode) -> usize {
        let checks = [self.x4, self.x6, self.z3, self.z5];
        let scored = match mode {
            CheckMode::TwoCheck => &checks[2..],
            CheckMode::FourCheck => &checks[..],
        };
        scored.iter().filter(|&&p| p == 0).count()
    }
}

/// Applies the correction frames to the logical readout.
///
/// X-basis readouts (0..8) are flipped by Z corrections. Z-basis readouts
/// (8..16) are flipped by X corrections on the same qubit, and additionally
/// by the X corrections that the readout CNOTs carried over: qubit `i+12`
/// picks up qubit `i`, qubit `i+8` picks up qubit `i+4`, for `i in 0..4`.
pub fn corrected_tail(
    tail: &[u8; TAIL_LEN],
    frame_x: &CorrectionFrame,
    frame_z: &CorrectionFrame,
) -> [u8; TAIL_LEN] {
    let mut corrected = *tail;
    for (i, bit) in corrected.iter_mut().enumerate().take(8) {
        *bit ^= frame_z.bit(i);
    }
    for i in 8..TAIL_LEN {
        corrected[i] ^= frame_x.bit(i);
        // Stand-in for applying the frame before the readout CNOTs.
        if i >= 12 {
            corrected[i] ^= frame_x.bit(i - 12);
        } else {
            corrected[i] ^= frame_x.bit(i - 4);
        }
    }
    corrected
}

/// Counts satisfied parity checks of the logical readout.
///
/// # Arguments
///
/// * `tail` - The last 16 bits of the shot record
/// * `frame_x`, `frame_z` - Correction frames of an accepted shot
/// * `apply_correction` - Whether to apply the frames before scoring
/// * `mode` - Which checks to score
///
/// # Errors
///
/// `TailLengthMismatch` when `tail` is not 16 bits long.
pub fn verify(
    tail: &[u8],
    frame_x: &CorrectionFrame,
    frame_z: &CorrectionFrame,
    apply_correction: bool,
    mode: CheckMode,
) -> Result<usize, QecError> {
    let tail: &[u8; TAIL_LEN] = tail
        .try_into()
        .map_err(|_| QecError::TailLengthMismatch { actual: tail.len() })?;
    let readout = if apply_correction {
        corrected_tail(tail, frame_x, frame_z)
    } else {
        *tail
    };
    Ok(Parities::from_tail(&readout).successful_checks(mode))
}
