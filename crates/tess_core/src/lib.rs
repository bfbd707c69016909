//! Core decoding algorithms and data structures for the tesseract code.
//!
//! This crate provides the row/column flag decoder for the 4x4 tesseract
//! code: the per-pass correction rules, the per-shot decoder driving them
//! across rounds, the final-state verifier that applies the accumulated
//! correction frames to the logical readout, and the aggregator that turns
//! many shots into acceptance and logical-success statistics. It also holds
//! the circuit construction and Pauli-frame sampler that feed the decoder
//! with shot records. All modules are `no_std` with `alloc`.

#![no_std]

extern crate alloc;

use core::fmt;

/// Bit manipulation utilities for packed qubit registers.
///
/// Provides get/set/toggle on bit vectors stored as u64 words. Used by the
/// Pauli frame to keep X and Z error registers compact.
pub mod bit_utils;

/// Experiment circuit construction.
///
/// Builds the encoding, error correction rounds, and logical measurement
/// of the tesseract experiment as a flat instruction list, inserting noise
/// channels according to an explicit noise configuration.
pub mod circuit;

/// Correction rules and correction frames.
///
/// One step of the flag state machine for each combination of pass
/// orientation (row or column) and Pauli type, together with the 16-qubit
/// counters that accumulate inferred corrections.
pub mod correction;

/// Per-shot decoder.
///
/// Drives the correction rules over the row and column passes of every
/// round and classifies the shot as accepted (with its correction frames)
/// or rejected.
pub mod decoder;

/// Experiment driver and aggregate statistics.
///
/// Runs the decoder and verifier over every shot of a sampled matrix and
/// accumulates acceptance, logical-pass, and fractional-success counts.
pub mod experiment;

/// Noise configuration for circuit construction.
///
/// Immutable value objects describing which circuit phases are noisy and
/// at which rates. Passed explicitly to the circuit builder.
pub mod noise;

/// Pauli frame tracking for error propagation.
///
/// Tracks X and Z errors on every qubit of the circuit without storing a
/// quantum state, updating them under the Clifford gates of the experiment.
pub mod pauli_frame;

/// Shot matrices and the sampler interface.
///
/// Defines the bit matrix handed to the decoder and the `Sampler` trait,
/// with a Pauli-frame backed implementation.
pub mod sampler;

/// Final-state verification.
///
/// Applies the correction frames to the trailing logical-measurement bits
/// and counts satisfied parity checks.
pub mod verifier;

/// Virtual machine executing circuit instructions on a Pauli frame.
///
/// Applies gates, resets, injected Paulis and sampled noise to the frame,
/// and records for every measurement whether it disagrees with the
/// noiseless reference.
pub mod vm;

/// Error types returned by decoding and simulation operations.
///
/// These represent caller contract violations. A rejected shot is a normal
/// decoding outcome and is never reported through this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QecError {
    /// A shot record does not have the length implied by the round count
    /// and measurement offset.
    ShotLengthMismatch {
        /// Length implied by the decoder configuration.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// The logical-measurement tail is not exactly 16 bits long.
    TailLengthMismatch {
        /// Length actually supplied.
        actual: usize,
    },

    /// A measurement outcome other than 0 or 1 was supplied.
    InvalidBit {
        /// Position of the offending value within its shot.
        index: usize,
        /// The offending value.
        value: u8,
    },

    /// A check-mode or encoding name was not recognised.
    InvalidMode,

    /// A noise probability lies outside `[0, 1]`.
    InvalidProbability(f64),

    /// Statistics scored against different check counts were combined.
    CheckCountMismatch {
        /// Checks per shot of the receiving statistics.
        expected: usize,
        /// Checks per shot of the merged statistics.
        actual: usize,
    },

    /// An instruction references a qubit beyond the simulated register.
    QubitOutOfBounds {
        /// The referenced qubit.
        qubit: usize,
        /// Number of qubits tracked by the frame.
        num_qubits: usize,
    },
}

impl fmt::Display for QecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QecError::ShotLengthMismatch { expected, actual } => write!(
                f,
                "shot record has {actual} bits, expected {expected} for the configured rounds and offset"
            ),
            QecError::TailLengthMismatch { actual } => {
                write!(f, "logical tail has {actual} bits, expected 16")
            }
            QecError::InvalidBit { index, value } => {
                write!(f, "measurement outcome {value} at index {index} is not a bit")
            }
            QecError::InvalidMode => write!(f, "unknown mode name"),
            QecError::InvalidProbability(p) => {
                write!(f, "probability {p} is outside [0, 1]")
            }
            QecError::CheckCountMismatch { expected, actual } => write!(
                f,
                "cannot merge statistics over {actual} checks into statistics over {expected}"
            ),
            QecError::QubitOutOfBounds { qubit, num_qubits } => {
                write!(f, "qubit {qubit} is out of bounds for {num_qubits} qubits")
            }
        }
    }
}

impl core::error::Error for QecError {}
