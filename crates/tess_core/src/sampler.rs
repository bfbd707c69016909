//! Shot matrices and samplers producing them.

use crate::QecError;
use crate::circuit::Circuit;
use crate::vm::VirtualMachine;
use alloc::vec::Vec;
use rand::Rng;

/// Row-major matrix of measurement records, one row of 0/1 values per shot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotMatrix {
    bits_per_shot: usize,
    num_shots: usize,
    bits: Vec<u8>,
}

impl ShotMatrix {
    /// Creates an empty matrix whose shots are `bits_per_shot` long.
    pub fn new(bits_per_shot: usize) -> Self {
        Self {
            bits_per_shot,
            num_shots: 0,
            bits: Vec::new(),
        }
    }

    pub fn with_capacity(bits_per_shot: usize, num_shots: usize) -> Self {
        Self {
            bits_per_shot,
            num_shots: 0,
            bits: Vec::with_capacity(bits_per_shot * num_shots),
        }
    }

    /// Builds a matrix from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// `ShotLengthMismatch` with the length of the trailing partial shot when
    /// the buffer is not a whole number of shots. `InvalidBit` when it holds
    /// a value other than 0 or 1, indexed within the offending shot.
    pub fn from_flat(bits_per_shot: usize, bits: Vec<u8>) -> Result<Self, QecError> {
        let whole = match bits_per_shot {
            0 => bits.is_empty(),
            n => bits.len() % n == 0,
        };
        if !whole {
            return Err(QecError::ShotLengthMismatch {
                expected: bits_per_shot,
                actual: bits.len() % bits_per_shot.max(1),
            });
        }
        if let Some(pos) = bits.iter().position(|&b| b > 1) {
            return Err(QecError::InvalidBit {
                index: pos % bits_per_shot.max(1),
                value: bits[pos],
            });
        }
        let num_shots = bits.len().checked_div(bits_per_shot).unwrap_or(0);
        Ok(Self {
            bits_per_shot,
            num_shots,
            bits,
        })
    }

    /// Appends one shot record.
    pub fn push_shot(&mut self, shot: &[u8]) -> Result<(), QecError> {
        if shot.len() != self.bits_per_shot {
            return Err(QecError::ShotLengthMismatch {
                expected: self.bits_per_shot,
                actual: shot.len(),
            });
        }
        if let Some(index) = shot.iter().position(|&b| b > 1) {
            return Err(QecError::InvalidBit {
                index,
                value: shot[index],
            });
        }
        self.bits.extend_from_slice(shot);
        self.num_shots += 1;
        Ok(())
    }

    pub fn bits_per_shot(&self) -> usize {
        self.bits_per_shot
    }

    pub fn num_shots(&self) -> usize {
        self.num_shots
    }

    pub fn is_empty(&self) -> bool {
        self.num_shots == 0
    }

    /// Record of shot `i`, or `None` past the last shot.
    pub fn shot(&self, i: usize) -> Option<&[u8]> {
        if i >= self.num_shots {
            return None;
        }
        let start = i * self.bits_per_shot;
        Some(&self.bits[start..start + self.bits_per_shot])
    }

    /// Mutable record of shot `i`.
    pub fn shot_mut(&mut self, i: usize) -> Option<&mut [u8]> {
        if i >= self.num_shots {
            return None;
        }
        let start = i * self.bits_per_shot;
        Some(&mut self.bits[start..start + self.bits_per_shot])
    }

    /// Iterates over shot records in order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.num_shots).filter_map(move |i| self.shot(i))
    }

    /// The flat row-major buffer.
    pub fn as_flat(&self) -> &[u8] {
        &self.bits
    }
}

/// A source of shot records for a circuit.
pub trait Sampler {
    /// Samples `shots` records of `circuit`.
    fn sample(&mut self, circuit: &Circuit, shots: usize) -> Result<ShotMatrix, QecError>;
}

/// Pauli-frame sampler.
///
/// Runs every shot through a [`VirtualMachine`] from an error-free frame.
/// Recorded bits are measurement flips relative to the noiseless reference,
/// so a noiseless circuit yields all-zero shots.
pub struct FrameSampler<R> {
    rng: R,
}

impl<R: Rng> FrameSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Sampler for FrameSampler<R> {
    fn sample(&mut self, circuit: &Circuit, shots: usize) -> Result<ShotMatrix, QecError> {
        log::debug!(
            "sampling {shots} shots of a {}-qubit circuit ({} instructions, {} noise)",
            circuit.num_qubits(),
            circuit.len(),
            circuit.noise_count()
        );
        let mut vm = VirtualMachine::new(circuit.num_qubits());
        let mut matrix = ShotMatrix::with_capacity(circuit.num_measurements(), shots);
        for _ in 0..shots {
            let record = vm.run(circuit, &mut self.rng)?;
            matrix.push_shot(record)?;
        }
        Ok(matrix)
    }
}
