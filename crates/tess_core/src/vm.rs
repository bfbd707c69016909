//! Virtual machine executing circuit instructions on a Pauli frame.
//!
//! The VM processes instructions sequentially, updating the frame under
//! gates, resets and sampled noise. Each measurement appends one bit to the
//! measurement record: 1 when the outcome disagrees with the noiseless
//! reference run, 0 otherwise.

use crate::QecError;
use crate::circuit::Circuit;
use crate::pauli_frame::{Pauli, PauliFrame};
use alloc::vec::Vec;
use rand::Rng;
use tess_common::isa::{Instruction, Opcode};

/// Pauli on one qubit of a two-qubit channel, `None` for identity.
fn pauli_from_bits(bits: u8) -> Option<Pauli> {
    match bits & 0b11 {
        1 => Some(Pauli::X),
        2 => Some(Pauli::Y),
        3 => Some(Pauli::Z),
        _ => None,
    }
}

/// Virtual machine for frame simulation of one shot.
///
/// Holds the Pauli frame of the current shot and the measurement record it
/// has produced so far.
pub struct VirtualMachine {
    /// Pauli frame tracking X and Z errors on every qubit.
    pub frame: PauliFrame,

    /// Measurement flips recorded so far, in execution order.
    pub record: Vec<u8>,
}

impl VirtualMachine {
    /// Creates a VM with an error-free frame over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            frame: PauliFrame::new(num_qubits),
            record: Vec::new(),
        }
    }

    /// Clears the frame and the measurement record for the next shot.
    pub fn reset(&mut self) {
        self.frame.reset();
        self.record.clear();
    }

    fn check_qubit(&self, q: u16) -> Result<usize, QecError> {
        let q = q as usize;
        let num_qubits = self.frame.num_qubits();
        if q >= num_qubits {
            return Err(QecError::QubitOutOfBounds {
                qubit: q,
                num_qubits,
            });
        }
        Ok(q)
    }

    /// Executes a single instruction.
    ///
    /// Noise instructions draw from `rng`; all others are deterministic.
    ///
    /// # Errors
    ///
    /// `QubitOutOfBounds` when an operand lies outside the frame, and
    /// `InvalidProbability` when a noise probability lies outside `[0, 1]`.
    pub fn execute<R: Rng + ?Sized>(
        &mut self,
        instr: &Instruction,
        rng: &mut R,
    ) -> Result<(), QecError> {
        let op = instr.opcode;
        if op == Opcode::Tick {
            return Ok(());
        }

        let a = self.check_qubit(instr.operand_1)?;
        let b = if op.arity() == 2 {
            self.check_qubit(instr.operand_2)?
        } else {
            a
        };
        if op.is_noise() && !(0.0..=1.0).contains(&instr.probability) {
            return Err(QecError::InvalidProbability(instr.probability));
        }

        match op {
            Opcode::GateH => self.frame.apply_hadamard(a),
            Opcode::GateCNOT => self.frame.apply_cnot(a, b),
            Opcode::PauliX => self.frame.apply_pauli(Pauli::X, a),
            Opcode::PauliY => self.frame.apply_pauli(Pauli::Y, a),
            Opcode::PauliZ => self.frame.apply_pauli(Pauli::Z, a),
            Opcode::Measure => self.record.push(self.frame.has_x_error(a) as u8),
            Opcode::Reset => self.frame.reset_qubit(a),
            Opcode::XError | Opcode::YError | Opcode::ZError => {
                if rng.gen_bool(instr.probability) {
                    let pauli = match op {
                        Opcode::XError => Pauli::X,
                        Opcode::YError => Pauli::Y,
                        _ => Pauli::Z,
                    };
                    self.frame.apply_pauli(pauli, a);
                }
            }
            Opcode::Depolarize1 => {
                if rng.gen_bool(instr.probability) {
                    let pauli = Pauli::ALL[rng.gen_range(0..3)];
                    self.frame.apply_pauli(pauli, a);
                }
            }
            Opcode::Depolarize2 => {
                if rng.gen_bool(instr.probability) {
                    // One of the 15 non-identity two-qubit Paulis.
                    let pair: u8 = rng.gen_range(1..16);
                    if let Some(p) = pauli_from_bits(pair) {
                        self.frame.apply_pauli(p, a);
                    }
                    if let Some(p) = pauli_from_bits(pair >> 2) {
                        self.frame.apply_pauli(p, b);
                    }
                }
            }
            Opcode::Tick => {}
        }

        Ok(())
    }

    /// Executes a whole circuit from an error-free frame and returns the
    /// measurement record of the shot.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        circuit: &Circuit,
        rng: &mut R,
    ) -> Result<&[u8], QecError> {
        self.reset();
        for instr in circuit.instructions() {
            self.execute(instr, rng)?;
        }
        Ok(&self.record)
    }
}
