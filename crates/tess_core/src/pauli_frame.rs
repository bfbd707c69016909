//! Pauli frame tracking for stabilizer circuit simulation.
//!
//! Implements the Pauli frame abstraction that tracks X and Z errors on
//! every qubit without explicitly storing the quantum state. A frame records
//! how the noisy run differs from the noiseless reference run, so the X
//! component on a qubit at the moment it is measured tells whether that
//! measurement disagrees with its expected value.

use crate::bit_utils::BitPack;
use alloc::vec;
use alloc::vec::Vec;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pauli {
    X,
    Y,
    Z,
}

impl Pauli {
    /// All three non-identity Paulis, in X, Y, Z order.
    pub const ALL: [Pauli; 3] = [Pauli::X, Pauli::Y, Pauli::Z];

    /// Whether the operator has an X component (X or Y).
    pub fn has_x(self) -> bool {
        matches!(self, Pauli::X | Pauli::Y)
    }

    /// Whether the operator has a Z component (Z or Y).
    pub fn has_z(self) -> bool {
        matches!(self, Pauli::Z | Pauli::Y)
    }
}

/// Pauli frame tracking X and Z errors on every qubit.
///
/// Maintains two bit vectors (X and Z registers) where each bit indicates
/// whether the corresponding qubit carries an X or Z error relative to the
/// reference run. Gates are applied by updating these registers according
/// to their conjugation rules on Pauli operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauliFrame {
    /// Packed X error bits, one per qubit.
    x_register: Vec<u64>,

    /// Packed Z error bits, one per qubit.
    z_register: Vec<u64>,

    num_qubits: usize,
}

impl PauliFrame {
    /// Creates an error-free frame for the specified number of qubits.
    pub fn new(num_qubits: usize) -> Self {
        let num_u64 = BitPack::words_for(num_qubits);
        Self {
            x_register: vec![0; num_u64],
            z_register: vec![0; num_u64],
            num_qubits,
        }
    }

    /// Number of qubits tracked by the frame.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Resets the whole frame to the error-free state.
    pub fn reset(&mut self) {
        self.x_register.fill(0);
        self.z_register.fill(0);
    }

    /// Clears both error bits of one qubit, as a reset to |0> does.
    pub fn reset_qubit(&mut self, q: usize) {
        BitPack::set(&mut self.x_register, q, false);
        BitPack::set(&mut self.z_register, q, false);
    }

    /// Applies a Hadamard gate to the specified qubit.
    ///
    /// The Hadamard gate conjugates X to Z and Z to X, so the frame update
    /// swaps the X and Z error bits for this qubit.
    pub fn apply_hadamard(&mut self, q: usize) {
        let has_x = BitPack::get(&self.x_register, q);
        let has_z = BitPack::get(&self.z_register, q);

        BitPack::set(&mut self.x_register, q, has_z);
        BitPack::set(&mut self.z_register, q, has_x);
    }

    /// Applies a CNOT gate with control `c` and target `t`.
    ///
    /// CNOT conjugates X_c to X_c X_t and Z_t to Z_c Z_t: an X error on the
    /// control spreads to the target, a Z error on the target spreads to
    /// the control.
    pub fn apply_cnot(&mut self, c: usize, t: usize) {
        if BitPack::get(&self.x_register, c) {
            BitPack::toggle(&mut self.x_register, t);
        }
        if BitPack::get(&self.z_register, t) {
            BitPack::toggle(&mut self.z_register, c);
        }
    }

    /// Multiplies the frame by a Pauli on one qubit.
    pub fn apply_pauli(&mut self, pauli: Pauli, q: usize) {
        if pauli.has_x() {
            BitPack::toggle(&mut self.x_register, q);
        }
        if pauli.has_z() {
            BitPack::toggle(&mut self.z_register, q);
        }
    }

    /// Checks whether the specified qubit has an X error in the frame.
    ///
    /// A Z-basis measurement of this qubit disagrees with the reference
    /// outcome exactly when this returns true.
    pub fn has_x_error(&self, q: usize) -> bool {
        BitPack::get(&self.x_register, q)
    }

    /// Checks whether the specified qubit has a Z error in the frame.
    pub fn has_z_error(&self, q: usize) -> bool {
        BitPack::get(&self.z_register, q)
    }

    /// Number of qubits carrying any error.
    pub fn weight(&self) -> usize {
        self.x_register
            .iter()
            .zip(&self.z_register)
            .map(|(x, z)| (x | z).count_ones() as usize)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hadamard_swaps_error_type() {
        let mut frame = PauliFrame::new(2);
        frame.apply_pauli(Pauli::X, 0);
        frame.apply_hadamard(0);
        assert!(!frame.has_x_error(0));
        assert!(frame.has_z_error(0));
    }

    #[test]
    fn cnot_spreads_x_forward_and_z_backward() {
        let mut frame = PauliFrame::new(3);
        frame.apply_pauli(Pauli::X, 0);
        frame.apply_pauli(Pauli::Z, 2);
        frame.apply_cnot(0, 1);
        frame.apply_cnot(1, 2);
        assert!(frame.has_x_error(0));
        assert!(frame.has_x_error(1));
        assert!(frame.has_x_error(2));
        assert!(frame.has_z_error(1));
        assert!(!frame.has_z_error(0));
    }

    #[test]
    fn y_is_x_and_z() {
        let mut frame = PauliFrame::new(1);
        frame.apply_pauli(Pauli::Y, 0);
        assert!(frame.has_x_error(0) && frame.has_z_error(0));
        assert_eq!(frame.weight(), 1);
        frame.reset_qubit(0);
        assert_eq!(frame.weight(), 0);
    }
}
