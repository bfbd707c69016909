//! Common definitions and constants shared across the tesseract decoder workspace.
//!
//! This crate provides the qubit layout of the 4x4 tesseract grid, the layout
//! of a shot record produced by one experiment, and the instruction set used
//! to describe experiment circuits. It is shared by the decoder core, the file
//! format readers and writers, and the host tools.

#![no_std]

/// Qubit and measurement-record layout of the tesseract experiment.
///
/// The 16 data qubits sit on a 4x4 grid in row-major order. Two ancillas
/// measure the X and Z stabilizer of a single row or column at a time, and
/// every stabilizer measurement appends its X outcome followed by its Z
/// outcome to the shot record.
pub mod layout {
    /// Number of data qubits in the tesseract code.
    pub const DATA_QUBITS: usize = 16;

    /// Side length of the data-qubit grid.
    pub const GRID_SIDE: usize = 4;

    /// Ancilla that measures the X-type stabilizer of a row or column.
    ///
    /// Its outcome is sensitive to Z errors on the data qubits and therefore
    /// drives the Z correction frame.
    pub const X_ANCILLA: u16 = 16;

    /// Ancilla that measures the Z-type stabilizer of a row or column.
    ///
    /// Its outcome is sensitive to X errors on the data qubits and therefore
    /// drives the X correction frame. It also acts as a flag for the X
    /// measurement sharing its CNOT ladder.
    pub const Z_ANCILLA: u16 = 17;

    /// Data qubits of each row stabilizer, top to bottom.
    pub const ROWS: [[u16; 4]; 4] = [
        [0, 1, 2, 3],
        [4, 5, 6, 7],
        [8, 9, 10, 11],
        [12, 13, 14, 15],
    ];

    /// Data qubits of each column stabilizer, left to right.
    pub const COLUMNS: [[u16; 4]; 4] = [
        [0, 4, 8, 12],
        [1, 5, 9, 13],
        [2, 6, 10, 14],
        [3, 7, 11, 15],
    ];

    /// Outcomes recorded per stabilizer measurement (X then Z).
    pub const MEASUREMENTS_PER_STABILIZER: usize = 2;

    /// Outcomes recorded by one pass over the four rows or the four columns.
    pub const MEASUREMENTS_PER_PASS: usize = 4 * MEASUREMENTS_PER_STABILIZER;

    /// Outcomes recorded by one full round (row pass followed by column pass).
    pub const MEASUREMENTS_PER_ROUND: usize = 2 * MEASUREMENTS_PER_PASS;

    /// Number of trailing logical-measurement outcomes in every shot.
    ///
    /// The first 8 are X-basis readouts of qubits 0..8, the last 8 are
    /// Z-basis readouts of qubits 8..16.
    pub const TAIL_LEN: usize = DATA_QUBITS;

    /// Number of bits in a shot record for the given round count and offset.
    ///
    /// # Arguments
    ///
    /// * `rounds` - Number of error correction rounds in the circuit
    /// * `measurement_offset` - Leading encoding-phase measurements (0 or 2)
    pub const fn shot_len(rounds: usize, measurement_offset: usize) -> usize {
        measurement_offset + rounds * MEASUREMENTS_PER_ROUND + TAIL_LEN
    }
}

/// Instruction set for tesseract experiment circuits.
///
/// Circuits are flat lists of instructions covering the Clifford gates the
/// experiment uses, Z-basis measurement and reset, deterministic Pauli
/// injection, and stochastic Pauli noise channels. The same instruction
/// stream is executed by the Pauli-frame sampler and serialized to Stim
/// circuit text.
pub mod isa {
    /// Opcode enumeration for circuit instructions.
    ///
    /// The numeric values group related operations: gates in `0x0_`, Pauli
    /// injections in `0x1_`, measurement and reset in `0x2_`, noise channels
    /// in `0x4_`, and annotations in `0xF_`.
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Opcode {
        /// Hadamard gate on one qubit.
        GateH = 0x01,

        /// CNOT gate with control and target qubits.
        GateCNOT = 0x03,

        /// Deterministic X (bit-flip) on one qubit.
        PauliX = 0x10,

        /// Deterministic Y on one qubit.
        PauliY = 0x11,

        /// Deterministic Z (phase-flip) on one qubit.
        PauliZ = 0x12,

        /// Destructive Z-basis measurement appending one outcome to the record.
        Measure = 0x20,

        /// Reset one qubit to |0>.
        Reset = 0x30,

        /// X error with the instruction's probability.
        XError = 0x40,

        /// Y error with the instruction's probability.
        YError = 0x41,

        /// Z error with the instruction's probability.
        ZError = 0x42,

        /// Single-qubit depolarizing channel: with the instruction's
        /// probability one of X, Y, Z is applied uniformly at random.
        Depolarize1 = 0x48,

        /// Two-qubit depolarizing channel: with the instruction's probability
        /// one of the 15 non-identity two-qubit Paulis is applied.
        Depolarize2 = 0x49,

        /// Layer separator. Has no effect on simulation.
        Tick = 0xF0,
    }

    impl Opcode {
        /// Number of qubit operands the opcode consumes.
        pub const fn arity(self) -> usize {
            match self {
                Opcode::GateCNOT | Opcode::Depolarize2 => 2,
                Opcode::Tick => 0,
                _ => 1,
            }
        }

        /// Returns true for opcodes that carry a probability.
        pub const fn is_noise(self) -> bool {
            matches!(
                self,
                Opcode::XError
                    | Opcode::YError
                    | Opcode::ZError
                    | Opcode::Depolarize1
                    | Opcode::Depolarize2
            )
        }
    }

    /// A single circuit instruction.
    ///
    /// Operands are qubit indices; `operand_2` is only meaningful for
    /// two-qubit opcodes and is zero otherwise. `probability` is only
    /// meaningful for noise opcodes and is zero otherwise.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Instruction {
        /// Operation to perform.
        pub opcode: Opcode,

        /// Target qubit, or the control qubit of a CNOT.
        pub operand_1: u16,

        /// Target qubit of a CNOT or second qubit of a two-qubit channel.
        pub operand_2: u16,

        /// Fault probability of a noise channel.
        pub probability: f64,
    }

    impl Instruction {
        /// Constructs a new instruction with the specified opcode and operands.
        ///
        /// # Arguments
        ///
        /// * `opcode` - The operation to perform
        /// * `op1` - First operand (qubit index, control, etc.)
        /// * `op2` - Second operand (target qubit, or zero)
        pub fn new(opcode: Opcode, op1: u16, op2: u16) -> Self {
            Self {
                opcode,
                operand_1: op1,
                operand_2: op2,
                probability: 0.0,
            }
        }

        /// Constructs a one-qubit instruction.
        pub fn single(opcode: Opcode, qubit: u16) -> Self {
            Self::new(opcode, qubit, 0)
        }

        /// Constructs a noise instruction acting with probability `p`.
        pub fn noise(opcode: Opcode, op1: u16, op2: u16, p: f64) -> Self {
            Self {
                opcode,
                operand_1: op1,
                operand_2: op2,
                probability: p,
            }
        }

        /// Constructs a layer separator.
        pub fn tick() -> Self {
            Self::new(Opcode::Tick, 0, 0)
        }

        /// Largest qubit index touched by the instruction, if any.
        pub fn max_qubit(&self) -> Option<u16> {
            match self.opcode.arity() {
                0 => None,
                1 => Some(self.operand_1),
                _ => Some(self.operand_1.max(self.operand_2)),
            }
        }
    }
}
