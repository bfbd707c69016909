//! Experiment circuit construction.
//!
//! The experiment encodes a logical state into the 16 data qubits, optionally
//! passes it through a noise channel, runs a number of row/column error
//! correction rounds, and finally reads out the two [[8,3,2]] color-code
//! blocks. Every operation belongs to a [`Phase`], and the builder follows
//! each operation of a noisy phase with the matching depolarizing channel.

use crate::QecError;
use crate::noise::{NoiseConfig, Phase};
use crate::pauli_frame::Pauli;
use crate::verifier::CheckMode;
use alloc::vec::Vec;
use core::str::FromStr;
use tess_common::isa::{Instruction, Opcode};
use tess_common::layout::{COLUMNS, DATA_QUBITS, ROWS, X_ANCILLA, Z_ANCILLA};

/// A flat instruction list with its register size and measurement count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Circuit {
    instructions: Vec<Instruction>,
    num_qubits: usize,
    num_measurements: usize,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instr: Instruction) {
        if let Some(q) = instr.max_qubit() {
            self.num_qubits = self.num_qubits.max(q as usize + 1);
        }
        if instr.opcode == Opcode::Measure {
            self.num_measurements += 1;
        }
        self.instructions.push(instr);
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// One past the largest qubit index used.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of outcomes one shot of this circuit records.
    pub fn num_measurements(&self) -> usize {
        self.num_measurements
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of noise-channel instructions.
    pub fn noise_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| i.opcode.is_noise())
            .count()
    }
}

impl Extend<Instruction> for Circuit {
    fn extend<T: IntoIterator<Item = Instruction>>(&mut self, iter: T) {
        for instr in iter {
            self.push(instr);
        }
    }
}

impl FromIterator<Instruction> for Circuit {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        let mut circuit = Circuit::new();
        circuit.extend(iter);
        circuit
    }
}

/// Logical state preparation, after figures 9a and 9b of the tesseract
/// code paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// |++0000>. Uses flag ancillas 16..=22 and records no encoding
    /// measurements.
    Fig9a,
    /// |+0+0+0> from two [[8,3,2]] blocks. Records the two check-ancilla
    /// outcomes before the first round.
    Fig9b,
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Fig9a => "9a",
            Encoding::Fig9b => "9b",
        }
    }

    /// Leading encoding-phase bits in every shot record.
    pub fn measurement_offset(self) -> usize {
        match self {
            Encoding::Fig9a => 0,
            Encoding::Fig9b => 2,
        }
    }

    /// Checks that carry information for the prepared state.
    pub fn check_mode(self) -> CheckMode {
        match self {
            Encoding::Fig9a => CheckMode::TwoCheck,
            Encoding::Fig9b => CheckMode::FourCheck,
        }
    }
}

impl FromStr for Encoding {
    type Err = QecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "9a" => Ok(Encoding::Fig9a),
            "9b" => Ok(Encoding::Fig9b),
            _ => Err(QecError::InvalidMode),
        }
    }
}

/// Check ancillas of the 9b encoding: (z ancilla, x ancilla).
const FIG9B_ANCILLAS: (u16, u16) = (16, 17);

/// Builder appending experiment phases to a circuit under a fixed noise
/// configuration.
pub struct CircuitBuilder<'a> {
    circuit: Circuit,
    noise: &'a NoiseConfig,
}

impl<'a> CircuitBuilder<'a> {
    pub fn new(noise: &'a NoiseConfig) -> Self {
        Self {
            circuit: Circuit::new(),
            noise,
        }
    }

    fn op1(&mut self, opcode: Opcode, q: u16, phase: Phase) {
        self.circuit.push(Instruction::single(opcode, q));
        if let Some(rates) = self.noise.phase(phase) {
            if rates.rate_1q > 0.0 {
                self.circuit
                    .push(Instruction::noise(Opcode::Depolarize1, q, 0, rates.rate_1q));
            }
        }
    }

    fn cnot(&mut self, c: u16, t: u16, phase: Phase) {
        self.circuit.push(Instruction::new(Opcode::GateCNOT, c, t));
        if let Some(rates) = self.noise.phase(phase) {
            if rates.rate_2q > 0.0 {
                self.circuit
                    .push(Instruction::noise(Opcode::Depolarize2, c, t, rates.rate_2q));
            }
        }
    }

    pub fn tick(&mut self) -> &mut Self {
        self.circuit.push(Instruction::tick());
        self
    }

    /// Appends the state preparation.
    pub fn encode(&mut self, encoding: Encoding) -> &mut Self {
        match encoding {
            Encoding::Fig9a => self.encode_fig9a(),
            Encoding::Fig9b => self.encode_fig9b(),
        }
        self.tick()
    }

    fn encode_quad(&mut self, flag: u16, qubits: [u16; 4]) {
        let ph = Phase::Encoding;
        self.cnot(qubits[0], flag, ph);
        for &q in &qubits[1..] {
            self.cnot(qubits[0], q, ph);
        }
        self.cnot(qubits[0], flag, ph);
    }

    fn cnot_rows(&mut self, from: u16, to: u16) {
        for i in 0..4 {
            self.cnot(from + i, to + i, Phase::Encoding);
        }
    }

    fn encode_fig9a(&mut self) {
        let ph = Phase::Encoding;
        for q in [0, 1, 2, 3, 4, 8, 12] {
            self.op1(Opcode::GateH, q, ph);
        }

        self.encode_quad(20, [4, 5, 6, 7]);
        self.encode_quad(21, [8, 9, 10, 11]);
        self.encode_quad(22, [12, 13, 14, 15]);

        // Ancillas 16..20 flag the row-1 fan-out.
        self.cnot_rows(0, 16);
        self.cnot_rows(0, 4);
        self.cnot_rows(0, 8);
        self.cnot_rows(0, 12);
        self.cnot_rows(0, 16);

        self.op1(Opcode::Reset, 18, ph);
        self.op1(Opcode::Reset, 19, ph);
        self.op1(Opcode::GateH, 19, ph);
        self.cnot(19, 18, ph);
        for q in 0..4 {
            self.cnot(19, q, ph);
        }
        self.cnot(19, 18, ph);
    }

    /// |000> in one [[8,3,2]] block, with its X and Z checks kicked onto the
    /// shared check ancillas.
    fn encode_000_block(&mut self, p: [u16; 8]) {
        let ph = Phase::Encoding;
        let (z_anc, x_anc) = FIG9B_ANCILLAS;

        self.op1(Opcode::GateH, x_anc, ph);
        for i in [0, 3, 6, 7] {
            self.op1(Opcode::GateH, p[i], ph);
        }

        for (c, t) in [
            (0, 1),
            (6, 2),
            (0, 4),
            (6, 5),
            (0, 5),
            (6, 1),
            (3, 2),
            (7, 4),
            (3, 4),
            (7, 1),
            (3, 5),
            (7, 2),
        ] {
            self.cnot(p[c], p[t], ph);
        }

        for (x_target, z_source) in [(0, 1), (1, 0), (2, 3), (3, 2)] {
            self.cnot(x_anc, p[x_target], ph);
            self.cnot(p[z_source], z_anc, ph);
        }

        self.op1(Opcode::GateH, x_anc, ph);
    }

    fn encode_fig9b(&mut self) {
        let ph = Phase::Encoding;
        let (z_anc, x_anc) = FIG9B_ANCILLAS;

        self.encode_000_block([0, 1, 2, 3, 4, 5, 6, 7]);
        // |000> -> |+++> on the top block.
        for q in 0..8 {
            self.op1(Opcode::GateH, q, ph);
        }
        self.encode_000_block([8, 9, 10, 11, 12, 13, 14, 15]);

        // Both blocks' checks accumulate on the ancillas; read them once.
        self.op1(Opcode::Measure, x_anc, ph);
        self.op1(Opcode::Measure, z_anc, ph);
    }

    /// Applies a deterministic Pauli error.
    pub fn inject(&mut self, pauli: Pauli, qubit: u16) -> &mut Self {
        let opcode = match pauli {
            Pauli::X => Opcode::PauliX,
            Pauli::Y => Opcode::PauliY,
            Pauli::Z => Opcode::PauliZ,
        };
        self.circuit.push(Instruction::single(opcode, qubit));
        self
    }

    /// Appends the configured channel layer on all data qubits, if any.
    pub fn channel(&mut self) -> &mut Self {
        let Some(channel) = self.noise.channel else {
            return self;
        };
        if channel.rate <= 0.0 {
            return self;
        }
        self.tick();
        for q in 0..DATA_QUBITS as u16 {
            self.circuit
                .push(Instruction::noise(channel.kind.opcode(), q, 0, channel.rate));
        }
        self.tick()
    }

    /// Measures the X and Z stabilizers of four data qubits.
    ///
    /// The X outcome is recorded first, then the Z outcome. The Z ancilla
    /// doubles as a flag for the X measurement's CNOT ladder.
    pub fn measure_stabilizer(&mut self, data: &[u16; 4]) -> &mut Self {
        let ph = Phase::Correction;
        let (xa, za) = (X_ANCILLA, Z_ANCILLA);

        self.op1(Opcode::Reset, xa, ph);
        self.op1(Opcode::Reset, za, ph);
        self.op1(Opcode::GateH, xa, ph);

        self.cnot(data[0], za, ph);
        self.cnot(xa, data[1], ph);
        self.cnot(data[1], za, ph);
        self.cnot(xa, data[0], ph);
        self.cnot(data[2], za, ph);
        self.cnot(xa, data[3], ph);
        self.cnot(data[3], za, ph);
        self.cnot(xa, data[2], ph);

        self.op1(Opcode::GateH, xa, ph);
        self.op1(Opcode::Measure, xa, ph);
        self.op1(Opcode::Measure, za, ph);
        self
    }

    /// One round: the four row stabilizers, then the four column stabilizers.
    pub fn correction_round(&mut self) -> &mut Self {
        for row in &ROWS {
            self.measure_stabilizer(row);
        }
        for col in &COLUMNS {
            self.measure_stabilizer(col);
        }
        self.tick()
    }

    pub fn correction_rounds(&mut self, rounds: usize) -> &mut Self {
        for _ in 0..rounds {
            self.correction_round();
        }
        self
    }

    /// Splits the code into two [[8,3,2]] blocks and reads them out.
    ///
    /// Transversal CNOTs run from row 1 to row 4 and from row 2 to row 3.
    /// The top half is then measured in the X basis and the bottom half in
    /// the Z basis, appending 16 outcomes in qubit order.
    pub fn measure_logical(&mut self) -> &mut Self {
        let ph = Phase::Measurement;
        for i in 0..4 {
            self.cnot(i, i + 12, ph);
        }
        for i in 0..4 {
            self.cnot(i + 4, i + 8, ph);
        }
        for q in 0..8 {
            self.op1(Opcode::GateH, q, ph);
        }
        for q in 0..DATA_QUBITS as u16 {
            self.op1(Opcode::Measure, q, ph);
        }
        self.tick()
    }

    pub fn finish(self) -> Circuit {
        self.circuit
    }
}

/// Builds the complete experiment: encoding, channel, `rounds` error
/// correction rounds, logical readout.
pub fn build_experiment(encoding: Encoding, rounds: usize, noise: &NoiseConfig) -> Circuit {
    let mut builder = CircuitBuilder::new(noise);
    builder
        .encode(encoding)
        .channel()
        .correction_rounds(rounds)
        .measure_logical();
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{ChannelKind, PhaseNoise};
    use tess_common::layout::shot_len;

    #[test]
    fn measurement_count_matches_shot_layout() {
        for encoding in [Encoding::Fig9a, Encoding::Fig9b] {
            for rounds in [0, 1, 3] {
                let circuit = build_experiment(encoding, rounds, &NoiseConfig::NONE);
                assert_eq!(
                    circuit.num_measurements(),
                    shot_len(rounds, encoding.measurement_offset())
                );
            }
        }
    }

    #[test]
    fn register_sizes() {
        assert_eq!(build_experiment(Encoding::Fig9a, 1, &NoiseConfig::NONE).num_qubits(), 23);
        assert_eq!(build_experiment(Encoding::Fig9b, 1, &NoiseConfig::NONE).num_qubits(), 18);
    }

    #[test]
    fn noiseless_circuit_has_no_channels() {
        let circuit = build_experiment(Encoding::Fig9a, 2, &NoiseConfig::NONE);
        assert_eq!(circuit.noise_count(), 0);

        let zero_rates = NoiseConfig {
            encoding: Some(PhaseNoise::uniform(0.0)),
            correction: Some(PhaseNoise::uniform(0.0)),
            ..NoiseConfig::NONE
        };
        assert_eq!(build_experiment(Encoding::Fig9a, 2, &zero_rates).noise_count(), 0);
    }

    #[test]
    fn noise_follows_only_active_phases() {
        let encoding_only = NoiseConfig {
            encoding: Some(PhaseNoise::uniform(0.1)),
            ..NoiseConfig::NONE
        };
        let with_rounds = build_experiment(Encoding::Fig9a, 2, &encoding_only);
        let without_rounds = build_experiment(Encoding::Fig9a, 0, &encoding_only);
        assert!(with_rounds.noise_count() > 0);
        assert_eq!(with_rounds.noise_count(), without_rounds.noise_count());

        let ec_only = NoiseConfig::correction_only(0.1);
        // 8 stabilizers x (6 one-qubit ops + 8 CNOTs) per round.
        assert_eq!(build_experiment(Encoding::Fig9a, 2, &ec_only).noise_count(), 2 * 8 * 14);
    }

    #[test]
    fn channel_layer_covers_data_qubits() {
        let noise = NoiseConfig::channel_only(ChannelKind::BitFlip, 0.2);
        let circuit = build_experiment(Encoding::Fig9a, 1, &noise);
        let channel: Vec<_> = circuit
            .instructions()
            .iter()
            .filter(|i| i.opcode == Opcode::XError)
            .collect();
        assert_eq!(channel.len(), DATA_QUBITS);
        assert!(channel.iter().all(|i| i.probability == 0.2));
    }

    #[test]
    fn encoding_names_parse() {
        assert_eq!("9a".parse::<Encoding>(), Ok(Encoding::Fig9a));
        assert_eq!("9b".parse::<Encoding>(), Ok(Encoding::Fig9b));
        assert!("9c".parse::<Encoding>().is_err());
    }
}
