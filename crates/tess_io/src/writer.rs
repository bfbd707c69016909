use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tess_common::isa::{Instruction, Opcode};
use tess_common::layout::{DATA_QUBITS, GRID_SIDE};
use tess_core::circuit::Circuit;

fn stim_name(opcode: Opcode) -> &'static str {
    match opcode {
        Opcode::GateH => "H",
        Opcode::GateCNOT => "CX",
        Opcode::PauliX => "X",
        Opcode::PauliY => "Y",
        Opcode::PauliZ => "Z",
        Opcode::Measure => "M",
        Opcode::Reset => "R",
        Opcode::XError => "X_ERROR",
        Opcode::YError => "Y_ERROR",
        Opcode::ZError => "Z_ERROR",
        Opcode::Depolarize1 => "DEPOLARIZE1",
        Opcode::Depolarize2 => "DEPOLARIZE2",
        Opcode::Tick => "TICK",
    }
}

fn write_instruction(out: &mut String, instr: &Instruction) {
    let op = instr.opcode;
    out.push_str(stim_name(op));
    if op.is_noise() {
        let _ = write!(out, "({})", instr.probability);
    }
    match op.arity() {
        0 => {}
        1 => {
            let _ = write!(out, " {}", instr.operand_1);
        }
        _ => {
            let _ = write!(out, " {} {}", instr.operand_1, instr.operand_2);
        }
    }
    out.push('\n');
}

/// Renders a circuit as Stim text, one instruction per line.
pub fn write_stim_circuit(circuit: &Circuit) -> String {
    let mut out = String::with_capacity(circuit.len() * 12);
    for instr in circuit.instructions() {
        write_instruction(&mut out, instr);
    }
    out
}

/// Writes a circuit to a .stim file.
///
/// The file opens with a comment header describing the experiment and the
/// qubit layout, followed by `QUBIT_COORDS` for the data grid (column,
/// row) and the ancillas (stacked in a column right of the grid).
pub fn save_stim_file<P: AsRef<Path>>(path: P, circuit: &Circuit, description: &str) -> Result<()> {
    let mut out = String::new();
    for line in description.lines() {
        let _ = writeln!(out, "# {line}");
    }
    let _ = writeln!(
        out,
        "# data qubits 0-15 on a 4x4 grid (row-major), ancillas {}-{}",
        DATA_QUBITS,
        circuit.num_qubits().saturating_sub(1).max(DATA_QUBITS)
    );
    let _ = writeln!(out, "# {} measurements per shot", circuit.num_measurements());

    for q in 0..circuit.num_qubits().max(DATA_QUBITS) {
        let (x, y) = if q < DATA_QUBITS {
            (q % GRID_SIDE, q / GRID_SIDE)
        } else {
            (GRID_SIDE + 1, q - DATA_QUBITS)
        };
        let _ = writeln!(out, "QUBIT_COORDS({x}, {y}) {q}");
    }

    out.push_str(&write_stim_circuit(circuit));
    fs::write(path, out).context("Failed to write .stim file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{load_stim_file, parse_stim_circuit};
    use tess_core::circuit::{Encoding, build_experiment};
    use tess_core::noise::{ChannelKind, ChannelNoise, NoiseConfig, PhaseNoise};

    fn noisy() -> NoiseConfig {
        NoiseConfig {
            encoding: Some(PhaseNoise::uniform(0.0005)),
            correction: Some(PhaseNoise {
                rate_1q: 0.001,
                rate_2q: 0.0123456789,
            }),
            measurement: None,
            channel: Some(ChannelNoise {
                kind: ChannelKind::Depolarizing,
                rate: 0.003,
            }),
        }
    }

    #[test]
    fn text_parses_back_to_same_circuit() {
        for encoding in [Encoding::Fig9a, Encoding::Fig9b] {
            let circuit = build_experiment(encoding, 2, &noisy());
            let parsed = parse_stim_circuit(&write_stim_circuit(&circuit)).unwrap();
            assert_eq!(parsed, circuit);
        }
    }

    #[test]
    fn formats_gates_and_noise() {
        let circuit: Circuit = [
            Instruction::new(Opcode::GateCNOT, 16, 3),
            Instruction::noise(Opcode::Depolarize2, 16, 3, 0.25),
            Instruction::single(Opcode::Measure, 16),
            Instruction::tick(),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            write_stim_circuit(&circuit),
            "CX 16 3\nDEPOLARIZE2(0.25) 16 3\nM 16\nTICK\n"
        );
    }

    #[test]
    fn saved_file_loads_with_coordinates_skipped() {
        let circuit = build_experiment(Encoding::Fig9b, 1, &NoiseConfig::NONE);
        let path = std::env::temp_dir().join(format!("tess_io_{}_save.stim", std::process::id()));
        save_stim_file(&path, &circuit, "9b encoding\n1 round").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# 9b encoding\n# 1 round\n"));
        assert!(text.contains("QUBIT_COORDS(3, 2) 11\n"));
        assert!(text.contains("QUBIT_COORDS(5, 1) 17\n"));
        let loaded = load_stim_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, circuit);
    }
}
