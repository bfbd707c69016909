//! Parser for Stim circuit files.
//!
//! Each non-empty line holds one instruction: a name, an optional
//! parenthesised argument list and whitespace-separated qubit targets.
//! Multi-target instructions expand to one ISA instruction per target (or
//! per target pair for two-qubit gates). Annotations that carry no
//! simulation semantics here are accepted and skipped.

use anyhow::{Context, Result, anyhow, bail};
use nom::{
    IResult,
    bytes::complete::take_while1,
    character::complete::{char, multispace0, space0, space1},
    combinator::{all_consuming, opt},
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, preceded},
};
use std::fs;
use std::path::Path;
use tess_common::isa::{Instruction, Opcode};
use tess_core::circuit::Circuit;

/// Stim annotations that are accepted and ignored.
const IGNORED: [&str; 4] = ["QUBIT_COORDS", "DETECTOR", "OBSERVABLE_INCLUDE", "SHIFT_COORDS"];

fn opcode_for(name: &str) -> Option<Opcode> {
    let opcode = match name {
        "H" => Opcode::GateH,
        "CX" | "CNOT" => Opcode::GateCNOT,
        "X" => Opcode::PauliX,
        "Y" => Opcode::PauliY,
        "Z" => Opcode::PauliZ,
        "M" => Opcode::Measure,
        "R" => Opcode::Reset,
        "X_ERROR" => Opcode::XError,
        "Y_ERROR" => Opcode::YError,
        "Z_ERROR" => Opcode::ZError,
        "DEPOLARIZE1" => Opcode::Depolarize1,
        "DEPOLARIZE2" => Opcode::Depolarize2,
        "TICK" => Opcode::Tick,
        _ => return None,
    };
    Some(opcode)
}

fn name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<f64>> {
    delimited(
        char('('),
        separated_list0(delimited(space0, char(','), space0), double),
        char(')'),
    )(input)
}

/// Instruction name and optional argument list.
fn head(input: &str) -> IResult<&str, (&str, Option<Vec<f64>>)> {
    let (input, name) = name(input)?;
    let (input, args) = opt(arguments)(input)?;
    Ok((input, (name, args)))
}

fn targets(input: &str) -> IResult<&str, Vec<u16>> {
    let (input, targets) = many0(preceded(space1, nom::character::complete::u16))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, targets))
}

/// Parses one instruction line into `circuit`.
fn parse_line(line: &str, circuit: &mut Circuit) -> Result<()> {
    let (rest, (name, args)) = head(line).map_err(|_| anyhow!("expected an instruction name"))?;
    if IGNORED.contains(&name) {
        return Ok(());
    }
    let opcode = opcode_for(name).ok_or_else(|| anyhow!("unsupported instruction {name}"))?;

    let (_, qubits) =
        all_consuming(targets)(rest).map_err(|_| anyhow!("malformed targets for {name}"))?;

    let probability = match (opcode.is_noise(), args.as_deref()) {
        (true, Some([p])) => *p,
        (true, _) => bail!("{name} takes exactly one probability argument"),
        (false, None | Some([])) => 0.0,
        (false, Some(_)) => bail!("{name} takes no arguments"),
    };
    if !(0.0..=1.0).contains(&probability) {
        bail!("probability {probability} is outside [0, 1]");
    }

    match opcode.arity() {
        0 => {
            if !qubits.is_empty() {
                bail!("{name} takes no targets");
            }
            circuit.push(Instruction::tick());
        }
        1 => {
            for &q in &qubits {
                circuit.push(Instruction::noise(opcode, q, 0, probability));
            }
        }
        _ => {
            if qubits.len() % 2 != 0 {
                bail!("{name} needs an even number of targets");
            }
            for pair in qubits.chunks_exact(2) {
                if pair[0] == pair[1] {
                    bail!("{name} targets must differ, got {} twice", pair[0]);
                }
                circuit.push(Instruction::noise(opcode, pair[0], pair[1], probability));
            }
        }
    }
    Ok(())
}

/// Parses Stim circuit text.
///
/// `#` starts a comment that runs to the end of the line. Errors name the
/// offending 1-based line number.
pub fn parse_stim_circuit(text: &str) -> Result<Circuit> {
    let mut circuit = Circuit::new();
    for (n, line) in text.lines().enumerate() {
        let code = line.split('#').next().unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }
        parse_line(code, &mut circuit).with_context(|| format!("line {}: {code}", n + 1))?;
    }
    Ok(circuit)
}

/// Loads and parses a Stim circuit file.
pub fn load_stim_file<P: AsRef<Path>>(path: P) -> Result<Circuit> {
    let text = fs::read_to_string(path).context("Failed to open .stim file")?;
    parse_stim_circuit(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_multi_target_lines() {
        let circuit = parse_stim_circuit(
            "# header\nH 0 1 2\nCX 0 1 2 3\nDEPOLARIZE2(0.01) 0 1\nM 3  # trailing\nTICK\n",
        )
        .unwrap();
        let ops: Vec<_> = circuit
            .instructions()
            .iter()
            .map(|i| (i.opcode, i.operand_1, i.operand_2))
            .collect();
        assert_eq!(
            ops,
            [
                (Opcode::GateH, 0, 0),
                (Opcode::GateH, 1, 0),
                (Opcode::GateH, 2, 0),
                (Opcode::GateCNOT, 0, 1),
                (Opcode::GateCNOT, 2, 3),
                (Opcode::Depolarize2, 0, 1),
                (Opcode::Measure, 3, 0),
                (Opcode::Tick, 0, 0),
            ]
        );
        assert_eq!(circuit.instructions()[5].probability, 0.01);
        assert_eq!(circuit.num_measurements(), 1);
        assert_eq!(circuit.num_qubits(), 4);
    }

    #[test]
    fn skips_annotations() {
        let circuit = parse_stim_circuit(
            "QUBIT_COORDS(0, 1) 4\nR 4\nDETECTOR(1, 2, 0) rec[-1]\nOBSERVABLE_INCLUDE(0) rec[-2]\nSHIFT_COORDS(0, 0, 1)\n",
        )
        .unwrap();
        assert_eq!(circuit.len(), 1);
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse_stim_circuit("H 0\nMPP X0*X1\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        assert!(parse_stim_circuit("CX 0 1 2").is_err());
        assert!(parse_stim_circuit("X_ERROR 0").is_err());
        assert!(parse_stim_circuit("X_ERROR(1.5) 0").is_err());
        assert!(parse_stim_circuit("H(0.1) 0").is_err());
        assert!(parse_stim_circuit("H 0 a").is_err());
        assert!(parse_stim_circuit("CX 1 1").is_err());
    }
}
