//! Circuit and sample generator for external tooling.
//!
//! Writes the experiment circuit as a Stim file so that it can be sampled
//! by other simulators, and optionally samples it here into a .b8 file that
//! the `decode` subcommand (or any Stim-compatible reader) accepts.

use crate::run::chunk_seed;
use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tess_core::circuit::{Encoding, build_experiment};
use tess_core::noise::NoiseConfig;
use tess_core::sampler::{FrameSampler, Sampler};
use tess_io::{loader, writer};

/// Generates the experiment circuit and, when `b8_path` is set, `shots`
/// samples of it.
///
/// # Arguments
///
/// * `encoding` - State preparation of the experiment
/// * `rounds` - Number of error correction rounds
/// * `noise` - Noise configuration baked into the circuit
/// * `stim_path` - Output path for the circuit (.stim file)
/// * `b8_path` - Output path for the samples (.b8 file), if any
/// * `shots` - Number of shots to sample
/// * `seed` - Sampler seed
pub fn generate(
    encoding: Encoding,
    rounds: usize,
    noise: &NoiseConfig,
    stim_path: &str,
    b8_path: Option<&str>,
    shots: usize,
    seed: u64,
) -> Result<()> {
    noise.validate()?;
    let circuit = build_experiment(encoding, rounds, noise);

    let description = format!(
        "Tesseract code experiment: encoding {}, {} error correction rounds\n\
         measurement offset {}, {} scoring\n\
         noise: {:?}",
        encoding.name(),
        rounds,
        encoding.measurement_offset(),
        encoding.check_mode().name(),
        noise
    );
    writer::save_stim_file(stim_path, &circuit, &description)?;
    println!(
        "Wrote {} ({} instructions, {} qubits, {} measurements per shot)",
        stim_path,
        circuit.len(),
        circuit.num_qubits(),
        circuit.num_measurements()
    );

    if let Some(b8_path) = b8_path {
        log::info!("sampling {shots} shots with seed {seed}");
        let mut sampler = FrameSampler::new(StdRng::seed_from_u64(chunk_seed(seed, 0)));
        let samples = sampler.sample(&circuit, shots)?;
        loader::write_b8_file(b8_path, &samples)?;
        println!("Wrote {} ({} shots)", b8_path, samples.num_shots());
    }

    println!("Done.");
    Ok(())
}
