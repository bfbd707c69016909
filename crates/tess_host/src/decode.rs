use crate::stats;
use anyhow::{Result, ensure};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use tess_core::experiment::{ExperimentConfig, ExperimentStats, evaluate_shot};
use tess_core::sampler::ShotMatrix;
use tess_io::loader;

fn load_shots(path: &str, bits_per_shot: usize) -> Result<ShotMatrix> {
    let is_01 = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("01"));
    if is_01 {
        loader::load_01_file(path, bits_per_shot)
    } else {
        let raw_bits = loader::load_b8_file(path)?;
        loader::slice_shots(&raw_bits, bits_per_shot)
    }
}

/// Decodes and scores every shot of a matrix across the rayon pool.
pub fn evaluate_parallel(shots: &ShotMatrix, config: &ExperimentConfig) -> Result<ExperimentStats> {
    let bits_per_shot = config.decoder().expected_len();
    ensure!(
        shots.bits_per_shot() == bits_per_shot,
        "shots hold {} bits, {} rounds with offset {} need {}",
        shots.bits_per_shot(),
        config.rounds,
        config.measurement_offset,
        bits_per_shot
    );

    let stats = shots
        .as_flat()
        .par_chunks(bits_per_shot)
        .try_fold(
            || ExperimentStats::new(config.mode),
            |mut acc, shot| {
                acc.record(evaluate_shot(shot, config)?);
                Ok::<_, tess_core::QecError>(acc)
            },
        )
        .try_reduce(
            || ExperimentStats::new(config.mode),
            |mut a, b| {
                a.merge(&b)?;
                Ok(a)
            },
        )?;
    Ok(stats)
}

pub fn decode_file(path: &str, config: &ExperimentConfig) -> Result<()> {
    let bits_per_shot = config.decoder().expected_len();
    println!("Loading Shots from {}...", path);
    let shots = load_shots(path, bits_per_shot)?;
    println!("Loaded {} shots of {} bits.", shots.num_shots(), bits_per_shot);

    log::info!(
        "decoding with {} rounds, offset {}, {}",
        config.rounds,
        config.measurement_offset,
        config.mode.name()
    );
    let start = Instant::now();
    let stats = evaluate_parallel(&shots, config)?;
    let elapsed = start.elapsed();

    stats::print_report(&stats);
    println!(
        "Time: {:.4} s ({:.2} shots/s)",
        elapsed.as_secs_f64(),
        shots.num_shots() as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tess_core::circuit::{Encoding, build_experiment};
    use tess_core::experiment::evaluate;
    use tess_core::noise::NoiseConfig;
    use tess_core::sampler::{FrameSampler, Sampler};

    #[test]
    fn parallel_matches_sequential() {
        let circuit = build_experiment(Encoding::Fig9b, 2, &NoiseConfig::correction_only(0.02));
        let config = ExperimentConfig::for_encoding(Encoding::Fig9b, 2, true);
        let shots = FrameSampler::new(StdRng::seed_from_u64(8))
            .sample(&circuit, 500)
            .unwrap();
        assert_eq!(
            evaluate_parallel(&shots, &config).unwrap(),
            evaluate(&shots, &config).unwrap()
        );
    }

    #[test]
    fn layout_mismatch_is_reported() {
        let shots = ShotMatrix::new(33);
        let config = ExperimentConfig::for_encoding(Encoding::Fig9a, 1, true);
        assert!(evaluate_parallel(&shots, &config).is_err());
    }

    #[test]
    fn sampled_b8_file_decodes() {
        let circuit = build_experiment(Encoding::Fig9a, 3, &NoiseConfig::NONE);
        let shots = FrameSampler::new(StdRng::seed_from_u64(2))
            .sample(&circuit, 40)
            .unwrap();
        let path = std::env::temp_dir().join(format!("tess_host_{}_decode.b8", std::process::id()));
        loader::write_b8_file(&path, &shots).unwrap();
        let path = path.to_string_lossy().into_owned();

        let config = ExperimentConfig::for_encoding(Encoding::Fig9a, 3, true);
        let loaded = load_shots(&path, config.decoder().expected_len()).unwrap();
        std::fs::remove_file(&path).ok();
        let stats = evaluate_parallel(&loaded, &config).unwrap();
        assert_eq!((stats.shots, stats.accepted, stats.logical_passed), (40, 40, 40));
    }
}
