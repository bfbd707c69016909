//! Noise sweeps over rounds and physical error rates.
//!
//! Every (rounds, noise) point runs as an independent parallel experiment
//! and becomes one CSV row.

use crate::run::{Trial, chunk_seed, run_parallel};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tess_core::circuit::Encoding;
use tess_core::experiment::ExperimentStats;
use tess_core::noise::{ChannelKind, NoiseConfig};

pub const CSV_HEADER: &str =
    "noise,rounds,shots,accepted,logical_passed,acceptance_rate,logical_rate,average_fraction";

/// Which noise source the swept rate drives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepTarget {
    /// Depolarizing noise after every error correction gate.
    Correction,
    /// One channel layer between encoding and error correction.
    Channel(ChannelKind),
}

impl SweepTarget {
    fn noise(self, rate: f64) -> NoiseConfig {
        match self {
            SweepTarget::Correction => NoiseConfig::correction_only(rate),
            SweepTarget::Channel(kind) => NoiseConfig::channel_only(kind, rate),
        }
    }
}

pub struct SweepPlan {
    pub encoding: Encoding,
    pub rounds: Vec<usize>,
    pub noise: Vec<f64>,
    pub target: SweepTarget,
    pub shots: usize,
    pub apply_correction: bool,
    pub seed: u64,
}

/// `points` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// One CSV row; the fraction column is empty when it is undefined.
pub fn csv_row(noise: f64, rounds: usize, stats: &ExperimentStats) -> String {
    let rate = |r: Option<f64>| r.map_or(String::new(), |r| format!("{r:.6}"));
    format!(
        "{noise},{rounds},{},{},{},{},{},{}",
        stats.shots,
        stats.accepted,
        stats.logical_passed,
        rate(stats.acceptance_rate()),
        rate(stats.logical_rate()),
        rate(stats.average_fraction()),
    )
}

pub fn run_sweep(plan: &SweepPlan, output: Option<&str>) -> Result<()> {
    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {path}"))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    writeln!(out, "{CSV_HEADER}")?;

    let total = plan.rounds.len() * plan.noise.len();
    log::info!(
        "sweeping {} points ({} rounds x {} rates), {} shots each",
        total,
        plan.rounds.len(),
        plan.noise.len(),
        plan.shots
    );

    for (ri, &rounds) in plan.rounds.iter().enumerate() {
        for (ni, &rate) in plan.noise.iter().enumerate() {
            let trial = Trial {
                encoding: plan.encoding,
                rounds,
                noise: plan.target.noise(rate),
                apply_correction: plan.apply_correction,
            };
            let point = (ri * plan.noise.len() + ni) as u64;
            let stats = run_parallel(&trial, plan.shots, chunk_seed(plan.seed, point << 32))?;
            log::info!(
                "[{}/{}] rounds {}, noise {}: {}/{} accepted",
                point + 1,
                total,
                rounds,
                rate,
                stats.accepted,
                stats.shots
            );
            writeln!(out, "{}", csv_row(rate, rounds, &stats))?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tess_core::verifier::CheckMode;

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 0.01, 0), Vec::<f64>::new());
        assert_eq!(linspace(0.5, 1.0, 1), [0.5]);
        let points = linspace(0.0, 0.01, 30);
        assert_eq!(points.len(), 30);
        assert_eq!(points[0], 0.0);
        assert!((points[29] - 0.01).abs() < 1e-15);
    }

    #[test]
    fn undefined_fraction_leaves_empty_field() {
        let mut stats = ExperimentStats::new(CheckMode::TwoCheck);
        stats.shots = 4;
        let row = csv_row(0.001, 3, &stats);
        assert_eq!(row, "0.001,3,4,0,0,0.000000,0.000000,");
        assert_eq!(row.split(',').count(), CSV_HEADER.split(',').count());
    }
}
