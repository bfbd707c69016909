//! Experiment driver and aggregate statistics.
//!
//! Every shot is decoded and, when accepted, verified against its logical
//! readout. The statistics keep integer totals only, so partial results
//! from independent workers can be merged exactly.

use crate::QecError;
use crate::circuit::{Circuit, Encoding};
use crate::decoder::{DecodeOutcome, Pass, Rejection, ShotDecoder};
use crate::sampler::{Sampler, ShotMatrix};
use crate::verifier::{CheckMode, verify};
use tess_common::layout::TAIL_LEN;

/// Decoding and scoring parameters of one experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperimentConfig {
    pub rounds: usize,
    pub measurement_offset: usize,
    pub mode: CheckMode,
    pub apply_correction: bool,
}

impl ExperimentConfig {
    /// Derives the offset and check mode from the encoding.
    pub fn for_encoding(encoding: Encoding, rounds: usize, apply_correction: bool) -> Self {
        Self {
            rounds,
            measurement_offset: encoding.measurement_offset(),
            mode: encoding.check_mode(),
            apply_correction,
        }
    }

    pub fn decoder(&self) -> ShotDecoder {
        ShotDecoder::new(self.rounds, self.measurement_offset)
    }
}

/// Result of one shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotResult {
    Rejected(Rejection),
    Accepted { successful_checks: usize },
}

/// Decodes and scores a single shot record.
pub fn evaluate_shot(shot: &[u8], config: &ExperimentConfig) -> Result<ShotResult, QecError> {
    match config.decoder().decode(shot)? {
        DecodeOutcome::Rejected(rejection) => Ok(ShotResult::Rejected(rejection)),
        DecodeOutcome::Accepted { frame_x, frame_z } => {
            let tail = &shot[shot.len() - TAIL_LEN..];
            let successful_checks =
                verify(tail, &frame_x, &frame_z, config.apply_correction, config.mode)?;
            Ok(ShotResult::Accepted { successful_checks })
        }
    }
}

/// Accumulated statistics over shots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperimentStats {
    pub shots: u64,
    pub accepted: u64,
    /// Accepted shots where every scored check holds.
    pub logical_passed: u64,
    /// Sum of successful checks over accepted shots.
    pub successful_checks: u64,
    pub max_checks: usize,
    /// Accepted shots by number of successful checks.
    pub check_histogram: [u64; 5],
    /// Rejected shots by the pass that rejected them, in `Pass::ALL` order.
    pub rejected_by_pass: [u64; 4],
}

impl ExperimentStats {
    pub fn new(mode: CheckMode) -> Self {
        Self {
            shots: 0,
            accepted: 0,
            logical_passed: 0,
            successful_checks: 0,
            max_checks: mode.max_checks(),
            check_histogram: [0; 5],
            rejected_by_pass: [0; 4],
        }
    }

    pub fn record(&mut self, result: ShotResult) {
        self.shots += 1;
        match result {
            ShotResult::Rejected(rejection) => {
                self.rejected_by_pass[rejection.pass.index()] += 1;
            }
            ShotResult::Accepted { successful_checks } => {
                self.accepted += 1;
                self.successful_checks += successful_checks as u64;
                self.check_histogram[successful_checks.min(4)] += 1;
                if successful_checks == self.max_checks {
                    self.logical_passed += 1;
                }
            }
        }
    }

    /// Folds another partial result into this one. Both must score the same
    /// number of checks.
    pub fn merge(&mut self, other: &ExperimentStats) -> Result<(), QecError> {
        if self.max_checks != other.max_checks {
            return Err(QecError::CheckCountMismatch {
                expected: self.max_checks,
                actual: other.max_checks,
            });
        }
        self.shots += other.shots;
        self.accepted += other.accepted;
        self.logical_passed += other.logical_passed;
        self.successful_checks += other.successful_checks;
        for (a, b) in self.check_histogram.iter_mut().zip(other.check_histogram) {
            *a += b;
        }
        for (a, b) in self.rejected_by_pass.iter_mut().zip(other.rejected_by_pass) {
            *a += b;
        }
        Ok(())
    }

    pub fn rejected(&self) -> u64 {
        self.shots - self.accepted
    }

    /// Rejections attributed to `pass`.
    pub fn rejected_at(&self, pass: Pass) -> u64 {
        self.rejected_by_pass[pass.index()]
    }

    /// Mean fraction of scored checks that hold over accepted shots.
    ///
    /// `None` when no shot was accepted.
    pub fn average_fraction(&self) -> Option<f64> {
        if self.accepted == 0 {
            return None;
        }
        Some(self.successful_checks as f64 / (self.accepted as f64 * self.max_checks as f64))
    }

    /// `accepted / shots`, or `None` for an empty run.
    pub fn acceptance_rate(&self) -> Option<f64> {
        (self.shots > 0).then(|| self.accepted as f64 / self.shots as f64)
    }

    /// `logical_passed / shots`, or `None` for an empty run.
    pub fn logical_rate(&self) -> Option<f64> {
        (self.shots > 0).then(|| self.logical_passed as f64 / self.shots as f64)
    }

    /// `logical_passed / accepted`, or `None` when nothing was accepted.
    pub fn logical_rate_given_accepted(&self) -> Option<f64> {
        (self.accepted > 0).then(|| self.logical_passed as f64 / self.accepted as f64)
    }
}

/// Decodes and scores every shot of a matrix.
pub fn evaluate(matrix: &ShotMatrix, config: &ExperimentConfig) -> Result<ExperimentStats, QecError> {
    let mut stats = ExperimentStats::new(config.mode);
    for shot in matrix.iter() {
        stats.record(evaluate_shot(shot, config)?);
    }
    Ok(stats)
}

/// Samples `shots` records of `circuit` and evaluates them.
///
/// # Errors
///
/// `ShotLengthMismatch` when the circuit's measurement count does not match
/// the layout in `config`, or any error raised by the sampler.
pub fn run<S: Sampler + ?Sized>(
    sampler: &mut S,
    circuit: &Circuit,
    shots: usize,
    config: &ExperimentConfig,
) -> Result<ExperimentStats, QecError> {
    let expected = config.decoder().expected_len();
    if circuit.num_measurements() != expected {
        return Err(QecError::ShotLengthMismatch {
            expected,
            actual: circuit.num_measurements(),
        });
    }
    let matrix = sampler.sample(circuit, shots)?;
    let stats = evaluate(&matrix, config)?;
    log::debug!(
        "{} rounds, {} shots: {} accepted, {} passed",
        config.rounds,
        stats.shots,
        stats.accepted,
        stats.logical_passed
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_check(rounds: usize) -> ExperimentConfig {
        ExperimentConfig {
            rounds,
            measurement_offset: 0,
            mode: CheckMode::TwoCheck,
            apply_correction: true,
        }
    }

    #[test]
    fn empty_stats_have_no_rates() {
        let stats = ExperimentStats::new(CheckMode::FourCheck);
        assert_eq!(stats.average_fraction(), None);
        assert_eq!(stats.acceptance_rate(), None);
        assert_eq!(stats.logical_rate_given_accepted(), None);
    }

    #[test]
    fn record_tallies_checks_and_passes() {
        let mut stats = ExperimentStats::new(CheckMode::FourCheck);
        stats.record(ShotResult::Accepted { successful_checks: 4 });
        stats.record(ShotResult::Accepted { successful_checks: 2 });
        stats.record(ShotResult::Rejected(Rejection {
            round: 0,
            pass: Pass::ColumnX,
        }));
        assert_eq!(stats.shots, 3);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.logical_passed, 1);
        assert_eq!(stats.check_histogram, [0, 0, 1, 0, 1]);
        assert_eq!(stats.rejected_at(Pass::ColumnX), 1);
        assert_eq!(stats.average_fraction(), Some(0.75));
    }

    #[test]
    fn merge_matches_sequential_record() {
        let results = [
            ShotResult::Accepted { successful_checks: 2 },
            ShotResult::Accepted { successful_checks: 1 },
            ShotResult::Rejected(Rejection {
                round: 1,
                pass: Pass::RowZ,
            }),
            ShotResult::Accepted { successful_checks: 0 },
        ];
        let mut all = ExperimentStats::new(CheckMode::TwoCheck);
        let mut left = ExperimentStats::new(CheckMode::TwoCheck);
        let mut right = ExperimentStats::new(CheckMode::TwoCheck);
        for (i, r) in results.into_iter().enumerate() {
            all.record(r);
            if i < 2 {
                left.record(r);
            } else {
                right.record(r);
            }
        }
        left.merge(&right).unwrap();
        assert_eq!(left, all);
    }

    #[test]
    fn merge_rejects_mixed_check_counts() {
        let mut two = ExperimentStats::new(CheckMode::TwoCheck);
        two.record(ShotResult::Accepted { successful_checks: 2 });
        let mut four = ExperimentStats::new(CheckMode::FourCheck);
        four.record(ShotResult::Accepted { successful_checks: 4 });
        assert_eq!(
            two.merge(&four),
            Err(QecError::CheckCountMismatch { expected: 2, actual: 4 })
        );
        assert_eq!((two.shots, two.successful_checks), (1, 2));
    }

    #[test]
    fn evaluate_shot_uses_tail() {
        let mut shot = [0u8; 32];
        // Z5 disagrees: bits 13 and 12 of the tail differ.
        shot[16 + 12] = 1;
        assert_eq!(
            evaluate_shot(&shot, &two_check(1)),
            Ok(ShotResult::Accepted { successful_checks: 1 })
        );
    }
}
