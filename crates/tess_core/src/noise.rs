//! Noise configuration for experiment circuits.
//!
//! A configuration says which phases of the experiment are noisy and at
//! which rates. It is a plain value passed to the circuit builder; there is
//! no process-wide default.

use crate::QecError;
use tess_common::isa::Opcode;

/// Phase of the experiment an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Encoding,
    Correction,
    Measurement,
}

/// Gate noise rates of one phase.
///
/// Every one-qubit operation of the phase is followed by a single-qubit
/// depolarizing channel at `rate_1q`, every two-qubit operation by a
/// two-qubit depolarizing channel at `rate_2q`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseNoise {
    pub rate_1q: f64,
    pub rate_2q: f64,
}

impl PhaseNoise {
    /// Same rate for one- and two-qubit operations.
    pub fn uniform(rate: f64) -> Self {
        Self {
            rate_1q: rate,
            rate_2q: rate,
        }
    }
}

/// Kind of the one-off channel applied to the data qubits between encoding
/// and error correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    BitFlip,
    PhaseFlip,
    Depolarizing,
}

impl ChannelKind {
    pub fn opcode(self) -> Opcode {
        match self {
            ChannelKind::BitFlip => Opcode::XError,
            ChannelKind::PhaseFlip => Opcode::ZError,
            ChannelKind::Depolarizing => Opcode::Depolarize1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelNoise {
    pub kind: ChannelKind,
    pub rate: f64,
}

/// Noise configuration of a whole experiment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoiseConfig {
    pub encoding: Option<PhaseNoise>,
    pub correction: Option<PhaseNoise>,
    pub measurement: Option<PhaseNoise>,
    pub channel: Option<ChannelNoise>,
}

impl NoiseConfig {
    /// Noiseless configuration.
    pub const NONE: NoiseConfig = NoiseConfig {
        encoding: None,
        correction: None,
        measurement: None,
        channel: None,
    };

    /// Gate noise during error correction rounds only.
    pub fn correction_only(rate: f64) -> Self {
        Self {
            correction: Some(PhaseNoise::uniform(rate)),
            ..Self::NONE
        }
    }

    /// A single channel layer between encoding and error correction only.
    pub fn channel_only(kind: ChannelKind, rate: f64) -> Self {
        Self {
            channel: Some(ChannelNoise { kind, rate }),
            ..Self::NONE
        }
    }

    /// Rates for `phase`, or `None` when the phase is noiseless.
    pub fn phase(&self, phase: Phase) -> Option<PhaseNoise> {
        match phase {
            Phase::Encoding => self.encoding,
            Phase::Correction => self.correction,
            Phase::Measurement => self.measurement,
        }
    }

    /// Checks that every configured probability lies in `[0, 1]`.
    pub fn validate(&self) -> Result<(), QecError> {
        let phase_rates = [self.encoding, self.correction, self.measurement]
            .into_iter()
            .flatten()
            .flat_map(|p| [p.rate_1q, p.rate_2q]);
        let channel_rate = self.channel.map(|c| c.rate);
        for p in phase_rates.chain(channel_rate) {
            if !(0.0..=1.0).contains(&p) {
                return Err(QecError::InvalidProbability(p));
            }
        }
        Ok(())
    }
}
