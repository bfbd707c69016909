mod decode;
mod generator;
mod run;
mod stats;
mod sweep;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tess_core::circuit::Encoding;
use tess_core::noise::{ChannelKind, ChannelNoise, NoiseConfig, PhaseNoise};
use tess_core::verifier::CheckMode;

#[derive(Parser)]
#[command(name = "tesseract", about = "Tesseract code row/column flag decoding experiments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum EncodingArg {
    #[value(name = "9a")]
    Fig9a,
    #[value(name = "9b")]
    Fig9b,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Fig9a => Encoding::Fig9a,
            EncodingArg::Fig9b => Encoding::Fig9b,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    TwoCheck,
    FourCheck,
}

impl From<ModeArg> for CheckMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::TwoCheck => CheckMode::TwoCheck,
            ModeArg::FourCheck => CheckMode::FourCheck,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelArg {
    BitFlip,
    PhaseFlip,
    Depolarizing,
}

impl From<ChannelArg> for ChannelKind {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::BitFlip => ChannelKind::BitFlip,
            ChannelArg::PhaseFlip => ChannelKind::PhaseFlip,
            ChannelArg::Depolarizing => ChannelKind::Depolarizing,
        }
    }
}

/// Gate and channel noise rates. A rate of zero disables that noise source.
#[derive(Args, Clone, Copy)]
struct NoiseArgs {
    /// Depolarizing rate after encoding gates
    #[arg(long, default_value_t = 0.0)]
    encoding_noise: f64,
    /// Depolarizing rate after error correction gates
    #[arg(long, default_value_t = 0.0)]
    ec_noise: f64,
    /// Depolarizing rate after logical measurement gates
    #[arg(long, default_value_t = 0.0)]
    measurement_noise: f64,
    /// Rate of the channel between encoding and error correction
    #[arg(long, default_value_t = 0.0)]
    channel_noise: f64,
    #[arg(long, value_enum, default_value_t = ChannelArg::Depolarizing)]
    channel_kind: ChannelArg,
}

impl NoiseArgs {
    fn to_config(self) -> NoiseConfig {
        let phase = |rate: f64| (rate > 0.0).then(|| PhaseNoise::uniform(rate));
        NoiseConfig {
            encoding: phase(self.encoding_noise),
            correction: phase(self.ec_noise),
            measurement: phase(self.measurement_noise),
            channel: (self.channel_noise > 0.0).then(|| ChannelNoise {
                kind: self.channel_kind.into(),
                rate: self.channel_noise,
            }),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sample and decode one experiment
    Run {
        #[arg(short, long, value_enum, default_value_t = EncodingArg::Fig9a)]
        encoding: EncodingArg,
        #[arg(short, long, default_value_t = 1)]
        rounds: usize,
        #[arg(short, long, default_value_t = 10_000)]
        shots: usize,
        #[command(flatten)]
        noise: NoiseArgs,
        /// Score the raw readout without applying correction frames
        #[arg(long)]
        no_correction: bool,
        #[arg(long, default_value_t = 12345)]
        seed: u64,
    },
    /// Acceptance and logical rates over a grid of noise rates and rounds
    Sweep {
        #[arg(short, long, value_enum, default_value_t = EncodingArg::Fig9a)]
        encoding: EncodingArg,
        #[arg(short, long, value_delimiter = ',', default_values_t = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 20, 30, 40, 50])]
        rounds: Vec<usize>,
        #[arg(short, long, default_value_t = 10_000)]
        shots: usize,
        #[arg(long, default_value_t = 0.0)]
        noise_min: f64,
        #[arg(long, default_value_t = 0.01)]
        noise_max: f64,
        #[arg(long, default_value_t = 30)]
        points: usize,
        /// Sweep the channel rate instead of the error correction gate rate
        #[arg(long)]
        sweep_channel_noise: bool,
        #[arg(long, value_enum, default_value_t = ChannelArg::Depolarizing)]
        channel_kind: ChannelArg,
        #[arg(long)]
        no_correction: bool,
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// CSV output path, stdout when absent
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Write the experiment circuit as Stim text, optionally with samples
    Gen {
        #[arg(short, long, value_enum, default_value_t = EncodingArg::Fig9a)]
        encoding: EncodingArg,
        #[arg(short, long, default_value_t = 1)]
        rounds: usize,
        #[command(flatten)]
        noise: NoiseArgs,
        #[arg(long, default_value = "tesseract.stim")]
        stim: String,
        #[arg(long, default_value = "tesseract.b8")]
        b8: String,
        /// Number of shots to sample into the .b8 file; none when zero
        #[arg(short, long, default_value_t = 0)]
        shots: usize,
        #[arg(long, default_value_t = 12345)]
        seed: u64,
    },
    /// Decode externally sampled shots from a .b8 or 01 file
    Decode {
        /// Input file; `.01` files are read as text, anything else as .b8
        #[arg(short, long)]
        input: String,
        #[arg(short, long)]
        rounds: usize,
        #[arg(short, long, value_enum, default_value_t = EncodingArg::Fig9a)]
        encoding: EncodingArg,
        /// Override the encoding's measurement offset
        #[arg(long)]
        offset: Option<usize>,
        /// Override the encoding's check mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[arg(long)]
        no_correction: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            encoding,
            rounds,
            shots,
            noise,
            no_correction,
            seed,
        } => {
            let trial = run::Trial {
                encoding: encoding.into(),
                rounds,
                noise: noise.to_config(),
                apply_correction: !no_correction,
            };
            run::run_and_report(&trial, shots, seed)?;
        }
        Commands::Sweep {
            encoding,
            rounds,
            shots,
            noise_min,
            noise_max,
            points,
            sweep_channel_noise,
            channel_kind,
            no_correction,
            seed,
            output,
        } => {
            let target = if sweep_channel_noise {
                sweep::SweepTarget::Channel(channel_kind.into())
            } else {
                sweep::SweepTarget::Correction
            };
            let plan = sweep::SweepPlan {
                encoding: encoding.into(),
                rounds,
                noise: sweep::linspace(noise_min, noise_max, points),
                target,
                shots,
                apply_correction: !no_correction,
                seed,
            };
            sweep::run_sweep(&plan, output.as_deref())?;
        }
        Commands::Gen {
            encoding,
            rounds,
            noise,
            stim,
            b8,
            shots,
            seed,
        } => {
            generator::generate(
                encoding.into(),
                rounds,
                &noise.to_config(),
                &stim,
                (shots > 0).then_some(b8.as_str()),
                shots,
                seed,
            )?;
        }
        Commands::Decode {
            input,
            rounds,
            encoding,
            offset,
            mode,
            no_correction,
        } => {
            let encoding: Encoding = encoding.into();
            let config = tess_core::experiment::ExperimentConfig {
                rounds,
                measurement_offset: offset.unwrap_or(encoding.measurement_offset()),
                mode: mode.map_or(encoding.check_mode(), CheckMode::from),
                apply_correction: !no_correction,
            };
            decode::decode_file(&input, &config)?;
        }
    }
    Ok(())
}
