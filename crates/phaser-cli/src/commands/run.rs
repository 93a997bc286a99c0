//! Replay a frame file through a [`phaser_sched::Pipeline`] and report each
//! tick's DAC output.

use std::path::PathBuf;

use clap::Args;
use phaser_dsp::InterpolationMode;
use phaser_sched::{Config, Pipeline};

use super::common::read_frames;

/// Simulate the datapath over a frame stream.
#[derive(Args)]
pub struct RunArgs {
    /// Optional static configuration to apply before the first frame.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Frame file produced by `phaser frame`, replayed one frame per tick.
    #[arg(short, long)]
    pub frames: Option<PathBuf>,

    /// Number of ticks to run once the frame file is exhausted.
    #[arg(short, long, default_value_t = 16)]
    pub ticks: u64,

    /// Number of DUC/servo channels.
    #[arg(long, default_value_t = 2)]
    pub channels: usize,

    /// IIR profiles per channel.
    #[arg(long, default_value_t = 1)]
    pub profiles: usize,

    /// Samples per frame body.
    #[arg(long, default_value_t = 1)]
    pub n_mux: usize,

    /// Clock cycles between sample-mux outputs.
    #[arg(long, default_value_t = 4)]
    pub cycles_per_sample: u32,

    /// Sample lane width, in bits.
    #[arg(long, default_value_t = 14)]
    pub w_s: u32,

    /// FFT coefficient width, in bits.
    #[arg(long, default_value_t = 18)]
    pub coef_width: u32,

    /// Coefficients carried per FFT-load frame.
    #[arg(long, default_value_t = 4)]
    pub coef_per_frame: usize,

    /// Number of STFT pulse-generator branches.
    #[arg(long, default_value_t = 1)]
    pub stft_branches: usize,

    /// STFT branch memory length (must be a power of two).
    #[arg(long, default_value_t = 64)]
    pub stft_mem_len: usize,

    /// Maximum configured SuperCic interpolation rate.
    #[arg(long, default_value_t = 1)]
    pub max_cic_rate: u32,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut pipeline = Pipeline::with_profiles(
        args.channels,
        args.profiles.max(1),
        args.n_mux,
        args.cycles_per_sample,
        args.w_s,
        args.coef_width,
        args.coef_per_frame,
        args.stft_branches,
        args.stft_mem_len,
        InterpolationMode::Bypass,
        args.max_cic_rate,
    );

    if let Some(path) = &args.config {
        let config = Config::load(path)?;
        pipeline.configure(&config)?;
    }

    let frames = match &args.frames {
        Some(path) => read_frames(path)?,
        None => Vec::new(),
    };

    println!("tick,register_read,sample_mark,dac");
    let total_ticks = args.ticks.max(frames.len() as u64);
    for tick in 0..total_ticks {
        let incoming = frames.get(tick as usize);
        let result = pipeline.step(incoming)?;

        let dac: Vec<String> = result
            .dac
            .iter()
            .map(|c| format!("({},{})", c.i, c.q))
            .collect();
        println!(
            "{tick},{},{},{}",
            result
                .register_read
                .map_or_else(String::new, |v| v.to_string()),
            result.sample_mark,
            dac.join(";")
        );
    }

    Ok(())
}
