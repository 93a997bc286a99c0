//! Build link frames (register access, sample bodies, FFT coefficient
//! loads) and append them to a frame file for [`super::run`] to replay.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use phaser_dsp::Complex;
use phaser_link::Frame;

use super::common::append_frame;

#[derive(Args)]
pub struct FrameArgs {
    /// Frame file to append to (created if it doesn't exist).
    #[arg(short, long)]
    pub out: PathBuf,

    #[command(subcommand)]
    command: FrameCommand,
}

#[derive(Subcommand)]
enum FrameCommand {
    /// Append a register write frame.
    RegisterWrite {
        /// Byte address, 0-127.
        addr: u8,
        /// Byte value to write.
        data: u8,
    },

    /// Append a register read frame.
    RegisterRead {
        /// Byte address, 0-127.
        addr: u8,
    },

    /// Append one sample-mux body frame.
    Sample {
        /// One `i,q` pair per channel, e.g. `100,-200 300,0`.
        #[arg(value_parser = parse_complex, required = true)]
        samples: Vec<(i64, i64)>,

        /// Bits per I/Q lane.
        #[arg(long, default_value_t = 14)]
        w_s: u32,
    },

    /// Append an FFT coefficient-load frame.
    FftLoad {
        /// Base address the coefficients start at.
        base_addr: u16,

        /// Comma-separated coefficient values.
        #[arg(value_delimiter = ',', required = true)]
        coeffs: Vec<i64>,

        /// Bits per coefficient.
        #[arg(long, default_value_t = 18)]
        coef_width: u32,

        /// Which STFT branch this load targets.
        #[arg(long, default_value_t = 0)]
        fft_id: u8,
    },
}

fn parse_complex(s: &str) -> Result<(i64, i64), String> {
    let (i, q) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'i,q', got '{s}'"))?;
    let i = i.trim().parse().map_err(|e| format!("bad I component '{i}': {e}"))?;
    let q = q.trim().parse().map_err(|e| format!("bad Q component '{q}': {e}"))?;
    Ok((i, q))
}

pub fn run(args: FrameArgs) -> anyhow::Result<()> {
    let frame = match args.command {
        FrameCommand::RegisterWrite { addr, data } => Frame::register_write(addr, data),
        FrameCommand::RegisterRead { addr } => Frame::register_read(addr),
        FrameCommand::Sample { samples, w_s } => {
            let group: Vec<Complex> = samples.into_iter().map(|(i, q)| Complex::new(i, q)).collect();
            Frame::pack_sample_mux_body(&[group], w_s)
        }
        FrameCommand::FftLoad { base_addr, coeffs, coef_width, fft_id } => {
            Frame::pack_fft_load(base_addr, &coeffs, coef_width, fft_id)
        }
    };

    append_frame(&args.out, &frame)?;
    println!("Appended {:?} frame to {}", frame.header.kind, args.out.display());
    Ok(())
}
