//! Shared CLI helpers used across multiple commands.
//!
//! Frames are persisted between CLI invocations as a simple length-prefixed
//! stream: `{header_word: u32 LE, body_len: u16 LE, body: [u8; body_len]}`
//! repeated. This framing is a host-tooling convenience only — it has no
//! bearing on the link's own wire format, which `phaser-link` models
//! starting from an already byte-aligned, per-frame buffer.

use std::fs::OpenOptions;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use phaser_link::Frame;

/// Append one frame to `path`, creating it if necessary.
pub fn append_frame(path: &Path, frame: &Frame) -> anyhow::Result<()> {
    let mut out = BufWriter::new(OpenOptions::new().create(true).append(true).open(path)?);
    write_frame(&mut out, frame)
}

/// Overwrite `path` with exactly `frames`, in order.
pub fn write_frames(path: &Path, frames: &[Frame]) -> anyhow::Result<()> {
    let mut out = BufWriter::new(std::fs::File::create(path)?);
    for frame in frames {
        write_frame(&mut out, frame)?;
    }
    Ok(())
}

fn write_frame(out: &mut impl Write, frame: &Frame) -> anyhow::Result<()> {
    let body_len: u16 = frame
        .body
        .len()
        .try_into()
        .map_err(|_| anyhow::anyhow!("frame body too long to encode ({} bytes)", frame.body.len()))?;
    out.write_all(&frame.header.to_word().to_le_bytes())?;
    out.write_all(&body_len.to_le_bytes())?;
    out.write_all(&frame.body)?;
    Ok(())
}

/// Read every frame out of a file written by [`append_frame`]/[`write_frames`].
pub fn read_frames(path: &Path) -> anyhow::Result<Vec<Frame>> {
    let mut bytes = Vec::new();
    std::fs::File::open(path)?.read_to_end(&mut bytes)?;

    let mut frames = Vec::new();
    let mut pos = 0usize;
    while pos < bytes.len() {
        if pos + 6 > bytes.len() {
            anyhow::bail!("{}: truncated frame header at byte {pos}", path.display());
        }
        let header_word = u32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap());
        let body_len = u16::from_le_bytes(bytes[pos + 4..pos + 6].try_into().unwrap()) as usize;
        pos += 6;
        if pos + body_len > bytes.len() {
            anyhow::bail!("{}: truncated frame body at byte {pos}", path.display());
        }
        let body = bytes[pos..pos + body_len].to_vec();
        pos += body_len;
        frames.push(Frame::parse(header_word, body)?);
    }
    Ok(frames)
}
