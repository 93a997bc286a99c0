//! Errors surfaced by the scheduler: configuration/preset I/O and whatever
//! the link layer rejects while the pipeline is running.

use std::path::PathBuf;

use thiserror::Error;

/// Errors the top-level scheduler can report.
#[derive(Debug, Error)]
pub enum SchedError {
    /// Failed to read a config/preset file.
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a config/preset file.
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a config/preset file's TOML.
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize a config/preset to TOML.
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A config file named a channel index the pipeline wasn't built with.
    #[error("config names channel {0}, pipeline only has {1}")]
    UnknownChannel(usize, usize),

    /// A config file named an IIR profile index out of range.
    #[error("config names profile {0}, servo only has {1}")]
    UnknownProfile(usize, usize),

    /// A frame was rejected by the link layer.
    #[error(transparent)]
    Link(#[from] phaser_link::LinkError),
}

impl SchedError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SchedError::ReadFile { path: path.into(), source }
    }

    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SchedError::WriteFile { path: path.into(), source }
    }
}
