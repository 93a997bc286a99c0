//! Static configuration: per-channel DUC defaults, IIR coefficient tables,
//! and interpolation settings, loaded from TOML via a `Preset`/`load`/`save`
//! shape, applied here to hardware-register defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchedError;

/// One channel's static DUC/interpolator defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    /// 32-bit frequency tuning word.
    #[serde(default)]
    pub duc_ftw: u32,
    /// 16-bit phase offset.
    #[serde(default)]
    pub duc_phase_offset: u32,
    /// `SuperCic` rate for this channel's interpolator (1 disables the CIC).
    #[serde(default = "default_cic_rate")]
    pub cic_rate: u32,
}

fn default_cic_rate() -> u32 {
    1
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            duc_ftw: 0,
            duc_phase_offset: 0,
            cic_rate: default_cic_rate(),
        }
    }
}

/// One `(b0, b1, a1, offset)` IIR profile for one channel. `b0`/`b1`/`a1`
/// are already scaled by `2^shift_c`; `offset` is in the servo's output
/// domain, unscaled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IirProfile {
    pub b0: i64,
    pub b1: i64,
    pub a1: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Static pipeline configuration: the TOML file a host would load at
/// startup before accepting any link frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Human-readable name for this configuration.
    #[serde(default = "default_name")]
    pub name: String,

    /// Per-channel DUC/interpolator defaults, indexed by channel number.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,

    /// `iir_profiles[channel][profile]`.
    #[serde(default)]
    pub iir_profiles: Vec<Vec<IirProfile>>,

    /// `shift_c`: the IIR's coefficient fixed-point shift.
    #[serde(default = "default_shift_c")]
    pub iir_shift_c: u32,

    /// `y_max`: the IIR's positive saturation ceiling.
    #[serde(default = "default_y_max")]
    pub iir_y_max: i64,
}

fn default_name() -> String {
    "Untitled".to_string()
}

fn default_shift_c() -> u32 {
    16
}

fn default_y_max() -> i64 {
    (1i64 << 15) - 1
}

impl Config {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Vec::new(),
            iir_profiles: Vec::new(),
            iir_shift_c: default_shift_c(),
            iir_y_max: default_y_max(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchedError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| SchedError::read_file(path, e))?;
        Ok(toml::from_str(&content)?)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, SchedError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SchedError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| SchedError::write_file(path, e))?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| SchedError::write_file(path, e))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, SchedError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(default_name())
    }
}
