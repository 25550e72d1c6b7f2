//! TOML configuration file support.
//!
//! Every reader and writer option can be set in a config file instead of on the
//! command line:
//!
//! ```toml
//! # spectralio.toml
//! [foss_reader]
//! id_field = "Field1"
//! max = 100
//!
//! [foss_writer]
//! segment_widths = [700]
//! start_points = [1100.0]
//! increments = [2.0]
//! end_points = [2498.0]
//! constituents = ["Protein", "Moisture"]
//!
//! [opus]
//! add_command_lines = true
//!
//! [opus_legacy]
//! sample_id = "NAM"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use spectralio::formats::{
    FormatOptions, FossReaderConfig, FossWriterConfig, OpusLegacyReaderConfig, OpusReaderConfig,
};

/// Root configuration structure for spectralio.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// FOSS `.nir`/`.cal` reader settings.
    pub foss_reader: FossReaderConfig,

    /// FOSS `.nir`/`.cal` writer settings.
    pub foss_writer: FossWriterConfig,

    /// OPUS block-table reader settings.
    pub opus: OpusReaderConfig,

    /// Legacy OPUS reader settings.
    pub opus_legacy: OpusLegacyReaderConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load the file if one was given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Options handed to the format registry.
    pub fn into_options(self) -> FormatOptions {
        FormatOptions {
            foss_reader: self.foss_reader,
            foss_writer: self.foss_writer,
            opus: self.opus,
            opus_legacy: self.opus_legacy,
        }
    }
}
