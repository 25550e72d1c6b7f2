//! Bruker OPUS reader driven by the block directory.

use std::collections::BTreeMap;

use log::{info, warn};
use serde::Deserialize;

use super::{FormatError, SpectrumReader};
use crate::opus::constants::{BLOCK_TYPE_MAIN_MASK, KEY_SAMPLE_ID_2, OPERATION_MEASURE_SAMPLE};
use crate::opus::{
    find_spectral_pairs, instrument_name, read_blocks, read_command_lines, read_definitions,
    read_log, to_hex_string, CommandLineData, SpectralPair, SpectrumParameters,
};
use crate::spectrum::{SampleValue, Spectrum, DEFAULT_SAMPLE_ID};

/// First wave number
pub const FIELD_FIRST_X: &str = "Opus.FirstX";
/// Last wave number
pub const FIELD_LAST_X: &str = "Opus.LastX";
/// Number of points
pub const FIELD_NUM_POINTS: &str = "Opus.NumPoints";
/// Wave number spacing
pub const FIELD_DIFF: &str = "Opus.Diff";
/// Amplitude scaling factor
pub const FIELD_SCALE: &str = "Opus.Scale";
/// Full data block type, hex
pub const FIELD_BLOCK_TYPE_DPF: &str = "Opus.BlockType.DPF";
/// Masked data block type, hex
pub const FIELD_BLOCK_TYPE_HEX: &str = "Opus.BlockType.Hex";
/// Whole log, newline separated
pub const FIELD_LOG: &str = "Opus.Log";
/// Instrument name from the HFL block
pub const FIELD_INSTRUMENT: &str = "Instrument";

const PREFIX_OPUS: &str = "Opus.";

/// Options of [`OpusReader`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OpusReaderConfig {
    /// Masked block type of the spectra to load, in hex (e.g. `100f`)
    pub spectrum_block_type: String,
    /// Command-line operation holding the sample ID
    pub operation: String,
    /// Command-line key holding the sample ID
    pub key: String,
    /// Load every spectrum regardless of block type
    pub all_spectra: bool,
    /// Add the values of other command lines to the sample data
    pub add_command_lines: bool,
    /// Add the whole log to the sample data
    pub add_log: bool,
    /// Fail instead of returning no spectra when DPF and data blocks do not pair up
    pub strict: bool,
}

impl Default for OpusReaderConfig {
    fn default() -> Self {
        Self {
            spectrum_block_type: to_hex_string(BLOCK_TYPE_MAIN_MASK),
            operation: OPERATION_MEASURE_SAMPLE.to_string(),
            key: KEY_SAMPLE_ID_2.to_string(),
            all_spectra: false,
            add_command_lines: false,
            add_log: false,
            strict: false,
        }
    }
}

/// Reads OPUS files through their block directory
#[derive(Debug, Clone, Default)]
pub struct OpusReader {
    config: OpusReaderConfig,
}

impl OpusReader {
    /// Create a reader
    pub fn new(config: OpusReaderConfig) -> Self {
        Self { config }
    }

    fn wanted(&self, pair: &SpectralPair<'_>) -> bool {
        self.config.all_spectra
            || self
                .config
                .spectrum_block_type
                .eq_ignore_ascii_case(&to_hex_string(pair.data.masked_type()))
    }

    fn spectrum(
        &self,
        pair: &SpectralPair<'_>,
        instrument: Option<&str>,
    ) -> Result<Option<Spectrum>, FormatError> {
        let Some(parameters) = SpectrumParameters::from_dpf(&pair.dpf) else {
            warn!("DPF block lacks NPT/FXV/LXV/CSF, skipping: {}", pair.dpf);
            return Ok(None);
        };
        let Some(amplitudes) = parameters.amplitudes(&pair.data) else {
            warn!(
                "Data block holds fewer than {} points, skipping: {}",
                parameters.num_points, pair.data
            );
            return Ok(None);
        };

        info!(
            "firstX={}, lastX={}, numPoints={}, diff={}, scale={}",
            parameters.first_x,
            parameters.last_x,
            parameters.num_points,
            parameters.diff(),
            parameters.scale
        );

        let mut sample_data: BTreeMap<String, SampleValue> = BTreeMap::new();
        sample_data.insert(FIELD_FIRST_X.to_string(), parameters.first_x.into());
        sample_data.insert(FIELD_LAST_X.to_string(), parameters.last_x.into());
        sample_data.insert(
            FIELD_NUM_POINTS.to_string(),
            f64::from(parameters.num_points).into(),
        );
        sample_data.insert(FIELD_DIFF.to_string(), parameters.diff().into());
        sample_data.insert(FIELD_SCALE.to_string(), parameters.scale.into());
        sample_data.insert(
            FIELD_BLOCK_TYPE_DPF.to_string(),
            to_hex_string(pair.data.block_type).into(),
        );
        sample_data.insert(
            FIELD_BLOCK_TYPE_HEX.to_string(),
            to_hex_string(pair.data.masked_type()).into(),
        );
        if let Some(instrument) = instrument {
            sample_data.insert(FIELD_INSTRUMENT.to_string(), instrument.into());
        }

        let spectrum = Spectrum::new(DEFAULT_SAMPLE_ID, parameters.waves(), amplitudes, sample_data)?;
        Ok(Some(spectrum))
    }

    /// Apply the sample ID and command-line values to a spectrum
    fn annotate(&self, spectrum: &mut Spectrum, command_lines: &[CommandLineData], log: &[String]) {
        let mut id_assigned = false;

        for (index, command_line) in command_lines.iter().enumerate() {
            let is_operation = command_line.operation == self.config.operation;

            if is_operation && !id_assigned {
                if let Some(id) = command_line.get(&self.config.key) {
                    spectrum.id = id.to_string();
                    id_assigned = true;
                }
            }

            if is_operation || self.config.add_command_lines {
                let position = if is_operation {
                    String::new()
                } else {
                    format!("{}.", index + 1)
                };
                for (key, value) in &command_line.values {
                    spectrum.set(
                        format!(
                            "{}{}{}.{}.{}",
                            PREFIX_OPUS, position, command_line.operation, command_line.cmd_type, key
                        ),
                        SampleValue::from_text_or_number(value),
                    );
                }
            }
        }

        if self.config.add_log {
            spectrum.set(FIELD_LOG, log.join("\n"));
        }
    }
}

impl SpectrumReader for OpusReader {
    fn read_bytes(&self, buffer: &[u8], filename: &str) -> Result<Vec<Spectrum>, FormatError> {
        let definitions = read_definitions(buffer)?;
        for (index, definition) in definitions.iter().enumerate() {
            info!("{}: definition #{}: {}", filename, index, definition);
        }

        let blocks = read_blocks(buffer, &definitions);
        for (index, block) in blocks.iter().enumerate() {
            info!("{}: block #{}: {}", filename, index, block);
        }

        let pairs = match find_spectral_pairs(&blocks) {
            Ok(pairs) => pairs,
            Err(mismatch) if self.config.strict => {
                return Err(FormatError::BlockCountMismatch {
                    dpf: mismatch.dpf,
                    data: mismatch.data,
                })
            }
            Err(_) => return Ok(Vec::new()),
        };

        let instrument = instrument_name(&blocks);
        let mut spectra = Vec::new();
        for pair in pairs.iter().filter(|pair| self.wanted(pair)) {
            if let Some(spectrum) = self.spectrum(pair, instrument.as_deref())? {
                spectra.push(spectrum);
            }
        }

        let log = read_log(&blocks);
        let command_lines = read_command_lines(&log);
        for spectrum in &mut spectra {
            self.annotate(spectrum, &command_lines, &log);
        }

        Ok(spectra)
    }
}
