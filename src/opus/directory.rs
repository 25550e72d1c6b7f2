use log::{debug, error, info};

use super::block::{Block, BlockDefinition};
use super::command_line::CommandLineData;
use super::constants::{
    BLOCK_DEFINITION_LENGTH, BLOCK_NAME_DPF, BLOCK_NAME_HFL, BLOCK_OFFSET, BLOCK_TYPE_DUMMY,
    BLOCK_TYPE_INCREMENT_DATA_TO_DPF, BLOCK_TYPE_TEXT, CSF, FIELD_VALUE_OFFSET, FXV,
    HEADER_LENGTH, INS, KEYWORD_CMDLINE, LXV, NPT,
};
use crate::serialisation::{IntSerialiser, SerialisationError, Serialiser};

/// Read the block directory from the file header.
///
/// Entries are read every 12 bytes from offset 36 until one has a zero length or the
/// header bound is reached.
pub fn read_definitions(buffer: &[u8]) -> Result<Vec<BlockDefinition>, SerialisationError> {
    let mut definitions = Vec::new();
    let mut offset = BLOCK_OFFSET;

    while offset < HEADER_LENGTH {
        let mut cursor = buffer.get(offset..).unwrap_or_default();
        let mut next = || -> Result<u32, SerialisationError> {
            // U32 never yields a value outside u32
            Ok(IntSerialiser::U32.deserialise(&mut cursor)? as u32)
        };

        let block_type = next()?;
        let length_blocks = next()?;
        let block_offset = next()?;
        if length_blocks == 0 {
            break;
        }

        definitions.push(BlockDefinition {
            block_type,
            length_blocks,
            offset: block_offset,
        });
        offset += BLOCK_DEFINITION_LENGTH;
    }

    Ok(definitions)
}

/// Materialise a [`Block`] for every non-dummy definition
pub fn read_blocks<'a>(buffer: &'a [u8], definitions: &[BlockDefinition]) -> Vec<Block<'a>> {
    definitions
        .iter()
        .enumerate()
        .filter(|(_, definition)| definition.block_type != BLOCK_TYPE_DUMMY)
        .map(|(index, definition)| {
            let start = definition.offset as usize;
            let end = (start as u64 + definition.length_bytes()).saturating_sub(1);
            Block::new(
                buffer,
                index,
                start,
                usize::try_from(end).unwrap_or(usize::MAX),
                definition.block_type,
            )
        })
        .collect()
}

/// A DPF block and the data block it describes
#[derive(Debug, Clone)]
pub struct SpectralPair<'a> {
    /// Data-parameter block
    pub dpf: Block<'a>,
    /// Amplitude block
    pub data: Block<'a>,
}

/// DPF blocks and data blocks could not be paired one-to-one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingMismatch {
    /// DPF entries collected, one per candidate data block
    pub dpf: usize,
    /// Candidate data blocks found
    pub data: usize,
}

/// Pair each DPF block with every data block whose type is 16 lower.
///
/// DPF blocks without a data block are dropped. A DPF block with several candidates
/// yields one pair per candidate, all sharing its scan parameters.
pub fn find_spectral_pairs<'a>(blocks: &[Block<'a>]) -> Result<Vec<SpectralPair<'a>>, PairingMismatch> {
    let mut dpf = Vec::new();
    let mut data = Vec::new();

    for candidate in blocks
        .iter()
        .filter(|b| b.name.as_deref() == Some(BLOCK_NAME_DPF))
    {
        let data_type = candidate
            .block_type
            .wrapping_sub(BLOCK_TYPE_INCREMENT_DATA_TO_DPF);
        for matched in blocks.iter().filter(|b| b.block_type == data_type) {
            dpf.push(candidate);
            data.push(matched);
        }
    }

    if dpf.len() != data.len() {
        error!(
            "Can't read data, due to differing number of DPF blocks and data blocks: {} != {}",
            dpf.len(),
            data.len()
        );
        for block in dpf.iter().chain(data.iter()) {
            info!("{}", block);
        }
        return Err(PairingMismatch {
            dpf: dpf.len(),
            data: data.len(),
        });
    }

    Ok(dpf
        .into_iter()
        .zip(data)
        .map(|(dpf, data)| SpectralPair {
            dpf: dpf.clone(),
            data: data.clone(),
        })
        .collect())
}

/// Scan parameters read from a DPF block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumParameters {
    /// Number of points
    pub num_points: u32,
    /// Wave number of the first point
    pub first_x: f64,
    /// Wave number of the last point
    pub last_x: f64,
    /// Amplitude scaling factor
    pub scale: f64,
}

impl SpectrumParameters {
    /// Read `NPT`, `FXV`, `LXV` and `CSF`; `None` if any is missing
    pub fn from_dpf(dpf: &Block<'_>) -> Option<Self> {
        Some(Self {
            num_points: dpf.get_from_id(NPT, FIELD_VALUE_OFFSET, Block::get_int)?,
            first_x: dpf.get_from_id(FXV, FIELD_VALUE_OFFSET, Block::get_double)?,
            last_x: dpf.get_from_id(LXV, FIELD_VALUE_OFFSET, Block::get_double)?,
            scale: dpf.get_from_id(CSF, FIELD_VALUE_OFFSET, Block::get_double)?,
        })
    }

    /// Spacing between consecutive wave numbers; zero for fewer than two points
    pub fn diff(&self) -> f64 {
        if self.num_points < 2 {
            return 0.0;
        }
        (self.last_x - self.first_x) / f64::from(self.num_points - 1)
    }

    /// `first_x + i * diff` for every point
    pub fn waves(&self) -> Vec<f64> {
        let diff = self.diff();
        (0..self.num_points)
            .map(|i| self.first_x + f64::from(i) * diff)
            .collect()
    }

    /// Scaled amplitudes from a data block; `None` if the block is short
    pub fn amplitudes(&self, data: &Block<'_>) -> Option<Vec<f64>> {
        (0..self.num_points as usize)
            .map(|i| {
                data.get_float(i * 4)
                    .map(|raw| f64::from(raw) * self.scale)
            })
            .collect()
    }
}

/// Instrument name from the last `HFL` block, if present and non-empty
pub fn instrument_name(blocks: &[Block<'_>]) -> Option<String> {
    blocks
        .iter()
        .rev()
        .find(|b| b.name.as_deref() == Some(BLOCK_NAME_HFL))
        .and_then(|hfl| hfl.get_from_id(INS, FIELD_VALUE_OFFSET, Block::get_text))
        .filter(|name| !name.is_empty())
}

/// Log entries from all text blocks: concatenated, split on nulls, trimmed, empties
/// removed
pub fn read_log(blocks: &[Block<'_>]) -> Vec<String> {
    let text: String = blocks
        .iter()
        .filter(|b| b.block_type == BLOCK_TYPE_TEXT)
        .map(|b| String::from_utf8_lossy(b.as_bytes()).trim().to_string())
        .collect();

    let log: Vec<String> = text
        .split('\0')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();

    debug!("{}", log.join("\n"));
    log
}

/// Parse every log entry containing the command-line keyword
pub fn read_command_lines(log: &[String]) -> Vec<CommandLineData> {
    log.iter()
        .filter(|entry| entry.contains(KEYWORD_CMDLINE))
        .map(|entry| {
            let command_line = CommandLineData::new(entry);
            debug!("{}", command_line);
            command_line
        })
        .collect()
}
