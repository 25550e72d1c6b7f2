//! Bruker OPUS reader for files whose directory is located by pattern scanning.
//!
//! Instead of walking the block directory, the AB (absorbance) and text entries are
//! found by matching their type bytes every 12 bytes from offset `0x24`. The scan
//! parameters are the last `NPT`/`FXV`/`LXV` tags preceding the AB data. Every offset
//! located along the way is kept in a trace, `-1` marking a failed lookup.

use std::collections::BTreeMap;

use log::{error, info};
use serde::Deserialize;

use super::{FormatError, SpectrumReader};
use crate::opus::constants::{BLOCK_OFFSET, FIELD_VALUE_OFFSET, FXV, KEY_SAMPLE_ID_2, LXV, NPT};
use crate::opus::{find_forward, find_reverse, find_with_wildcard};
use crate::serialisation::{FloatSerialiser, IntSerialiser, Serialiser};
use crate::spectrum::{SampleValue, Spectrum};

/// Prefix of trace entries added to the sample data
pub const PREFIX_TRACE: &str = "Trace.";

/// Sample ID used when the text block carries none
pub const MISSING_SAMPLE_ID: &str = "ERR";

/// Directory entry type bytes of the AB block
const AB_PATTERN: [u8; 4] = [0x0F, 0x10, 0x00, 0xFF];

/// Directory entry type bytes of the text block
const TEXT_PATTERN: [u8; 4] = [0xFF, 0xFF, 0x68, 0x40];

/// Stride between directory entries
const ENTRY_STEP: usize = 12;

/// Backward searches stop before reaching this offset
const REVERSE_FLOOR: usize = 4;

/// Options of [`OpusLegacyReader`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OpusLegacyReaderConfig {
    /// Text-block key holding the sample ID
    pub sample_id: String,
    /// Add the located offsets to the sample data under `Trace.`
    pub add_trace_to_report: bool,
}

impl Default for OpusLegacyReaderConfig {
    fn default() -> Self {
        Self {
            sample_id: KEY_SAMPLE_ID_2.to_string(),
            add_trace_to_report: false,
        }
    }
}

/// Reads single-spectrum OPUS files by pattern scanning
#[derive(Debug, Clone, Default)]
pub struct OpusLegacyReader {
    config: OpusLegacyReaderConfig,
}

/// Offsets located in one file image
struct Scan<'a> {
    buffer: &'a [u8],
    trace: BTreeMap<&'static str, i64>,
}

impl<'a> Scan<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            trace: BTreeMap::new(),
        }
    }

    fn record(&mut self, key: &'static str, value: Option<usize>) -> Option<usize> {
        self.trace
            .insert(key, value.map_or(-1, |v| i64::try_from(v).unwrap_or(i64::MAX)));
        value
    }

    fn int_at(&self, offset: usize) -> Option<usize> {
        let value = IntSerialiser::U32
            .deserialise_from_bytes(self.buffer.get(offset..)?)
            .ok()?;
        usize::try_from(value).ok()
    }

    fn directory_entry(&mut self, key: &'static str, pattern: &[u8]) -> Option<usize> {
        let position =
            find_with_wildcard(self.buffer, pattern, BLOCK_OFFSET, ENTRY_STEP).map(|p| p + 4);
        self.record(key, position)
    }

    fn ab_data_offset(&mut self) -> Option<usize> {
        let entry = self.directory_entry("ab_offset", &AB_PATTERN);
        let offset = entry.and_then(|entry| self.int_at(entry + 4));
        self.record("ab_data_offset", offset)
    }

    /// Offset and length in bytes of the text block
    fn text_block(&mut self) -> Option<(usize, usize)> {
        let entry = self.directory_entry("text_offset", &TEXT_PATTERN);
        let offset = entry.and_then(|entry| self.int_at(entry + 4));
        let size = entry.and_then(|entry| self.int_at(entry));
        self.record("text_block_offset", offset);
        self.record("text_block_size", size);
        Some((offset?, size? * 4))
    }

    fn tag_before(&mut self, key: &'static str, tag: &[u8], from: usize) -> Option<usize> {
        let position = find_reverse(self.buffer, tag, from, REVERSE_FLOOR);
        self.record(key, position)
    }

    fn double_at(&self, offset: usize) -> Option<f64> {
        FloatSerialiser::F64
            .deserialise_from_bytes(self.buffer.get(offset..)?)
            .ok()
    }

    fn float_at(&self, offset: usize) -> Option<f64> {
        FloatSerialiser::F32
            .deserialise_from_bytes(self.buffer.get(offset..)?)
            .ok()
    }

    fn text(&self, offset: usize, length: usize) -> &'a [u8] {
        let end = offset.saturating_add(length).min(self.buffer.len());
        self.buffer.get(offset..end).unwrap_or_default()
    }
}

/// Value of `KEY='value'` in the text block
fn value_for(text: &[u8], key: &str) -> Option<String> {
    let needle = format!("{}='", key);
    let start = find_forward(text, needle.as_bytes(), 0, text.len().saturating_sub(1))?;
    let value_start = start + needle.len();
    let value_end = text[value_start..].iter().position(|&b| b == b'\'')? + value_start;
    Some(String::from_utf8_lossy(&text[value_start..value_end]).into_owned())
}

/// Split on commas outside single quotes, keeping the quotes
fn split_keeping_quotes(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in s.chars() {
        match c {
            '\'' => {
                quoted = !quoted;
                current.push(c);
            }
            ',' if !quoted => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// `{key='text', key=number}` pairs from the text block; anything else is skipped
fn metadata(text: &[u8]) -> BTreeMap<String, SampleValue> {
    let text = String::from_utf8_lossy(text);
    let (Some(open), Some(close)) = (text.find('{'), text.find('}')) else {
        return BTreeMap::new();
    };
    let body = text.get(open + 1..close).unwrap_or_default();

    split_keeping_quotes(body)
        .into_iter()
        .filter_map(|part| {
            let mut pieces = part.split('=');
            let (key, value) = (pieces.next()?, pieces.next()?);
            if pieces.next().is_some() {
                return None;
            }

            let value = match value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
                Some(quoted) => SampleValue::Text(quoted.to_string()),
                None => SampleValue::Number(value.trim().parse().ok()?),
            };
            Some((key.to_string(), value))
        })
        .collect()
}

impl OpusLegacyReader {
    /// Create a reader
    pub fn new(config: OpusLegacyReaderConfig) -> Self {
        Self { config }
    }

    fn read_spectrum(&self, scan: &mut Scan<'_>) -> Result<Spectrum, FormatError> {
        let data_offset = scan
            .ab_data_offset()
            .ok_or_else(|| FormatError::MissingData("AB data offset".to_string()))?;
        info!("data_start={}", data_offset);

        let fxv = scan.tag_before("fxv_offset", FXV, data_offset);
        let lxv = scan.tag_before("lxv_offset", LXV, data_offset);
        let npt = scan.tag_before("npt_offset", NPT, data_offset);

        let count = npt.and_then(|npt| scan.int_at(npt + FIELD_VALUE_OFFSET));
        scan.record("ab_count", count);
        let count =
            count.ok_or_else(|| FormatError::MissingData("number of data points (NPT)".to_string()))?;
        info!("points={}", count);

        let first_x = fxv
            .and_then(|fxv| scan.double_at(fxv + FIELD_VALUE_OFFSET))
            .ok_or_else(|| FormatError::MissingData("first data point (FXV)".to_string()))?;
        let last_x = lxv
            .and_then(|lxv| scan.double_at(lxv + FIELD_VALUE_OFFSET))
            .ok_or_else(|| FormatError::MissingData("last data point (LXV)".to_string()))?;

        let diff = if count < 2 {
            0.0
        } else {
            (last_x - first_x) / (count - 1) as f64
        };
        let amplitudes = (0..count)
            .map(|i| scan.float_at(data_offset + i * 4))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                FormatError::MissingData(format!("{} data points at {}", count, data_offset))
            })?;
        let waves = (0..count).map(|i| first_x + i as f64 * diff).collect();

        let (text, sample_data) = match scan.text_block() {
            Some((offset, length)) => {
                let text = scan.text(offset, length);
                (text, metadata(text))
            }
            None => (&[][..], BTreeMap::new()),
        };

        let id = match value_for(text, &self.config.sample_id) {
            Some(id) => {
                info!("{}='{}'", self.config.sample_id, id);
                id
            }
            None => {
                info!("{}=null", self.config.sample_id);
                MISSING_SAMPLE_ID.to_string()
            }
        };

        let mut spectrum = Spectrum::new(id, waves, amplitudes, sample_data)?;
        for (key, value) in &scan.trace {
            info!("{}={}", key, value);
            if self.config.add_trace_to_report {
                spectrum.set(format!("{}{}", PREFIX_TRACE, key), *value as f64);
            }
        }
        Ok(spectrum)
    }
}

impl SpectrumReader for OpusLegacyReader {
    fn read_bytes(&self, buffer: &[u8], filename: &str) -> Result<Vec<Spectrum>, FormatError> {
        let mut scan = Scan::new(buffer);
        match self.read_spectrum(&mut scan) {
            Ok(spectrum) => Ok(vec![spectrum]),
            Err(e) => {
                error!("Failed to read '{}': {}", filename, e);
                Ok(Vec::new())
            }
        }
    }
}
