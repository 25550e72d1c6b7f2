//! Thermo `.spa` reader.
//!
//! Layout: a null-terminated title at byte 30, the number of directory entries at 294
//! and 16-byte directory entries from 304 (`u16` type, `u32` offset). Only three entry
//! types are used: comments, data description and data.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use log::{debug, info};

use super::{FormatError, SpectrumReader};
use crate::serialisation::{
    FloatSerialiser, IntSerialiser, NullTerminatedStringSerialiser, Serialiser, StringEncoding,
};
use crate::spectrum::{SampleValue, Spectrum};

const TITLE_OFFSET: usize = 30;
const NUM_BLOCKS_OFFSET: usize = 294;
const DIRECTORY_OFFSET: usize = 304;
const DIRECTORY_ENTRY_LENGTH: usize = 16;

const BLOCK_TYPE_COMMENTS: u16 = 0x001B;
const BLOCK_TYPE_DATA: u16 = 0x0003;
const BLOCK_TYPE_DATA_DESCRIPTION: u16 = 0x0002;

const DATE_FORMAT_COMMENT: &str = "%a %b %d %H:%M:%S %Y";
const DATE_FORMAT_INTERNAL: &str = "%Y-%m-%d %H:%M:%S";

const TEXT: NullTerminatedStringSerialiser = NullTerminatedStringSerialiser::new(StringEncoding::Ascii);

/// Reads Thermo `.spa` files
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaReader;

impl SpaReader {
    /// Create a reader
    pub fn new() -> Self {
        SpaReader
    }
}

fn u16_at(buffer: &[u8], offset: usize) -> Result<u16, FormatError> {
    let value = IntSerialiser::U16.deserialise_from_bytes(buffer.get(offset..).unwrap_or_default())?;
    Ok(value as u16)
}

fn u32_at(buffer: &[u8], offset: usize) -> Result<usize, FormatError> {
    let value = IntSerialiser::U32.deserialise_from_bytes(buffer.get(offset..).unwrap_or_default())?;
    usize::try_from(value).map_err(|_| FormatError::InvalidValue(format!("offset {}", value)))
}

fn f32_at(buffer: &[u8], offset: usize) -> Result<f64, FormatError> {
    Ok(FloatSerialiser::F32.deserialise_from_bytes(buffer.get(offset..).unwrap_or_default())?)
}

/// Normalise a comment timestamp such as `Tue Mar 02 10:11:12 2021 (GMT+01:00)`
fn format_time(text: &str) -> Option<String> {
    let parse = |text: &str| NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT_COMMENT).ok();

    let parsed = parse(text).or_else(|| {
        let zone_start = text.rfind(" (")?;
        text.trim_end().ends_with(')').then(|| parse(&text[..zone_start]))?
    })?;
    Some(parsed.format(DATE_FORMAT_INTERNAL).to_string())
}

/// Turn `\r\n`-separated comment lines into metadata.
///
/// Lines not starting with a tab open a section; tab-indented `key on <time>` and
/// `key: value` lines become `section - key` entries.
fn parse_comments(comments: &str) -> BTreeMap<String, SampleValue> {
    let mut metadata = BTreeMap::new();
    let mut section = "";

    for line in comments.split("\r\n") {
        if !line.starts_with('\t') {
            section = line;
            continue;
        }

        let line = line.trim();
        let (key, value) = if let Some((key, time)) = line.split_once(" on ") {
            match format_time(time) {
                Some(formatted) => (key, formatted),
                None => continue,
            }
        } else if let Some((key, value)) = line.split_once(':') {
            (key, value.trim().to_string())
        } else {
            continue;
        };

        let name = if section.is_empty() {
            key.trim().to_string()
        } else {
            format!("{} - {}", section, key.trim())
        };
        metadata.insert(name, SampleValue::Text(value));
    }

    metadata
}

impl SpectrumReader for SpaReader {
    fn read_bytes(&self, buffer: &[u8], filename: &str) -> Result<Vec<Spectrum>, FormatError> {
        let title = TEXT.read_at(buffer, TITLE_OFFSET)?;
        let num_blocks = u16_at(buffer, NUM_BLOCKS_OFFSET)?;
        info!("{}: # blocks: {}", filename, num_blocks);

        let mut offset_comments = None;
        let mut offset_data = None;
        let mut offset_data_description = None;

        for index in 0..usize::from(num_blocks) {
            let entry = DIRECTORY_OFFSET + index * DIRECTORY_ENTRY_LENGTH;
            let slot = match u16_at(buffer, entry)? {
                BLOCK_TYPE_COMMENTS => &mut offset_comments,
                BLOCK_TYPE_DATA => &mut offset_data,
                BLOCK_TYPE_DATA_DESCRIPTION => &mut offset_data_description,
                _ => continue,
            };
            *slot = Some(u32_at(buffer, entry + 2)?);
        }

        let missing = |what: &str| FormatError::MissingData(format!("offset for {}", what));
        let offset_comments = offset_comments.ok_or_else(|| missing("comments"))?;
        let offset_data = offset_data.ok_or_else(|| missing("data"))?;
        let offset_data_description =
            offset_data_description.ok_or_else(|| missing("data description"))?;
        info!(
            "offsets: comments={}, data={}, data description={}",
            offset_comments, offset_data, offset_data_description
        );

        let comments = TEXT.read_at(buffer, offset_comments)?;
        debug!("Comments:\n{}", comments.replace("\r\n", "\n"));
        let sample_data = parse_comments(&comments);

        let num_points = u32_at(buffer, offset_data_description + 4)?;
        let max_wave = f32_at(buffer, offset_data_description + 16)?;
        let min_wave = f32_at(buffer, offset_data_description + 20)?;
        info!("# points: {}, wave numbers: {} - {}", num_points, min_wave, max_wave);

        let capacity = num_points.min(buffer.len() / 4);
        let mut waves = Vec::with_capacity(capacity);
        let mut amplitudes = Vec::with_capacity(capacity);
        for i in 0..num_points {
            let amplitude = f32_at(buffer, offset_data + i * 4)?;
            if amplitude.is_nan() {
                continue;
            }
            waves.push(max_wave - (max_wave - min_wave) * i as f64 / num_points as f64);
            amplitudes.push(amplitude);
        }

        Ok(vec![Spectrum::new(title, waves, amplitudes, sample_data)?])
    }
}
