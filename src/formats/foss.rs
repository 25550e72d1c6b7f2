//! FOSS `.nir` / `.cal` adapter.
//!
//! The reader handles both variants the same way: `.cal` files simply carry constituent
//! values that end up in the spectrum's sample data. The writer builds every header
//! from [`FossWriterConfig`].

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, error, warn};
use serde::Deserialize;

use super::{FormatError, SpectrumReader, SpectrumWriter};
use crate::foss::{
    ConstituentValues, DataBlock, FossFile, FossFileSerialiser, FossSample, GeneralHeader,
    InstrumentHeader, InstrumentType, SampleHeader, SampleInfo, CAL_FILE_TYPE, MAX_CONSTITUENTS,
    MAX_SEGMENTS, NIR_FILE_TYPE, SPACING_EQUAL, WAVE_GROUP_SIZE,
};
use crate::serialisation::Serialiser;
use crate::spectrum::{SampleValue, Spectrum};

/// Metadata key holding the sample type
pub const SAMPLE_TYPE_KEY: &str = "sample_type";

/// Options of [`FossReader`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FossReaderConfig {
    /// Where the sample type comes from: `Code`, `Field1`, `Field2`, `Field3`, `ID`, or a
    /// literal sample type
    pub type_field: String,
    /// Where the sample ID comes from: `ID`, `Field1`, `Field2`, `Field3`, or a prefix
    /// combined with the file name and live sample number
    pub id_field: String,
    /// First live spectrum to load, 1-based
    pub start: usize,
    /// Maximum number of spectra to load
    pub max: Option<usize>,
}

impl Default for FossReaderConfig {
    fn default() -> Self {
        Self {
            type_field: "Code".to_string(),
            id_field: "ID".to_string(),
            start: 1,
            max: None,
        }
    }
}

/// Reads FOSS `.nir` and `.cal` files
#[derive(Debug, Clone, Default)]
pub struct FossReader {
    config: FossReaderConfig,
}

impl FossReader {
    /// Create a reader
    pub fn new(config: FossReaderConfig) -> Self {
        Self { config }
    }

    fn sample_id(&self, header: &SampleHeader, filename: &str, num_deleted: usize) -> String {
        match self.config.id_field.to_ascii_lowercase().as_str() {
            "id" => header.sample_no.clone(),
            "field1" => header.sample_id_1.clone(),
            "field2" => header.sample_id_2.clone(),
            "field3" => header.sample_id_3.clone(),
            _ => format!(
                "{}{}{}",
                self.config.id_field,
                filename,
                i64::from(header.sequence) - num_deleted as i64
            ),
        }
    }

    fn sample_type(&self, header: &SampleHeader) -> String {
        match self.config.type_field.to_ascii_lowercase().as_str() {
            "code" => header.product_code.to_string(),
            "field1" => header.sample_id_1.clone(),
            "field2" => header.sample_id_2.clone(),
            "field3" => header.sample_id_3.clone(),
            "id" => header.sample_no.clone(),
            _ => self.config.type_field.clone(),
        }
    }
}

/// Wave numbers described by the instrument header's segments
fn wave_numbers(header: &InstrumentHeader) -> Vec<f64> {
    let num_seg = usize::from(header.num_seg).min(MAX_SEGMENTS);
    let segments = &header.points_per_segment[..num_seg];
    let total_points: usize = segments.iter().map(|&points| usize::from(points)).sum();

    if header.spacing_mode != SPACING_EQUAL {
        warn!("Can't process spacing mode {}", header.spacing_mode);
        return (0..total_points).map(|i| i as f64).collect();
    }

    let mut waves = Vec::with_capacity(total_points);
    for (segment, &points) in segments.iter().enumerate() {
        let start = header.starts().get(segment).copied().unwrap_or_default();
        let increment = header.increments().get(segment).copied().unwrap_or_default();
        for j in 0..points {
            waves.push(f64::from(start) + f64::from(j) * f64::from(increment));
        }
    }
    waves
}

/// Whether the number of named constituents agrees with the general header
fn constituents_consistent(file: &FossFile) -> bool {
    let named = file
        .instrument_header
        .constituents
        .iter()
        .filter(|name| !name.is_empty())
        .count();

    if named != usize::from(file.general_header.num_consts) {
        error!(
            "Constituent count mismatch: general header says {}, instrument header names {}",
            file.general_header.num_consts, named
        );
        return false;
    }
    true
}

fn constituent_report(
    names: &[String],
    values: &ConstituentValues,
) -> BTreeMap<String, SampleValue> {
    names
        .iter()
        .zip(&values.constituents)
        .filter(|(name, value)| !name.is_empty() && **value != 0.0)
        .map(|(name, value)| (name.to_lowercase(), SampleValue::Number(f64::from(*value))))
        .collect()
}

impl SpectrumReader for FossReader {
    fn read_bytes(&self, buffer: &[u8], filename: &str) -> Result<Vec<Spectrum>, FormatError> {
        let file = FossFileSerialiser::new()?.deserialise_from_bytes(buffer)?;
        debug!(
            "{}: {} live, {} deleted, {} points",
            filename, file.general_header.count, file.general_header.deleted,
            file.general_header.num_points
        );

        let wavenumbers = wave_numbers(&file.instrument_header);
        let extract_constituents =
            file.general_header.num_consts > 0 && constituents_consistent(&file);

        let mut spectra = Vec::new();
        let mut num_deleted = 0;
        let mut live = 0;

        for sample in &file.samples {
            if sample.header.deleted {
                num_deleted += 1;
                continue;
            }

            live += 1;
            if live < self.config.start {
                continue;
            }

            let id = self.sample_id(&sample.header, filename, num_deleted);
            if id.is_empty() {
                continue;
            }
            let sample_type = self.sample_type(&sample.header);
            if sample_type.is_empty() {
                continue;
            }

            let amplitudes: Vec<f64> = sample.data.data.iter().map(|&a| f64::from(a)).collect();
            let waves = if amplitudes.len() == wavenumbers.len() {
                wavenumbers.clone()
            } else {
                warn!("Different no. of wavenumbers and amplitudes");
                (0..amplitudes.len()).map(|i| i as f64).collect()
            };

            let mut sample_data = if extract_constituents {
                constituent_report(&file.instrument_header.constituents, &sample.constituents)
            } else {
                BTreeMap::new()
            };
            sample_data.insert(SAMPLE_TYPE_KEY.to_string(), SampleValue::Text(sample_type));

            spectra.push(Spectrum::new(id, waves, amplitudes, sample_data)?);

            if self.config.max.is_some_and(|max| spectra.len() >= max) {
                break;
            }
        }

        Ok(spectra)
    }
}

/// Which FOSS file a [`FossWriter`] produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FossVariant {
    /// Spectra only
    Nir,
    /// Spectra with constituent values
    Cal,
}

impl FossVariant {
    fn file_type(self) -> u16 {
        match self {
            FossVariant::Nir => NIR_FILE_TYPE,
            FossVariant::Cal => CAL_FILE_TYPE,
        }
    }
}

/// Options of [`FossWriter`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FossWriterConfig {
    /// Instrument model name
    pub instrument_name: String,
    /// Client of each sample
    pub client: String,
    /// File identifier
    pub file_id: String,
    /// First sample ID field
    pub sample_id_1: String,
    /// Second sample ID field
    pub sample_id_2: String,
    /// Third sample ID field
    pub sample_id_3: String,
    /// Instrument serial number
    pub serial_no: String,
    /// Serial number of the master instrument
    pub master: String,
    /// Instrument operator
    pub operator: String,
    /// Points per segment
    pub segment_widths: Vec<u16>,
    /// Segment start wave numbers
    pub start_points: Vec<f32>,
    /// Segment wave increments
    pub increments: Vec<f32>,
    /// Segment end wave numbers
    pub end_points: Vec<f32>,
    /// Number of EOCs per revolution
    pub eoc: u16,
    /// Creation timestamp; only its date is kept. Defaults to now.
    pub timestamp: Option<NaiveDateTime>,
    /// Product code, or the metadata field holding it
    pub product_code: String,
    /// Treat `product_code` as a metadata field name
    pub product_code_from_field: bool,
    /// Constituent names written to `.cal` files
    pub constituents: Vec<String>,
}

impl Default for FossWriterConfig {
    fn default() -> Self {
        Self {
            instrument_name: "<not implemented>".to_string(),
            client: "client".to_string(),
            file_id: "generated by wai.spectralio".to_string(),
            sample_id_1: String::new(),
            sample_id_2: String::new(),
            sample_id_3: String::new(),
            serial_no: "0000-0000-0000".to_string(),
            master: "0000-0000-0000".to_string(),
            operator: "wai.spectralio".to_string(),
            segment_widths: vec![1050],
            start_points: vec![400.0],
            increments: vec![2.0],
            end_points: vec![1098.0],
            eoc: 0,
            timestamp: None,
            product_code: "01".to_string(),
            product_code_from_field: false,
            constituents: Vec::new(),
        }
    }
}

/// Writes FOSS `.nir` and `.cal` files
#[derive(Debug, Clone)]
pub struct FossWriter {
    variant: FossVariant,
    config: FossWriterConfig,
}

impl FossWriter {
    /// Writer for spectra-only `.nir` files
    pub fn nir(config: FossWriterConfig) -> Self {
        Self {
            variant: FossVariant::Nir,
            config,
        }
    }

    /// Writer for `.cal` files with constituent values
    pub fn cal(config: FossWriterConfig) -> Self {
        Self {
            variant: FossVariant::Cal,
            config,
        }
    }

    /// The file variant produced
    pub fn variant(&self) -> FossVariant {
        self.variant
    }

    fn creation_date(&self) -> NaiveDate {
        self.config
            .timestamp
            .unwrap_or_else(|| Local::now().naive_local())
            .date()
    }

    fn constituent_names(&self) -> &[String] {
        match self.variant {
            FossVariant::Nir => &[],
            FossVariant::Cal => &self.config.constituents,
        }
    }

    /// Assemble the in-memory file for `spectra`
    pub fn build_file(&self, spectra: &[Spectrum]) -> Result<FossFile, FormatError> {
        let first = spectra.first().ok_or(FormatError::EmptyInput)?;
        let date = self.creation_date();
        let time = date.and_time(NaiveTime::default());

        let general_header = GeneralHeader {
            file_type: self.variant.file_type(),
            count: to_u16(spectra.len(), "number of spectra")?,
            deleted: 0,
            num_points: to_u16(first.len(), "number of points")?,
            num_consts: to_u16(self.constituent_names().len(), "number of constituents")?,
            creation_date: date,
            time,
            most_recent: 0,
            file_id: self.config.file_id.clone(),
            master: self.config.master.clone(),
            packing: String::new(),
        };

        let instrument_header = self.instrument_header()?;

        let samples = spectra
            .iter()
            .enumerate()
            .map(|(position, spectrum)| {
                let sequence = to_u16(position, "sample position")?;
                let id = spectrum.id.replace('\'', "");
                Ok(FossSample {
                    header: SampleHeader {
                        sample_no: id.clone(),
                        sequence,
                        deleted: false,
                        date,
                        product_code: self.product_code(spectrum),
                        client: self.config.client.clone(),
                        sample_id_1: self.config.sample_id_1.clone(),
                        sample_id_2: self.config.sample_id_2.clone(),
                        sample_id_3: self.config.sample_id_3.clone(),
                        operator: self.config.operator.clone(),
                        standardised: 0,
                        time,
                    },
                    data: DataBlock {
                        data: spectrum.amplitudes().iter().map(|&a| a as f32).collect(),
                    },
                    constituents: self.constituent_values(spectrum),
                    info: SampleInfo {
                        sample_id: id,
                        sequence,
                        deleted: false,
                    },
                })
            })
            .collect::<Result<Vec<_>, FormatError>>()?;

        Ok(FossFile {
            general_header,
            instrument_header,
            samples,
        })
    }

    fn instrument_header(&self) -> Result<InstrumentHeader, FormatError> {
        let widths = &self.config.segment_widths;
        if widths.len() > MAX_SEGMENTS {
            return Err(FormatError::InvalidValue(format!(
                "at most {} segments are supported, got {}",
                MAX_SEGMENTS,
                widths.len()
            )));
        }

        let mut constituents = self.constituent_names().to_vec();
        if constituents.len() > MAX_CONSTITUENTS {
            return Err(FormatError::InvalidValue(format!(
                "at most {} constituents are supported, got {}",
                MAX_CONSTITUENTS,
                constituents.len()
            )));
        }
        constituents.resize(MAX_CONSTITUENTS, String::new());

        let mut points_per_segment = [0u16; MAX_SEGMENTS];
        points_per_segment[..widths.len()].copy_from_slice(widths);

        let mut wave = [0f32; 3 * WAVE_GROUP_SIZE];
        let groups = [
            &self.config.start_points,
            &self.config.increments,
            &self.config.end_points,
        ];
        for (group, values) in groups.iter().enumerate() {
            for (slot, &value) in values.iter().take(WAVE_GROUP_SIZE).enumerate() {
                wave[group * WAVE_GROUP_SIZE + slot] = value;
            }
        }

        Ok(InstrumentHeader {
            instrument_type: InstrumentType::SIC_6500,
            model: self.config.instrument_name.clone(),
            serial: self.config.serial_no.clone(),
            num_seg: to_u16(widths.len(), "number of segments")?,
            points_per_segment,
            spacing_mode: SPACING_EQUAL,
            wave,
            neoc: self.config.eoc,
            constituents,
        })
    }

    fn product_code(&self, spectrum: &Spectrum) -> u16 {
        let code = if self.config.product_code_from_field {
            match spectrum.get(&self.config.product_code) {
                Some(value) => value.to_string(),
                None => format!(
                    "<Field '{}' Not Available in Report>",
                    self.config.product_code
                ),
            }
        } else {
            self.config.product_code.clone()
        };

        match code.trim().parse() {
            Ok(code) => code,
            Err(e) => {
                error!("Product code ({}) is non-numeric, or not present: {}", code, e);
                0
            }
        }
    }

    fn constituent_values(&self, spectrum: &Spectrum) -> ConstituentValues {
        let constituents = self
            .constituent_names()
            .iter()
            .map(|name| {
                spectrum
                    .get(name)
                    .and_then(SampleValue::as_f64)
                    .unwrap_or(0.0) as f32
            })
            .collect();
        ConstituentValues { constituents }
    }
}

fn to_u16(value: usize, what: &str) -> Result<u16, FormatError> {
    u16::try_from(value)
        .map_err(|_| FormatError::InvalidValue(format!("{} {} does not fit in 16 bits", what, value)))
}

impl SpectrumWriter for FossWriter {
    fn write_bytes(&self, spectra: &[Spectrum]) -> Result<Vec<u8>, FormatError> {
        let file = self.build_file(spectra)?;
        Ok(FossFileSerialiser::new()?.serialise_to_bytes(&file)?)
    }
}
