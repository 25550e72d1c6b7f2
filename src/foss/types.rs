//! In-memory records of a FOSS NIR/CAL file

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::serialisation::IntEnum;

/// `GeneralHeader::file_type` of a spectra-only `.NIR` file
pub const NIR_FILE_TYPE: u16 = 1;

/// `GeneralHeader::file_type` of a `.CAL` file carrying constituent values
pub const CAL_FILE_TYPE: u16 = 2;

/// Number of per-segment point counts in the instrument header
pub const MAX_SEGMENTS: usize = 20;

/// Number of wave floats in the instrument header (starts, increments, ends)
pub const NUM_WAVE_VALUES: usize = 21;

/// Number of floats in each of the start/increment/end groups
pub const WAVE_GROUP_SIZE: usize = 7;

/// Number of constituent slots (names and values)
pub const MAX_CONSTITUENTS: usize = 32;

/// Spacing mode whose segments are equally spaced
pub const SPACING_EQUAL: u16 = 1;

/// File-level header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralHeader {
    /// 1 = NIR, 2 = CAL
    pub file_type: u16,
    /// Number of live samples
    pub count: u16,
    /// Number of deleted samples
    pub deleted: u16,
    /// Spectral points per sample, shared by every data block
    pub num_points: u16,
    /// Number of constituents per sample
    pub num_consts: u16,
    /// Creation date
    pub creation_date: NaiveDate,
    /// Creation time
    pub time: NaiveDateTime,
    /// CHK-file marker, normally 0
    pub most_recent: u16,
    /// File identifier (71 bytes)
    pub file_id: String,
    /// Master instrument serial number (9 bytes)
    pub master: String,
    /// Packing information (30 bytes)
    pub packing: String,
}

impl Default for GeneralHeader {
    fn default() -> Self {
        let now = Local::now().naive_local();
        Self {
            file_type: NIR_FILE_TYPE,
            count: 0,
            deleted: 0,
            num_points: 0,
            num_consts: 0,
            creation_date: now.date(),
            time: now,
            most_recent: 0,
            file_id: String::new(),
            master: String::new(),
            packing: String::new(),
        }
    }
}

impl GeneralHeader {
    /// Total number of sample records in the file, deleted ones included
    pub fn total_samples(&self) -> usize {
        usize::from(self.count) + usize::from(self.deleted)
    }
}

/// Instrument model codes
#[allow(non_camel_case_types, missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum InstrumentType {
    #[default]
    SER_4250,
    SER_51A,
    SIC_4250,
    SIC_6250,
    SIC_6250V,
    PARALLEL_6250,
    PARALLEL_6250V,
    BL_500,
    BL_400,
    SIC_6500,
    SIC_5500,
    SIC_5000,
    SIC_4500,
    INFRATEC,
}

impl IntEnum for InstrumentType {
    const NAME: &'static str = "instrument type";

    const VARIANTS: &'static [Self] = &[
        InstrumentType::SER_4250,
        InstrumentType::SER_51A,
        InstrumentType::SIC_4250,
        InstrumentType::SIC_6250,
        InstrumentType::SIC_6250V,
        InstrumentType::PARALLEL_6250,
        InstrumentType::PARALLEL_6250V,
        InstrumentType::BL_500,
        InstrumentType::BL_400,
        InstrumentType::SIC_6500,
        InstrumentType::SIC_5500,
        InstrumentType::SIC_5000,
        InstrumentType::SIC_4500,
        InstrumentType::INFRATEC,
    ];

    fn code(self) -> i128 {
        self as i128
    }
}

/// Instrument description and wave-number layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentHeader {
    /// Instrument model code
    pub instrument_type: InstrumentType,
    /// Model name (21 bytes)
    pub model: String,
    /// Serial number (9 bytes)
    pub serial: String,
    /// Number of segments in use
    pub num_seg: u16,
    /// Points in each segment, zero for unused segments
    pub points_per_segment: [u16; MAX_SEGMENTS],
    /// 0 = TILFIL, 1 = EQUALSPC, 2 = FILFIL, 3 = SIN
    pub spacing_mode: u16,
    /// Segment starts, increments and ends, seven of each
    pub wave: [f32; NUM_WAVE_VALUES],
    /// End-of-coverage count
    pub neoc: u16,
    /// Constituent names, positionally aligned with constituent values. Always
    /// [`MAX_CONSTITUENTS`] slots; unused slots are empty.
    pub constituents: Vec<String>,
}

impl Default for InstrumentHeader {
    fn default() -> Self {
        Self {
            instrument_type: InstrumentType::default(),
            model: String::new(),
            serial: String::new(),
            num_seg: 0,
            points_per_segment: [0; MAX_SEGMENTS],
            spacing_mode: 0,
            wave: [0.0; NUM_WAVE_VALUES],
            neoc: 0,
            constituents: vec![String::new(); MAX_CONSTITUENTS],
        }
    }
}

impl InstrumentHeader {
    /// Segment start wave numbers
    pub fn starts(&self) -> &[f32] {
        &self.wave[..WAVE_GROUP_SIZE]
    }

    /// Segment increments
    pub fn increments(&self) -> &[f32] {
        &self.wave[WAVE_GROUP_SIZE..2 * WAVE_GROUP_SIZE]
    }

    /// Segment end wave numbers
    pub fn ends(&self) -> &[f32] {
        &self.wave[2 * WAVE_GROUP_SIZE..]
    }
}

/// Per-sample header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleHeader {
    /// Sample number (13 bytes)
    pub sample_no: String,
    /// Position in the file
    pub sequence: u16,
    /// Deleted marker
    pub deleted: bool,
    /// Acquisition date
    pub date: NaiveDate,
    /// Numeric product code
    pub product_code: u16,
    /// Client (9 bytes)
    pub client: String,
    /// First free-text sample ID (50 bytes)
    pub sample_id_1: String,
    /// Second free-text sample ID (50 bytes)
    pub sample_id_2: String,
    /// Third free-text sample ID (51 bytes, null-terminated)
    pub sample_id_3: String,
    /// Operator (32 bytes)
    pub operator: String,
    /// Standardisation marker
    pub standardised: u16,
    /// Acquisition time
    pub time: NaiveDateTime,
}

impl Default for SampleHeader {
    fn default() -> Self {
        let now = Local::now().naive_local();
        Self {
            sample_no: String::new(),
            sequence: 0,
            deleted: false,
            date: now.date(),
            product_code: 0,
            client: String::new(),
            sample_id_1: String::new(),
            sample_id_2: String::new(),
            sample_id_3: String::new(),
            operator: String::new(),
            standardised: 0,
            time: now,
        }
    }
}

/// Amplitudes of one sample
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DataBlock {
    /// Single-precision amplitudes, `num_points` long
    pub data: Vec<f32>,
}

/// Reference values of one sample
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConstituentValues {
    /// Values up to the first zero slot
    pub constituents: Vec<f32>,
}

/// Per-sample footer
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SampleInfo {
    /// Sample ID (13 bytes)
    pub sample_id: String,
    /// Position in the file
    pub sequence: u16,
    /// Deleted marker
    pub deleted: bool,
}

/// All records belonging to one sample
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FossSample {
    /// Sample header
    pub header: SampleHeader,
    /// Amplitudes
    pub data: DataBlock,
    /// Reference values
    pub constituents: ConstituentValues,
    /// Footer, stored after every sample record
    pub info: SampleInfo,
}

/// A complete FOSS file
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FossFile {
    /// File header
    pub general_header: GeneralHeader,
    /// Instrument header
    pub instrument_header: InstrumentHeader,
    /// Samples in file order, deleted ones included
    pub samples: Vec<FossSample>,
}
