//! # FOSS NIR/CAL Binary Layout
//!
//! Positional, little-endian records with no self-description:
//!
//! ```text
//! GeneralHeader       128 bytes
//! InstrumentHeader    768 bytes
//! repeat count + deleted:
//!     SampleHeader        256 bytes
//!     DataBlock           ceil(num_points / 32) * 128 bytes
//!     ConstituentValues   128 bytes
//! repeat count + deleted:
//!     SampleInfo          16 bytes
//! ```
//!
//! `num_points` lives only in the general header, so every data block in a file has the
//! same length. Truncated input is a hard error; no partial sample list is returned.

mod date;
mod file;
mod headers;
mod safe_string;
mod sample;
mod types;

#[cfg(test)]
mod tests;

pub use date::DateSerialiser;
pub use file::FossFileSerialiser;
pub use headers::{GeneralHeaderSerialiser, InstrumentHeaderSerialiser};
pub use safe_string::SafeStringSerialiser;
pub use sample::{
    ConstituentValuesSerialiser, DataBlockSerialiser, SampleHeaderSerialiser, SampleInfoSerialiser,
};
pub use types::{
    ConstituentValues, DataBlock, FossFile, FossSample, GeneralHeader, InstrumentHeader,
    InstrumentType, SampleHeader, SampleInfo, CAL_FILE_TYPE, MAX_CONSTITUENTS, MAX_SEGMENTS,
    NIR_FILE_TYPE, NUM_WAVE_VALUES, SPACING_EQUAL, WAVE_GROUP_SIZE,
};

/// Serialised size of [`GeneralHeader`]
pub const GENERAL_HEADER_LENGTH: usize = 128;

/// Serialised size of [`InstrumentHeader`]
pub const INSTRUMENT_HEADER_LENGTH: usize = 768;

/// Serialised size of [`SampleHeader`]
pub const SAMPLE_HEADER_LENGTH: usize = 256;

/// Serialised size of [`ConstituentValues`]
pub const CONSTITUENT_VALUES_LENGTH: usize = 128;

/// Serialised size of [`SampleInfo`]
pub const SAMPLE_INFO_LENGTH: usize = 16;
