//! # spectralio - Binary Spectroscopy Formats
//!
//! `spectralio` reads and writes the proprietary binary file formats used to exchange
//! NIR/MIR spectral measurements between instruments and analysis tools. Every format
//! maps to one common in-memory value, [`Spectrum`]: a sample identifier, ordered
//! wave-number/amplitude pairs and free-form sample metadata.
//!
//! ## Supported Formats
//!
//! | Format | Extension | Read | Write |
//! |--------|-----------|------|-------|
//! | FOSS NIR (spectra only) | `.nir` | yes | yes |
//! | FOSS CAL (spectra + reference values) | `.cal` | yes | yes |
//! | Bruker OPUS, block table | `.0`, `.1`, ... | yes | no |
//! | Bruker OPUS, legacy scan | `.0`, `.1`, ... | yes | no |
//! | Thermo SPA | `.spa` | yes | no |
//!
//! Any path ending in `.gz` is transparently (de)compressed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spectralio::formats::{FossReader, FossReaderConfig, SpectrumReader};
//!
//! let reader = FossReader::new(FossReaderConfig::default());
//! let spectra = reader.read("VALK10.NIR")?;
//!
//! for spectrum in &spectra {
//!     println!("{}: {} points", spectrum.id, spectrum.len());
//! }
//! # Ok::<(), spectralio::formats::FormatError>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized in layers, leaves first:
//!
//! - [`serialisation`]: typed primitive codecs (bools, fixed-width integers, floats,
//!   fixed/null-terminated/length-prefixed strings, bit flags, enums, epoch timestamps)
//! - [`foss`]: FOSS NIR/CAL record layouts and the whole-file assembler
//! - [`opus`]: OPUS block directory, block views, byte-pattern search and the
//!   command-line metadata parser
//! - [`formats`]: adapters between the structures above and [`Spectrum`]
//!
//! ## FOSS File Layout
//!
//! All FOSS values are little-endian. A file is laid out positionally:
//!
//! ```text
//! GeneralHeader        128 bytes
//! InstrumentHeader     768 bytes
//! repeat count+deleted:
//!   SampleHeader       256 bytes
//!   DataBlock          ceil(num_points / 32) * 128 bytes
//!   ConstituentValues  128 bytes
//! repeat count+deleted:
//!   SampleInfo          16 bytes
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::too_many_arguments)]

pub mod formats;
pub mod foss;
pub mod opus;
pub mod serialisation;
pub mod spectrum;

pub use spectrum::{SampleValue, Spectrum, SpectrumError};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::formats::{
        Format, FormatError, FormatOptions, FossReader, FossReaderConfig, FossVariant,
        FossWriter, FossWriterConfig, OpusLegacyReader, OpusLegacyReaderConfig, OpusReader,
        OpusReaderConfig, SpaReader, SpectrumReader, SpectrumWriter,
    };
    pub use crate::foss::{
        ConstituentValues, DataBlock, FossFile, FossFileSerialiser, GeneralHeader,
        InstrumentHeader, InstrumentType, SampleHeader, SampleInfo,
    };
    pub use crate::serialisation::{Endianness, SerialisationError, Serialiser};
    pub use crate::spectrum::{SampleValue, Spectrum, SpectrumError};
}
