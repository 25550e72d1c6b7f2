//! Adapters between on-disk spectrum formats and [`Spectrum`].
//!
//! Every format is exposed through [`SpectrumReader`] and, where writing is supported,
//! [`SpectrumWriter`]:
//!
//! - [`FossReader`] / [`FossWriter`] - FOSS `.nir` and `.cal` files
//! - [`OpusReader`] - Bruker OPUS files with a block directory
//! - [`OpusLegacyReader`] - Bruker OPUS files located by byte-pattern scanning
//! - [`SpaReader`] - Thermo `.spa` files
//!
//! [`Format`] is the registry that maps a format tag or file extension to a reader or
//! writer. Paths ending in `.gz` are decompressed on read and compressed on write.

mod error;
mod foss;
mod io;
mod opus;
mod opus_legacy;
mod spa;

use std::path::Path;

pub use error::FormatError;
pub use foss::{FossReader, FossReaderConfig, FossVariant, FossWriter, FossWriterConfig};
pub use io::{is_gzip_path, read_file_bytes, write_file_bytes};
pub use opus::{OpusReader, OpusReaderConfig};
pub use opus_legacy::{OpusLegacyReader, OpusLegacyReaderConfig};
pub use spa::SpaReader;

use crate::spectrum::Spectrum;

/// Reads all spectra stored in one file
pub trait SpectrumReader {
    /// Parse spectra from the (already decompressed) contents of a file.
    ///
    /// `filename` is the file's base name without a `.gz` suffix; some formats derive
    /// sample IDs from it.
    fn read_bytes(&self, buffer: &[u8], filename: &str) -> Result<Vec<Spectrum>, FormatError>;

    /// Whether the file is opened in binary mode
    fn is_binary(&self, _filename: &str) -> bool {
        true
    }

    /// Read a file from disk, decompressing it if the path ends in `.gz`
    fn read_path(&self, path: &Path) -> Result<Vec<Spectrum>, FormatError> {
        let buffer = read_file_bytes(path)?;
        self.read_bytes(&buffer, &logical_file_name(path))
    }

    /// Convenience wrapper around [`SpectrumReader::read_path`]
    fn read<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Spectrum>, FormatError>
    where
        Self: Sized,
    {
        self.read_path(path.as_ref())
    }
}

/// Writes a list of spectra into one file
pub trait SpectrumWriter {
    /// Encode spectra into the bytes of a file
    fn write_bytes(&self, spectra: &[Spectrum]) -> Result<Vec<u8>, FormatError>;

    /// Whether the file is opened in binary mode
    fn is_binary(&self, _filename: &str) -> bool {
        true
    }

    /// Write a file to disk, compressing it if the path ends in `.gz`
    fn write_path(&self, spectra: &[Spectrum], path: &Path) -> Result<(), FormatError> {
        let buffer = self.write_bytes(spectra)?;
        write_file_bytes(path, &buffer)?;
        Ok(())
    }

    /// Convenience wrapper around [`SpectrumWriter::write_path`]
    fn write<P: AsRef<Path>>(&self, spectra: &[Spectrum], path: P) -> Result<(), FormatError>
    where
        Self: Sized,
    {
        self.write_path(spectra, path.as_ref())
    }
}

/// Base name of a path with any `.gz` suffix removed
fn logical_file_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.strip_suffix(".gz") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Registered spectrum formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// FOSS `.nir`, spectra only
    Nir,
    /// FOSS `.cal`, spectra with reference values
    Cal,
    /// Bruker OPUS with a block directory
    Opus,
    /// Bruker OPUS located by byte-pattern scanning
    OpusLegacy,
    /// Thermo `.spa`
    Spa,
}

struct FormatEntry {
    format: Format,
    tag: &'static str,
    extensions: &'static [&'static str],
    writable: bool,
}

/// OPUS files carry numeric extensions (`.0`, `.1`, ...), so they are never matched by
/// extension and must be chosen by tag
const REGISTRY: &[FormatEntry] = &[
    FormatEntry {
        format: Format::Nir,
        tag: "nir",
        extensions: &["nir"],
        writable: true,
    },
    FormatEntry {
        format: Format::Cal,
        tag: "cal",
        extensions: &["cal"],
        writable: true,
    },
    FormatEntry {
        format: Format::Opus,
        tag: "opus",
        extensions: &[],
        writable: false,
    },
    FormatEntry {
        format: Format::OpusLegacy,
        tag: "opus-legacy",
        extensions: &[],
        writable: false,
    },
    FormatEntry {
        format: Format::Spa,
        tag: "spa",
        extensions: &["spa"],
        writable: false,
    },
];

/// Per-format configuration used when constructing readers and writers
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    /// FOSS reader options
    pub foss_reader: FossReaderConfig,
    /// FOSS writer options
    pub foss_writer: FossWriterConfig,
    /// OPUS block-table reader options
    pub opus: OpusReaderConfig,
    /// Legacy OPUS reader options
    pub opus_legacy: OpusLegacyReaderConfig,
}

impl Format {
    /// Every registered format
    pub fn all() -> impl Iterator<Item = Format> {
        REGISTRY.iter().map(|entry| entry.format)
    }

    fn entry(self) -> &'static FormatEntry {
        // REGISTRY holds one entry per variant, in declaration order
        &REGISTRY[self as usize]
    }

    /// Short name used on the command line
    pub fn tag(self) -> &'static str {
        self.entry().tag
    }

    /// Whether a writer exists for this format
    pub fn is_writable(self) -> bool {
        self.entry().writable
    }

    /// Look up a format by tag, ignoring case
    pub fn from_tag(tag: &str) -> Result<Format, FormatError> {
        REGISTRY
            .iter()
            .find(|entry| entry.tag.eq_ignore_ascii_case(tag))
            .map(|entry| entry.format)
            .ok_or_else(|| FormatError::UnsupportedFormat(tag.to_string()))
    }

    /// Guess the format from a file extension, looking through a `.gz` suffix
    pub fn from_path(path: &Path) -> Result<Format, FormatError> {
        let name = logical_file_name(path);
        let extension = Path::new(&name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .ok_or_else(|| FormatError::UnsupportedFormat(path.display().to_string()))?;

        REGISTRY
            .iter()
            .find(|entry| entry.extensions.contains(&extension.as_str()))
            .map(|entry| entry.format)
            .ok_or_else(|| FormatError::UnsupportedFormat(format!(".{}", extension)))
    }

    /// Construct a reader for this format
    pub fn reader(self, options: &FormatOptions) -> Box<dyn SpectrumReader> {
        match self {
            Format::Nir | Format::Cal => Box::new(FossReader::new(options.foss_reader.clone())),
            Format::Opus => Box::new(OpusReader::new(options.opus.clone())),
            Format::OpusLegacy => Box::new(OpusLegacyReader::new(options.opus_legacy.clone())),
            Format::Spa => Box::new(SpaReader::new()),
        }
    }

    /// Construct a writer for this format
    pub fn writer(self, options: &FormatOptions) -> Result<Box<dyn SpectrumWriter>, FormatError> {
        match self {
            Format::Nir => Ok(Box::new(FossWriter::nir(options.foss_writer.clone()))),
            Format::Cal => Ok(Box::new(FossWriter::cal(options.foss_writer.clone()))),
            other => Err(FormatError::WriteNotSupported(other.tag())),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::from_tag(s)
    }
}
