use crate::serialisation::SerialisationError;
use crate::spectrum::SpectrumError;

/// Errors that can occur while reading or writing a spectrum file
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Binary layout could not be read or written
    #[error("Serialisation error: {0}")]
    SerialisationError(#[from] SerialisationError),

    /// A spectrum could not be constructed
    #[error("Spectrum error: {0}")]
    SpectrumError(#[from] SpectrumError),

    /// DPF and data blocks of an OPUS file do not pair up (strict mode only)
    #[error("Differing number of DPF blocks and data blocks: {dpf} != {data}")]
    BlockCountMismatch {
        /// DPF blocks with a matching data block
        dpf: usize,
        /// Matching data blocks
        data: usize,
    },

    /// A required value is absent from the file
    #[error("Missing data: {0}")]
    MissingData(String),

    /// A value is present but unusable
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Nothing to write
    #[error("No spectra to write")]
    EmptyInput,

    /// No format is registered under this name or extension
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The format can only be read
    #[error("Writing is not supported for {0}")]
    WriteNotSupported(&'static str),
}
