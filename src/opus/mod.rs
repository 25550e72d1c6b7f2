//! # OPUS Block Directory
//!
//! An OPUS file is a header holding a directory of 12-byte entries, each pointing at a
//! block elsewhere in the file:
//!
//! ```text
//! offset 36:  [type: u32][length in words: u32][offset: u32]  repeated
//! ```
//!
//! Parameter blocks (`DPF`, `HFL`, ...) are sequences of tagged fields such as `NPT\0`,
//! whose value sits 8 bytes after the tag. Each spectral data block is described by the
//! DPF block whose type code is 16 higher. Text blocks hold a null-separated log, some
//! entries of which are `COMMAND_LINE` records carrying the sample ID.
//!
//! Everything here borrows the caller's buffer; nothing is copied until a value is read.
//!
//! ```rust,no_run
//! use spectralio::opus::{read_blocks, read_definitions};
//!
//! let buffer = std::fs::read("sample.0")?;
//! let definitions = read_definitions(&buffer)?;
//! for block in read_blocks(&buffer, &definitions) {
//!     println!("{}", block);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod block;
mod command_line;
pub mod constants;
mod directory;
mod search;

#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod tests;

pub use block::{Block, BlockDefinition};
pub use command_line::CommandLineData;
pub use directory::{
    find_spectral_pairs, instrument_name, read_blocks, read_command_lines, read_definitions,
    read_log, PairingMismatch, SpectralPair, SpectrumParameters,
};
pub use search::{find_forward, find_reverse, find_with_wildcard, to_hex_string, WILDCARD};
