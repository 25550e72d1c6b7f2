//! # Typed Binary Serialisers
//!
//! Every serialiser converts one Rust value to and from a fixed binary layout. The
//! contract mirrors a two-step write:
//!
//! 1. [`Serialiser::check`] validates the value (range, encoding, length) before a
//!    single byte is emitted.
//! 2. [`Serialiser::write_value`] emits the bytes.
//!
//! Reading never validates beyond consuming the expected number of bytes. A stream that
//! ends early fails with [`SerialisationError::Shortfall`].
//!
//! Serialisers are configured once at construction and never mutated afterwards, so a
//! single instance can be shared read-only between threads.
//!
//! ## Example
//!
//! ```rust
//! use spectralio::serialisation::{IntSerialiser, Serialiser};
//!
//! let u16_le = IntSerialiser::U16;
//! let bytes = u16_le.serialise_to_bytes(&513)?;
//! assert_eq!(bytes, vec![0x01, 0x02]);
//! assert_eq!(u16_le.deserialise_from_bytes(&bytes)?, 513);
//! assert!(u16_le.serialise_to_bytes(&65536).is_err());
//! # Ok::<(), spectralio::serialisation::SerialisationError>(())
//! ```

mod boolean;
mod enumeration;
mod epoch;
mod error;
mod flags;
mod float;
mod int;
mod string;


use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub use boolean::BoolSerialiser;
pub use enumeration::{EnumSerialiser, IntEnum};
pub use epoch::SecondsSinceEpochSerialiser;
pub use error::SerialisationError;
pub use flags::{FlagSerialiser, Flags, UNUSED};
pub use float::{FloatSerialiser, Precision};
pub use int::IntSerialiser;
pub use string::{
    FixedLengthStringSerialiser, LengthPrefixedStringSerialiser, NullTerminatedStringSerialiser,
    StringEncoding, NULL_BYTE,
};

/// Byte order of multi-byte fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Least significant byte first
    #[default]
    Little,
    /// Most significant byte first
    Big,
}

/// A codec for one value type against a byte stream
pub trait Serialiser {
    /// The value this serialiser reads and writes
    type Value;

    /// Validate a value before it is written
    fn check(&self, value: &Self::Value) -> Result<(), SerialisationError>;

    /// Write a value that has already passed [`Serialiser::check`]
    fn write_value(&self, value: &Self::Value, out: &mut dyn Write)
        -> Result<(), SerialisationError>;

    /// Read one value from the stream
    fn read_value(&self, input: &mut dyn Read) -> Result<Self::Value, SerialisationError>;

    /// Check and write a value
    fn serialise(&self, value: &Self::Value, out: &mut dyn Write) -> Result<(), SerialisationError> {
        self.check(value)?;
        self.write_value(value, out)
    }

    /// Read a value
    fn deserialise(&self, input: &mut dyn Read) -> Result<Self::Value, SerialisationError> {
        self.read_value(input)
    }

    /// Serialise a value into a new byte vector
    fn serialise_to_bytes(&self, value: &Self::Value) -> Result<Vec<u8>, SerialisationError> {
        let mut buffer = Vec::new();
        self.serialise(value, &mut buffer)?;
        Ok(buffer)
    }

    /// Deserialise a value from the start of a byte slice
    fn deserialise_from_bytes(&self, bytes: &[u8]) -> Result<Self::Value, SerialisationError> {
        let mut cursor = bytes;
        self.deserialise(&mut cursor)
    }

    /// Serialise a value to a file, creating parent directories as needed
    fn serialise_to_file(&self, value: &Self::Value, path: &Path) -> Result<(), SerialisationError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(path)?);
        self.serialise(value, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Deserialise a value from a file
    fn deserialise_from_file(&self, path: &Path) -> Result<Self::Value, SerialisationError> {
        let mut reader = BufReader::new(File::open(path)?);
        self.deserialise(&mut reader)
    }
}

/// Read exactly `count` bytes, reporting how many arrived if the stream ends early
pub(crate) fn read_exact_bytes(
    input: &mut dyn Read,
    count: usize,
) -> Result<Vec<u8>, SerialisationError> {
    let mut buffer = Vec::with_capacity(count);
    (&mut *input).take(count as u64).read_to_end(&mut buffer)?;

    if buffer.len() != count {
        return Err(SerialisationError::Shortfall {
            required: count,
            received: buffer.len(),
        });
    }

    Ok(buffer)
}

/// Consume and discard `count` bytes of padding
pub(crate) fn skip_bytes(input: &mut dyn Read, count: usize) -> Result<(), SerialisationError> {
    let skipped = std::io::copy(&mut (&mut *input).take(count as u64), &mut std::io::sink())?;
    if skipped as usize != count {
        return Err(SerialisationError::Shortfall {
            required: count,
            received: skipped as usize,
        });
    }
    Ok(())
}

/// Write `count` zero bytes of padding
pub(crate) fn write_zeros(out: &mut dyn Write, count: usize) -> Result<(), SerialisationError> {
    out.write_all(&vec![0u8; count])?;
    Ok(())
}
