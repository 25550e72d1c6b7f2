use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::{read_exact_bytes, Endianness, SerialisationError, Serialiser};

/// Widest supported integer field, in bytes
const MAX_NUM_BYTES: usize = 8;

/// Fixed-width integer serialiser
///
/// Values are carried as `i128` so that every signed and unsigned width up to eight
/// bytes is representable without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntSerialiser {
    endianness: Endianness,
    num_bytes: usize,
    signed: bool,
}

impl Default for IntSerialiser {
    fn default() -> Self {
        Self::I32
    }
}

impl IntSerialiser {
    /// Unsigned byte
    pub const U8: Self = Self::fixed(1, false);
    /// Little-endian unsigned 16-bit
    pub const U16: Self = Self::fixed(2, false);
    /// Little-endian signed 16-bit
    pub const I16: Self = Self::fixed(2, true);
    /// Little-endian unsigned 32-bit
    pub const U32: Self = Self::fixed(4, false);
    /// Little-endian signed 32-bit
    pub const I32: Self = Self::fixed(4, true);

    const fn fixed(num_bytes: usize, signed: bool) -> Self {
        Self {
            endianness: Endianness::Little,
            num_bytes,
            signed,
        }
    }

    /// Create an integer serialiser of the given width (1 to 8 bytes)
    pub fn new(
        num_bytes: usize,
        signed: bool,
        endianness: Endianness,
    ) -> Result<Self, SerialisationError> {
        if num_bytes < 1 {
            return Err(SerialisationError::InvalidConfig(
                "num_bytes must be at least 1".to_string(),
            ));
        }
        if num_bytes > MAX_NUM_BYTES {
            return Err(SerialisationError::InvalidConfig(format!(
                "num_bytes must be at most {} (got {})",
                MAX_NUM_BYTES, num_bytes
            )));
        }

        Ok(Self {
            endianness,
            num_bytes,
            signed,
        })
    }

    /// Same width and signedness with a different byte order
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Configured width in bytes
    pub fn num_bytes(&self) -> usize {
        self.num_bytes
    }

    /// Whether values are two's-complement signed
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Configured byte order
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Number of bits needed to store `value`, accounting for the sign bit.
    ///
    /// Zero always takes one bit. Returns `None` for negative values in unsigned mode.
    pub fn bit_length_actual(value: i128, signed: bool) -> Option<u32> {
        if value == 0 {
            return Some(1);
        }

        if signed {
            if value > 0 {
                Some(bit_length(value) + 1)
            } else {
                // -(2^n) needs n + 1 bits, same as 2^n - 1
                Some(bit_length(-(value + 1)) + 1)
            }
        } else if value > 0 {
            Some(bit_length(value))
        } else {
            None
        }
    }
}

/// Bit length of a non-negative value
fn bit_length(value: i128) -> u32 {
    128 - value.leading_zeros()
}

impl Serialiser for IntSerialiser {
    type Value = i128;

    fn check(&self, value: &i128) -> Result<(), SerialisationError> {
        if !self.signed && *value < 0 {
            return Err(SerialisationError::NegativeUnsigned(*value));
        }

        match Self::bit_length_actual(*value, self.signed) {
            Some(bits) if bits as usize <= 8 * self.num_bytes => Ok(()),
            _ => Err(SerialisationError::OutOfRange {
                value: value.to_string(),
                num_bytes: self.num_bytes,
            }),
        }
    }

    fn write_value(&self, value: &i128, out: &mut dyn Write) -> Result<(), SerialisationError> {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes()[..self.num_bytes].to_vec(),
            Endianness::Big => value.to_be_bytes()[16 - self.num_bytes..].to_vec(),
        };
        out.write_all(&bytes)?;
        Ok(())
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<i128, SerialisationError> {
        let bytes = read_exact_bytes(input, self.num_bytes)?;

        let value = match (self.endianness, self.signed) {
            (Endianness::Little, true) => LittleEndian::read_int128(&bytes, self.num_bytes),
            (Endianness::Little, false) => {
                LittleEndian::read_uint128(&bytes, self.num_bytes) as i128
            }
            (Endianness::Big, true) => BigEndian::read_int128(&bytes, self.num_bytes),
            (Endianness::Big, false) => BigEndian::read_uint128(&bytes, self.num_bytes) as i128,
        };

        Ok(value)
    }
}
