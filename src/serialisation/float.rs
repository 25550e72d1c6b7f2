use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::{read_exact_bytes, Endianness, SerialisationError, Serialiser};

/// IEEE-754 precision of a float field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// 4-byte single precision
    Single,
    /// 8-byte double precision
    #[default]
    Double,
}

impl Precision {
    /// Get the byte size per value
    pub fn byte_size(&self) -> usize {
        match self {
            Precision::Single => 4,
            Precision::Double => 8,
        }
    }
}

/// IEEE-754 float serialiser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatSerialiser {
    endianness: Endianness,
    precision: Precision,
}

impl FloatSerialiser {
    /// Little-endian single precision
    pub const F32: Self = Self {
        endianness: Endianness::Little,
        precision: Precision::Single,
    };
    /// Little-endian double precision
    pub const F64: Self = Self {
        endianness: Endianness::Little,
        precision: Precision::Double,
    };

    /// Create a float serialiser
    pub fn new(precision: Precision, endianness: Endianness) -> Self {
        Self {
            endianness,
            precision,
        }
    }

    /// Configured precision
    pub fn precision(&self) -> Precision {
        self.precision
    }
}

impl Serialiser for FloatSerialiser {
    type Value = f64;

    fn check(&self, value: &f64) -> Result<(), SerialisationError> {
        if self.precision == Precision::Single && value.is_finite() && value.abs() > f32::MAX as f64 {
            return Err(SerialisationError::OutOfRange {
                value: value.to_string(),
                num_bytes: 4,
            });
        }
        Ok(())
    }

    fn write_value(&self, value: &f64, out: &mut dyn Write) -> Result<(), SerialisationError> {
        let mut buffer = [0u8; 8];
        let size = self.precision.byte_size();

        match (self.precision, self.endianness) {
            (Precision::Single, Endianness::Little) => {
                LittleEndian::write_f32(&mut buffer, *value as f32)
            }
            (Precision::Single, Endianness::Big) => BigEndian::write_f32(&mut buffer, *value as f32),
            (Precision::Double, Endianness::Little) => LittleEndian::write_f64(&mut buffer, *value),
            (Precision::Double, Endianness::Big) => BigEndian::write_f64(&mut buffer, *value),
        }

        out.write_all(&buffer[..size])?;
        Ok(())
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<f64, SerialisationError> {
        let bytes = read_exact_bytes(input, self.precision.byte_size())?;

        let value = match (self.precision, self.endianness) {
            (Precision::Single, Endianness::Little) => LittleEndian::read_f32(&bytes) as f64,
            (Precision::Single, Endianness::Big) => BigEndian::read_f32(&bytes) as f64,
            (Precision::Double, Endianness::Little) => LittleEndian::read_f64(&bytes),
            (Precision::Double, Endianness::Big) => BigEndian::read_f64(&bytes),
        };

        Ok(value)
    }
}
