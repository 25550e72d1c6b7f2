use std::io::{Read, Write};

use super::{read_exact_bytes, SerialisationError, Serialiser};

/// Single-byte boolean with configurable marker bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolSerialiser {
    true_byte: u8,
    false_byte: u8,
}

impl Default for BoolSerialiser {
    fn default() -> Self {
        Self {
            true_byte: 0x01,
            false_byte: 0x00,
        }
    }
}

impl BoolSerialiser {
    /// Create a serialiser with custom marker bytes
    pub fn new(true_byte: u8, false_byte: u8) -> Result<Self, SerialisationError> {
        if true_byte == false_byte {
            return Err(SerialisationError::InvalidConfig(
                "true_byte and false_byte are indistinguishable".to_string(),
            ));
        }

        Ok(Self {
            true_byte,
            false_byte,
        })
    }
}

impl Serialiser for BoolSerialiser {
    type Value = bool;

    fn check(&self, _value: &bool) -> Result<(), SerialisationError> {
        Ok(())
    }

    fn write_value(&self, value: &bool, out: &mut dyn Write) -> Result<(), SerialisationError> {
        out.write_all(&[if *value { self.true_byte } else { self.false_byte }])?;
        Ok(())
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<bool, SerialisationError> {
        let byte = read_exact_bytes(input, 1)?[0];

        if byte == self.true_byte {
            Ok(true)
        } else if byte == self.false_byte {
            Ok(false)
        } else {
            Err(SerialisationError::InvalidBool(byte))
        }
    }
}
