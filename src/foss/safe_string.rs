use std::io::{Read, Write};

use crate::serialisation::{
    FixedLengthStringSerialiser, SerialisationError, Serialiser, NULL_BYTE,
};

/// Fixed-width ASCII field that tolerates garbage on read.
///
/// Decoding keeps only the bytes before the first null and drops any byte outside the
/// 7-bit range, so legacy files with stray high bytes still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeStringSerialiser {
    inner: FixedLengthStringSerialiser,
}

impl SafeStringSerialiser {
    /// Field of `length` bytes, the last one forced to null if `ensure_null_terminated`
    pub const fn new(length: usize, ensure_null_terminated: bool) -> Self {
        Self {
            inner: FixedLengthStringSerialiser::ascii(length, ensure_null_terminated),
        }
    }

    /// Bytes occupied in the stream
    pub fn field_length(&self) -> usize {
        self.inner.field_length()
    }
}

impl Serialiser for SafeStringSerialiser {
    type Value = String;

    fn check(&self, value: &String) -> Result<(), SerialisationError> {
        self.inner.check(value)
    }

    fn write_value(&self, value: &String, out: &mut dyn Write) -> Result<(), SerialisationError> {
        self.inner.write_value(value, out)
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<String, SerialisationError> {
        let encoded = self.inner.read_encoded(input)?;

        Ok(encoded
            .iter()
            .take_while(|&&b| b != NULL_BYTE)
            .filter(|b| b.is_ascii())
            .map(|&b| b as char)
            .collect())
    }
}
