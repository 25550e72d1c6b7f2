use std::io::{Read, Write};

use super::{read_exact_bytes, IntSerialiser, SerialisationError, Serialiser};

/// The null terminator byte
pub const NULL_BYTE: u8 = 0x00;

/// Text encoding applied before a string reaches the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringEncoding {
    /// UTF-8
    #[default]
    Utf8,
    /// 7-bit ASCII; any other character is an error
    Ascii,
}

impl StringEncoding {
    /// Encode text to bytes
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, SerialisationError> {
        match self {
            StringEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            StringEncoding::Ascii => {
                if let Some(c) = text.chars().find(|c| !c.is_ascii()) {
                    return Err(SerialisationError::Encoding(format!(
                        "'ascii' codec can't encode character {:?} in {:?}",
                        c, text
                    )));
                }
                Ok(text.as_bytes().to_vec())
            }
        }
    }

    /// Decode bytes to text
    pub fn decode(&self, bytes: &[u8]) -> Result<String, SerialisationError> {
        match self {
            StringEncoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| SerialisationError::Encoding(e.to_string())),
            StringEncoding::Ascii => {
                if let Some(position) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err(SerialisationError::Encoding(format!(
                        "'ascii' codec can't decode byte {:#04x} in position {}",
                        bytes[position], position
                    )));
                }
                Ok(bytes.iter().map(|&b| b as char).collect())
            }
        }
    }
}

/// Strip trailing null padding
fn trim_nulls(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != NULL_BYTE)
        .map_or(0, |last| last + 1);
    &bytes[..end]
}

/// String stored in a field of exactly `length` bytes.
///
/// Short strings are padded with null bytes; long strings are truncated (or rejected in
/// `raise_on_truncate` mode). With `ensure_null_terminated` the last byte of the field is
/// always a null. Truncation works on encoded bytes, so a multi-byte UTF-8 character may
/// be cut in half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLengthStringSerialiser {
    length: usize,
    encoding: StringEncoding,
    ensure_null_terminated: bool,
    raise_on_truncate: bool,
}

impl FixedLengthStringSerialiser {
    /// Create a fixed-length string serialiser
    pub fn new(
        length: usize,
        encoding: StringEncoding,
        ensure_null_terminated: bool,
        raise_on_truncate: bool,
    ) -> Result<Self, SerialisationError> {
        if length == 0 {
            return Err(SerialisationError::InvalidConfig(format!(
                "Length must be a positive value, not {}",
                length
            )));
        }

        Ok(Self {
            length: if ensure_null_terminated { length - 1 } else { length },
            encoding,
            ensure_null_terminated,
            raise_on_truncate,
        })
    }

    /// ASCII field of a known non-zero width that pads or truncates silently
    pub(crate) const fn ascii(length: usize, ensure_null_terminated: bool) -> Self {
        Self {
            length: if ensure_null_terminated {
                length.saturating_sub(1)
            } else {
                length
            },
            encoding: StringEncoding::Ascii,
            ensure_null_terminated,
            raise_on_truncate: false,
        }
    }

    /// Total bytes occupied in the stream
    pub fn field_length(&self) -> usize {
        self.length + usize::from(self.ensure_null_terminated)
    }

    /// Configured encoding
    pub fn encoding(&self) -> StringEncoding {
        self.encoding
    }

    /// Read the field and return its bytes with trailing padding removed
    pub fn read_encoded(&self, input: &mut dyn Read) -> Result<Vec<u8>, SerialisationError> {
        let bytes = read_exact_bytes(input, self.length)?;
        let encoded = trim_nulls(&bytes).to_vec();

        if self.ensure_null_terminated {
            read_exact_bytes(input, 1)?;
        }

        Ok(encoded)
    }
}

impl Serialiser for FixedLengthStringSerialiser {
    type Value = String;

    fn check(&self, value: &String) -> Result<(), SerialisationError> {
        let encoded = self.encoding.encode(value)?;

        if self.raise_on_truncate && encoded.len() > self.length {
            return Err(SerialisationError::Truncation {
                actual: encoded.len(),
                length: self.length,
            });
        }

        Ok(())
    }

    fn write_value(&self, value: &String, out: &mut dyn Write) -> Result<(), SerialisationError> {
        let mut field = self.encoding.encode(value)?;
        field.resize(self.length, NULL_BYTE);

        if self.ensure_null_terminated {
            field.push(NULL_BYTE);
        }

        out.write_all(&field)?;
        Ok(())
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<String, SerialisationError> {
        let encoded = self.read_encoded(input)?;
        self.encoding.decode(&encoded)
    }
}

/// String followed by a single null terminator.
///
/// Without a fixed length, reading consumes bytes until the first null and fails with a
/// shortfall if the stream ends first. With a fixed length the field is padded or
/// truncated to exactly that many bytes and its last byte forced to null, unless
/// `fixed_length_ignore_null` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullTerminatedStringSerialiser {
    encoding: StringEncoding,
    fixed_length: Option<usize>,
    fixed_length_ignore_null: bool,
}

impl NullTerminatedStringSerialiser {
    /// Unbounded null-terminated string
    pub const fn new(encoding: StringEncoding) -> Self {
        Self {
            encoding,
            fixed_length: None,
            fixed_length_ignore_null: false,
        }
    }

    /// Null-terminated string padded to a fixed field width
    pub fn fixed(
        encoding: StringEncoding,
        fixed_length: usize,
        ignore_null: bool,
    ) -> Result<Self, SerialisationError> {
        if fixed_length == 0 {
            return Err(SerialisationError::InvalidConfig(
                "fixed_length must be positive".to_string(),
            ));
        }

        Ok(Self {
            encoding,
            fixed_length: Some(fixed_length),
            fixed_length_ignore_null: ignore_null,
        })
    }

    /// Decode a string starting at `offset` in `buffer`, stopping at the first null or
    /// the end of the buffer
    pub fn read_at(&self, buffer: &[u8], offset: usize) -> Result<String, SerialisationError> {
        let tail = buffer.get(offset..).unwrap_or_default();
        let end = tail.iter().position(|&b| b == NULL_BYTE).unwrap_or(tail.len());
        self.encoding.decode(&tail[..end])
    }
}

impl Serialiser for NullTerminatedStringSerialiser {
    type Value = String;

    fn check(&self, value: &String) -> Result<(), SerialisationError> {
        self.encoding.encode(value).map(|_| ())
    }

    fn write_value(&self, value: &String, out: &mut dyn Write) -> Result<(), SerialisationError> {
        let mut field = self.encoding.encode(value)?;

        match self.fixed_length {
            Some(length) => {
                field.resize(length, NULL_BYTE);
                if !self.fixed_length_ignore_null {
                    field[length - 1] = NULL_BYTE;
                }
            }
            None => field.push(NULL_BYTE),
        }

        out.write_all(&field)?;
        Ok(())
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<String, SerialisationError> {
        let bytes = match self.fixed_length {
            Some(length) => read_exact_bytes(input, length)?,
            None => {
                let mut bytes = Vec::new();
                loop {
                    let byte = read_exact_bytes(input, 1).map_err(|_| {
                        SerialisationError::Shortfall {
                            required: bytes.len() + 1,
                            received: bytes.len(),
                        }
                    })?[0];
                    if byte == NULL_BYTE {
                        break;
                    }
                    bytes.push(byte);
                }
                bytes
            }
        };

        self.encoding.decode(trim_nulls(&bytes))
    }
}

/// String preceded by its encoded byte length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthPrefixedStringSerialiser<S = IntSerialiser> {
    encoding: StringEncoding,
    length_serialiser: S,
}

impl Default for LengthPrefixedStringSerialiser {
    fn default() -> Self {
        Self::new(StringEncoding::Utf8, IntSerialiser::default())
    }
}

impl<S> LengthPrefixedStringSerialiser<S>
where
    S: Serialiser<Value = i128>,
{
    /// Create a serialiser that writes the length with `length_serialiser`
    pub fn new(encoding: StringEncoding, length_serialiser: S) -> Self {
        Self {
            encoding,
            length_serialiser,
        }
    }
}

impl<S> Serialiser for LengthPrefixedStringSerialiser<S>
where
    S: Serialiser<Value = i128>,
{
    type Value = String;

    fn check(&self, value: &String) -> Result<(), SerialisationError> {
        let encoded = self.encoding.encode(value)?;
        self.length_serialiser.check(&(encoded.len() as i128))
    }

    fn write_value(&self, value: &String, out: &mut dyn Write) -> Result<(), SerialisationError> {
        let encoded = self.encoding.encode(value)?;
        self.length_serialiser
            .write_value(&(encoded.len() as i128), out)?;
        out.write_all(&encoded)?;
        Ok(())
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<String, SerialisationError> {
        let length = self.length_serialiser.read_value(input)?;
        let length = usize::try_from(length).map_err(|_| SerialisationError::OutOfRange {
            value: length.to_string(),
            num_bytes: 0,
        })?;

        let bytes = read_exact_bytes(input, length)?;
        self.encoding.decode(&bytes)
    }
}
