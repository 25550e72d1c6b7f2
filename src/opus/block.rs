use std::fmt;

use super::constants::BLOCK_TYPE_SPEC_MASK;
use super::search::find_forward;
use crate::serialisation::{
    FloatSerialiser, IntSerialiser, NullTerminatedStringSerialiser, Serialiser, StringEncoding,
};

/// One entry of the OPUS block directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockDefinition {
    /// Block type code
    pub block_type: u32,
    /// Length in 4-byte words
    pub length_blocks: u32,
    /// Byte offset of the block in the file
    pub offset: u32,
}

impl BlockDefinition {
    /// Length in bytes
    pub fn length_bytes(&self) -> u64 {
        u64::from(self.length_blocks) * 4
    }
}

impl fmt::Display for BlockDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={}, lenBlocks={}, lenBytes={}, offset={}",
            self.block_type,
            self.length_blocks,
            self.length_bytes(),
            self.offset
        )
    }
}

/// A view of one block within the file image.
///
/// `start` and `end` are inclusive byte offsets; `end` is clamped to the last byte of
/// the buffer. Getters take offsets relative to `start` and return `None` when the
/// value would run past the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Block<'a> {
    buffer: &'a [u8],
    /// Index of the defining directory entry
    pub definition: usize,
    /// First byte of the block
    pub start: usize,
    /// Last byte of the block
    pub end: usize,
    /// Block type code
    pub block_type: u32,
    /// Three-letter name sniffed from the first bytes, if alphabetic
    pub name: Option<String>,
}

impl<'a> Block<'a> {
    /// Create a view over `buffer[start..=end]`
    pub fn new(buffer: &'a [u8], definition: usize, start: usize, end: usize, block_type: u32) -> Self {
        let end = end.min(buffer.len().saturating_sub(1));

        let name = buffer
            .get(start..start + 3)
            .filter(|_| buffer.len() > 3)
            .filter(|bytes| bytes.iter().all(u8::is_ascii_alphabetic))
            .map(|bytes| bytes.iter().map(|&b| b as char).collect());

        Self {
            buffer,
            definition,
            start,
            end,
            block_type,
            name,
        }
    }

    /// Block type restricted to the spectral sub-type bits
    pub fn masked_type(&self) -> u32 {
        self.block_type & BLOCK_TYPE_SPEC_MASK
    }

    /// Size of the block in bytes
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    /// Whether the block covers no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bytes covered by the block
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buffer
            .get(self.start..=self.end)
            .unwrap_or_default()
    }

    /// Offset of `id` relative to the block start, searching forwards.
    /// The match may end on the block's last byte.
    pub fn find_id(&self, id: &[u8]) -> Option<usize> {
        find_forward(self.buffer, id, self.start, self.end).map(|pos| pos - self.start)
    }

    /// Whether `id` occurs in the block
    pub fn has_id(&self, id: &[u8]) -> bool {
        self.find_id(id).is_some()
    }

    /// Read a value `offset` bytes past the tag `id`
    pub fn get_from_id<T>(
        &self,
        id: &[u8],
        offset: usize,
        get: impl Fn(&Self, usize) -> Option<T>,
    ) -> Option<T> {
        let pos = self.find_id(id)?;
        get(self, pos + offset)
    }

    fn tail(&self, offset: usize) -> Option<&'a [u8]> {
        self.buffer.get(self.start.checked_add(offset)?..)
    }

    /// Unsigned 32-bit integer
    pub fn get_int(&self, offset: usize) -> Option<u32> {
        let value = IntSerialiser::U32.deserialise_from_bytes(self.tail(offset)?).ok()?;
        u32::try_from(value).ok()
    }

    /// Single-precision float
    pub fn get_float(&self, offset: usize) -> Option<f32> {
        FloatSerialiser::F32
            .deserialise_from_bytes(self.tail(offset)?)
            .ok()
            .map(|v| v as f32)
    }

    /// Double-precision float
    pub fn get_double(&self, offset: usize) -> Option<f64> {
        FloatSerialiser::F64.deserialise_from_bytes(self.tail(offset)?).ok()
    }

    /// ASCII text up to the next null or the end of the file
    pub fn get_text(&self, offset: usize) -> Option<String> {
        NullTerminatedStringSerialiser::new(StringEncoding::Ascii)
            .read_at(self.buffer, self.start.checked_add(offset)?)
            .ok()
    }
}

impl fmt::Display for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "definition={}, type={}, maskedTypeHex={:05x}, name={}, start={}, end={}",
            self.definition,
            self.block_type,
            self.masked_type(),
            self.name.as_deref().unwrap_or("None"),
            self.start,
            self.end
        )
    }
}
