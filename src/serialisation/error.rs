/// Errors that can occur while serialising or deserialising binary values
#[derive(Debug, thiserror::Error)]
pub enum SerialisationError {
    /// I/O error on the underlying stream
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The stream ended before a fixed-width field was complete
    #[error("Failed to read enough data from stream (required {required} bytes, received {received})")]
    Shortfall {
        /// Bytes the field needs
        required: usize,
        /// Bytes that were available
        received: usize,
    },

    /// Integer does not fit the configured byte width
    #[error("Int magnitude is too big for current num_bytes setting ({value} won't fit in {num_bytes} byte(s))")]
    OutOfRange {
        /// The rejected value
        value: String,
        /// The configured width
        num_bytes: usize,
    },

    /// Negative value given to an unsigned field
    #[error("Can't serialise negative ints in unsigned mode (got {0})")]
    NegativeUnsigned(i128),

    /// Encoded string is longer than its fixed field and truncation is disallowed
    #[error("Encoded string of length {actual} will truncate to {length}")]
    Truncation {
        /// Encoded length of the string
        actual: usize,
        /// Width of the field
        length: usize,
    },

    /// Text could not be encoded or decoded with the configured encoding
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A boolean field held neither of the configured marker bytes
    #[error("Received invalid byte {0:#04x}")]
    InvalidBool(u8),

    /// Decoded integer is not a member of the target enumeration
    #[error("No {name} with code {code} found")]
    InvalidEnumValue {
        /// Enumeration name
        name: &'static str,
        /// The decoded code
        code: i128,
    },

    /// Date or timestamp outside the representable range
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Flag values do not belong to the serialiser's flag layout
    #[error("Invalid flags: {0}")]
    InvalidFlags(String),

    /// Serialiser was constructed with an unusable configuration
    #[error("Invalid serialiser configuration: {0}")]
    InvalidConfig(String),

    /// A sequence does not have the length the layout demands
    #[error("{what}: expected {expected} values, got {actual}")]
    LengthMismatch {
        /// The offending field
        what: &'static str,
        /// Required length
        expected: usize,
        /// Supplied length
        actual: usize,
    },
}
