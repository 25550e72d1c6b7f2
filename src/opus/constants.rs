//! Fixed offsets, block type codes and field tags of the OPUS layout

/// Offset of the first block definition in the header
pub const BLOCK_OFFSET: usize = 36;

/// Upper bound of the header region scanned for block definitions
pub const HEADER_LENGTH: usize = 500;

/// Size of one block definition record (type, length, offset)
pub const BLOCK_DEFINITION_LENGTH: usize = 12;

/// Block type of unused directory entries
pub const BLOCK_TYPE_DUMMY: u32 = 0;

/// Block type of text (log) blocks
pub const BLOCK_TYPE_TEXT: u32 = 1080557568;

/// Mask selecting the spectral sub-type of a data block
pub const BLOCK_TYPE_SPEC_MASK: u32 = 0x000F_FFFF;

/// Masked block type of the main spectrum
pub const BLOCK_TYPE_MAIN_MASK: u32 = 0x100F;

/// Difference between a DPF block's type and its data block's type
pub const BLOCK_TYPE_INCREMENT_DATA_TO_DPF: u32 = 16;

/// Offset from a field tag to its value
pub const FIELD_VALUE_OFFSET: usize = 8;

/// Number of points
pub const NPT: &[u8; 4] = b"NPT\0";

/// First x value
pub const FXV: &[u8; 4] = b"FXV\0";

/// Last x value
pub const LXV: &[u8; 4] = b"LXV\0";

/// Y scaling factor
pub const CSF: &[u8; 4] = b"CSF\0";

/// Instrument name
pub const INS: &[u8; 4] = b"INS\0";

/// Name of data-parameter blocks
pub const BLOCK_NAME_DPF: &str = "DPF";

/// Name of the instrument-parameter block
pub const BLOCK_NAME_HFL: &str = "HFL";

/// Marker of command-line log entries
pub const KEYWORD_CMDLINE: &str = "COMMAND_LINE";

/// Operation whose command line carries the sample ID
pub const OPERATION_MEASURE_SAMPLE: &str = "MeasureSample";

/// Command-line key holding the sample ID
pub const KEY_SAMPLE_ID_2: &str = "SNM";
