use std::io::{Read, Write};

use log::warn;

use super::date::DateSerialiser;
use super::headers::{read_u16, time_serialiser};
use super::safe_string::SafeStringSerialiser;
use super::types::{ConstituentValues, DataBlock, SampleHeader, SampleInfo, MAX_CONSTITUENTS};
use crate::serialisation::{
    read_exact_bytes, skip_bytes, write_zeros, BoolSerialiser, FloatSerialiser, IntSerialiser,
    SecondsSinceEpochSerialiser, SerialisationError, Serialiser,
};

/// Reserved bytes closing a sample header
const SAMPLE_HEADER_PADDING: usize = 38;

/// Floats per data-block alignment unit
const DATA_BLOCK_ALIGNMENT: usize = 32;

/// Width of one single-precision slot
const FLOAT_WIDTH: usize = 4;

const SAMPLE_NO: SafeStringSerialiser = SafeStringSerialiser::new(13, false);
const CLIENT: SafeStringSerialiser = SafeStringSerialiser::new(9, false);
const SAMPLE_ID_1: SafeStringSerialiser = SafeStringSerialiser::new(50, false);
const SAMPLE_ID_2: SafeStringSerialiser = SafeStringSerialiser::new(50, false);
const SAMPLE_ID_3: SafeStringSerialiser = SafeStringSerialiser::new(51, true);
const OPERATOR: SafeStringSerialiser = SafeStringSerialiser::new(32, false);

/// Serialiser for the 256-byte [`SampleHeader`]
#[derive(Debug, Clone)]
pub struct SampleHeaderSerialiser {
    time_serialiser: SecondsSinceEpochSerialiser,
}

impl Default for SampleHeaderSerialiser {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleHeaderSerialiser {
    /// Create the serialiser
    pub fn new() -> Self {
        Self {
            time_serialiser: time_serialiser(),
        }
    }
}

impl Serialiser for SampleHeaderSerialiser {
    type Value = SampleHeader;

    fn check(&self, value: &SampleHeader) -> Result<(), SerialisationError> {
        SAMPLE_NO.check(&value.sample_no)?;
        DateSerialiser.check(&value.date)?;
        CLIENT.check(&value.client)?;
        SAMPLE_ID_1.check(&value.sample_id_1)?;
        SAMPLE_ID_2.check(&value.sample_id_2)?;
        SAMPLE_ID_3.check(&value.sample_id_3)?;
        OPERATOR.check(&value.operator)?;
        self.time_serialiser.check(&value.time)
    }

    fn write_value(
        &self,
        value: &SampleHeader,
        out: &mut dyn Write,
    ) -> Result<(), SerialisationError> {
        SAMPLE_NO.write_value(&value.sample_no, out)?;
        IntSerialiser::U16.write_value(&i128::from(value.sequence), out)?;
        BoolSerialiser::default().write_value(&value.deleted, out)?;
        DateSerialiser.write_value(&value.date, out)?;
        IntSerialiser::U16.write_value(&i128::from(value.product_code), out)?;
        CLIENT.write_value(&value.client, out)?;
        SAMPLE_ID_1.write_value(&value.sample_id_1, out)?;
        SAMPLE_ID_2.write_value(&value.sample_id_2, out)?;
        SAMPLE_ID_3.write_value(&value.sample_id_3, out)?;
        OPERATOR.write_value(&value.operator, out)?;
        IntSerialiser::U16.write_value(&i128::from(value.standardised), out)?;
        self.time_serialiser.write_value(&value.time, out)?;
        write_zeros(out, SAMPLE_HEADER_PADDING)
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<SampleHeader, SerialisationError> {
        let header = SampleHeader {
            sample_no: SAMPLE_NO.read_value(input)?,
            sequence: read_u16(input)?,
            deleted: BoolSerialiser::default().read_value(input)?,
            date: DateSerialiser.read_value(input)?,
            product_code: read_u16(input)?,
            client: CLIENT.read_value(input)?,
            sample_id_1: SAMPLE_ID_1.read_value(input)?,
            sample_id_2: SAMPLE_ID_2.read_value(input)?,
            sample_id_3: SAMPLE_ID_3.read_value(input)?,
            operator: OPERATOR.read_value(input)?,
            standardised: read_u16(input)?,
            time: self.time_serialiser.read_value(input)?,
        };
        skip_bytes(input, SAMPLE_HEADER_PADDING)?;
        Ok(header)
    }
}

/// Serialiser for a [`DataBlock`] of a fixed point count.
///
/// The amplitudes are followed by zero padding up to the next multiple of 32 floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBlockSerialiser {
    count: usize,
}

impl DataBlockSerialiser {
    /// Create a serialiser for blocks of `count` amplitudes
    pub fn new(count: usize) -> Result<Self, SerialisationError> {
        if count < 1 {
            return Err(SerialisationError::InvalidConfig(format!(
                "count must be at least one (was {})",
                count
            )));
        }
        Ok(Self { count })
    }

    /// Number of amplitudes per block
    pub fn count(&self) -> usize {
        self.count
    }

    /// Zero bytes following the amplitudes
    pub fn padding_length(&self) -> usize {
        ((DATA_BLOCK_ALIGNMENT - self.count % DATA_BLOCK_ALIGNMENT) % DATA_BLOCK_ALIGNMENT)
            * FLOAT_WIDTH
    }

    /// Total bytes occupied in the stream
    pub fn block_length(&self) -> usize {
        self.count * FLOAT_WIDTH + self.padding_length()
    }
}

impl Serialiser for DataBlockSerialiser {
    type Value = DataBlock;

    fn check(&self, value: &DataBlock) -> Result<(), SerialisationError> {
        if value.data.len() != self.count {
            return Err(SerialisationError::LengthMismatch {
                what: "data block amplitudes",
                expected: self.count,
                actual: value.data.len(),
            });
        }
        Ok(())
    }

    fn write_value(&self, value: &DataBlock, out: &mut dyn Write) -> Result<(), SerialisationError> {
        for &amplitude in &value.data {
            FloatSerialiser::F32.write_value(&f64::from(amplitude), out)?;
        }
        write_zeros(out, self.padding_length())
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<DataBlock, SerialisationError> {
        let data = (0..self.count)
            .map(|_| FloatSerialiser::F32.read_value(&mut *input).map(|v| v as f32))
            .collect::<Result<Vec<_>, _>>()?;
        skip_bytes(input, self.padding_length())?;
        Ok(DataBlock { data })
    }
}

/// Serialiser for the 32-slot [`ConstituentValues`] region.
///
/// Reading stops at the first all-zero slot, so a genuine value of exactly `0.0` ends the
/// list early. That is a limitation of the layout itself; the remaining slots are still
/// consumed to keep the stream aligned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstituentValuesSerialiser;

impl Serialiser for ConstituentValuesSerialiser {
    type Value = ConstituentValues;

    fn check(&self, _value: &ConstituentValues) -> Result<(), SerialisationError> {
        Ok(())
    }

    fn write_value(
        &self,
        value: &ConstituentValues,
        out: &mut dyn Write,
    ) -> Result<(), SerialisationError> {
        let num_constituents = value.constituents.len();
        if num_constituents > MAX_CONSTITUENTS {
            warn!(
                "More than {} constituents specified ({}). Using {}",
                MAX_CONSTITUENTS, num_constituents, MAX_CONSTITUENTS
            );
        }

        let written = &value.constituents[..num_constituents.min(MAX_CONSTITUENTS)];
        for &constituent in written {
            FloatSerialiser::F32.write_value(&f64::from(constituent), out)?;
        }
        write_zeros(out, (MAX_CONSTITUENTS - written.len()) * FLOAT_WIDTH)
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<ConstituentValues, SerialisationError> {
        let mut constituents = Vec::new();

        while constituents.len() < MAX_CONSTITUENTS {
            let word = read_exact_bytes(input, FLOAT_WIDTH)?;
            if word.iter().all(|&b| b == 0) {
                // One padding word is already consumed
                skip_bytes(input, (MAX_CONSTITUENTS - 1 - constituents.len()) * FLOAT_WIDTH)?;
                break;
            }
            constituents.push(FloatSerialiser::F32.deserialise_from_bytes(&word)? as f32);
        }

        Ok(ConstituentValues { constituents })
    }
}

const SAMPLE_ID: SafeStringSerialiser = SafeStringSerialiser::new(13, false);

/// Serialiser for the 16-byte [`SampleInfo`] footer
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleInfoSerialiser;

impl Serialiser for SampleInfoSerialiser {
    type Value = SampleInfo;

    fn check(&self, value: &SampleInfo) -> Result<(), SerialisationError> {
        SAMPLE_ID.check(&value.sample_id)
    }

    fn write_value(&self, value: &SampleInfo, out: &mut dyn Write) -> Result<(), SerialisationError> {
        SAMPLE_ID.write_value(&value.sample_id, out)?;
        IntSerialiser::U16.write_value(&i128::from(value.sequence), out)?;
        BoolSerialiser::default().write_value(&value.deleted, out)
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<SampleInfo, SerialisationError> {
        Ok(SampleInfo {
            sample_id: SAMPLE_ID.read_value(input)?,
            sequence: read_u16(input)?,
            deleted: BoolSerialiser::default().read_value(input)?,
        })
    }
}
