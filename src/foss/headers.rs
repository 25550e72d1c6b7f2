use std::io::{Read, Write};

use chrono::NaiveDateTime;

use super::date::DateSerialiser;
use super::safe_string::SafeStringSerialiser;
use super::types::{
    GeneralHeader, InstrumentHeader, InstrumentType, MAX_CONSTITUENTS, MAX_SEGMENTS,
    NUM_WAVE_VALUES,
};
use crate::serialisation::{
    skip_bytes, write_zeros, EnumSerialiser, FloatSerialiser, IntSerialiser,
    SecondsSinceEpochSerialiser, SerialisationError, Serialiser,
};

/// Reserved bytes between `neoc` and the constituent names
const INSTRUMENT_HEADER_PADDING: usize = 94;

const FILE_ID: SafeStringSerialiser = SafeStringSerialiser::new(71, false);
const MASTER: SafeStringSerialiser = SafeStringSerialiser::new(9, false);
const PACKING: SafeStringSerialiser = SafeStringSerialiser::new(30, false);
const MODEL: SafeStringSerialiser = SafeStringSerialiser::new(21, false);
const SERIAL: SafeStringSerialiser = SafeStringSerialiser::new(9, false);
const CONSTITUENT_NAME: SafeStringSerialiser = SafeStringSerialiser::new(16, false);

/// Convert a record field to the integer serialisers' value type
fn u16_value(value: u16) -> i128 {
    i128::from(value)
}

/// Read a 2-byte unsigned field
pub(crate) fn read_u16(input: &mut dyn Read) -> Result<u16, SerialisationError> {
    // U16 never yields a value outside u16
    Ok(IntSerialiser::U16.read_value(input)? as u16)
}

/// Unsigned 32-bit seconds since the Unix epoch
pub(crate) fn time_serialiser() -> SecondsSinceEpochSerialiser {
    SecondsSinceEpochSerialiser::new(NaiveDateTime::default(), IntSerialiser::U32)
}

/// Serialiser for the 128-byte [`GeneralHeader`]
#[derive(Debug, Clone)]
pub struct GeneralHeaderSerialiser {
    time_serialiser: SecondsSinceEpochSerialiser,
}

impl Default for GeneralHeaderSerialiser {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneralHeaderSerialiser {
    /// Create the serialiser
    pub fn new() -> Self {
        Self {
            time_serialiser: time_serialiser(),
        }
    }
}

impl Serialiser for GeneralHeaderSerialiser {
    type Value = GeneralHeader;

    fn check(&self, value: &GeneralHeader) -> Result<(), SerialisationError> {
        DateSerialiser.check(&value.creation_date)?;
        self.time_serialiser.check(&value.time)?;
        FILE_ID.check(&value.file_id)?;
        MASTER.check(&value.master)?;
        PACKING.check(&value.packing)
    }

    fn write_value(
        &self,
        value: &GeneralHeader,
        out: &mut dyn Write,
    ) -> Result<(), SerialisationError> {
        for field in [
            value.file_type,
            value.count,
            value.deleted,
            value.num_points,
            value.num_consts,
        ] {
            IntSerialiser::U16.write_value(&u16_value(field), out)?;
        }
        DateSerialiser.write_value(&value.creation_date, out)?;
        self.time_serialiser.write_value(&value.time, out)?;
        IntSerialiser::U16.write_value(&u16_value(value.most_recent), out)?;
        FILE_ID.write_value(&value.file_id, out)?;
        MASTER.write_value(&value.master, out)?;
        PACKING.write_value(&value.packing, out)
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<GeneralHeader, SerialisationError> {
        Ok(GeneralHeader {
            file_type: read_u16(input)?,
            count: read_u16(input)?,
            deleted: read_u16(input)?,
            num_points: read_u16(input)?,
            num_consts: read_u16(input)?,
            creation_date: DateSerialiser.read_value(input)?,
            time: self.time_serialiser.read_value(input)?,
            most_recent: read_u16(input)?,
            file_id: FILE_ID.read_value(input)?,
            master: MASTER.read_value(input)?,
            packing: PACKING.read_value(input)?,
        })
    }
}

/// Serialiser for the 768-byte [`InstrumentHeader`]
#[derive(Debug, Clone)]
pub struct InstrumentHeaderSerialiser {
    instrument_type: EnumSerialiser<InstrumentType>,
}

impl InstrumentHeaderSerialiser {
    /// Create the serialiser
    pub fn new() -> Result<Self, SerialisationError> {
        Ok(Self {
            instrument_type: EnumSerialiser::with_int_serialiser(IntSerialiser::U16)?,
        })
    }
}

impl Serialiser for InstrumentHeaderSerialiser {
    type Value = InstrumentHeader;

    fn check(&self, value: &InstrumentHeader) -> Result<(), SerialisationError> {
        if value.constituents.len() != MAX_CONSTITUENTS {
            return Err(SerialisationError::LengthMismatch {
                what: "constituent names",
                expected: MAX_CONSTITUENTS,
                actual: value.constituents.len(),
            });
        }

        self.instrument_type.check(&value.instrument_type)?;
        MODEL.check(&value.model)?;
        SERIAL.check(&value.serial)?;
        for wave in value.wave {
            FloatSerialiser::F32.check(&f64::from(wave))?;
        }
        value
            .constituents
            .iter()
            .try_for_each(|name| CONSTITUENT_NAME.check(name))
    }

    fn write_value(
        &self,
        value: &InstrumentHeader,
        out: &mut dyn Write,
    ) -> Result<(), SerialisationError> {
        self.instrument_type.write_value(&value.instrument_type, out)?;
        MODEL.write_value(&value.model, out)?;
        SERIAL.write_value(&value.serial, out)?;
        IntSerialiser::U16.write_value(&u16_value(value.num_seg), out)?;
        for points in value.points_per_segment {
            IntSerialiser::U16.write_value(&u16_value(points), out)?;
        }
        IntSerialiser::U16.write_value(&u16_value(value.spacing_mode), out)?;
        for wave in value.wave {
            FloatSerialiser::F32.write_value(&f64::from(wave), out)?;
        }
        IntSerialiser::U16.write_value(&u16_value(value.neoc), out)?;
        write_zeros(out, INSTRUMENT_HEADER_PADDING)?;

        for name in &value.constituents {
            CONSTITUENT_NAME.write_value(name, out)?;
        }
        Ok(())
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<InstrumentHeader, SerialisationError> {
        let instrument_type = self.instrument_type.read_value(input)?;
        let model = MODEL.read_value(input)?;
        let serial = SERIAL.read_value(input)?;
        let num_seg = read_u16(input)?;

        let mut points_per_segment = [0u16; MAX_SEGMENTS];
        for points in points_per_segment.iter_mut() {
            *points = read_u16(input)?;
        }

        let spacing_mode = read_u16(input)?;

        let mut wave = [0f32; NUM_WAVE_VALUES];
        for value in wave.iter_mut() {
            *value = FloatSerialiser::F32.read_value(input)? as f32;
        }

        let neoc = read_u16(input)?;
        skip_bytes(input, INSTRUMENT_HEADER_PADDING)?;

        let constituents = (0..MAX_CONSTITUENTS)
            .map(|_| CONSTITUENT_NAME.read_value(&mut *input))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(InstrumentHeader {
            instrument_type,
            model,
            serial,
            num_seg,
            points_per_segment,
            spacing_mode,
            wave,
            neoc,
            constituents,
        })
    }
}
