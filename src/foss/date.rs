use std::io::{Read, Write};

use chrono::{Datelike, NaiveDate};

use crate::serialisation::{IntSerialiser, SerialisationError, Serialiser};

const BASE_YEAR: i32 = 1980;

/// Highest year the 7-bit year field can hold
const MAX_YEAR: i32 = BASE_YEAR + 0x7F;

/// Calendar date packed into two little-endian bytes.
///
/// ```text
/// LSB: MMMDDDDD
/// MSB: YYYYYYYM   (years since 1980)
/// ```
///
/// Two zero bytes decode as 1980-01-01, although that date itself encodes as `0x0021`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateSerialiser;

impl DateSerialiser {
    fn pack(date: &NaiveDate) -> i128 {
        let year = i128::from(date.year() - BASE_YEAR);
        (year << 9) | (i128::from(date.month()) << 5) | i128::from(date.day())
    }
}

impl Serialiser for DateSerialiser {
    type Value = NaiveDate;

    fn check(&self, value: &NaiveDate) -> Result<(), SerialisationError> {
        if !(BASE_YEAR..=MAX_YEAR).contains(&value.year()) {
            return Err(SerialisationError::InvalidDate(format!(
                "{} is outside {}..={}",
                value, BASE_YEAR, MAX_YEAR
            )));
        }
        Ok(())
    }

    fn write_value(&self, value: &NaiveDate, out: &mut dyn Write) -> Result<(), SerialisationError> {
        IntSerialiser::U16.write_value(&Self::pack(value), out)
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<NaiveDate, SerialisationError> {
        let combined = IntSerialiser::U16.read_value(input)?;

        if combined == 0 {
            return NaiveDate::from_ymd_opt(BASE_YEAR, 1, 1)
                .ok_or_else(|| SerialisationError::InvalidDate("1980-01-01".to_string()));
        }

        let day = (combined & 0x1F) as u32;
        let month = ((combined >> 5) & 0xF) as u32;
        let year = (combined >> 9) as i32 + BASE_YEAR;

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            SerialisationError::InvalidDate(format!(
                "packed date {:#06x} gives year {} month {} day {}",
                combined, year, month, day
            ))
        })
    }
}
