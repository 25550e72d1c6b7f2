use std::io::{Read, Write};

use chrono::{NaiveDateTime, TimeDelta};

use super::{IntSerialiser, SerialisationError, Serialiser};

/// Timestamp stored as whole seconds elapsed since an epoch.
///
/// Sub-second precision is truncated toward zero on write. The default epoch is the
/// Unix epoch and the default count is a little-endian signed 32-bit integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondsSinceEpochSerialiser<S = IntSerialiser> {
    epoch: NaiveDateTime,
    int_serialiser: S,
}

impl Default for SecondsSinceEpochSerialiser {
    fn default() -> Self {
        Self::new(NaiveDateTime::default(), IntSerialiser::default())
    }
}

impl<S> SecondsSinceEpochSerialiser<S>
where
    S: Serialiser<Value = i128>,
{
    /// Create a serialiser relative to `epoch`
    pub fn new(epoch: NaiveDateTime, int_serialiser: S) -> Self {
        Self {
            epoch,
            int_serialiser,
        }
    }

    /// The configured epoch
    pub fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    fn seconds_since_epoch(&self, value: &NaiveDateTime) -> i128 {
        i128::from((*value - self.epoch).num_seconds())
    }
}

impl<S> Serialiser for SecondsSinceEpochSerialiser<S>
where
    S: Serialiser<Value = i128>,
{
    type Value = NaiveDateTime;

    fn check(&self, value: &NaiveDateTime) -> Result<(), SerialisationError> {
        self.int_serialiser.check(&self.seconds_since_epoch(value))
    }

    fn write_value(
        &self,
        value: &NaiveDateTime,
        out: &mut dyn Write,
    ) -> Result<(), SerialisationError> {
        self.int_serialiser
            .write_value(&self.seconds_since_epoch(value), out)
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<NaiveDateTime, SerialisationError> {
        let seconds = self.int_serialiser.read_value(input)?;

        i64::try_from(seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| self.epoch.checked_add_signed(delta))
            .ok_or_else(|| {
                SerialisationError::InvalidDate(format!(
                    "{} seconds from {} is not representable",
                    seconds, self.epoch
                ))
            })
    }
}
