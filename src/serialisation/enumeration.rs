use std::fmt::Debug;
use std::io::{Read, Write};
use std::marker::PhantomData;

use super::{Endianness, IntSerialiser, SerialisationError, Serialiser};

/// An enumeration whose members map one-to-one onto integer codes
pub trait IntEnum: Copy + Eq + Debug + 'static {
    /// Name used in error messages
    const NAME: &'static str;

    /// Every member of the enumeration
    const VARIANTS: &'static [Self];

    /// The integer code of this member
    fn code(self) -> i128;

    /// Look up the member with the given code
    fn from_code(code: i128) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.code() == code)
    }
}

/// Serialises an [`IntEnum`] through an integer field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumSerialiser<E: IntEnum> {
    int_serialiser: IntSerialiser,
    _enum: PhantomData<E>,
}

impl<E: IntEnum> EnumSerialiser<E> {
    /// Create a serialiser whose integer field is exactly wide enough for every code.
    ///
    /// The field is signed only when some code is negative.
    pub fn new() -> Result<Self, SerialisationError> {
        let codes = E::VARIANTS.iter().map(|v| v.code());
        let (min, max) = match (codes.clone().min(), codes.max()) {
            (Some(min), Some(max)) => (min, max),
            _ => {
                return Err(SerialisationError::InvalidConfig(format!(
                    "{} has no members",
                    E::NAME
                )))
            }
        };

        let signed = min < 0;
        let bits = [min, max]
            .iter()
            .filter_map(|&code| IntSerialiser::bit_length_actual(code, signed))
            .max()
            .unwrap_or(1) as usize;

        Ok(Self {
            int_serialiser: IntSerialiser::new((bits + 7) / 8, signed, Endianness::Little)?,
            _enum: PhantomData,
        })
    }

    /// Use an explicit integer field; every code must fit it
    pub fn with_int_serialiser(int_serialiser: IntSerialiser) -> Result<Self, SerialisationError> {
        for variant in E::VARIANTS {
            int_serialiser.check(&variant.code()).map_err(|e| {
                SerialisationError::InvalidConfig(format!(
                    "Int serialiser unsuitable for {}: {}",
                    E::NAME,
                    e
                ))
            })?;
        }

        Ok(Self {
            int_serialiser,
            _enum: PhantomData,
        })
    }

    /// The underlying integer field
    pub fn int_serialiser(&self) -> IntSerialiser {
        self.int_serialiser
    }
}

impl<E: IntEnum> Serialiser for EnumSerialiser<E> {
    type Value = E;

    fn check(&self, value: &E) -> Result<(), SerialisationError> {
        self.int_serialiser.check(&value.code())
    }

    fn write_value(&self, value: &E, out: &mut dyn Write) -> Result<(), SerialisationError> {
        self.int_serialiser.write_value(&value.code(), out)
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<E, SerialisationError> {
        let code = self.int_serialiser.read_value(input)?;
        E::from_code(code).ok_or(SerialisationError::InvalidEnumValue {
            name: E::NAME,
            code,
        })
    }
}
