use std::collections::HashSet;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use super::{read_exact_bytes, SerialisationError, Serialiser};

/// Flag name marking a bit position as unused
pub const UNUSED: &str = "";

const RESERVED_WORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Layout shared by a serialiser and every [`Flags`] value it produces
#[derive(Debug, PartialEq, Eq)]
struct FlagSpec {
    /// Names in declaration order; index 0 is the most significant bit
    names: Vec<String>,
}

impl FlagSpec {
    fn num_flags(&self) -> usize {
        self.names.len()
    }

    fn bit_position(&self, name: &str) -> Option<usize> {
        if name == UNUSED {
            return None;
        }
        self.names
            .iter()
            .position(|n| n == name)
            .map(|index| self.num_flags() - index - 1)
    }

    fn named(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        let num_flags = self.num_flags();
        self.names
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() != UNUSED)
            .map(move |(index, name)| (name.as_str(), num_flags - index - 1))
    }
}

fn check_flag_names(names: &[&str]) -> Result<(), SerialisationError> {
    if names.is_empty() {
        return Err(SerialisationError::InvalidConfig(
            "No flag names supplied".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for &name in names.iter().filter(|&&n| n != UNUSED) {
        if name.starts_with('_') {
            return Err(SerialisationError::InvalidConfig(format!(
                "'{}' is not a valid flag name because it starts with an underscore",
                name
            )));
        }
        if !seen.insert(name) {
            return Err(SerialisationError::InvalidConfig(format!(
                "'{}' is specified more than once",
                name
            )));
        }

        let mut chars = name.chars();
        let valid_start = chars.next().is_some_and(char::is_alphabetic);
        if !valid_start || !chars.all(|c| c.is_alphanumeric() || c == '_') {
            return Err(SerialisationError::InvalidConfig(format!(
                "'{}' is not a valid flag name (not an identifier)",
                name
            )));
        }
        if RESERVED_WORDS.contains(&name) {
            return Err(SerialisationError::InvalidConfig(format!(
                "'{}' is not a valid flag name (reserved keyword)",
                name
            )));
        }
    }

    Ok(())
}

/// Packs named boolean flags into whole bytes.
///
/// The first declared flag occupies the most significant bit position (`num_flags - 1`)
/// and the bytes are written big-endian, so a single-byte field reads left to right in
/// declaration order. [`UNUSED`] names reserve a bit without making it addressable.
#[derive(Debug, Clone)]
pub struct FlagSerialiser {
    spec: Arc<FlagSpec>,
}

impl FlagSerialiser {
    /// Create a serialiser for the given flag names, most significant first
    pub fn new(names: &[&str]) -> Result<Self, SerialisationError> {
        check_flag_names(names)?;

        Ok(Self {
            spec: Arc::new(FlagSpec {
                names: names.iter().map(|n| n.to_string()).collect(),
            }),
        })
    }

    /// Number of bit positions, including unused ones
    pub fn num_flags(&self) -> usize {
        self.spec.num_flags()
    }

    /// Number of bytes occupied in the stream
    pub fn num_bytes(&self) -> usize {
        (self.num_flags() + 7) / 8
    }

    /// Named flags with their bit positions, in declaration order
    pub fn flags(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.spec.named()
    }

    /// Whether a flag with this name exists
    pub fn has_flag(&self, name: &str) -> bool {
        self.spec.bit_position(name).is_some()
    }

    /// Bit position of a named flag
    pub fn bit_position(&self, name: &str) -> Result<usize, SerialisationError> {
        self.spec.bit_position(name).ok_or_else(|| {
            SerialisationError::InvalidFlags(format!("Serialiser has no flag named '{}'", name))
        })
    }

    /// Build a flag set.
    ///
    /// `positional` values fill the most significant positions in declaration order;
    /// `named` values set any remaining flags. Flags given neither way are `false`.
    pub fn flags_from(
        &self,
        positional: &[bool],
        named: &[(&str, bool)],
    ) -> Result<Flags, SerialisationError> {
        let num_flags = self.num_flags();
        if positional.len() > num_flags {
            return Err(SerialisationError::InvalidFlags(format!(
                "Received {} positional flag values but expected at most {}",
                positional.len(),
                num_flags
            )));
        }

        let mut values = positional.to_vec();
        values.resize(num_flags, false);

        let first_unset = num_flags - positional.len();
        for &(name, value) in named {
            let position = self.bit_position(name)?;
            if position >= first_unset {
                return Err(SerialisationError::InvalidFlags(format!(
                    "Flag '{}' specified by name and position",
                    name
                )));
            }
            values[num_flags - position - 1] = value;
        }

        Ok(Flags {
            spec: Arc::clone(&self.spec),
            values,
        })
    }
}

/// An immutable set of flag values tied to the serialiser that defined them
#[derive(Debug, Clone)]
pub struct Flags {
    spec: Arc<FlagSpec>,
    values: Vec<bool>,
}

impl Flags {
    fn index(&self, position: usize) -> Result<usize, SerialisationError> {
        let num_flags = self.spec.num_flags();
        if position >= num_flags {
            return Err(SerialisationError::InvalidFlags(format!(
                "Flag bit-position {} is out of range [0,{})",
                position, num_flags
            )));
        }
        Ok(num_flags - position - 1)
    }

    /// Value of the flag at a bit position
    pub fn bit(&self, position: usize) -> Result<bool, SerialisationError> {
        Ok(self.values[self.index(position)?])
    }

    /// Value of a named flag
    pub fn get(&self, name: &str) -> Result<bool, SerialisationError> {
        let position = self.spec.bit_position(name).ok_or_else(|| {
            SerialisationError::InvalidFlags(format!("Invalid flag name '{}'", name))
        })?;
        self.bit(position)
    }

    /// `(bit_position, value)` pairs from bit 0 upwards
    pub fn enumerate(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.values.iter().rev().copied().enumerate()
    }
}

impl PartialEq for Flags {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.spec, &other.spec) && self.values == other.values
    }
}

impl Eq for Flags {}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .spec
            .named()
            .map(|(name, position)| {
                format!("{}={}", name, self.values[self.spec.num_flags() - position - 1])
            })
            .collect();
        write!(f, "Flags({})", rendered.join(", "))
    }
}

impl Serialiser for FlagSerialiser {
    type Value = Flags;

    fn check(&self, value: &Flags) -> Result<(), SerialisationError> {
        if !Arc::ptr_eq(&value.spec, &self.spec) {
            return Err(SerialisationError::InvalidFlags(
                "Supplied flags are not from the serialiser's flag layout".to_string(),
            ));
        }
        Ok(())
    }

    fn write_value(&self, value: &Flags, out: &mut dyn Write) -> Result<(), SerialisationError> {
        let num_bytes = self.num_bytes();
        let mut bytes = vec![0u8; num_bytes];

        for (position, set) in value.enumerate() {
            if set {
                bytes[num_bytes - 1 - position / 8] |= 1 << (position % 8);
            }
        }

        out.write_all(&bytes)?;
        Ok(())
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<Flags, SerialisationError> {
        let num_bytes = self.num_bytes();
        let bytes = read_exact_bytes(input, num_bytes)?;

        let values = (0..self.num_flags())
            .rev()
            .map(|position| (bytes[num_bytes - 1 - position / 8] >> (position % 8)) & 1 == 1)
            .collect();

        Ok(Flags {
            spec: Arc::clone(&self.spec),
            values,
        })
    }
}
