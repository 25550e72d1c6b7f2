//! The common in-memory spectrum value shared by every format.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default sample identifier for spectra whose file carries none
pub const DEFAULT_SAMPLE_ID: &str = "noid";

/// Errors raised when constructing a spectrum
#[derive(Debug, thiserror::Error)]
pub enum SpectrumError {
    /// Wave numbers and amplitudes must pair up
    #[error("Lists with wave numbers and amplitudes must have same length: {waves} != {amplitudes}")]
    LengthMismatch {
        /// Number of wave numbers supplied
        waves: usize,
        /// Number of amplitudes supplied
        amplitudes: usize,
    },
}

/// A single metadata value attached to a spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    /// Boolean flag
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// Free text
    Text(String),
}

impl SampleValue {
    /// Interpret the value as a number, parsing text if needed
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SampleValue::Number(value) => Some(*value),
            SampleValue::Text(text) => text.trim().parse().ok(),
            SampleValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        }
    }

    /// Parse text as a number when possible, keeping it as text otherwise
    pub fn from_text_or_number(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(value) => SampleValue::Number(value),
            Err(_) => SampleValue::Text(text.to_string()),
        }
    }
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleValue::Bool(flag) => write!(f, "{}", flag),
            SampleValue::Number(value) => write!(f, "{}", value),
            SampleValue::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<&str> for SampleValue {
    fn from(text: &str) -> Self {
        SampleValue::Text(text.to_string())
    }
}

impl From<String> for SampleValue {
    fn from(text: String) -> Self {
        SampleValue::Text(text)
    }
}

impl From<f64> for SampleValue {
    fn from(value: f64) -> Self {
        SampleValue::Number(value)
    }
}

impl From<bool> for SampleValue {
    fn from(flag: bool) -> Self {
        SampleValue::Bool(flag)
    }
}

/// Spectral data and sample metadata for one measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Sample identifier
    pub id: String,
    waves: Vec<f64>,
    amplitudes: Vec<f64>,
    /// Sample metadata (reference values, instrument settings, ...)
    pub sample_data: BTreeMap<String, SampleValue>,
}

impl Spectrum {
    /// Create a spectrum, checking that every wave number has an amplitude
    pub fn new(
        id: impl Into<String>,
        waves: Vec<f64>,
        amplitudes: Vec<f64>,
        sample_data: BTreeMap<String, SampleValue>,
    ) -> Result<Self, SpectrumError> {
        if waves.len() != amplitudes.len() {
            return Err(SpectrumError::LengthMismatch {
                waves: waves.len(),
                amplitudes: amplitudes.len(),
            });
        }

        Ok(Self {
            id: id.into(),
            waves,
            amplitudes,
            sample_data,
        })
    }

    /// Create a spectrum without sample metadata
    pub fn from_points(
        id: impl Into<String>,
        waves: Vec<f64>,
        amplitudes: Vec<f64>,
    ) -> Result<Self, SpectrumError> {
        Self::new(id, waves, amplitudes, BTreeMap::new())
    }

    /// Wave numbers, in file order
    pub fn waves(&self) -> &[f64] {
        &self.waves
    }

    /// Amplitudes, aligned with [`Spectrum::waves`]
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Number of spectral points
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Whether the spectrum has no points
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Iterate over (wave number, amplitude) pairs
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.waves.iter().copied().zip(self.amplitudes.iter().copied())
    }

    /// Insert or replace a metadata field
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SampleValue>) {
        self.sample_data.insert(key.into(), value.into());
    }

    /// Look up a metadata field
    pub fn get(&self, key: &str) -> Option<&SampleValue> {
        self.sample_data.get(key)
    }
}

impl fmt::Display for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: #points={}", self.id, self.len())
    }
}
