use std::io::{Read, Write};

use log::debug;

use super::headers::{GeneralHeaderSerialiser, InstrumentHeaderSerialiser};
use super::sample::{
    ConstituentValuesSerialiser, DataBlockSerialiser, SampleHeaderSerialiser, SampleInfoSerialiser,
};
use super::types::{FossFile, FossSample, SampleInfo};
use crate::serialisation::{SerialisationError, Serialiser};

/// Reads and writes a whole [`FossFile`].
///
/// Layout: general header, instrument header, then one (header, data, constituents)
/// record per sample, then every sample's footer in the same order.
#[derive(Debug, Clone)]
pub struct FossFileSerialiser {
    general_header: GeneralHeaderSerialiser,
    instrument_header: InstrumentHeaderSerialiser,
    sample_header: SampleHeaderSerialiser,
}

impl FossFileSerialiser {
    /// Create the serialiser
    pub fn new() -> Result<Self, SerialisationError> {
        Ok(Self {
            general_header: GeneralHeaderSerialiser::new(),
            instrument_header: InstrumentHeaderSerialiser::new()?,
            sample_header: SampleHeaderSerialiser::new(),
        })
    }

    fn data_block(file_points: u16) -> Result<DataBlockSerialiser, SerialisationError> {
        DataBlockSerialiser::new(usize::from(file_points))
    }
}

impl Serialiser for FossFileSerialiser {
    type Value = FossFile;

    fn check(&self, value: &FossFile) -> Result<(), SerialisationError> {
        let expected = value.general_header.total_samples();
        if value.samples.len() != expected {
            return Err(SerialisationError::LengthMismatch {
                what: "samples (count + deleted)",
                expected,
                actual: value.samples.len(),
            });
        }

        self.general_header.check(&value.general_header)?;
        self.instrument_header.check(&value.instrument_header)?;

        if value.samples.is_empty() {
            return Ok(());
        }

        let data_block = Self::data_block(value.general_header.num_points)?;
        for sample in &value.samples {
            self.sample_header.check(&sample.header)?;
            data_block.check(&sample.data)?;
            ConstituentValuesSerialiser.check(&sample.constituents)?;
            SampleInfoSerialiser.check(&sample.info)?;
        }
        Ok(())
    }

    fn write_value(&self, value: &FossFile, out: &mut dyn Write) -> Result<(), SerialisationError> {
        self.general_header.write_value(&value.general_header, out)?;
        self.instrument_header
            .write_value(&value.instrument_header, out)?;

        if value.samples.is_empty() {
            return Ok(());
        }

        let data_block = Self::data_block(value.general_header.num_points)?;
        for sample in &value.samples {
            self.sample_header.write_value(&sample.header, out)?;
            data_block.write_value(&sample.data, out)?;
            ConstituentValuesSerialiser.write_value(&sample.constituents, out)?;
        }
        for sample in &value.samples {
            SampleInfoSerialiser.write_value(&sample.info, out)?;
        }
        Ok(())
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<FossFile, SerialisationError> {
        let general_header = self.general_header.read_value(input)?;
        let instrument_header = self.instrument_header.read_value(input)?;
        let total = general_header.total_samples();

        debug!(
            "FOSS file: {} samples ({} deleted), {} points, {} constituents",
            total, general_header.deleted, general_header.num_points, general_header.num_consts
        );

        let mut samples = Vec::with_capacity(total);
        if total > 0 {
            let data_block = Self::data_block(general_header.num_points)?;
            for _ in 0..total {
                samples.push(FossSample {
                    header: self.sample_header.read_value(input)?,
                    data: data_block.read_value(input)?,
                    constituents: ConstituentValuesSerialiser.read_value(input)?,
                    info: SampleInfo::default(),
                });
            }
            for sample in samples.iter_mut() {
                sample.info = SampleInfoSerialiser.read_value(input)?;
            }
        }

        Ok(FossFile {
            general_header,
            instrument_header,
            samples,
        })
    }
}
