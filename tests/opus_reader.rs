//! OPUS files read from disk with both OPUS readers

use std::path::PathBuf;
use tempfile::TempDir;

use spectralio::formats::{
    Format, FormatOptions, OpusLegacyReader, OpusReader, OpusReaderConfig,
    SpectrumReader,
};
use spectralio::opus::constants::{BLOCK_TYPE_TEXT, CSF, FXV, INS, LXV, NPT};
use spectralio::SampleValue;

const ABSORBANCE: u32 = 0x100F;
const ABSORBANCE_PARAMETERS: u32 = ABSORBANCE + 16;
const SINGLE_CHANNEL: u32 = 0x1007;
const SINGLE_CHANNEL_PARAMETERS: u32 = SINGLE_CHANNEL + 16;
const INSTRUMENT: u32 = 0x60;

const MEASURE: &str =
    "COMMAND_LINE MeasureSample ([\"::this::\":Meas];{SNM='Rapeseed 3', NSS=32, RES=8})";

/// Builds OPUS images: a 36-byte preamble, a directory of 12-byte entries, then blocks
struct OpusImage {
    blocks: Vec<(u32, Vec<u8>)>,
}

impl OpusImage {
    fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    fn block(mut self, block_type: u32, content: Vec<u8>) -> Self {
        self.blocks.push((block_type, content));
        self
    }

    fn parameters(self, block_type: u32, points: u32, first: f64, last: f64, scale: f64) -> Self {
        let mut content = tagged(b"DPF\0", &1u32.to_le_bytes());
        content.extend(tagged(FXV, &first.to_le_bytes()));
        content.extend(tagged(LXV, &last.to_le_bytes()));
        content.extend(tagged(NPT, &points.to_le_bytes()));
        content.extend(tagged(CSF, &scale.to_le_bytes()));
        content.extend(tagged(b"END\0", &[]));
        self.block(block_type, content)
    }

    fn data(self, block_type: u32, values: &[f32]) -> Self {
        self.block(block_type, values.iter().flat_map(|v| v.to_le_bytes()).collect())
    }

    fn text(self, entries: &[&str]) -> Self {
        let mut content = Vec::new();
        for entry in entries {
            content.extend_from_slice(entry.as_bytes());
            content.push(0);
        }
        self.block(BLOCK_TYPE_TEXT, content)
    }

    fn build(&self) -> Vec<u8> {
        let mut buffer = vec![0u8; 512];
        for (index, (block_type, content)) in self.blocks.iter().enumerate() {
            let mut content = content.clone();
            content.resize((content.len() + 3) / 4 * 4, 0);

            let entry = 36 + index * 12;
            let offset = buffer.len() as u32;
            buffer[entry..entry + 4].copy_from_slice(&block_type.to_le_bytes());
            buffer[entry + 4..entry + 8].copy_from_slice(&((content.len() / 4) as u32).to_le_bytes());
            buffer[entry + 8..entry + 12].copy_from_slice(&offset.to_le_bytes());
            buffer.extend(content);
        }
        buffer
    }

    fn save(&self, dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

fn tagged(tag: &[u8; 4], value: &[u8]) -> Vec<u8> {
    let mut bytes = tag.to_vec();
    bytes.extend_from_slice(&[0u8; 4]);
    bytes.extend_from_slice(value);
    bytes
}

fn instrument(name: &str) -> Vec<u8> {
    let mut content = tagged(b"HFL\0", &[0u8; 4]);
    let mut value = name.as_bytes().to_vec();
    value.push(0);
    content.extend(tagged(INS, &value));
    content
}

fn measurement() -> OpusImage {
    OpusImage::new()
        .block(INSTRUMENT, instrument("TANGO"))
        .parameters(ABSORBANCE_PARAMETERS, 4, 11000.0, 3950.0, 1.0)
        .data(ABSORBANCE, &[0.125, 0.25, 0.5, 1.0])
        .text(&["Measurement started", MEASURE])
}

#[test]
fn test_block_table_reader() {
    let dir = TempDir::new().unwrap();
    let path = measurement().save(&dir, "rapeseed.0");

    let spectra = OpusReader::default().read(&path).unwrap();
    assert_eq!(spectra.len(), 1);

    let spectrum = &spectra[0];
    assert_eq!(spectrum.id, "Rapeseed 3");
    assert_eq!(spectrum.waves(), &[11000.0, 8650.0, 6300.0, 3950.0]);
    assert_eq!(spectrum.amplitudes(), &[0.125, 0.25, 0.5, 1.0]);
    assert_eq!(spectrum.get("Instrument"), Some(&SampleValue::from("TANGO")));
    assert_eq!(
        spectrum.get("Opus.MeasureSample.Meas.NSS"),
        Some(&SampleValue::Number(32.0))
    );
}

#[test]
fn test_block_table_reader_all_spectra() {
    let dir = TempDir::new().unwrap();
    let path = measurement()
        .parameters(SINGLE_CHANNEL_PARAMETERS, 2, 4000.0, 4002.0, 2.0)
        .data(SINGLE_CHANNEL, &[3.0, 5.0])
        .save(&dir, "channels.1");

    let main_only = OpusReader::default().read(&path).unwrap();
    assert_eq!(main_only.len(), 1);
    assert_eq!(main_only[0].get("Opus.BlockType.Hex"), Some(&SampleValue::from("100f")));

    let reader = OpusReader::new(OpusReaderConfig {
        all_spectra: true,
        ..OpusReaderConfig::default()
    });
    let spectra = reader.read(&path).unwrap();
    assert_eq!(spectra.len(), 2);

    let single_channel = spectra
        .iter()
        .find(|s| s.get("Opus.BlockType.Hex") == Some(&SampleValue::from("1007")))
        .unwrap();
    assert_eq!(single_channel.waves(), &[4000.0, 4002.0]);
    assert_eq!(single_channel.amplitudes(), &[6.0, 10.0]);
    assert_eq!(single_channel.id, "Rapeseed 3");
}

#[test]
fn test_block_table_reader_shared_parameters() {
    let dir = TempDir::new().unwrap();
    let path = OpusImage::new()
        .parameters(ABSORBANCE_PARAMETERS, 2, 1.0, 2.0, 1.0)
        .data(ABSORBANCE, &[1.0, 2.0])
        .data(ABSORBANCE, &[3.0, 4.0])
        .save(&dir, "twice.0");

    let lenient = OpusReader::default().read(&path).unwrap();
    let strict = OpusReader::new(OpusReaderConfig {
        strict: true,
        ..OpusReaderConfig::default()
    })
    .read(&path)
    .unwrap();

    for spectra in [lenient, strict] {
        assert_eq!(spectra.len(), 2);
        assert_eq!(spectra[0].waves(), &[1.0, 2.0]);
        assert_eq!(spectra[0].amplitudes(), &[1.0, 2.0]);
        assert_eq!(spectra[1].waves(), &[1.0, 2.0]);
        assert_eq!(spectra[1].amplitudes(), &[3.0, 4.0]);
    }
}

#[test]
fn test_legacy_reader() {
    let dir = TempDir::new().unwrap();
    let path = OpusImage::new()
        .parameters(ABSORBANCE_PARAMETERS, 3, 1000.0, 1010.0, 4.0)
        .data(ABSORBANCE, &[0.5, 0.75, 1.0])
        .text(&["NAM='x' SNM='Rapeseed 3' {SNM='Rapeseed 3', NSS=32, OPR='lab'}"])
        .save(&dir, "legacy.0");

    let spectra = OpusLegacyReader::default().read(&path).unwrap();
    assert_eq!(spectra.len(), 1);

    let spectrum = &spectra[0];
    assert_eq!(spectrum.id, "Rapeseed 3");
    assert_eq!(spectrum.waves(), &[1000.0, 1005.0, 1010.0]);
    assert_eq!(spectrum.amplitudes(), &[0.5, 0.75, 1.0]);
    assert_eq!(spectrum.get("NSS"), Some(&SampleValue::Number(32.0)));
    assert_eq!(spectrum.get("OPR"), Some(&SampleValue::from("lab")));
}

#[test]
fn test_legacy_reader_unreadable_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.0");
    std::fs::write(&path, vec![0xAB; 128]).unwrap();

    assert!(OpusLegacyReader::default().read(&path).unwrap().is_empty());
}

#[test]
fn test_opus_formats_are_chosen_by_tag() {
    let dir = TempDir::new().unwrap();
    let path = measurement().save(&dir, "rapeseed.0");

    assert!(Format::from_path(&path).is_err());

    let options = FormatOptions::default();
    for tag in ["opus", "opus-legacy"] {
        let format: Format = tag.parse().unwrap();
        assert!(!format.is_writable());
        let spectra = format.reader(&options).read_path(&path).unwrap();
        assert_eq!(spectra.len(), 1, "format {}", tag);
        assert_eq!(spectra[0].len(), 4);
    }
}
