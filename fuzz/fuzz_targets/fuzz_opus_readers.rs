#![no_main]

use libfuzzer_sys::fuzz_target;
use spectralio::formats::{OpusLegacyReader, OpusReader, SpaReader, SpectrumReader};

fuzz_target!(|data: &[u8]| {
    let _ = OpusReader::default().read_bytes(data, "fuzz.0");
    let _ = OpusLegacyReader::default().read_bytes(data, "fuzz.0");
    let _ = SpaReader::new().read_bytes(data, "fuzz.spa");
});
