#![no_main]

use libfuzzer_sys::fuzz_target;
use spectralio::formats::{FossReader, SpectrumReader};
use spectralio::foss::FossFileSerialiser;
use spectralio::serialisation::Serialiser;

fuzz_target!(|data: &[u8]| {
    if let Ok(serialiser) = FossFileSerialiser::new() {
        let _ = serialiser.deserialise_from_bytes(data);
    }
    let _ = FossReader::default().read_bytes(data, "fuzz.nir");
});
