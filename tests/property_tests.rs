//! Property tests for the primitive serialisers and the FOSS layout

mod serialisation_properties {
    use proptest::prelude::*;

    use spectralio::serialisation::{
        Endianness, FixedLengthStringSerialiser, IntSerialiser, Serialiser, StringEncoding,
    };

    proptest! {
        #[test]
        fn unsigned_width_accepts_exactly_its_range(num_bytes in 1usize..=8, value in any::<u64>()) {
            let serialiser = IntSerialiser::new(num_bytes, false, Endianness::Big).unwrap();
            let fits = num_bytes == 8 || value < (1u64 << (8 * num_bytes));

            match serialiser.serialise_to_bytes(&i128::from(value)) {
                Ok(bytes) => {
                    prop_assert!(fits);
                    prop_assert_eq!(bytes.len(), num_bytes);
                    prop_assert_eq!(serialiser.deserialise_from_bytes(&bytes).unwrap(), i128::from(value));
                }
                Err(_) => prop_assert!(!fits),
            }
        }

        #[test]
        fn signed_values_keep_their_sign(value in any::<i32>()) {
            let serialiser = IntSerialiser::I32;
            let bytes = serialiser.serialise_to_bytes(&i128::from(value)).unwrap();
            prop_assert_eq!(bytes, value.to_le_bytes().to_vec());

            let narrow = IntSerialiser::I16;
            let fits = i16::try_from(value).is_ok();
            prop_assert_eq!(narrow.serialise_to_bytes(&i128::from(value)).is_ok(), fits);
        }

        #[test]
        fn fixed_length_strings_fill_their_field(
            text in "[A-Za-z0-9 ._-]{0,40}",
            length in 1usize..24,
            null_terminated in any::<bool>(),
        ) {
            let serialiser =
                FixedLengthStringSerialiser::new(length, StringEncoding::Ascii, null_terminated, false)
                    .unwrap();
            let bytes = serialiser.serialise_to_bytes(&text).unwrap();
            prop_assert_eq!(bytes.len(), length);
            if null_terminated {
                prop_assert_eq!(bytes[length - 1], 0);
            }

            let capacity = if null_terminated { length - 1 } else { length };
            let expected: String = text.chars().take(capacity).collect();
            prop_assert_eq!(serialiser.deserialise_from_bytes(&bytes).unwrap(), expected);
        }

        #[test]
        fn strict_strings_reject_overflow(text in "[a-z]{1,30}", length in 1usize..16) {
            let serialiser =
                FixedLengthStringSerialiser::new(length, StringEncoding::Ascii, false, true).unwrap();
            prop_assert_eq!(serialiser.serialise_to_bytes(&text).is_ok(), text.len() <= length);
        }
    }
}

mod foss_properties {
    use proptest::prelude::*;

    use spectralio::formats::{FossReader, FossWriter, FossWriterConfig, SpectrumReader, SpectrumWriter};
    use spectralio::foss::{
        ConstituentValues, ConstituentValuesSerialiser, DataBlock, DataBlockSerialiser,
        CONSTITUENT_VALUES_LENGTH, MAX_CONSTITUENTS,
    };
    use spectralio::serialisation::Serialiser;
    use spectralio::Spectrum;

    fn non_zero() -> impl Strategy<Value = f32> {
        prop_oneof![0.001f32..1000.0, -1000.0f32..-0.001]
    }

    proptest! {
        #[test]
        fn data_blocks_are_padded_to_128_bytes(data in prop::collection::vec(-10.0f32..10.0, 1..200)) {
            let serialiser = DataBlockSerialiser::new(data.len()).unwrap();
            let bytes = serialiser.serialise_to_bytes(&DataBlock { data: data.clone() }).unwrap();

            prop_assert_eq!(bytes.len() % 128, 0);
            prop_assert_eq!(bytes.len(), serialiser.block_length());
            prop_assert!(bytes.len() - data.len() * 4 < 128);
            prop_assert!(bytes[data.len() * 4..].iter().all(|&b| b == 0));

            let read = serialiser.deserialise_from_bytes(&bytes).unwrap();
            prop_assert_eq!(read.data, data);
        }

        #[test]
        fn constituent_list_stops_at_first_zero(
            values in prop::collection::vec(non_zero(), 0..MAX_CONSTITUENTS),
            cut in any::<prop::sample::Index>(),
        ) {
            let mut written = values.clone();
            let zero_at = if values.is_empty() { 0 } else { cut.index(values.len()) };
            if zero_at < written.len() {
                written[zero_at] = 0.0;
            }

            let serialiser = ConstituentValuesSerialiser;
            let bytes = serialiser
                .serialise_to_bytes(&ConstituentValues { constituents: written })
                .unwrap();
            prop_assert_eq!(bytes.len(), CONSTITUENT_VALUES_LENGTH);

            let read = serialiser.deserialise_from_bytes(&bytes).unwrap();
            prop_assert_eq!(read.constituents, values[..zero_at.min(values.len())].to_vec());
        }

        #[test]
        fn nir_files_preserve_ids_and_amplitudes(
            samples in prop::collection::vec(
                ("[A-Z][A-Z0-9]{0,11}", prop::collection::vec(-5.0f32..5.0, 24)),
                1..8,
            ),
        ) {
            let spectra: Vec<Spectrum> = samples
                .iter()
                .map(|(id, amplitudes)| {
                    let waves = (0..amplitudes.len()).map(|i| 400.0 + 2.0 * i as f64).collect();
                    let amplitudes = amplitudes.iter().map(|&a| f64::from(a)).collect();
                    Spectrum::from_points(id.clone(), waves, amplitudes).unwrap()
                })
                .collect();

            let config = FossWriterConfig {
                segment_widths: vec![24],
                end_points: vec![446.0],
                ..FossWriterConfig::default()
            };
            let bytes = FossWriter::nir(config).write_bytes(&spectra).unwrap();
            let read = FossReader::default().read_bytes(&bytes, "prop.nir").unwrap();

            prop_assert_eq!(read.len(), spectra.len());
            for (written, read) in spectra.iter().zip(&read) {
                prop_assert_eq!(&read.id, &written.id);
                prop_assert_eq!(read.waves(), written.waves());
                prop_assert_eq!(read.amplitudes(), written.amplitudes());
            }
        }
    }
}
