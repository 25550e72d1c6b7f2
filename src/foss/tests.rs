use super::*;
use crate::serialisation::{SerialisationError, Serialiser};
use chrono::{NaiveDate, NaiveDateTime};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn datetime(year: i32, month: u32, day: u32, hour: u32, min: u32) -> NaiveDateTime {
    date(year, month, day).and_hms_opt(hour, min, 0).unwrap()
}

fn instrument_header() -> InstrumentHeader {
    let mut wave = [0f32; NUM_WAVE_VALUES];
    wave[0] = 400.0;
    wave[WAVE_GROUP_SIZE] = 2.0;
    wave[2 * WAVE_GROUP_SIZE] = 478.0;

    let mut points_per_segment = [0u16; MAX_SEGMENTS];
    points_per_segment[0] = 40;

    let mut constituents = vec![String::new(); MAX_CONSTITUENTS];
    constituents[0] = "Protein".to_string();
    constituents[1] = "Moisture".to_string();

    InstrumentHeader {
        instrument_type: InstrumentType::SIC_6500,
        model: "6500".to_string(),
        serial: "1234-5678".to_string(),
        num_seg: 1,
        points_per_segment,
        spacing_mode: SPACING_EQUAL,
        wave,
        neoc: 0,
        constituents,
    }
}

fn sample(sequence: u16, deleted: bool, num_points: usize) -> FossSample {
    let id = format!("S{}", sequence);
    FossSample {
        header: SampleHeader {
            sample_no: id.clone(),
            sequence,
            deleted,
            date: date(2021, 3, 14),
            product_code: 7,
            client: "client".to_string(),
            sample_id_1: "wheat".to_string(),
            sample_id_2: "lot 42".to_string(),
            sample_id_3: "third".to_string(),
            operator: "operator".to_string(),
            standardised: 1,
            time: datetime(2021, 3, 14, 15, 9),
        },
        data: DataBlock {
            data: (0..num_points)
                .map(|i| i as f32 * 0.25 + f32::from(sequence))
                .collect(),
        },
        constituents: ConstituentValues {
            constituents: vec![12.5, 9.75],
        },
        info: SampleInfo {
            sample_id: id,
            sequence,
            deleted,
        },
    }
}

fn foss_file() -> FossFile {
    FossFile {
        general_header: GeneralHeader {
            file_type: CAL_FILE_TYPE,
            count: 2,
            deleted: 1,
            num_points: 40,
            num_consts: 2,
            creation_date: date(2020, 2, 29),
            time: datetime(2020, 2, 29, 0, 0),
            most_recent: 0,
            file_id: "generated in a test".to_string(),
            master: "0000-0000".to_string(),
            packing: String::new(),
        },
        instrument_header: instrument_header(),
        samples: vec![sample(0, false, 40), sample(1, true, 40), sample(2, false, 40)],
    }
}

#[test]
fn test_record_lengths() {
    let file = foss_file();
    let first = &file.samples[0];

    let general = GeneralHeaderSerialiser::new()
        .serialise_to_bytes(&file.general_header)
        .unwrap();
    assert_eq!(general.len(), GENERAL_HEADER_LENGTH);

    let instrument = InstrumentHeaderSerialiser::new()
        .unwrap()
        .serialise_to_bytes(&file.instrument_header)
        .unwrap();
    assert_eq!(instrument.len(), INSTRUMENT_HEADER_LENGTH);

    let header = SampleHeaderSerialiser::new()
        .serialise_to_bytes(&first.header)
        .unwrap();
    assert_eq!(header.len(), SAMPLE_HEADER_LENGTH);

    let constituents = ConstituentValuesSerialiser
        .serialise_to_bytes(&first.constituents)
        .unwrap();
    assert_eq!(constituents.len(), CONSTITUENT_VALUES_LENGTH);

    let info = SampleInfoSerialiser.serialise_to_bytes(&first.info).unwrap();
    assert_eq!(info.len(), SAMPLE_INFO_LENGTH);
}

#[test]
fn test_foss_file_round_trip() {
    let serialiser = FossFileSerialiser::new().unwrap();
    let file = foss_file();

    let bytes = serialiser.serialise_to_bytes(&file).unwrap();
    let block = DataBlockSerialiser::new(40).unwrap().block_length();
    let expected = GENERAL_HEADER_LENGTH
        + INSTRUMENT_HEADER_LENGTH
        + 3 * (SAMPLE_HEADER_LENGTH + block + CONSTITUENT_VALUES_LENGTH)
        + 3 * SAMPLE_INFO_LENGTH;
    assert_eq!(bytes.len(), expected);

    let decoded = serialiser.deserialise_from_bytes(&bytes).unwrap();
    assert_eq!(decoded, file);
}

#[test]
fn test_sample_info_follows_all_samples() {
    let serialiser = FossFileSerialiser::new().unwrap();
    let bytes = serialiser.serialise_to_bytes(&foss_file()).unwrap();

    let footer_start = bytes.len() - 3 * SAMPLE_INFO_LENGTH;
    assert_eq!(&bytes[footer_start..footer_start + 2], b"S0");
    assert_eq!(&bytes[footer_start + 16..footer_start + 18], b"S1");
    // deleted flag of the second footer
    assert_eq!(bytes[footer_start + 16 + 15], 0x01);
}

#[test]
fn test_empty_file_round_trip() {
    let serialiser = FossFileSerialiser::new().unwrap();
    let file = FossFile {
        general_header: GeneralHeader {
            creation_date: date(1999, 12, 31),
            time: datetime(1999, 12, 31, 23, 59),
            ..GeneralHeader::default()
        },
        instrument_header: instrument_header(),
        samples: Vec::new(),
    };

    let bytes = serialiser.serialise_to_bytes(&file).unwrap();
    assert_eq!(bytes.len(), GENERAL_HEADER_LENGTH + INSTRUMENT_HEADER_LENGTH);
    assert_eq!(serialiser.deserialise_from_bytes(&bytes).unwrap(), file);
}

#[test]
fn test_sample_count_must_match_header() {
    let serialiser = FossFileSerialiser::new().unwrap();
    let mut file = foss_file();
    file.general_header.count = 5;

    assert!(matches!(
        serialiser.serialise_to_bytes(&file),
        Err(SerialisationError::LengthMismatch {
            expected: 6,
            actual: 3,
            ..
        })
    ));
}

#[test]
fn test_check_runs_before_any_bytes_are_written() {
    let serialiser = FossFileSerialiser::new().unwrap();
    let mut file = foss_file();
    file.samples[2].data.data.pop();

    let mut out = Vec::new();
    assert!(serialiser.serialise(&file, &mut out).is_err());
    assert!(out.is_empty());
}

#[test]
fn test_truncated_file_fails() {
    let serialiser = FossFileSerialiser::new().unwrap();
    let bytes = serialiser.serialise_to_bytes(&foss_file()).unwrap();

    let result = serialiser.deserialise_from_bytes(&bytes[..bytes.len() - 1]);
    assert!(matches!(result, Err(SerialisationError::Shortfall { .. })));
}

#[test]
fn test_date_zero_bytes_decode_as_1980() {
    assert_eq!(
        DateSerialiser.deserialise_from_bytes(&[0x00, 0x00]).unwrap(),
        date(1980, 1, 1)
    );
}

#[test]
fn test_date_1980_does_not_encode_as_zero() {
    let bytes = DateSerialiser.serialise_to_bytes(&date(1980, 1, 1)).unwrap();
    assert_eq!(bytes, vec![0x21, 0x00]);
    assert_eq!(DateSerialiser.deserialise_from_bytes(&bytes).unwrap(), date(1980, 1, 1));
}

#[test]
fn test_date_packing() {
    // (41 << 9) | (3 << 5) | 14
    let bytes = DateSerialiser.serialise_to_bytes(&date(2021, 3, 14)).unwrap();
    assert_eq!(bytes, vec![0x6E, 0x52]);
    assert_eq!(DateSerialiser.deserialise_from_bytes(&bytes).unwrap(), date(2021, 3, 14));
}

#[test]
fn test_date_out_of_range() {
    assert!(DateSerialiser.serialise_to_bytes(&date(1979, 12, 31)).is_err());
    assert!(DateSerialiser.serialise_to_bytes(&date(2107, 12, 31)).is_ok());
    assert!(DateSerialiser.serialise_to_bytes(&date(2108, 1, 1)).is_err());
    // month 0
    assert!(matches!(
        DateSerialiser.deserialise_from_bytes(&[0x01, 0x00]),
        Err(SerialisationError::InvalidDate(_))
    ));
}

#[test]
fn test_safe_string_strips_high_bytes() {
    let serialiser = SafeStringSerialiser::new(8, false);
    assert_eq!(
        serialiser.deserialise_from_bytes(b"ab\xC3\xA9cd\0z").unwrap(),
        "abcd"
    );
    assert_eq!(serialiser.field_length(), 8);
}

#[test]
fn test_sample_id_3_is_null_terminated() {
    let mut header = sample(0, false, 1).header;
    header.sample_id_3 = "x".repeat(60);

    let bytes = SampleHeaderSerialiser::new().serialise_to_bytes(&header).unwrap();
    assert_eq!(bytes[178], b'x');
    assert_eq!(bytes[179], 0x00);

    let decoded = SampleHeaderSerialiser::new().deserialise_from_bytes(&bytes).unwrap();
    assert_eq!(decoded.sample_id_3, "x".repeat(50));
}

#[test]
fn test_data_block_padding() {
    let serialiser = DataBlockSerialiser::new(33).unwrap();
    assert_eq!(serialiser.padding_length(), 124);

    let block = DataBlock {
        data: (0..33).map(|i| i as f32 + 1.0).collect(),
    };
    let mut bytes = serialiser.serialise_to_bytes(&block).unwrap();
    assert_eq!(bytes.len(), 33 * 4 + 124);
    assert!(bytes[33 * 4..].iter().all(|&b| b == 0));

    bytes.push(0xAB);
    let mut cursor: &[u8] = &bytes;
    assert_eq!(serialiser.deserialise(&mut cursor).unwrap(), block);
    assert_eq!(cursor, &[0xABu8]);
}

#[test]
fn test_data_block_exact_multiple_has_no_padding() {
    let serialiser = DataBlockSerialiser::new(64).unwrap();
    assert_eq!(serialiser.padding_length(), 0);
    assert_eq!(serialiser.block_length(), 256);
}

#[test]
fn test_data_block_validation() {
    assert!(DataBlockSerialiser::new(0).is_err());

    let serialiser = DataBlockSerialiser::new(4).unwrap();
    let short = DataBlock {
        data: vec![1.0, 2.0],
    };
    assert!(matches!(
        serialiser.serialise_to_bytes(&short),
        Err(SerialisationError::LengthMismatch {
            expected: 4,
            actual: 2,
            ..
        })
    ));
}

#[test]
fn test_constituent_values_stop_at_first_zero() {
    let values = ConstituentValues {
        constituents: vec![1.0, 2.0],
    };
    let mut bytes = ConstituentValuesSerialiser.serialise_to_bytes(&values).unwrap();
    bytes.push(0xCD);

    let mut cursor: &[u8] = &bytes;
    let decoded = ConstituentValuesSerialiser.deserialise(&mut cursor).unwrap();
    assert_eq!(decoded.constituents, vec![1.0, 2.0]);
    assert_eq!(cursor, &[0xCDu8]);
}

#[test]
fn test_constituent_zero_value_ends_list() {
    let values = ConstituentValues {
        constituents: vec![1.0, 0.0, 3.0],
    };
    let mut bytes = ConstituentValuesSerialiser.serialise_to_bytes(&values).unwrap();
    bytes.push(0xCD);

    let mut cursor: &[u8] = &bytes;
    let decoded = ConstituentValuesSerialiser.deserialise(&mut cursor).unwrap();
    assert_eq!(decoded.constituents, vec![1.0]);
    assert_eq!(cursor, &[0xCDu8]);
}

#[test]
fn test_constituent_values_truncated_to_32() {
    let values = ConstituentValues {
        constituents: (1..=33).map(|i| i as f32).collect(),
    };
    let bytes = ConstituentValuesSerialiser.serialise_to_bytes(&values).unwrap();
    assert_eq!(bytes.len(), CONSTITUENT_VALUES_LENGTH);

    let decoded = ConstituentValuesSerialiser.deserialise_from_bytes(&bytes).unwrap();
    assert_eq!(decoded.constituents.len(), MAX_CONSTITUENTS);
    assert_eq!(decoded.constituents[31], 32.0);
}

#[test]
fn test_unknown_instrument_type_rejected() {
    let serialiser = InstrumentHeaderSerialiser::new().unwrap();
    let mut bytes = serialiser.serialise_to_bytes(&instrument_header()).unwrap();
    assert_eq!(&bytes[..2], &[9, 0]);

    bytes[0] = 14;
    assert!(matches!(
        serialiser.deserialise_from_bytes(&bytes),
        Err(SerialisationError::InvalidEnumValue { code: 14, .. })
    ));
}

#[test]
fn test_instrument_header_wave_groups() {
    let header = instrument_header();
    assert_eq!(header.starts()[0], 400.0);
    assert_eq!(header.increments()[0], 2.0);
    assert_eq!(header.ends()[0], 478.0);
    assert_eq!(header.ends().len(), WAVE_GROUP_SIZE);
}

#[test]
fn test_too_many_constituent_names_rejected() {
    let mut header = instrument_header();
    header.constituents.push("extra".to_string());
    assert!(InstrumentHeaderSerialiser::new()
        .unwrap()
        .serialise_to_bytes(&header)
        .is_err());
}

#[test]
fn test_short_constituent_name_list_rejected() {
    let mut header = instrument_header();
    header.constituents.truncate(2);
    let result = InstrumentHeaderSerialiser::new().unwrap().serialise_to_bytes(&header);
    assert!(matches!(
        result,
        Err(SerialisationError::LengthMismatch { expected: MAX_CONSTITUENTS, actual: 2, .. })
    ));

    let default = InstrumentHeader::default();
    assert_eq!(default.constituents.len(), MAX_CONSTITUENTS);
    assert!(InstrumentHeaderSerialiser::new().unwrap().serialise_to_bytes(&default).is_ok());
}
