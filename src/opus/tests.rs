use super::constants::*;
use super::test_support::*;
use super::*;

#[test]
fn test_read_definitions() {
    let buffer = image(&[
        (DPF_TYPE, dpf_block(Some(3), 1.0, 3.0, Some(1.0))),
        (DATA_TYPE, data_block(&[1.0, 2.0, 3.0])),
    ]);

    let definitions = read_definitions(&buffer).unwrap();
    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions[0].block_type, DPF_TYPE);
    assert_eq!(definitions[0].offset as usize, DATA_START);
    assert_eq!(definitions[1].length_blocks, 3);
    assert_eq!(definitions[1].length_bytes(), 12);
}

#[test]
fn test_read_definitions_short_header() {
    assert!(read_definitions(&[0u8; 40]).is_err());
}

#[test]
fn test_dummy_blocks_skipped() {
    let buffer = image(&[
        (BLOCK_TYPE_DUMMY, data_block(&[0.0])),
        (DATA_TYPE, data_block(&[1.0])),
    ]);

    let definitions = read_definitions(&buffer).unwrap();
    let blocks = read_blocks(&buffer, &definitions);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].definition, 1);
    assert_eq!(blocks[0].masked_type(), DATA_TYPE);
}

#[test]
fn test_block_name_and_span() {
    let buffer = image(&[
        (DPF_TYPE, dpf_block(Some(2), 1.0, 2.0, Some(1.0))),
        (DATA_TYPE, data_block(&[1.0, 2.0])),
    ]);
    let definitions = read_definitions(&buffer).unwrap();
    let blocks = read_blocks(&buffer, &definitions);

    assert_eq!(blocks[0].name.as_deref(), Some("DPF"));
    assert_eq!(blocks[1].name, None);
    assert_eq!(blocks[1].len(), 8);
    assert_eq!(blocks[1].end, buffer.len() - 1);
    assert!(blocks[0].has_id(NPT));
    assert!(!blocks[1].has_id(NPT));
}

#[test]
fn test_block_end_clamped_to_buffer() {
    let buffer = vec![b'A'; 20];
    let block = Block::new(&buffer, 0, 8, 400, DATA_TYPE);
    assert_eq!(block.end, 19);
    assert_eq!(block.len(), 12);
    assert_eq!(block.name.as_deref(), Some("AAA"));
}

#[test]
fn test_find_id_is_relative_to_block() {
    let mut buffer = vec![0u8; 16];
    buffer.extend(field(NPT, &7u32.to_le_bytes()));
    let block = Block::new(&buffer, 0, 16, buffer.len() - 1, DPF_TYPE);

    assert_eq!(block.find_id(NPT), Some(0));
    assert_eq!(block.get_from_id(NPT, FIELD_VALUE_OFFSET, Block::get_int), Some(7));
}

#[test]
fn test_find_id_up_to_last_byte() {
    let mut buffer = b"DPF\0".to_vec();
    buffer.extend_from_slice(NPT);
    buffer.extend_from_slice(b"tail");

    let block = Block::new(&buffer, 0, 0, 7, DPF_TYPE);
    assert_eq!(block.find_id(NPT), Some(4));

    let shorter = Block::new(&buffer, 0, 0, 6, DPF_TYPE);
    assert_eq!(shorter.find_id(NPT), None);
}

#[test]
fn test_spectral_pairs() {
    let buffer = image(&[
        (DPF_TYPE, dpf_block(Some(2), 1.0, 2.0, Some(1.0))),
        (DATA_TYPE, data_block(&[1.0, 2.0])),
        (0x2000 + BLOCK_TYPE_INCREMENT_DATA_TO_DPF, dpf_block(Some(2), 1.0, 2.0, Some(1.0))),
    ]);
    let definitions = read_definitions(&buffer).unwrap();
    let blocks = read_blocks(&buffer, &definitions);

    let pairs = find_spectral_pairs(&blocks).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].dpf.block_type, DPF_TYPE);
    assert_eq!(pairs[0].data.block_type, DATA_TYPE);
}

#[test]
fn test_dpf_pairs_with_every_matching_block() {
    let buffer = image(&[
        (DPF_TYPE, dpf_block(Some(1), 1.0, 2.0, Some(1.0))),
        (DATA_TYPE, data_block(&[1.0])),
        (DATA_TYPE, data_block(&[2.0])),
    ]);
    let definitions = read_definitions(&buffer).unwrap();
    let blocks = read_blocks(&buffer, &definitions);

    let pairs = find_spectral_pairs(&blocks).unwrap();
    assert_eq!(pairs.len(), 2);
    assert!(pairs.iter().all(|pair| pair.dpf.start == blocks[0].start));
    assert_eq!(pairs[0].data.start, blocks[1].start);
    assert_eq!(pairs[1].data.start, blocks[2].start);
}

#[test]
fn test_wave_reconstruction() {
    let buffer = image(&[(DPF_TYPE, dpf_block(Some(1801), 4000.0, 400.0, Some(1.0)))]);
    let definitions = read_definitions(&buffer).unwrap();
    let blocks = read_blocks(&buffer, &definitions);

    let parameters = SpectrumParameters::from_dpf(&blocks[0]).unwrap();
    assert_eq!(parameters.num_points, 1801);
    assert_eq!(parameters.diff(), -2.0);

    let waves = parameters.waves();
    assert_eq!(waves.len(), 1801);
    assert_eq!(waves[0], 4000.0);
    assert_eq!(waves[1800], 400.0);
    assert!((waves[900] - 2200.0).abs() < 1e-9);
}

#[test]
fn test_amplitudes_scaled() {
    let buffer = image(&[
        (DPF_TYPE, dpf_block(Some(3), 1.0, 3.0, Some(0.5))),
        (DATA_TYPE, data_block(&[1.0, 2.0, 3.0])),
    ]);
    let definitions = read_definitions(&buffer).unwrap();
    let blocks = read_blocks(&buffer, &definitions);
    let pairs = find_spectral_pairs(&blocks).unwrap();

    let parameters = SpectrumParameters::from_dpf(&pairs[0].dpf).unwrap();
    assert_eq!(parameters.amplitudes(&pairs[0].data).unwrap(), vec![0.5, 1.0, 1.5]);

    let too_many = SpectrumParameters {
        num_points: 10,
        ..parameters
    };
    assert!(too_many.amplitudes(&pairs[0].data).is_none());
}

#[test]
fn test_missing_field_gives_none() {
    let buffer = image(&[(DPF_TYPE, dpf_block(Some(3), 1.0, 3.0, None))]);
    let definitions = read_definitions(&buffer).unwrap();
    let blocks = read_blocks(&buffer, &definitions);
    assert!(SpectrumParameters::from_dpf(&blocks[0]).is_none());

    let buffer = image(&[(DPF_TYPE, dpf_block(None, 1.0, 3.0, Some(1.0)))]);
    let definitions = read_definitions(&buffer).unwrap();
    let blocks = read_blocks(&buffer, &definitions);
    assert!(SpectrumParameters::from_dpf(&blocks[0]).is_none());
}

#[test]
fn test_single_point_has_zero_diff() {
    let parameters = SpectrumParameters {
        num_points: 1,
        first_x: 1000.0,
        last_x: 1000.0,
        scale: 1.0,
    };
    assert_eq!(parameters.waves(), vec![1000.0]);
}

#[test]
fn test_log_and_command_lines() {
    let first = b"started\0 COMMAND_LINE MeasureSample([\"::this::\":Meas];{SNM='X1', GAI=4})\0\0".to_vec();
    let second = b"  finished \0".to_vec();
    let buffer = image(&[(BLOCK_TYPE_TEXT, first), (BLOCK_TYPE_TEXT, second)]);
    let definitions = read_definitions(&buffer).unwrap();
    let blocks = read_blocks(&buffer, &definitions);

    let log = read_log(&blocks);
    assert_eq!(log.len(), 3);
    assert_eq!(log[0], "started");
    assert_eq!(log[2], "finished");

    let command_lines = read_command_lines(&log);
    assert_eq!(command_lines.len(), 1);
    assert_eq!(command_lines[0].operation, OPERATION_MEASURE_SAMPLE);
    assert_eq!(command_lines[0].get(KEY_SAMPLE_ID_2), Some("X1"));
}

#[test]
fn test_instrument_name() {
    let mut hfl = field(b"HFL\0", &[0u8; 4]);
    hfl.extend(field(INS, b"MPA\0"));
    let buffer = image(&[(0x60, hfl)]);
    let definitions = read_definitions(&buffer).unwrap();
    let blocks = read_blocks(&buffer, &definitions);

    assert_eq!(instrument_name(&blocks).as_deref(), Some("MPA"));
    assert_eq!(instrument_name(&blocks[..0]), None);
}
