//! Synthetic OPUS images for tests

use super::constants::*;

pub(crate) const DATA_TYPE: u32 = 0x100F;
pub(crate) const DPF_TYPE: u32 = DATA_TYPE + BLOCK_TYPE_INCREMENT_DATA_TO_DPF;
pub(crate) const DATA_START: usize = 512;

pub(crate) fn field(tag: &[u8; 4], value: &[u8]) -> Vec<u8> {
    let mut bytes = tag.to_vec();
    bytes.extend_from_slice(&[0u8; 4]);
    bytes.extend_from_slice(value);
    bytes
}

pub(crate) fn dpf_block(npt: Option<u32>, first_x: f64, last_x: f64, scale: Option<f64>) -> Vec<u8> {
    let mut bytes = field(b"DPF\0", &1u32.to_le_bytes());
    bytes.extend(field(FXV, &first_x.to_le_bytes()));
    bytes.extend(field(LXV, &last_x.to_le_bytes()));
    if let Some(npt) = npt {
        bytes.extend(field(NPT, &npt.to_le_bytes()));
    }
    if let Some(scale) = scale {
        bytes.extend(field(CSF, &scale.to_le_bytes()));
    }
    bytes.extend(field(b"END\0", &[]));
    bytes
}

pub(crate) fn data_block(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Lay out a header directory followed by the given blocks
pub(crate) fn image(blocks: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut buffer = vec![0u8; DATA_START];

    for (index, (block_type, content)) in blocks.iter().enumerate() {
        let mut content = content.clone();
        content.resize((content.len() + 3) / 4 * 4, 0);

        let entry = BLOCK_OFFSET + index * BLOCK_DEFINITION_LENGTH;
        let offset = buffer.len() as u32;
        let words = (content.len() / 4) as u32;
        buffer[entry..entry + 4].copy_from_slice(&block_type.to_le_bytes());
        buffer[entry + 4..entry + 8].copy_from_slice(&words.to_le_bytes());
        buffer[entry + 8..entry + 12].copy_from_slice(&offset.to_le_bytes());

        buffer.extend(content);
    }

    buffer
}

pub(crate) fn text_block(entries: &[&str]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for entry in entries {
        bytes.extend_from_slice(entry.as_bytes());
        bytes.push(0);
    }
    bytes
}
