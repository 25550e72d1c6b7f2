//! Byte-sequence searches over an in-memory OPUS image

/// Pattern byte that matches any input byte in [`find_with_wildcard`]
pub const WILDCARD: u8 = 0xFF;

/// First position in `[start, end]` (inclusive) where `needle` lies entirely inside
/// the range
pub fn find_forward(buffer: &[u8], needle: &[u8], start: usize, end: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }

    let stop = end.saturating_add(1).min(buffer.len());
    if start >= stop || stop - start < needle.len() {
        return None;
    }

    buffer[start..stop]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| start + pos)
}

/// Step through `buffer` from `start` in strides of `step` bytes and return the first
/// position whose bytes match `pattern`, treating [`WILDCARD`] pattern bytes as
/// matching anything
pub fn find_with_wildcard(buffer: &[u8], pattern: &[u8], start: usize, step: usize) -> Option<usize> {
    if pattern.is_empty() || step == 0 {
        return None;
    }

    (start..buffer.len().saturating_sub(pattern.len()) + 1)
        .step_by(step)
        .find(|&offset| {
            buffer
                .get(offset..offset + pattern.len())
                .is_some_and(|window| {
                    window
                        .iter()
                        .zip(pattern)
                        .all(|(&b, &p)| p == WILDCARD || p == b)
                })
        })
}

/// Search backwards from `from` for `needle`, giving up once the position reaches
/// `floor` (exclusive)
pub fn find_reverse(buffer: &[u8], needle: &[u8], from: usize, floor: usize) -> Option<usize> {
    if needle.is_empty() || from <= floor {
        return None;
    }

    (floor + 1..=from)
        .rev()
        .find(|&pos| buffer.get(pos..pos + needle.len()) == Some(needle))
}

/// Lower-case hexadecimal without leading zeros, e.g. `0x100F` gives `"100f"`
pub fn to_hex_string(value: u32) -> String {
    format!("{:x}", value)
}
