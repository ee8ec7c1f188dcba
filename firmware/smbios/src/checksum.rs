//! Byte-sum checksum used by both entry point layouts.

/// Wrapping 8-bit sum of `bytes[start..start + length]`
///
/// Returns `None` when the range does not fit in `bytes`.
#[must_use]
pub fn sum(bytes: &[u8], start: usize, length: usize) -> Option<u8> {
    let end = start.checked_add(length)?;
    let range = bytes.get(start..end)?;
    Some(range.iter().fold(0u8, |acc, &b| acc.wrapping_add(b)))
}

/// Whether the range sums to zero modulo 256
///
/// A range that runs past the end of `bytes` is never valid.
#[must_use]
pub fn is_valid(bytes: &[u8], start: usize, length: usize) -> bool {
    sum(bytes, start, length) == Some(0)
}
