//! # Versioned Layouts
//!
//! SMBIOS record layouts only ever grow by appending fields. A record type is
//! described as a list of [`Generation`]s, each naming the version that
//! introduced it and the formatted-area size it requires.
//!
//! The decoder picks the richest generation that both the table version and
//! the record's declared length allow. Firmware sometimes tags a table with a
//! newer version than the records it actually emits, so the bytes present win
//! over the version number.
//!
//! Field reads go through [`FieldReader`], which is cut to the selected
//! generation's size: a field introduced later simply reads as `None`.

use crate::header::SpecVersion;

// =============================================================================
// GENERATIONS
// =============================================================================

/// One layout generation of a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation<G> {
    /// Generation identifier
    pub id: G,
    /// Version that introduced this layout
    pub introduced: SpecVersion,
    /// Formatted-area size, header included
    pub size: usize,
}

/// A record type whose layout grew across specification versions
pub trait VersionedLayout: Copy + Sized + 'static {
    /// Generations in ascending order
    const GENERATIONS: &'static [Generation<Self>];

    /// Select the generation for a record
    fn select(version: SpecVersion, declared_length: usize) -> Option<Generation<Self>> {
        select_generation(Self::GENERATIONS, version, declared_length)
    }
}

/// Pick the richest generation allowed by `version` and `declared_length`
///
/// Returns `None` when even the oldest generation does not fit.
pub fn select_generation<G: Copy>(
    generations: &[Generation<G>],
    version: SpecVersion,
    declared_length: usize,
) -> Option<Generation<G>> {
    generations
        .iter()
        .filter(|g| g.introduced <= version && g.size <= declared_length)
        .max_by_key(|g| (g.introduced, g.size))
        .copied()
}

// =============================================================================
// FIELD READER
// =============================================================================

/// Bounds-checked little-endian reader over a formatted area
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    bytes: &'a [u8],
}

impl<'a> FieldReader<'a> {
    /// Reader over `body`, limited to the first `size` bytes
    pub fn new(body: &'a [u8], size: usize) -> Self {
        Self { bytes: &body[..size.min(body.len())] }
    }

    /// Number of readable bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing is readable
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn array<const N: usize>(&self, offset: usize) -> Option<[u8; N]> {
        self.bytes.get(offset..offset.checked_add(N)?)?.try_into().ok()
    }

    /// Read a byte
    pub fn u8_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    /// Read a little-endian word
    pub fn u16_at(&self, offset: usize) -> Option<u16> {
        self.array(offset).map(u16::from_le_bytes)
    }

    /// Read a little-endian dword
    pub fn u32_at(&self, offset: usize) -> Option<u32> {
        self.array(offset).map(u32::from_le_bytes)
    }

    /// Read a little-endian qword
    pub fn u64_at(&self, offset: usize) -> Option<u64> {
        self.array(offset).map(u64::from_le_bytes)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Layout {
        Base,
        Grown,
        Newest,
    }

    impl VersionedLayout for Layout {
        const GENERATIONS: &'static [Generation<Self>] = &[
            Generation { id: Layout::Base, introduced: SpecVersion::V2_1, size: 8 },
            Generation { id: Layout::Grown, introduced: SpecVersion::V2_3, size: 12 },
            Generation { id: Layout::Newest, introduced: SpecVersion::V3_0, size: 16 },
        ];
    }

    #[test]
    fn test_select_by_version() {
        let pick = |v, len| Layout::select(v, len).map(|g| g.id);
        assert_eq!(pick(SpecVersion::V2_1, 16), Some(Layout::Base));
        assert_eq!(pick(SpecVersion::V2_8, 16), Some(Layout::Grown));
        assert_eq!(pick(SpecVersion::V3_0, 16), Some(Layout::Newest));
        assert_eq!(pick(SpecVersion::new(2, 0), 16), None);
    }

    #[test]
    fn test_select_by_length() {
        let pick = |v, len| Layout::select(v, len).map(|g| g.id);
        assert_eq!(pick(SpecVersion::V3_0, 15), Some(Layout::Grown));
        assert_eq!(pick(SpecVersion::V3_0, 12), Some(Layout::Grown));
        assert_eq!(pick(SpecVersion::V3_0, 11), Some(Layout::Base));
        assert_eq!(pick(SpecVersion::V3_0, 7), None);
    }

    #[test]
    fn test_reader_bounds() {
        let body = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let reader = FieldReader::new(&body, 6);
        assert_eq!(reader.len(), 6);
        assert_eq!(reader.u8_at(5), Some(6));
        assert_eq!(reader.u8_at(6), None);
        assert_eq!(reader.u16_at(4), Some(0x0605));
        assert_eq!(reader.u16_at(5), None);
        assert_eq!(reader.u32_at(2), Some(0x0605_0403));
        assert_eq!(reader.u64_at(0), None);
        assert_eq!(reader.u32_at(usize::MAX), None);

        let full = FieldReader::new(&body, 64);
        assert_eq!(full.len(), body.len());
        assert_eq!(full.u64_at(2), Some(0x0A09_0807_0605_0403));
    }
}
