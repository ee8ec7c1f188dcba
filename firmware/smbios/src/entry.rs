//! # Entry Point Locator
//!
//! Finds the SMBIOS entry point inside an arbitrary buffer and validates it.
//!
//! Two incompatible layouts exist:
//!
//! | Anchor  | Layout | Size | Table address | Table length       |
//! |---------|--------|------|---------------|--------------------|
//! | `_SM_`  | 32-bit | 31   | u32 @ 0x18    | u16 @ 0x16         |
//! | `_SM3_` | 64-bit | 24   | u64 @ 0x10    | u32 @ 0x0C (max)   |
//!
//! A checksum failure is not fatal: firmware with a broken checksum is common
//! enough that the table is still exposed, flagged as unverified.

use crate::checksum;
use crate::error::{SmbiosError, SmbiosResult};
use crate::header::SpecVersion;
use crate::{DMI_ANCHOR, SMBIOS2_ANCHOR, SMBIOS3_ANCHOR};

// =============================================================================
// 32-BIT ENTRY POINT
// =============================================================================

/// SMBIOS 2.x entry point (32-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint32 {
    /// Checksum byte
    pub checksum: u8,
    /// Declared entry point length
    pub length: u8,
    /// Major version
    pub major_version: u8,
    /// Minor version
    pub minor_version: u8,
    /// Size of the largest structure
    pub max_structure_size: u16,
    /// Entry point revision
    pub entry_point_revision: u8,
    /// Intermediate (`_DMI_`) checksum
    pub intermediate_checksum: u8,
    /// Structure table length
    pub structure_table_length: u16,
    /// Structure table physical address
    pub structure_table_address: u32,
    /// Declared number of structures
    pub number_of_structures: u16,
    /// BCD revision
    pub bcd_revision: u8,
    /// Whether the intermediate anchor was present
    intermediate_anchor_ok: bool,
}

impl EntryPoint32 {
    /// Layout size
    pub const SIZE: usize = 31;

    /// Offset of the entry point length byte
    pub const LENGTH_OFFSET: usize = 5;

    /// Start of the range covered by the intermediate checksum
    pub const INTERMEDIATE_OFFSET: usize = 0x10;

    /// Length of the range covered by the intermediate checksum
    pub const INTERMEDIATE_LENGTH: usize = 0x0F;

    /// Parse from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE || bytes[0..4] != SMBIOS2_ANCHOR {
            return None;
        }

        Some(Self {
            checksum: bytes[4],
            length: bytes[5],
            major_version: bytes[6],
            minor_version: bytes[7],
            max_structure_size: u16::from_le_bytes([bytes[8], bytes[9]]),
            entry_point_revision: bytes[10],
            intermediate_checksum: bytes[21],
            structure_table_length: u16::from_le_bytes([bytes[22], bytes[23]]),
            structure_table_address: u32::from_le_bytes(bytes[24..28].try_into().ok()?),
            number_of_structures: u16::from_le_bytes([bytes[28], bytes[29]]),
            bcd_revision: bytes[30],
            intermediate_anchor_ok: bytes[16..21] == DMI_ANCHOR,
        })
    }

    /// Validate both the full and the intermediate checksum
    pub fn validate_checksum(&self, bytes: &[u8]) -> bool {
        self.intermediate_anchor_ok
            && checksum::is_valid(bytes, 0, self.length as usize)
            && checksum::is_valid(bytes, Self::INTERMEDIATE_OFFSET, Self::INTERMEDIATE_LENGTH)
    }

    /// Get version
    pub fn version(&self) -> SpecVersion {
        SpecVersion::new(self.major_version, self.minor_version)
    }
}

// =============================================================================
// 64-BIT ENTRY POINT
// =============================================================================

/// SMBIOS 3.x entry point (64-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint64 {
    /// Checksum byte
    pub checksum: u8,
    /// Declared entry point length
    pub length: u8,
    /// Major version
    pub major_version: u8,
    /// Minor version
    pub minor_version: u8,
    /// Specification document revision
    pub docrev: u8,
    /// Entry point revision
    pub entry_point_revision: u8,
    /// Maximum size of the structure table
    pub structure_table_max_size: u32,
    /// Structure table physical address
    pub structure_table_address: u64,
}

impl EntryPoint64 {
    /// Layout size
    pub const SIZE: usize = 24;

    /// Offset of the entry point length byte
    pub const LENGTH_OFFSET: usize = 6;

    /// Parse from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE || bytes[0..5] != SMBIOS3_ANCHOR {
            return None;
        }

        Some(Self {
            checksum: bytes[5],
            length: bytes[6],
            major_version: bytes[7],
            minor_version: bytes[8],
            docrev: bytes[9],
            entry_point_revision: bytes[10],
            structure_table_max_size: u32::from_le_bytes(bytes[12..16].try_into().ok()?),
            structure_table_address: u64::from_le_bytes(bytes[16..24].try_into().ok()?),
        })
    }

    /// Validate checksum
    pub fn validate_checksum(&self, bytes: &[u8]) -> bool {
        checksum::is_valid(bytes, 0, self.length as usize)
    }

    /// Get version
    pub fn version(&self) -> SpecVersion {
        SpecVersion::new(self.major_version, self.minor_version)
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Entry point layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPointKind {
    /// `_SM_` layout
    Bits32(EntryPoint32),
    /// `_SM3_` layout
    Bits64(EntryPoint64),
}

/// A located, checksum-checked entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    kind: EntryPointKind,
    /// Offset of the anchor within the scanned buffer
    offset: usize,
    checksum_validated: bool,
    checksum_sum: u8,
}

impl EntryPoint {
    /// Scan `buffer` for the first usable entry point
    ///
    /// Every byte offset is tried. An anchor whose declared length (or fixed
    /// layout) would run past the end of the buffer is skipped.
    ///
    /// # Errors
    ///
    /// [`SmbiosError::EntryPointNotFound`] when no anchor qualifies.
    pub fn locate(buffer: &[u8]) -> SmbiosResult<Self> {
        for offset in 0..buffer.len() {
            let window = &buffer[offset..];

            if window.starts_with(&SMBIOS3_ANCHOR) {
                if let Some(entry) = Self::overlay64(window, offset) {
                    return Ok(entry);
                }
            } else if window.starts_with(&SMBIOS2_ANCHOR) {
                if let Some(entry) = Self::overlay32(window, offset) {
                    return Ok(entry);
                }
            }
        }

        Err(SmbiosError::EntryPointNotFound)
    }

    fn fits(window: &[u8], length_offset: usize, size: usize, offset: usize) -> bool {
        let declared = match window.get(length_offset) {
            Some(&len) => len as usize,
            None => return false,
        };
        let needed = declared.max(size);
        if window.len() < needed {
            log::trace!(
                "smbios: anchor at {:#x} needs {} bytes, {} remain",
                offset,
                needed,
                window.len()
            );
            return false;
        }
        true
    }

    fn overlay32(window: &[u8], offset: usize) -> Option<Self> {
        if !Self::fits(window, EntryPoint32::LENGTH_OFFSET, EntryPoint32::SIZE, offset) {
            return None;
        }
        let entry = EntryPoint32::from_bytes(window)?;
        let validated = entry.validate_checksum(window);
        let sum = checksum::sum(window, 0, entry.length as usize).unwrap_or(0);
        Some(Self::finish(EntryPointKind::Bits32(entry), offset, validated, sum))
    }

    fn overlay64(window: &[u8], offset: usize) -> Option<Self> {
        if !Self::fits(window, EntryPoint64::LENGTH_OFFSET, EntryPoint64::SIZE, offset) {
            return None;
        }
        let entry = EntryPoint64::from_bytes(window)?;
        let validated = entry.validate_checksum(window);
        let sum = checksum::sum(window, 0, entry.length as usize).unwrap_or(0);
        Some(Self::finish(EntryPointKind::Bits64(entry), offset, validated, sum))
    }

    fn finish(kind: EntryPointKind, offset: usize, validated: bool, sum: u8) -> Self {
        let entry = Self {
            kind,
            offset,
            checksum_validated: validated,
            checksum_sum: sum,
        };

        log::debug!(
            "smbios: {}-bit entry point at {:#x}, version {}, table {:#x} ({} bytes)",
            entry.width(),
            offset,
            entry.version(),
            entry.table_address(),
            entry.table_length()
        );
        if !validated {
            log::warn!("smbios: entry point checksum mismatch, table is unverified");
        }

        entry
    }

    /// Layout variant
    #[must_use]
    pub const fn kind(&self) -> &EntryPointKind {
        &self.kind
    }

    /// Address width of the layout (32 or 64)
    #[must_use]
    pub const fn width(&self) -> u8 {
        match self.kind {
            EntryPointKind::Bits32(_) => 32,
            EntryPointKind::Bits64(_) => 64,
        }
    }

    /// Offset of the anchor within the scanned buffer
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Whether every checksum covering the entry point summed to zero
    #[must_use]
    pub const fn checksum_validated(&self) -> bool {
        self.checksum_validated
    }

    /// Checksum outcome as a `Result`
    ///
    /// # Errors
    ///
    /// [`SmbiosError::ChecksumMismatch`] when the entry point is unverified.
    pub const fn checksum_status(&self) -> SmbiosResult<()> {
        if self.checksum_validated {
            Ok(())
        } else {
            Err(SmbiosError::ChecksumMismatch { computed: self.checksum_sum })
        }
    }

    /// Declared entry point length
    #[must_use]
    pub const fn length(&self) -> u8 {
        match &self.kind {
            EntryPointKind::Bits32(e) => e.length,
            EntryPointKind::Bits64(e) => e.length,
        }
    }

    /// Specification version
    #[must_use]
    pub fn version(&self) -> SpecVersion {
        match &self.kind {
            EntryPointKind::Bits32(e) => e.version(),
            EntryPointKind::Bits64(e) => e.version(),
        }
    }

    /// Physical address of the structure table
    #[must_use]
    pub const fn table_address(&self) -> u64 {
        match &self.kind {
            EntryPointKind::Bits32(e) => e.structure_table_address as u64,
            EntryPointKind::Bits64(e) => e.structure_table_address,
        }
    }

    /// Structure table length (maximum size for the 64-bit layout)
    #[must_use]
    pub const fn table_length(&self) -> u32 {
        match &self.kind {
            EntryPointKind::Bits32(e) => e.structure_table_length as u32,
            EntryPointKind::Bits64(e) => e.structure_table_max_size,
        }
    }

    /// Declared structure count (32-bit layout only)
    #[must_use]
    pub const fn structure_count(&self) -> Option<u16> {
        match &self.kind {
            EntryPointKind::Bits32(e) => Some(e.number_of_structures),
            EntryPointKind::Bits64(_) => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{entry_point32, entry_point64};
    use alloc::vec;

    #[test]
    fn test_locate_64_at_any_offset() {
        for pad in [0usize, 1, 7, 16, 63] {
            let mut buffer = vec![0xAAu8; pad];
            buffer.extend_from_slice(&entry_point64(SpecVersion::V3_0, 0x1000, 0x200));
            buffer.extend_from_slice(&[0u8; 8]);

            let entry = EntryPoint::locate(&buffer).expect("entry point");
            assert_eq!(entry.offset(), pad);
            assert_eq!(entry.width(), 64);
            assert_eq!(entry.version(), SpecVersion::V3_0);
            assert_eq!(entry.table_address(), 0x1000);
            assert_eq!(entry.table_length(), 0x200);
            assert_eq!(entry.structure_count(), None);
            assert!(entry.checksum_validated());
        }
    }

    #[test]
    fn test_locate_32() {
        let mut buffer = vec![0u8; 5];
        buffer.extend_from_slice(&entry_point32(SpecVersion::new(2, 7), 0xE_0000, 0x400, 12));

        let entry = EntryPoint::locate(&buffer).expect("entry point");
        assert_eq!(entry.offset(), 5);
        assert_eq!(entry.width(), 32);
        assert_eq!(entry.version(), SpecVersion::V2_7);
        assert_eq!(entry.table_address(), 0xE_0000);
        assert_eq!(entry.table_length(), 0x400);
        assert_eq!(entry.structure_count(), Some(12));
        assert!(entry.checksum_validated());
        assert!(entry.checksum_status().is_ok());
    }

    #[test]
    fn test_not_found() {
        let buffer = b"no anchor in here, just _S M_ and _SM";
        assert_eq!(EntryPoint::locate(buffer), Err(SmbiosError::EntryPointNotFound));
        assert_eq!(EntryPoint::locate(&[]), Err(SmbiosError::EntryPointNotFound));
    }

    #[test]
    fn test_truncated_anchor_is_skipped() {
        // A bare anchor at the end cannot be overlaid; the complete one after
        // the decoy must still be found.
        let mut buffer = b"_SM3_".to_vec();
        buffer.extend_from_slice(&entry_point64(SpecVersion::V3_0, 0, 0));
        let entry = EntryPoint::locate(&buffer).expect("entry point");
        assert_eq!(entry.offset(), 5);

        let truncated = &entry_point64(SpecVersion::V3_0, 0, 0)[..20];
        assert_eq!(EntryPoint::locate(truncated), Err(SmbiosError::EntryPointNotFound));
    }

    #[test]
    fn test_declared_length_overrun_is_skipped() {
        let mut bytes = entry_point64(SpecVersion::V3_0, 0, 0);
        bytes[EntryPoint64::LENGTH_OFFSET] = 0x40;
        assert_eq!(EntryPoint::locate(&bytes), Err(SmbiosError::EntryPointNotFound));
    }

    #[test]
    fn test_checksum_flip_is_flagged_not_fatal() {
        let good = entry_point64(SpecVersion::V3_0, 0x20, 0x10);
        for i in 0..EntryPoint64::SIZE {
            // Anchor and length bytes decide whether the layout is found at all.
            if i < 5 || i == EntryPoint64::LENGTH_OFFSET {
                continue;
            }
            let mut bytes = good.clone();
            bytes[i] ^= 0x80;
            let entry = EntryPoint::locate(&bytes).expect("still located");
            assert!(!entry.checksum_validated(), "flip at {} went unnoticed", i);
            assert!(matches!(
                entry.checksum_status(),
                Err(SmbiosError::ChecksumMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_checksum_flip_32() {
        let good = entry_point32(SpecVersion::V2_8, 0x100, 0x80, 4);
        for i in 0..EntryPoint32::SIZE {
            if i < 4 || i == EntryPoint32::LENGTH_OFFSET {
                continue;
            }
            let mut bytes = good.clone();
            bytes[i] ^= 0x80;
            let entry = EntryPoint::locate(&bytes).expect("still located");
            assert_eq!(entry.width(), 32);
            assert!(!entry.checksum_validated(), "flip at {} went unnoticed", i);
        }
    }

    #[test]
    fn test_intermediate_checksum_32() {
        let mut bytes = entry_point32(SpecVersion::V2_8, 0x100, 0x80, 4);
        // Keep the full checksum intact by moving the error inside the
        // intermediate range and compensating in the formatted area.
        bytes[0x16] = bytes[0x16].wrapping_add(1);
        bytes[0x0B] = bytes[0x0B].wrapping_sub(1);
        assert!(checksum::is_valid(&bytes, 0, EntryPoint32::SIZE));

        let entry = EntryPoint::locate(&bytes).expect("entry point");
        assert!(!entry.checksum_validated());
    }
}
