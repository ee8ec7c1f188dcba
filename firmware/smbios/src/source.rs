//! # Firmware Sources
//!
//! The decoder never touches hardware. Whatever reads firmware memory (a
//! bootloader, a kernel driver, a userspace tool) implements
//! [`FirmwareSource`] and hands back an [`AcquiredTable`].

use alloc::vec::Vec;

use crate::error::SmbiosResult;
use crate::table::SmbiosTable;

/// Physical base of the legacy BIOS window scanned for `_SM_` / `_SM3_`
pub const LEGACY_WINDOW_BASE: u64 = 0xF_0000;

/// Length of the legacy BIOS window
pub const LEGACY_WINDOW_LENGTH: usize = 0x1_0000;

/// Something that can produce raw SMBIOS bytes
pub trait FirmwareSource {
    /// Acquisition error
    type Error;

    /// Read the entry point and structure table
    fn acquire(&self) -> Result<AcquiredTable, Self::Error>;
}

/// Raw bytes handed over by a [`FirmwareSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquiredTable {
    /// A physical memory window holding both the entry point and the table
    Window {
        /// Physical address of `bytes[0]`
        base_address: u64,
        /// Window contents
        bytes: Vec<u8>,
    },
    /// Entry point and table exposed separately (Linux sysfs)
    Split {
        /// Entry point bytes
        entry_point: Vec<u8>,
        /// Structure table bytes
        table: Vec<u8>,
    },
}

impl AcquiredTable {
    /// Window at [`LEGACY_WINDOW_BASE`]
    pub fn legacy_window(bytes: Vec<u8>) -> Self {
        Self::Window { base_address: LEGACY_WINDOW_BASE, bytes }
    }

    /// Total number of bytes held
    pub fn len(&self) -> usize {
        match self {
            Self::Window { bytes, .. } => bytes.len(),
            Self::Split { entry_point, table } => entry_point.len() + table.len(),
        }
    }

    /// Whether nothing was acquired
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode the acquired bytes
    ///
    /// # Errors
    ///
    /// See [`SmbiosTable::open_at`] and [`SmbiosTable::from_parts`].
    pub fn open(&self) -> SmbiosResult<SmbiosTable<'_>> {
        match self {
            Self::Window { base_address, bytes } => SmbiosTable::open_at(bytes, *base_address),
            Self::Split { entry_point, table } => SmbiosTable::from_parts(entry_point, table),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
