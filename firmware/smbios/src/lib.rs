//! # Helix SMBIOS - Firmware Table Decoder
//!
//! This crate decodes the System Management BIOS table that platform firmware
//! exposes to describe the installed hardware.
//!
//! ## Design Philosophy
//!
//! 1. **Zero-Copy**: every view borrows the acquired buffer; only decoded
//!    values (numbers, strings) are ever materialised
//! 2. **Version-Aware**: typed records select the richest layout generation
//!    that both the table version and the record's declared length allow
//! 3. **Best-Effort**: integrity problems (bad checksum, truncated stream)
//!    degrade to partial output instead of aborting
//! 4. **No I/O**: acquisition of the raw bytes is a collaborator concern
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use helix_smbios::SmbiosTable;
//!
//! fn dump(buffer: &[u8]) {
//!     let table = SmbiosTable::open(buffer).expect("no SMBIOS entry point");
//!
//!     for device in table.memory_devices() {
//!         let _locator = device.device_locator();
//!     }
//!
//!     let _text = table.render();
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          HELIX SMBIOS STACK                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Layer 3: SmbiosTable (Facade, Cursor, Rendering)                       │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Layer 2: Typed Records (MemoryDevice) + StringTable                    │
//! │           └─ Generation selection, bounds-checked field readers         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Layer 1: RecordIndex (single pass over the structure table)            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Layer 0: EntryPoint (_SM_ / _SM3_ anchor scan, checksum)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#![no_std]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checksum;
pub mod entry;
pub mod error;
pub mod header;
pub mod index;
pub mod layout;
pub mod memory_device;
pub mod render;
pub mod source;
pub mod strings;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use entry::{EntryPoint, EntryPoint32, EntryPoint64};
pub use error::{SmbiosError, SmbiosResult};
pub use header::{RecordHeader, RecordType, SpecVersion};
pub use index::{build_index, RecordIndex};
pub use memory_device::{
    DeviceSet, DeviceSize, ErrorHandle, MemoryDevice, MemoryDeviceGeneration, MemoryTypeDetail,
    Rank, Speed, Voltage, Width,
};
pub use source::{AcquiredTable, FirmwareSource};
pub use strings::StringTable;
pub use table::{HeaderCursor, SmbiosTable};

// =============================================================================
// Constants
// =============================================================================

/// Anchor of the 32-bit (SMBIOS 2.x) entry point
pub const SMBIOS2_ANCHOR: [u8; 4] = *b"_SM_";

/// Anchor of the 64-bit (SMBIOS 3.x) entry point
pub const SMBIOS3_ANCHOR: [u8; 5] = *b"_SM3_";

/// Intermediate anchor embedded in the 32-bit entry point
pub const DMI_ANCHOR: [u8; 5] = *b"_DMI_";

/// String returned for string index 0
pub const NOT_SPECIFIED: &str = "Not Specified";

/// String returned for a string index past the end of the string table
pub const BAD_INDEX: &str = "Bad index";

/// Label used for enumerated values the table does not define
pub const OUT_OF_SPEC: &str = "Out of spec";
