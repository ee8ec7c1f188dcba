//! # Memory Device (Type 17)
//!
//! One record per memory socket. The formatted area grew through five
//! revisions, each appending fields:
//!
//! | Generation | Size | Adds                                                  |
//! |------------|------|-------------------------------------------------------|
//! | 2.1        | 0x15 | handles, widths, size, form factor, locators, type    |
//! | 2.3        | 0x1B | speed, manufacturer, serial, asset tag, part number   |
//! | 2.6        | 0x1C | attributes (rank)                                     |
//! | 2.7        | 0x22 | extended size, configured clock speed                 |
//! | 2.8        | 0x28 | minimum, maximum and configured voltage               |
//!
//! Accessors return `None` for a field the selected generation does not
//! carry. Sentinel values (unknown, not installed...) decode to the enums
//! below rather than to raw numbers.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use bitflags::bitflags;
use static_assertions::const_assert_eq;

use crate::error::{SmbiosError, SmbiosResult};
use crate::header::{RecordHeader, RecordType, SpecVersion};
use crate::layout::{FieldReader, Generation, VersionedLayout};
use crate::render::RecordWriter;
use crate::strings::StringTable;
use crate::OUT_OF_SPEC;

// =============================================================================
// FIELD OFFSETS
// =============================================================================

/// Field offsets within the formatted area
pub mod offset {
    /// Physical Memory Array handle (u16)
    pub const ARRAY_HANDLE: usize = 0x04;
    /// Memory Error Information handle (u16)
    pub const ERROR_HANDLE: usize = 0x06;
    /// Total width in bits (u16)
    pub const TOTAL_WIDTH: usize = 0x08;
    /// Data width in bits (u16)
    pub const DATA_WIDTH: usize = 0x0A;
    /// Size (u16)
    pub const SIZE: usize = 0x0C;
    /// Form factor (u8)
    pub const FORM_FACTOR: usize = 0x0E;
    /// Device set (u8)
    pub const DEVICE_SET: usize = 0x0F;
    /// Device locator string
    pub const DEVICE_LOCATOR: usize = 0x10;
    /// Bank locator string
    pub const BANK_LOCATOR: usize = 0x11;
    /// Memory type (u8)
    pub const MEMORY_TYPE: usize = 0x12;
    /// Type detail bitmask (u16)
    pub const TYPE_DETAIL: usize = 0x13;
    /// Speed in MT/s (u16)
    pub const SPEED: usize = 0x15;
    /// Manufacturer string
    pub const MANUFACTURER: usize = 0x17;
    /// Serial number string
    pub const SERIAL_NUMBER: usize = 0x18;
    /// Asset tag string
    pub const ASSET_TAG: usize = 0x19;
    /// Part number string
    pub const PART_NUMBER: usize = 0x1A;
    /// Attributes, rank in bits 3:0 (u8)
    pub const ATTRIBUTES: usize = 0x1B;
    /// Extended size in MiB (u32)
    pub const EXTENDED_SIZE: usize = 0x1C;
    /// Configured memory clock speed (u16)
    pub const CONFIGURED_CLOCK_SPEED: usize = 0x20;
    /// Minimum voltage in mV (u16)
    pub const MINIMUM_VOLTAGE: usize = 0x22;
    /// Maximum voltage in mV (u16)
    pub const MAXIMUM_VOLTAGE: usize = 0x24;
    /// Configured voltage in mV (u16)
    pub const CONFIGURED_VOLTAGE: usize = 0x26;
}

// =============================================================================
// GENERATIONS
// =============================================================================

/// Layout generation of a Memory Device record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemoryDeviceGeneration {
    /// SMBIOS 2.1 base layout
    V2_1,
    /// SMBIOS 2.3: speed and identification strings
    V2_3,
    /// SMBIOS 2.6: rank
    V2_6,
    /// SMBIOS 2.7: extended size and configured clock speed
    V2_7,
    /// SMBIOS 2.8: voltages
    V2_8,
}

impl MemoryDeviceGeneration {
    /// Formatted-area size of the 2.1 layout
    pub const SIZE_V2_1: usize = 0x15;
    /// Formatted-area size of the 2.3 layout
    pub const SIZE_V2_3: usize = 0x1B;
    /// Formatted-area size of the 2.6 layout
    pub const SIZE_V2_6: usize = 0x1C;
    /// Formatted-area size of the 2.7 layout
    pub const SIZE_V2_7: usize = 0x22;
    /// Formatted-area size of the 2.8 layout
    pub const SIZE_V2_8: usize = 0x28;
}

// Each generation ends exactly where the next one's first field starts
const_assert_eq!(offset::TYPE_DETAIL + 2, MemoryDeviceGeneration::SIZE_V2_1);
const_assert_eq!(offset::SPEED, MemoryDeviceGeneration::SIZE_V2_1);
const_assert_eq!(offset::PART_NUMBER + 1, MemoryDeviceGeneration::SIZE_V2_3);
const_assert_eq!(offset::ATTRIBUTES, MemoryDeviceGeneration::SIZE_V2_3);
const_assert_eq!(offset::ATTRIBUTES + 1, MemoryDeviceGeneration::SIZE_V2_6);
const_assert_eq!(offset::EXTENDED_SIZE, MemoryDeviceGeneration::SIZE_V2_6);
const_assert_eq!(offset::CONFIGURED_CLOCK_SPEED + 2, MemoryDeviceGeneration::SIZE_V2_7);
const_assert_eq!(offset::MINIMUM_VOLTAGE, MemoryDeviceGeneration::SIZE_V2_7);
const_assert_eq!(offset::CONFIGURED_VOLTAGE + 2, MemoryDeviceGeneration::SIZE_V2_8);

impl VersionedLayout for MemoryDeviceGeneration {
    const GENERATIONS: &'static [Generation<Self>] = &[
        Generation { id: Self::V2_1, introduced: SpecVersion::V2_1, size: Self::SIZE_V2_1 },
        Generation { id: Self::V2_3, introduced: SpecVersion::V2_3, size: Self::SIZE_V2_3 },
        Generation { id: Self::V2_6, introduced: SpecVersion::V2_6, size: Self::SIZE_V2_6 },
        Generation { id: Self::V2_7, introduced: SpecVersion::V2_7, size: Self::SIZE_V2_7 },
        Generation { id: Self::V2_8, introduced: SpecVersion::V2_8, size: Self::SIZE_V2_8 },
    ];
}

// =============================================================================
// SENTINEL-DECODED VALUES
// =============================================================================

/// Memory Error Information handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorHandle {
    /// 0xFFFE: the platform does not provide error information
    NotProvided,
    /// 0xFFFF: no error was detected
    NoError,
    /// Handle of a Memory Error Information record
    Handle(u16),
}

impl ErrorHandle {
    fn from_raw(raw: u16) -> Self {
        match raw {
            0xFFFE => Self::NotProvided,
            0xFFFF => Self::NoError,
            handle => Self::Handle(handle),
        }
    }
}

impl fmt::Display for ErrorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotProvided => f.write_str("Not Provided"),
            Self::NoError => f.write_str("No Error"),
            Self::Handle(h) => write!(f, "{:#06x}", h),
        }
    }
}

/// Total or data width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 0x0000 or 0xFFFF
    Unknown,
    /// Width in bits
    Bits(u16),
}

impl Width {
    fn from_raw(raw: u16) -> Self {
        match raw {
            0x0000 | 0xFFFF => Self::Unknown,
            bits => Self::Bits(bits),
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("Unknown"),
            Self::Bits(n) => write!(f, "{} bits", n),
        }
    }
}

/// Device size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSize {
    /// 0x0000: the socket is empty
    NotInstalled,
    /// 0xFFFF
    Unknown,
    /// 0x7FFF in a record without the extended size field
    ExtendedUnavailable,
    /// Granularity bit set
    Kilobytes(u32),
    /// Size in MiB
    Megabytes(u32),
}

impl DeviceSize {
    /// Size in MiB, when known and installed
    #[must_use]
    pub const fn megabytes(&self) -> Option<u64> {
        match self {
            Self::Kilobytes(kb) => Some(*kb as u64 / 1024),
            Self::Megabytes(mb) => Some(*mb as u64),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled => f.write_str("No Module Installed"),
            Self::Unknown => f.write_str("Unknown"),
            Self::ExtendedUnavailable => f.write_str("Extended Size Unavailable"),
            Self::Kilobytes(kb) => write!(f, "{} kB", kb),
            Self::Megabytes(mb) if *mb != 0 && mb % 1024 == 0 => write!(f, "{} GB", mb / 1024),
            Self::Megabytes(mb) => write!(f, "{} MB", mb),
        }
    }
}

/// Device set membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSet {
    /// 0x00: not part of a set
    None,
    /// 0xFF
    Unknown,
    /// Set number
    Set(u8),
}

impl DeviceSet {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::None,
            0xFF => Self::Unknown,
            set => Self::Set(set),
        }
    }
}

impl fmt::Display for DeviceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Unknown => f.write_str("Unknown"),
            Self::Set(n) => write!(f, "{}", n),
        }
    }
}

/// Memory speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    /// 0x0000
    Unknown,
    /// 0xFFFF
    Reserved,
    /// Megatransfers per second
    MegaTransfers(u16),
}

impl Speed {
    fn from_raw(raw: u16) -> Self {
        match raw {
            0x0000 => Self::Unknown,
            0xFFFF => Self::Reserved,
            mts => Self::MegaTransfers(mts),
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("Unknown"),
            Self::Reserved => f.write_str("Reserved"),
            Self::MegaTransfers(n) => write!(f, "{} MT/s", n),
        }
    }
}

/// Module rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    /// 0
    Unknown,
    /// Rank count (1-15)
    Ranks(u8),
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("Unknown"),
            Self::Ranks(n) => write!(f, "{}", n),
        }
    }
}

/// Operating voltage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voltage {
    /// 0
    Unknown,
    /// Millivolts
    Millivolts(u16),
}

impl Voltage {
    fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::Unknown,
            mv => Self::Millivolts(mv),
        }
    }
}

impl fmt::Display for Voltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("Unknown"),
            Self::Millivolts(mv) => write!(f, "{}.{:03} V", mv / 1000, mv % 1000),
        }
    }
}

// =============================================================================
// LABEL TABLES
// =============================================================================

const FORM_FACTORS: &[(u8, &str)] = &[
    (0x01, "Other"),
    (0x02, "Unknown"),
    (0x03, "SIMM"),
    (0x04, "SIP"),
    (0x05, "Chip"),
    (0x06, "DIP"),
    (0x07, "ZIP"),
    (0x08, "Proprietary Card"),
    (0x09, "DIMM"),
    (0x0A, "TSOP"),
    (0x0B, "Row Of Chips"),
    (0x0C, "RIMM"),
    (0x0D, "SODIMM"),
    (0x0E, "SRIMM"),
    (0x0F, "FB-DIMM"),
    (0x10, "Die"),
];

const MEMORY_TYPES: &[(u8, &str)] = &[
    (0x01, "Other"),
    (0x02, "Unknown"),
    (0x03, "DRAM"),
    (0x04, "EDRAM"),
    (0x05, "VRAM"),
    (0x06, "SRAM"),
    (0x07, "RAM"),
    (0x08, "ROM"),
    (0x09, "Flash"),
    (0x0A, "EEPROM"),
    (0x0B, "FEPROM"),
    (0x0C, "EPROM"),
    (0x0D, "CDRAM"),
    (0x0E, "3DRAM"),
    (0x0F, "SDRAM"),
    (0x10, "SGRAM"),
    (0x11, "RDRAM"),
    (0x12, "DDR"),
    (0x13, "DDR2"),
    (0x14, "DDR2 FB-DIMM"),
    (0x18, "DDR3"),
    (0x19, "FBD2"),
    (0x1A, "DDR4"),
    (0x1B, "LPDDR"),
    (0x1C, "LPDDR2"),
    (0x1D, "LPDDR3"),
    (0x1E, "LPDDR4"),
    (0x1F, "Logical non-volatile device"),
    (0x20, "HBM"),
    (0x21, "HBM2"),
    (0x22, "DDR5"),
    (0x23, "LPDDR5"),
];

/// Type detail labels by bit position
const TYPE_DETAILS: [&str; 16] = [
    "Reserved",
    "Other",
    "Unknown",
    "Fast-paged",
    "Static Column",
    "Pseudo-static",
    "RAMBUS",
    "Synchronous",
    "CMOS",
    "EDO",
    "Window DRAM",
    "Cache DRAM",
    "Non-Volatile",
    "Registered (Buffered)",
    "Unbuffered (Unregistered)",
    "LRDIMM",
];

fn lookup(table: &'static [(u8, &'static str)], value: u8) -> &'static str {
    table
        .binary_search_by_key(&value, |&(key, _)| key)
        .map_or(OUT_OF_SPEC, |i| table[i].1)
}

/// Label of a form factor value
#[must_use]
pub fn form_factor_label(value: u8) -> &'static str {
    lookup(FORM_FACTORS, value)
}

/// Label of a memory type value
#[must_use]
pub fn memory_type_label(value: u8) -> &'static str {
    lookup(MEMORY_TYPES, value)
}

bitflags! {
    /// Memory type detail bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MemoryTypeDetail: u16 {
        /// Reserved
        const RESERVED = 1 << 0;
        /// Other
        const OTHER = 1 << 1;
        /// Unknown
        const UNKNOWN = 1 << 2;
        /// Fast-paged
        const FAST_PAGED = 1 << 3;
        /// Static column
        const STATIC_COLUMN = 1 << 4;
        /// Pseudo-static
        const PSEUDO_STATIC = 1 << 5;
        /// RAMBUS
        const RAMBUS = 1 << 6;
        /// Synchronous
        const SYNCHRONOUS = 1 << 7;
        /// CMOS
        const CMOS = 1 << 8;
        /// EDO
        const EDO = 1 << 9;
        /// Window DRAM
        const WINDOW_DRAM = 1 << 10;
        /// Cache DRAM
        const CACHE_DRAM = 1 << 11;
        /// Non-volatile
        const NON_VOLATILE = 1 << 12;
        /// Registered (buffered)
        const REGISTERED = 1 << 13;
        /// Unbuffered (unregistered)
        const UNBUFFERED = 1 << 14;
        /// LRDIMM
        const LRDIMM = 1 << 15;
    }
}

impl MemoryTypeDetail {
    /// Labels of the set bits, joined with ", "
    ///
    /// An empty mask renders as "Out of spec".
    #[must_use]
    pub fn label(&self) -> String {
        if self.is_empty() {
            return String::from(OUT_OF_SPEC);
        }

        TYPE_DETAILS
            .iter()
            .enumerate()
            .filter(|(bit, _)| self.bits() & (1 << bit) != 0)
            .map(|(_, label)| *label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// MEMORY DEVICE
// =============================================================================

/// Decoded view of a Memory Device record
#[derive(Debug, Clone)]
pub struct MemoryDevice<'a> {
    header: RecordHeader<'a>,
    generation: Generation<MemoryDeviceGeneration>,
    fields: FieldReader<'a>,
    strings: StringTable<'a>,
}

impl<'a> MemoryDevice<'a> {
    /// Decode `header` under table version `version`
    ///
    /// # Errors
    ///
    /// - [`SmbiosError::UnexpectedRecordType`] for a non-type-17 record
    /// - [`SmbiosError::RecordTooShort`] when no generation fits
    pub fn new(header: &RecordHeader<'a>, version: SpecVersion) -> SmbiosResult<Self> {
        if header.record_type != RecordType::MEMORY_DEVICE {
            return Err(SmbiosError::UnexpectedRecordType {
                expected: RecordType::MEMORY_DEVICE,
                found: header.record_type,
            });
        }

        let generation = MemoryDeviceGeneration::select(version, header.body.len()).ok_or(
            SmbiosError::RecordTooShort { handle: header.handle, length: header.length },
        )?;

        Ok(Self {
            header: *header,
            generation,
            fields: FieldReader::new(header.body, generation.size),
            strings: StringTable::extract(header),
        })
    }

    /// Convert an absent field into [`SmbiosError::FieldNotAvailableForVersion`]
    ///
    /// # Errors
    ///
    /// Returns the error when `value` is `None`.
    pub fn require<T>(field: &'static str, value: Option<T>) -> SmbiosResult<T> {
        value.ok_or(SmbiosError::FieldNotAvailableForVersion { field })
    }

    /// Underlying record header
    #[must_use]
    pub const fn header(&self) -> &RecordHeader<'a> {
        &self.header
    }

    /// Selected layout generation
    #[must_use]
    pub const fn generation(&self) -> MemoryDeviceGeneration {
        self.generation.id
    }

    /// Record string table
    #[must_use]
    pub const fn strings(&self) -> &StringTable<'a> {
        &self.strings
    }

    fn string_at(&self, offset: usize) -> Option<&str> {
        self.fields.u8_at(offset).map(|index| self.strings.get(index))
    }

    // -------------------------------------------------------------------------
    // 2.1
    // -------------------------------------------------------------------------

    /// Handle of the Physical Memory Array this device belongs to
    pub fn array_handle(&self) -> Option<u16> {
        self.fields.u16_at(offset::ARRAY_HANDLE)
    }

    /// Memory Error Information handle
    pub fn error_handle(&self) -> Option<ErrorHandle> {
        self.fields.u16_at(offset::ERROR_HANDLE).map(ErrorHandle::from_raw)
    }

    /// Total width, check bits included
    pub fn total_width(&self) -> Option<Width> {
        self.fields.u16_at(offset::TOTAL_WIDTH).map(Width::from_raw)
    }

    /// Data width
    pub fn data_width(&self) -> Option<Width> {
        self.fields.u16_at(offset::DATA_WIDTH).map(Width::from_raw)
    }

    /// Raw size word
    pub fn raw_size(&self) -> Option<u16> {
        self.fields.u16_at(offset::SIZE)
    }

    /// Device size
    ///
    /// 0x7FFF defers to the extended size field when the record carries it.
    pub fn size(&self) -> Option<DeviceSize> {
        let raw = self.raw_size()?;
        Some(match raw {
            0x0000 => DeviceSize::NotInstalled,
            0xFFFF => DeviceSize::Unknown,
            0x7FFF => self
                .extended_size()
                .map_or(DeviceSize::ExtendedUnavailable, DeviceSize::Megabytes),
            kb if kb & 0x8000 != 0 => DeviceSize::Kilobytes(u32::from(kb & 0x7FFF)),
            mb => DeviceSize::Megabytes(u32::from(mb)),
        })
    }

    /// Raw form factor
    pub fn form_factor(&self) -> Option<u8> {
        self.fields.u8_at(offset::FORM_FACTOR)
    }

    /// Form factor label
    pub fn form_factor_label(&self) -> Option<&'static str> {
        self.form_factor().map(form_factor_label)
    }

    /// Device set
    pub fn device_set(&self) -> Option<DeviceSet> {
        self.fields.u8_at(offset::DEVICE_SET).map(DeviceSet::from_raw)
    }

    /// Device locator string index
    pub fn device_locator_index(&self) -> Option<u8> {
        self.fields.u8_at(offset::DEVICE_LOCATOR)
    }

    /// Socket or board position label, e.g. "DIMM 3"
    pub fn device_locator(&self) -> Option<&str> {
        self.string_at(offset::DEVICE_LOCATOR)
    }

    /// Bank locator string index
    pub fn bank_locator_index(&self) -> Option<u8> {
        self.fields.u8_at(offset::BANK_LOCATOR)
    }

    /// Bank label, e.g. "Bank 0"
    pub fn bank_locator(&self) -> Option<&str> {
        self.string_at(offset::BANK_LOCATOR)
    }

    /// Raw memory type
    pub fn memory_type(&self) -> Option<u8> {
        self.fields.u8_at(offset::MEMORY_TYPE)
    }

    /// Memory type label
    pub fn memory_type_label(&self) -> Option<&'static str> {
        self.memory_type().map(memory_type_label)
    }

    /// Type detail bits
    pub fn type_detail(&self) -> Option<MemoryTypeDetail> {
        self.fields
            .u16_at(offset::TYPE_DETAIL)
            .map(MemoryTypeDetail::from_bits_retain)
    }

    // -------------------------------------------------------------------------
    // 2.3
    // -------------------------------------------------------------------------

    /// Maximum capable speed
    pub fn speed(&self) -> Option<Speed> {
        self.fields.u16_at(offset::SPEED).map(Speed::from_raw)
    }

    /// Manufacturer string index
    pub fn manufacturer_index(&self) -> Option<u8> {
        self.fields.u8_at(offset::MANUFACTURER)
    }

    /// Manufacturer
    pub fn manufacturer(&self) -> Option<&str> {
        self.string_at(offset::MANUFACTURER)
    }

    /// Serial number string index
    pub fn serial_number_index(&self) -> Option<u8> {
        self.fields.u8_at(offset::SERIAL_NUMBER)
    }

    /// Serial number
    pub fn serial_number(&self) -> Option<&str> {
        self.string_at(offset::SERIAL_NUMBER)
    }

    /// Asset tag string index
    pub fn asset_tag_index(&self) -> Option<u8> {
        self.fields.u8_at(offset::ASSET_TAG)
    }

    /// Asset tag
    pub fn asset_tag(&self) -> Option<&str> {
        self.string_at(offset::ASSET_TAG)
    }

    /// Part number string index
    pub fn part_number_index(&self) -> Option<u8> {
        self.fields.u8_at(offset::PART_NUMBER)
    }

    /// Part number
    pub fn part_number(&self) -> Option<&str> {
        self.string_at(offset::PART_NUMBER)
    }

    // -------------------------------------------------------------------------
    // 2.6 - 2.8
    // -------------------------------------------------------------------------

    /// Rank (attributes bits 3:0)
    pub fn rank(&self) -> Option<Rank> {
        self.fields.u8_at(offset::ATTRIBUTES).map(|attr| match attr & 0x0F {
            0 => Rank::Unknown,
            n => Rank::Ranks(n),
        })
    }

    /// Extended size in MiB (bits 30:0)
    pub fn extended_size(&self) -> Option<u32> {
        self.fields
            .u32_at(offset::EXTENDED_SIZE)
            .map(|size| size & 0x7FFF_FFFF)
    }

    /// Configured memory clock speed
    pub fn configured_clock_speed(&self) -> Option<Speed> {
        self.fields
            .u16_at(offset::CONFIGURED_CLOCK_SPEED)
            .map(Speed::from_raw)
    }

    /// Minimum operating voltage
    pub fn minimum_voltage(&self) -> Option<Voltage> {
        self.fields.u16_at(offset::MINIMUM_VOLTAGE).map(Voltage::from_raw)
    }

    /// Maximum operating voltage
    pub fn maximum_voltage(&self) -> Option<Voltage> {
        self.fields.u16_at(offset::MAXIMUM_VOLTAGE).map(Voltage::from_raw)
    }

    /// Configured voltage
    pub fn configured_voltage(&self) -> Option<Voltage> {
        self.fields
            .u16_at(offset::CONFIGURED_VOLTAGE)
            .map(Voltage::from_raw)
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Multi-line description, fields in byte-offset order
    #[must_use]
    pub fn render(&self) -> String {
        let mut w = RecordWriter::new(&self.header);
        w.line(format_args!(
            "Memory Device (SMBIOS {} layout)",
            self.generation.introduced
        ));

        w.field_opt("Array Handle", self.array_handle().map(HexHandle));
        w.field_opt("Error Information Handle", self.error_handle());
        w.field_opt("Total Width", self.total_width());
        w.field_opt("Data Width", self.data_width());
        w.field_opt("Size", self.size());
        w.field_opt("Form Factor", self.form_factor_label());
        w.field_opt("Set", self.device_set());
        w.field_opt("Locator", self.device_locator());
        w.field_opt("Bank Locator", self.bank_locator());
        w.field_opt("Type", self.memory_type_label());
        w.field_opt("Type Detail", self.type_detail().map(|d| d.label()));
        w.field_opt("Speed", self.speed());
        w.field_opt("Manufacturer", self.manufacturer());
        w.field_opt("Serial Number", self.serial_number());
        w.field_opt("Asset Tag", self.asset_tag());
        w.field_opt("Part Number", self.part_number());
        w.field_opt("Rank", self.rank());
        w.field_opt("Extended Size", self.extended_size().map(DeviceSize::Megabytes));
        w.field_opt("Configured Memory Speed", self.configured_clock_speed());
        w.field_opt("Minimum Voltage", self.minimum_voltage());
        w.field_opt("Maximum Voltage", self.maximum_voltage());
        w.field_opt("Configured Voltage", self.configured_voltage());

        w.finish()
    }
}

impl fmt::Display for MemoryDevice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

struct HexHandle(u16);

impl fmt::Display for HexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_index;
    use crate::testing::{memory_device_fields, record, DeviceFields};
    use crate::{BAD_INDEX, NOT_SPECIFIED};
    use alloc::vec::Vec;

    fn decode_with<R>(bytes: &[u8], version: SpecVersion, check: impl FnOnce(&MemoryDevice<'_>) -> R) -> R {
        let index = build_index(bytes, 0, bytes.len());
        let device = MemoryDevice::new(&index.headers[0], version).expect("memory device");
        check(&device)
    }

    fn device_bytes(values: &DeviceFields, size: usize, strings: &[&str]) -> Vec<u8> {
        record(17, 0x0040, &memory_device_fields(values, size), strings)
    }

    #[test]
    fn test_v21_reports_later_fields_absent() {
        let bytes = device_bytes(&DeviceFields::default(), 0x15, &["DIMM0", "Bank0"]);

        decode_with(&bytes, SpecVersion::V3_0, |d| {
            assert_eq!(d.generation(), MemoryDeviceGeneration::V2_1);
            assert_eq!(d.array_handle(), Some(0x1000));
            assert_eq!(d.device_locator(), Some("DIMM0"));
            assert_eq!(d.bank_locator(), Some("Bank0"));
            assert_eq!(d.speed(), None);
            assert_eq!(d.manufacturer(), None);
            assert_eq!(d.serial_number(), None);
            assert_eq!(d.asset_tag(), None);
            assert_eq!(d.part_number_index(), None);
            assert_eq!(d.rank(), None);
            assert_eq!(d.extended_size(), None);
            assert_eq!(d.configured_clock_speed(), None);
            assert_eq!(d.minimum_voltage(), None);
            assert_eq!(d.maximum_voltage(), None);
            assert_eq!(d.configured_voltage(), None);
        });
    }

    #[test]
    fn test_version_caps_generation() {
        let bytes = device_bytes(&DeviceFields::default(), 0x28, &["DIMM0"]);

        decode_with(&bytes, SpecVersion::V2_3, |d| {
            assert_eq!(d.generation(), MemoryDeviceGeneration::V2_3);
            assert!(d.speed().is_some());
            assert_eq!(d.rank(), None);
        });
        decode_with(&bytes, SpecVersion::V2_8, |d| {
            assert_eq!(d.generation(), MemoryDeviceGeneration::V2_8);
            assert_eq!(d.configured_voltage(), Some(Voltage::Millivolts(1200)));
        });
    }

    #[test]
    fn test_length_caps_generation() {
        for (size, expected) in [
            (0x15, MemoryDeviceGeneration::V2_1),
            (0x1A, MemoryDeviceGeneration::V2_1),
            (0x1B, MemoryDeviceGeneration::V2_3),
            (0x1C, MemoryDeviceGeneration::V2_6),
            (0x21, MemoryDeviceGeneration::V2_6),
            (0x22, MemoryDeviceGeneration::V2_7),
            (0x28, MemoryDeviceGeneration::V2_8),
            (0x54, MemoryDeviceGeneration::V2_8),
        ] {
            let bytes = device_bytes(&DeviceFields::default(), size, &[]);
            decode_with(&bytes, SpecVersion::new(3, 4), |d| {
                assert_eq!(d.generation(), expected, "declared length {:#x}", size);
            });
        }
    }

    #[test]
    fn test_rejects_wrong_type_and_short_record() {
        let bytes = record(16, 0x0001, &[0u8; 0x13], &[]);
        let index = build_index(&bytes, 0, bytes.len());
        assert_eq!(
            MemoryDevice::new(&index.headers[0], SpecVersion::V3_0).err(),
            Some(SmbiosError::UnexpectedRecordType { expected: 17, found: 16 })
        );

        let bytes = device_bytes(&DeviceFields::default(), 0x14, &[]);
        let index = build_index(&bytes, 0, bytes.len());
        assert_eq!(
            MemoryDevice::new(&index.headers[0], SpecVersion::V3_0).err(),
            Some(SmbiosError::RecordTooShort { handle: 0x0040, length: 0x14 })
        );

        let bytes = device_bytes(&DeviceFields::default(), 0x15, &[]);
        let index = build_index(&bytes, 0, bytes.len());
        assert!(MemoryDevice::new(&index.headers[0], SpecVersion::new(2, 0)).is_err());
    }

    #[test]
    fn test_width_sentinels() {
        for (raw, expected) in [
            (0x0000, Width::Unknown),
            (0xFFFF, Width::Unknown),
            (72, Width::Bits(72)),
        ] {
            let values = DeviceFields { total_width: raw, data_width: raw, ..Default::default() };
            let bytes = device_bytes(&values, 0x15, &[]);
            decode_with(&bytes, SpecVersion::V2_1, |d| {
                assert_eq!(d.total_width(), Some(expected));
                assert_eq!(d.data_width(), Some(expected));
            });
        }
    }

    #[test]
    fn test_size_sentinels() {
        let cases = [
            (0x0000, 0x15, DeviceSize::NotInstalled),
            (0xFFFF, 0x15, DeviceSize::Unknown),
            (0x7FFF, 0x1C, DeviceSize::ExtendedUnavailable),
            (0x7FFF, 0x22, DeviceSize::Megabytes(65536)),
            (0x8200, 0x15, DeviceSize::Kilobytes(512)),
            (8192, 0x15, DeviceSize::Megabytes(8192)),
        ];
        for (raw, size, expected) in cases {
            let values = DeviceFields { size: raw, extended_size: 0x8001_0000, ..Default::default() };
            let bytes = device_bytes(&values, size, &[]);
            decode_with(&bytes, SpecVersion::V3_0, |d| {
                assert_eq!(d.size(), Some(expected), "raw size {:#x}", raw);
            });
        }
        assert_ne!(DeviceSize::NotInstalled, DeviceSize::Unknown);
    }

    #[test]
    fn test_handle_and_set_sentinels() {
        assert_eq!(ErrorHandle::from_raw(0xFFFE), ErrorHandle::NotProvided);
        assert_eq!(ErrorHandle::from_raw(0xFFFF), ErrorHandle::NoError);
        assert_eq!(ErrorHandle::from_raw(0x0012), ErrorHandle::Handle(0x12));
        assert_eq!(DeviceSet::from_raw(0), DeviceSet::None);
        assert_eq!(DeviceSet::from_raw(0xFF), DeviceSet::Unknown);
        assert_eq!(DeviceSet::from_raw(2), DeviceSet::Set(2));
        assert_eq!(Speed::from_raw(0), Speed::Unknown);
        assert_eq!(Speed::from_raw(0xFFFF), Speed::Reserved);
    }

    #[test]
    fn test_labels() {
        assert_eq!(form_factor_label(0x09), "DIMM");
        assert_eq!(form_factor_label(0x0D), "SODIMM");
        assert_eq!(form_factor_label(0x00), OUT_OF_SPEC);
        assert_eq!(form_factor_label(0x42), OUT_OF_SPEC);
        assert_eq!(memory_type_label(0x1A), "DDR4");
        assert_eq!(memory_type_label(0x22), "DDR5");
        assert_eq!(memory_type_label(0x16), OUT_OF_SPEC);
        assert_eq!(memory_type_label(0xFF), OUT_OF_SPEC);
    }

    #[test]
    fn test_type_detail_label() {
        let detail = MemoryTypeDetail::SYNCHRONOUS | MemoryTypeDetail::UNBUFFERED;
        assert_eq!(detail.label(), "Synchronous, Unbuffered (Unregistered)");
        assert_eq!(MemoryTypeDetail::empty().label(), OUT_OF_SPEC);
        assert_eq!(MemoryTypeDetail::LRDIMM.label(), "LRDIMM");
    }

    #[test]
    fn test_string_fields() {
        let values = DeviceFields { manufacturer: 3, serial_number: 0, asset_tag: 9, ..Default::default() };
        let bytes = device_bytes(&values, 0x1B, &["DIMM0", "Bank0", "Acme"]);
        decode_with(&bytes, SpecVersion::V2_3, |d| {
            assert_eq!(d.manufacturer(), Some("Acme"));
            assert_eq!(d.serial_number(), Some(NOT_SPECIFIED));
            assert_eq!(d.asset_tag(), Some(BAD_INDEX));
        });
    }

    #[test]
    fn test_require() {
        let bytes = device_bytes(&DeviceFields::default(), 0x15, &[]);
        decode_with(&bytes, SpecVersion::V3_0, |d| {
            assert_eq!(MemoryDevice::require("array handle", d.array_handle()), Ok(0x1000));
            assert_eq!(
                MemoryDevice::require("rank", d.rank()),
                Err(SmbiosError::FieldNotAvailableForVersion { field: "rank" })
            );
        });
    }

    #[test]
    fn test_render_follows_offsets() {
        let bytes = device_bytes(&DeviceFields::default(), 0x28, &["DIMM0", "Bank0"]);
        decode_with(&bytes, SpecVersion::V3_0, |d| {
            let text = d.render();
            assert!(text.starts_with("Handle 0x0040, DMI type 17, 40 bytes\n"));
            assert!(text.contains("\tSize: 8 GB\n"));
            assert!(text.contains("\tType: DDR4\n"));
            assert!(text.contains("\tConfigured Voltage: 1.200 V\n"));

            let locator = text.find("Locator: DIMM0").expect("locator");
            let speed = text.find("Speed:").expect("speed");
            let voltage = text.find("Minimum Voltage").expect("voltage");
            assert!(locator < speed && speed < voltage);
        });
    }

    #[test]
    fn test_render_omits_absent_fields() {
        let bytes = device_bytes(&DeviceFields::default(), 0x15, &["DIMM0"]);
        decode_with(&bytes, SpecVersion::V3_0, |d| {
            let text = d.render();
            assert!(text.contains("SMBIOS 2.1 layout"));
            assert!(!text.contains("Speed"));
            assert!(!text.contains("Voltage"));
        });
    }
}
