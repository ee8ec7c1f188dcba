//! # Record Headers
//!
//! Every SMBIOS structure starts with the same four-byte header:
//!
//! ```text
//! +------+--------+-----------------+
//! | Type | Length | Handle (LE u16) |
//! +------+--------+-----------------+
//!   0x00   0x01     0x02
//! ```
//!
//! `Length` covers the formatted area only (header included). The string set
//! follows immediately and ends with two consecutive NUL bytes.

use core::fmt;

// =============================================================================
// SPECIFICATION VERSION
// =============================================================================

/// SMBIOS specification version declared by the entry point
///
/// Ordering is lexicographic on `(major, minor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecVersion {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
}

impl SpecVersion {
    /// SMBIOS 2.1
    pub const V2_1: Self = Self::new(2, 1);
    /// SMBIOS 2.3
    pub const V2_3: Self = Self::new(2, 3);
    /// SMBIOS 2.6
    pub const V2_6: Self = Self::new(2, 6);
    /// SMBIOS 2.7
    pub const V2_7: Self = Self::new(2, 7);
    /// SMBIOS 2.8
    pub const V2_8: Self = Self::new(2, 8);
    /// SMBIOS 3.0
    pub const V3_0: Self = Self::new(3, 0);

    /// Create a version
    #[must_use]
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Whether this version is at least `other`
    #[must_use]
    pub fn at_least(&self, other: Self) -> bool {
        *self >= other
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

// =============================================================================
// RECORD HEADER
// =============================================================================

/// Lightweight descriptor of one record in the structure table
///
/// The descriptor borrows the acquired buffer; no record body is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader<'a> {
    /// Record type (0-255)
    pub record_type: u8,
    /// Length of the formatted area, header included
    pub length: u8,
    /// Record handle (0xFFFF is reserved)
    pub handle: u16,
    /// Offset of the record's first byte in the buffer
    pub offset: usize,
    /// Formatted area (`length` bytes)
    pub body: &'a [u8],
    /// String set following the formatted area, terminators included
    pub strings: &'a [u8],
}

impl<'a> RecordHeader<'a> {
    /// Size of the fixed header
    pub const SIZE: usize = 4;

    /// Reserved handle value
    pub const RESERVED_HANDLE: u16 = 0xFFFF;

    /// Decoded record type
    #[must_use]
    pub const fn kind(&self) -> RecordType {
        RecordType::from_u8(self.record_type)
    }

    /// Whether this is the End-of-Table marker
    #[must_use]
    pub const fn is_end_of_table(&self) -> bool {
        self.record_type == RecordType::END_OF_TABLE
    }

    /// Total bytes occupied by the record, string set included
    #[must_use]
    pub const fn total_size(&self) -> usize {
        self.body.len() + self.strings.len()
    }
}

// =============================================================================
// RECORD TYPES
// =============================================================================

/// SMBIOS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordType(pub u8);

impl RecordType {
    /// BIOS Information
    pub const BIOS_INFORMATION: u8 = 0;
    /// System Information
    pub const SYSTEM_INFORMATION: u8 = 1;
    /// System Enclosure or Chassis
    pub const SYSTEM_ENCLOSURE: u8 = 3;
    /// Processor Information
    pub const PROCESSOR_INFORMATION: u8 = 4;
    /// Cache Information
    pub const CACHE_INFORMATION: u8 = 7;
    /// Port Connector Information
    pub const PORT_CONNECTOR: u8 = 8;
    /// System Slots
    pub const SYSTEM_SLOTS: u8 = 9;
    /// Physical Memory Array
    pub const PHYSICAL_MEMORY_ARRAY: u8 = 16;
    /// Memory Device
    pub const MEMORY_DEVICE: u8 = 17;
    /// Memory Array Mapped Address
    pub const MEMORY_ARRAY_MAPPED_ADDRESS: u8 = 19;
    /// System Boot Information
    pub const SYSTEM_BOOT_INFORMATION: u8 = 32;
    /// Inactive
    pub const INACTIVE: u8 = 126;
    /// End-of-Table
    pub const END_OF_TABLE: u8 = 127;

    /// Wrap a raw type byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        Self(value)
    }

    /// Whether the type is in the OEM-specific range (128-255)
    #[must_use]
    pub const fn is_oem(&self) -> bool {
        self.0 >= 128
    }

    /// Human-readable name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self.0 {
            0 => "BIOS Information",
            1 => "System Information",
            2 => "Base Board Information",
            3 => "Chassis Information",
            4 => "Processor Information",
            5 => "Memory Controller Information",
            6 => "Memory Module Information",
            7 => "Cache Information",
            8 => "Port Connector Information",
            9 => "System Slots",
            10 => "On Board Devices Information",
            11 => "OEM Strings",
            12 => "System Configuration Options",
            13 => "BIOS Language Information",
            14 => "Group Associations",
            15 => "System Event Log",
            16 => "Physical Memory Array",
            17 => "Memory Device",
            18 => "32-bit Memory Error Information",
            19 => "Memory Array Mapped Address",
            20 => "Memory Device Mapped Address",
            21 => "Built-in Pointing Device",
            22 => "Portable Battery",
            23 => "System Reset",
            24 => "Hardware Security",
            25 => "System Power Controls",
            26 => "Voltage Probe",
            27 => "Cooling Device",
            28 => "Temperature Probe",
            29 => "Electrical Current Probe",
            30 => "Out-of-band Remote Access",
            31 => "Boot Integrity Services",
            32 => "System Boot Information",
            33 => "64-bit Memory Error Information",
            34 => "Management Device",
            35 => "Management Device Component",
            36 => "Management Device Threshold Data",
            37 => "Memory Channel",
            38 => "IPMI Device Information",
            39 => "System Power Supply",
            40 => "Additional Information",
            41 => "Onboard Devices Extended Information",
            42 => "Management Controller Host Interface",
            43 => "TPM Device",
            44 => "Processor Additional Information",
            126 => "Inactive",
            127 => "End Of Table",
            128..=255 => "OEM-specific",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TESTS
// =============================================================================
