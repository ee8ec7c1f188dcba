//! # Error Types
//!
//! Error kinds raised while locating, indexing and decoding an SMBIOS table.
//!
//! Only structural impossibilities are fatal to table construction
//! ([`SmbiosError::EntryPointNotFound`], [`SmbiosError::TableOutOfBounds`]).
//! Every other kind is surfaced next to best-effort data.

use core::fmt;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while decoding an SMBIOS table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SmbiosError {
    /// No `_SM_` or `_SM3_` anchor with a usable layout was found
    EntryPointNotFound,

    /// The entry point checksum does not sum to zero
    ChecksumMismatch {
        /// Byte sum over the declared entry point length
        computed: u8,
    },

    /// The structure table is not a valid record stream
    MalformedRecordStream {
        /// Offset of the offending record within the buffer
        offset: usize,
        /// What was wrong with it
        reason: &'static str,
    },

    /// The structure table does not map into the supplied buffer
    TableOutOfBounds {
        /// Table address declared by the entry point
        address: u64,
        /// Table length declared by the entry point
        length: u32,
    },

    /// A string index points past the end of the record's string table
    StringIndexOutOfRange {
        /// Requested 1-based index
        index: u8,
        /// Number of strings actually present
        count: usize,
    },

    /// The field does not exist in the selected layout generation
    FieldNotAvailableForVersion {
        /// Field name
        field: &'static str,
    },

    /// A typed decoder was handed a record of another type
    UnexpectedRecordType {
        /// Type the decoder handles
        expected: u8,
        /// Type found in the header
        found: u8,
    },

    /// The record is too short for any known layout generation
    RecordTooShort {
        /// Record handle
        handle: u16,
        /// Declared record length
        length: u8,
    },
}

impl SmbiosError {
    /// Whether the table can still be used when this error is reported
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::EntryPointNotFound | Self::TableOutOfBounds { .. })
    }
}

impl fmt::Display for SmbiosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntryPointNotFound => write!(f, "SMBIOS entry point not found"),

            Self::ChecksumMismatch { computed } => {
                write!(f, "entry point checksum mismatch (sum {:#04x})", computed)
            }

            Self::MalformedRecordStream { offset, reason } => {
                write!(f, "malformed record stream at offset {:#x}: {}", offset, reason)
            }

            Self::TableOutOfBounds { address, length } => {
                write!(
                    f,
                    "structure table at {:#x} ({} bytes) lies outside the buffer",
                    address, length
                )
            }

            Self::StringIndexOutOfRange { index, count } => {
                write!(f, "string index {} out of range ({} strings)", index, count)
            }

            Self::FieldNotAvailableForVersion { field } => {
                write!(f, "field '{}' is not present in this record version", field)
            }

            Self::UnexpectedRecordType { expected, found } => {
                write!(f, "expected record type {}, found {}", expected, found)
            }

            Self::RecordTooShort { handle, length } => {
                write!(f, "record {:#06x} is too short ({} bytes)", handle, length)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SmbiosError {}

// =============================================================================
// Result Type
// =============================================================================

/// Result type for SMBIOS operations
pub type SmbiosResult<T> = Result<T, SmbiosError>;

// =============================================================================
// TESTS
// =============================================================================
