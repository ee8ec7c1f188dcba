//! # String Table
//!
//! The string set trailing a record's formatted area, addressed by 1-based
//! index from string fields in the body. Index 0 always resolves to
//! [`NOT_SPECIFIED`].
//!
//! ```text
//! "DIMM0" 00 "Bank0" 00 00     two strings
//! 00 00                        no strings
//! ```

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::{SmbiosError, SmbiosResult};
use crate::header::RecordHeader;
use crate::{BAD_INDEX, NOT_SPECIFIED};

/// Parsed string set of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTable<'a> {
    /// Slot 0 holds the sentinel
    strings: Vec<Cow<'a, str>>,
}

impl<'a> StringTable<'a> {
    /// Parse the string set of `header`
    pub fn extract(header: &RecordHeader<'a>) -> Self {
        Self::parse(header.strings)
    }

    /// Parse a raw string set
    ///
    /// Parsing stops at the double NUL or at the end of `data`, whichever
    /// comes first. Invalid UTF-8 is replaced, not rejected.
    pub fn parse(data: &'a [u8]) -> Self {
        let mut strings = vec![Cow::Borrowed(NOT_SPECIFIED)];

        // An empty set is written as two NULs
        if data.first().map_or(true, |&b| b == 0) {
            return Self { strings };
        }

        let mut pos = 0;
        while pos < data.len() {
            let len = data[pos..].iter().position(|&b| b == 0).unwrap_or(data.len() - pos);
            strings.push(String::from_utf8_lossy(&data[pos..pos + len]));
            pos += len + 1;

            if data.get(pos).map_or(true, |&b| b == 0) {
                break;
            }
        }

        Self { strings }
    }

    /// Look up a string by its 1-based index
    ///
    /// Index 0 yields [`NOT_SPECIFIED`]; an index past the end yields
    /// [`BAD_INDEX`].
    #[must_use]
    pub fn get(&self, index: u8) -> &str {
        self.strings.get(index as usize).map_or(BAD_INDEX, |s| &**s)
    }

    /// Look up a string by its 1-based index, reporting out-of-range indices
    ///
    /// # Errors
    ///
    /// [`SmbiosError::StringIndexOutOfRange`] when `index` is past the end.
    pub fn try_get(&self, index: u8) -> SmbiosResult<&str> {
        self.strings
            .get(index as usize)
            .map(|s| &**s)
            .ok_or(SmbiosError::StringIndexOutOfRange { index, count: self.len() })
    }

    /// Number of real strings (the sentinel is not counted)
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len() - 1
    }

    /// Whether the record carries no strings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the real strings in file order
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.strings[1..].iter().map(|s| &**s)
    }
}

// =============================================================================
// TESTS
// =============================================================================
