//! # SMBIOS Table
//!
//! Read-only facade over an acquired buffer. Construction locates the entry
//! point and indexes the structure table once; every query afterwards walks
//! the cached headers.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;
use core::iter::FusedIterator;
use core::slice;

use spin::Once;

use crate::entry::EntryPoint;
use crate::error::{SmbiosError, SmbiosResult};
use crate::header::{RecordHeader, RecordType, SpecVersion};
use crate::index::{build_index, RecordIndex};
use crate::memory_device::MemoryDevice;
use crate::render::render_generic;

/// Decoded SMBIOS table
#[derive(Debug)]
pub struct SmbiosTable<'a> {
    entry_point: EntryPoint,
    index: RecordIndex<'a>,
    table_base: usize,
    table_length: usize,
    /// Header positions per record type, built on first use
    by_type: Once<BTreeMap<u8, Vec<usize>>>,
}

impl<'a> SmbiosTable<'a> {
    /// Open a buffer whose first byte is physical address 0
    ///
    /// # Errors
    ///
    /// See [`SmbiosTable::open_at`].
    pub fn open(buffer: &'a [u8]) -> SmbiosResult<Self> {
        Self::open_at(buffer, 0)
    }

    /// Open a buffer whose first byte is physical address `base_address`
    ///
    /// # Errors
    ///
    /// - [`SmbiosError::EntryPointNotFound`] when no anchor qualifies
    /// - [`SmbiosError::TableOutOfBounds`] when the table address is outside
    ///   the buffer
    pub fn open_at(buffer: &'a [u8], base_address: u64) -> SmbiosResult<Self> {
        let entry_point = EntryPoint::locate(buffer)?;
        let address = entry_point.table_address();
        let length = entry_point.table_length();

        let out_of_bounds = SmbiosError::TableOutOfBounds { address, length };
        let table_base = address
            .checked_sub(base_address)
            .and_then(|offset| usize::try_from(offset).ok())
            .ok_or(out_of_bounds)?;

        let maps = if length == 0 {
            table_base <= buffer.len()
        } else {
            table_base < buffer.len()
        };
        if !maps {
            log::warn!(
                "smbios: table at {:#x} is outside the {}-byte buffer based at {:#x}",
                address,
                buffer.len(),
                base_address
            );
            return Err(out_of_bounds);
        }

        Ok(Self::build(entry_point, buffer, table_base, length as usize))
    }

    /// Open an entry point and a structure table exposed separately
    ///
    /// The table address in the entry point is ignored; `table` starts at
    /// its first byte.
    ///
    /// # Errors
    ///
    /// [`SmbiosError::EntryPointNotFound`] when `entry_point` holds no anchor.
    pub fn from_parts(entry_point: &[u8], table: &'a [u8]) -> SmbiosResult<Self> {
        let entry_point = EntryPoint::locate(entry_point)?;
        let length = (entry_point.table_length() as usize).min(table.len());
        Ok(Self::build(entry_point, table, 0, length))
    }

    fn build(entry_point: EntryPoint, buffer: &'a [u8], table_base: usize, table_length: usize) -> Self {
        let index = build_index(buffer, table_base, table_length);
        Self {
            entry_point,
            index,
            table_base,
            table_length,
            by_type: Once::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Metadata
    // -------------------------------------------------------------------------

    /// Located entry point
    pub fn entry_point(&self) -> &EntryPoint {
        &self.entry_point
    }

    /// Specification version declared by the entry point
    pub fn version(&self) -> SpecVersion {
        self.entry_point.version()
    }

    /// Number of indexed records, End-of-Table included
    pub fn structure_count(&self) -> usize {
        self.index.headers.len()
    }

    /// Structure count declared by a 32-bit entry point
    pub fn declared_structure_count(&self) -> Option<u16> {
        self.entry_point.structure_count()
    }

    /// Whether the entry point checksum validated
    pub fn checksum_validated(&self) -> bool {
        self.entry_point.checksum_validated()
    }

    /// Error that cut indexing short, if any
    pub fn index_error(&self) -> Option<SmbiosError> {
        self.index.error
    }

    /// Offset of the structure table within the buffer
    pub fn table_base(&self) -> usize {
        self.table_base
    }

    /// Declared table length (maximum size for 64-bit entry points)
    pub fn table_length(&self) -> usize {
        self.table_length
    }

    // -------------------------------------------------------------------------
    // Traversal
    // -------------------------------------------------------------------------

    /// Headers in file order
    pub fn headers(&self) -> slice::Iter<'_, RecordHeader<'a>> {
        self.index.headers.iter()
    }

    /// Restartable cursor positioned on the first record
    pub fn cursor(&self) -> HeaderCursor<'_, 'a> {
        HeaderCursor::new(&self.index.headers)
    }

    /// Record with the given handle
    pub fn find_by_handle(&self, handle: u16) -> Option<&RecordHeader<'a>> {
        self.headers().find(|h| h.handle == handle)
    }

    fn type_index(&self) -> &BTreeMap<u8, Vec<usize>> {
        self.by_type.call_once(|| {
            let mut map: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
            for (position, header) in self.index.headers.iter().enumerate() {
                map.entry(header.record_type).or_default().push(position);
            }
            map
        })
    }

    /// Records of one type, in file order
    pub fn records_of_type(&self, record_type: u8) -> impl Iterator<Item = &RecordHeader<'a>> + '_ {
        self.type_index()
            .get(&record_type)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .filter_map(move |&position| self.index.headers.get(position))
    }

    /// Decoded Memory Device records
    ///
    /// Records the decoder rejects are skipped.
    pub fn memory_devices(&self) -> impl Iterator<Item = MemoryDevice<'a>> + '_ {
        let version = self.version();
        self.records_of_type(RecordType::MEMORY_DEVICE)
            .filter_map(move |header| match MemoryDevice::new(header, version) {
                Ok(device) => Some(device),
                Err(err) => {
                    log::debug!("smbios: skipping record {:#06x}: {}", header.handle, err);
                    None
                }
            })
    }

    /// Sum of the sizes of installed memory devices, in MiB
    pub fn total_memory_mb(&self) -> u64 {
        self.memory_devices()
            .filter_map(|device| device.size())
            .filter_map(|size| size.megabytes())
            .sum()
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Render one record, typed when a decoder exists
    pub fn render_record(&self, header: &RecordHeader<'a>) -> String {
        if header.record_type == RecordType::MEMORY_DEVICE {
            if let Ok(device) = MemoryDevice::new(header, self.version()) {
                return device.render();
            }
        }
        render_generic(header)
    }

    /// Render the whole table
    pub fn render(&self) -> String {
        let mut out = String::new();
        let body_length: usize = self.headers().map(RecordHeader::total_size).sum();

        let _ = writeln!(out, "SMBIOS {} present.", self.version());
        if !self.checksum_validated() {
            let _ = writeln!(out, "Entry point checksum is invalid.");
        }
        let _ = writeln!(
            out,
            "{} structures occupying {} bytes.",
            self.structure_count(),
            body_length
        );
        let address = self.entry_point.table_address();
        let _ = match self.entry_point.width() {
            32 => writeln!(out, "Table at {:#010X}.", address),
            _ => writeln!(out, "Table at {:#018X}.", address),
        };

        for header in self.headers() {
            out.push('\n');
            out.push_str(&self.render_record(header));
        }

        if let Some(err) = self.index_error() {
            let _ = writeln!(out, "\nTable is truncated: {}.", err);
        }
        out
    }
}

// =============================================================================
// CURSOR
// =============================================================================

/// Read-only, restartable, bidirectional cursor over indexed headers
///
/// As an iterator it yields the window between the current position and the
/// back end, from either side.
#[derive(Debug, Clone)]
pub struct HeaderCursor<'t, 'a> {
    headers: &'t [RecordHeader<'a>],
    front: usize,
    back: usize,
}

impl<'t, 'a> HeaderCursor<'t, 'a> {
    fn new(headers: &'t [RecordHeader<'a>]) -> Self {
        Self { headers, front: 0, back: headers.len() }
    }

    /// Record under the cursor
    pub fn current(&self) -> Option<&'t RecordHeader<'a>> {
        if self.front < self.back {
            self.headers.get(self.front)
        } else {
            None
        }
    }

    /// Step forward and return the new current record
    pub fn advance(&mut self) -> Option<&'t RecordHeader<'a>> {
        if self.front < self.back {
            self.front += 1;
        }
        self.current()
    }

    /// Step back and return the new current record
    pub fn retreat(&mut self) -> Option<&'t RecordHeader<'a>> {
        if self.front == 0 {
            return None;
        }
        self.front -= 1;
        self.current()
    }

    /// Return to the first record and reset the back end
    pub fn rewind(&mut self) {
        self.front = 0;
        self.back = self.headers.len();
    }

    /// Index of the current record
    pub fn position(&self) -> usize {
        self.front
    }
}

impl<'t, 'a> Iterator for HeaderCursor<'t, 'a> {
    type Item = &'t RecordHeader<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = self.current()?;
        self.front += 1;
        Some(header)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl<'t, 'a> DoubleEndedIterator for HeaderCursor<'t, 'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back <= self.front {
            return None;
        }
        self.back -= 1;
        self.headers.get(self.back)
    }
}

impl ExactSizeIterator for HeaderCursor<'_, '_> {}

impl FusedIterator for HeaderCursor<'_, '_> {}

// =============================================================================
// TESTS
// =============================================================================
