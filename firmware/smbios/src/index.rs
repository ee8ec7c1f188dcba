//! # Record Indexer
//!
//! Single pass over the structure table producing one [`RecordHeader`] per
//! record. Bodies are never copied; headers borrow the buffer.
//!
//! Indexing stops on the first of:
//!
//! - an End-of-Table (type 127) record, which is kept in the index
//! - the running offset reaching the table end (missing terminator)
//! - a malformed record, reported alongside the headers gathered so far

use alloc::vec::Vec;

use crate::error::SmbiosError;
use crate::header::RecordHeader;

/// Headers gathered from one table, plus the error that stopped indexing early
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordIndex<'a> {
    /// Headers in file order
    pub headers: Vec<RecordHeader<'a>>,
    /// Set when the stream was malformed; `headers` is then partial
    pub error: Option<SmbiosError>,
}

impl<'a> RecordIndex<'a> {
    /// Whether the whole stream was indexed without error
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Walk the structure table starting at `table_base`
///
/// The table end is `table_base + table_length`, clamped to the buffer.
pub fn build_index(buffer: &[u8], table_base: usize, table_length: usize) -> RecordIndex<'_> {
    let declared_end = table_base.saturating_add(table_length);
    let end = declared_end.min(buffer.len());
    if end < declared_end {
        log::debug!(
            "smbios: table declares {} bytes at {:#x}, buffer holds {}",
            table_length,
            table_base,
            end.saturating_sub(table_base)
        );
    }

    let mut index = RecordIndex::default();
    let mut offset = table_base;

    while offset < end {
        match read_record(buffer, offset, end) {
            Ok((header, next)) => {
                let last = header.is_end_of_table();
                index.headers.push(header);
                offset = next;
                if last {
                    break;
                }
            }
            Err(err) => {
                log::warn!("smbios: {}; keeping {} records", err, index.headers.len());
                index.error = Some(err);
                break;
            }
        }
    }

    log::debug!("smbios: indexed {} records", index.headers.len());
    index
}

fn malformed(offset: usize, reason: &'static str) -> SmbiosError {
    SmbiosError::MalformedRecordStream { offset, reason }
}

/// Read one record at `offset`, returning its header and the next offset
fn read_record(buffer: &[u8], offset: usize, end: usize) -> Result<(RecordHeader<'_>, usize), SmbiosError> {
    if end - offset < RecordHeader::SIZE {
        return Err(malformed(offset, "truncated record header"));
    }

    let record_type = buffer[offset];
    let length = buffer[offset + 1];
    let handle = u16::from_le_bytes([buffer[offset + 2], buffer[offset + 3]]);

    if (length as usize) < RecordHeader::SIZE {
        return Err(malformed(offset, "length below header size"));
    }

    let body_end = offset + length as usize;
    if body_end > end {
        return Err(malformed(offset, "formatted area runs past table end"));
    }

    // String set ends with two consecutive NUL bytes
    let strings_end = buffer[body_end..end]
        .windows(2)
        .position(|pair| pair == [0, 0])
        .map(|pos| body_end + pos + 2)
        .ok_or_else(|| malformed(offset, "string set is not terminated"))?;

    let header = RecordHeader {
        record_type,
        length,
        handle,
        offset,
        body: &buffer[offset..body_end],
        strings: &buffer[body_end..strings_end],
    };

    Ok((header, strings_end))
}

// =============================================================================
// TESTS
// =============================================================================
