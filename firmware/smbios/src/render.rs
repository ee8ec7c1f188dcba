//! # Text Rendering
//!
//! dmidecode-style text blocks:
//!
//! ```text
//! Handle 0x0040, DMI type 17, 40 bytes
//! Memory Device (SMBIOS 2.8 layout)
//! 	Locator: DIMM0
//! 	...
//! ```
//!
//! Records without a typed decoder render their header line, their name and
//! a hex dump of the formatted area.

use alloc::string::String;
use core::fmt::{self, Write};

use crate::header::RecordHeader;
use crate::strings::StringTable;

/// Bytes per hex dump line
const DUMP_WIDTH: usize = 16;

/// Line-oriented builder for one record block
#[derive(Debug)]
pub struct RecordWriter {
    out: String,
}

impl RecordWriter {
    /// Start a block with the record's header line
    pub fn new(header: &RecordHeader<'_>) -> Self {
        let mut w = Self { out: String::new() };
        w.line(format_args!(
            "Handle {:#06x}, DMI type {}, {} bytes",
            header.handle, header.record_type, header.length
        ));
        w
    }

    /// Append an unindented line
    pub fn line(&mut self, args: fmt::Arguments<'_>) {
        // Writing into a String cannot fail
        let _ = self.out.write_fmt(args);
        self.out.push('\n');
    }

    /// Append a `label: value` field line
    pub fn field(&mut self, label: &str, value: impl fmt::Display) {
        let _ = writeln!(self.out, "\t{}: {}", label, value);
    }

    /// Append a field line when the value is present
    pub fn field_opt<T: fmt::Display>(&mut self, label: &str, value: Option<T>) {
        if let Some(value) = value {
            self.field(label, value);
        }
    }

    /// Finished block
    pub fn finish(self) -> String {
        self.out
    }
}

/// Render a record that has no typed decoder
pub fn render_generic(header: &RecordHeader<'_>) -> String {
    let mut w = RecordWriter::new(header);
    w.line(format_args!("{}", header.kind()));
    if header.is_end_of_table() {
        return w.finish();
    }

    w.line(format_args!("\tHeader and Data:"));
    for chunk in header.body.chunks(DUMP_WIDTH) {
        let mut row = String::with_capacity(chunk.len() * 3);
        for (i, byte) in chunk.iter().enumerate() {
            if i > 0 {
                row.push(' ');
            }
            let _ = write!(row, "{:02X}", byte);
        }
        w.line(format_args!("\t\t{}", row));
    }

    let strings = StringTable::extract(header);
    if !strings.is_empty() {
        w.line(format_args!("\tStrings:"));
        for s in strings.iter() {
            w.line(format_args!("\t\t{}", s));
        }
    }

    w.finish()
}

// =============================================================================
// TESTS
// =============================================================================
