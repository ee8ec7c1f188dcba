//! # helix-smbios-dump
//!
//! Prints the SMBIOS table of the running machine (or of a raw dump) in a
//! dmidecode-like format.
//!
//! Exit status: 0 on success, 1 when the table cannot be acquired or decoded,
//! 2 on a usage error.

mod acquire;
mod config;
mod logger;

use std::fmt;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use helix_smbios::{SmbiosError, SmbiosTable};

use crate::acquire::AcquireError;
use crate::config::DumpConfig;
use crate::logger::LoggerConfig;

/// Failures after the command line was accepted
#[derive(Debug)]
enum DumpError {
    Acquire(AcquireError),
    Decode(SmbiosError),
    Output(io::Error),
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquire(err) => write!(f, "acquisition failed: {}", err),
            Self::Decode(err) => write!(f, "decoding failed: {}", err),
            Self::Output(err) => write!(f, "writing output failed: {}", err),
        }
    }
}

impl From<AcquireError> for DumpError {
    fn from(err: AcquireError) -> Self {
        Self::Acquire(err)
    }
}

impl From<SmbiosError> for DumpError {
    fn from(err: SmbiosError) -> Self {
        Self::Decode(err)
    }
}

impl From<io::Error> for DumpError {
    fn from(err: io::Error) -> Self {
        Self::Output(err)
    }
}

fn print_headers(table: &SmbiosTable<'_>, out: &mut impl Write, type_filter: Option<u8>) -> io::Result<()> {
    for header in table.headers() {
        if matches!(type_filter, Some(ty) if ty != header.record_type) {
            continue;
        }
        writeln!(
            out,
            "{:#06x}  type {:3}  length {:3}  {}",
            header.handle,
            header.record_type,
            header.length,
            header.kind()
        )?;
    }
    Ok(())
}

fn run(config: &DumpConfig) -> Result<(), DumpError> {
    let acquired = acquire::acquire(&config.source())?;
    let table = acquired.open()?;

    if !table.checksum_validated() {
        log::warn!("entry point checksum is invalid, output may be unreliable");
    }
    if let Some(err) = table.index_error() {
        log::warn!("structure table is truncated: {}", err);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if config.headers_only {
        print_headers(&table, &mut out, config.type_filter)?;
    } else if let Some(ty) = config.type_filter {
        for header in table.records_of_type(ty) {
            writeln!(out, "{}", table.render_record(header))?;
        }
    } else {
        write!(out, "{}", table.render())?;
    }

    if config.type_filter.is_none() {
        log::info!("{} MB of memory installed", table.total_memory_mb());
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let config = DumpConfig::parse();

    if let Err(err) = logger::init(LoggerConfig::for_level(config.log_level())) {
        eprintln!("helix-smbios-dump: {}", err);
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::from(1)
        }
    }
}
