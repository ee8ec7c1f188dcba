//! Command-line configuration.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;

const LONG_ABOUT: &str = "Print the SMBIOS table of the running machine in a dmidecode-like format.

By default the tables exposed under /sys/firmware/dmi/tables are read, falling
back to the legacy BIOS window in /dev/mem. Use --file to decode a raw dump.";

/// Where the raw bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceChoice {
    /// sysfs, then /dev/mem
    Auto,
    /// /dev/mem only
    DevMem,
    /// A dump file
    File(PathBuf),
}

/// Parsed invocation
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "helix-smbios-dump",
    version,
    about = "Dump the SMBIOS table of the running machine",
    long_about = LONG_ABOUT
)]
pub struct DumpConfig {
    #[arg(
        long = "file",
        value_name = "PATH",
        conflicts_with = "dev_mem",
        long_help = "Read a raw dump instead of the running firmware. The dump is scanned as a window based at address 0."
    )]
    pub file: Option<PathBuf>,
    #[arg(
        long = "dev-mem",
        action = ArgAction::SetTrue,
        long_help = "Scan the legacy BIOS window in /dev/mem instead of sysfs."
    )]
    pub dev_mem: bool,
    #[arg(
        long = "type",
        value_name = "N",
        value_parser = parse_record_type,
        long_help = "Only print records of type N (decimal or 0x-prefixed hex)."
    )]
    pub type_filter: Option<u8>,
    #[arg(
        long = "headers",
        action = ArgAction::SetTrue,
        long_help = "Print one line per record instead of decoding."
    )]
    pub headers_only: bool,
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        conflicts_with = "quiet",
        long_help = "More diagnostics on stderr. Repeat for trace output."
    )]
    pub verbose: u8,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Only report errors on stderr."
    )]
    pub quiet: bool,
}

fn parse_record_type(value: &str) -> Result<u8, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| format!("'{}' is not a record type (0-255)", value))
}

impl DumpConfig {
    /// Selected acquisition source
    pub fn source(&self) -> SourceChoice {
        match &self.file {
            Some(path) => SourceChoice::File(path.clone()),
            None if self.dev_mem => SourceChoice::DevMem,
            None => SourceChoice::Auto,
        }
    }

    /// Log level implied by `-v` / `-q`
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<DumpConfig, clap::Error> {
        DumpConfig::try_parse_from(std::iter::once("helix-smbios-dump").chain(args.iter().copied()))
    }

    fn error_kind(args: &[&str]) -> ErrorKind {
        match parse(args) {
            Ok(config) => panic!("expected a usage error, got {:?}", config),
            Err(err) => err.kind(),
        }
    }

    #[test]
    fn test_command_definition() {
        DumpConfig::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).expect("config");
        assert_eq!(config.source(), SourceChoice::Auto);
        assert_eq!(config.type_filter, None);
        assert!(!config.headers_only);
        assert_eq!(config.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_flags() {
        let config = parse(&["--file", "dump.bin", "--type", "0x11", "--headers", "-vv"]).expect("config");
        assert_eq!(config.source(), SourceChoice::File(PathBuf::from("dump.bin")));
        assert_eq!(config.type_filter, Some(17));
        assert!(config.headers_only);
        assert_eq!(config.log_level(), LevelFilter::Trace);

        let config = parse(&["--dev-mem", "--type", "4", "-q"]).expect("config");
        assert_eq!(config.source(), SourceChoice::DevMem);
        assert_eq!(config.type_filter, Some(4));
        assert_eq!(config.log_level(), LevelFilter::Error);

        let config = parse(&["-v"]).expect("config");
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_help() {
        assert_eq!(error_kind(&["--type", "17", "--help"]), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(error_kind(&["--bogus"]), ErrorKind::UnknownArgument);
        assert!(parse(&["--file"]).is_err());
        assert_eq!(error_kind(&["--type", "256"]), ErrorKind::ValueValidation);
        assert_eq!(error_kind(&["--type", "0xZZ"]), ErrorKind::ValueValidation);
        assert_eq!(error_kind(&["--file", "a", "--dev-mem"]), ErrorKind::ArgumentConflict);
        assert_eq!(error_kind(&["--dev-mem", "--file", "a"]), ErrorKind::ArgumentConflict);
        assert_eq!(error_kind(&["-v", "-q"]), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_usage_error_exit_code() {
        let err = parse(&["--bogus"]).expect_err("usage error");
        assert_eq!(err.exit_code(), 2);
    }
}
