//! stderr sink for the `log` facade.

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Logger configuration
#[derive(Debug, Clone, Copy)]
pub struct LoggerConfig {
    /// Most verbose level emitted
    pub max_level: LevelFilter,
    /// Prefix messages with their module path
    pub show_source: bool,
}

impl LoggerConfig {
    /// Configuration for a level chosen on the command line
    pub fn for_level(max_level: LevelFilter) -> Self {
        Self {
            max_level,
            show_source: max_level >= LevelFilter::Debug,
        }
    }
}

/// Writes `[LEVEL] module: message` lines to stderr
#[derive(Debug)]
pub struct StderrLogger {
    config: LoggerConfig,
}

impl StderrLogger {
    pub fn new(config: LoggerConfig) -> Self {
        Self { config }
    }

    fn format(&self, record: &Record<'_>) -> String {
        match record.module_path() {
            Some(module) if self.config.show_source => {
                format!("[{:<5}] {}: {}", record.level(), module, record.args())
            }
            _ => format!("[{:<5}] {}", record.level(), record.args()),
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.config.max_level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the logger process-wide
pub fn init(config: LoggerConfig) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(StderrLogger::new(config)))?;
    log::set_max_level(config.max_level);
    Ok(())
}
