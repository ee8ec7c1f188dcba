//! Linux firmware sources.
//!
//! sysfs exposes the entry point and the structure table as two files and
//! needs no special privileges beyond root. `/dev/mem` is the fallback for
//! kernels without `CONFIG_DMI_SYSFS`.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use helix_smbios::source::{LEGACY_WINDOW_BASE, LEGACY_WINDOW_LENGTH};
use helix_smbios::{AcquiredTable, FirmwareSource};

use crate::config::SourceChoice;

/// Default sysfs directory
pub const SYSFS_TABLES: &str = "/sys/firmware/dmi/tables";

/// Default physical memory device
pub const DEV_MEM: &str = "/dev/mem";

/// Acquisition failure
#[derive(Debug)]
pub enum AcquireError {
    /// Reading `path` failed
    Io {
        path: PathBuf,
        source: io::Error,
    },
    /// Every source in the fallback chain failed
    Exhausted(Vec<AcquireError>),
}

impl AcquireError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io { path: path.to_path_buf(), source }
    }
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            Self::Exhausted(errors) => {
                f.write_str("no SMBIOS source available")?;
                for err in errors {
                    write!(f, "; {}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for AcquireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Exhausted(_) => None,
        }
    }
}

// =============================================================================
// SOURCES
// =============================================================================

/// `smbios_entry_point` and `DMI` under a sysfs tables directory
#[derive(Debug, Clone)]
pub struct SysfsSource {
    dir: PathBuf,
}

impl SysfsSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for SysfsSource {
    fn default() -> Self {
        Self::new(SYSFS_TABLES)
    }
}

impl FirmwareSource for SysfsSource {
    type Error = AcquireError;

    fn acquire(&self) -> Result<AcquiredTable, Self::Error> {
        let entry_path = self.dir.join("smbios_entry_point");
        let table_path = self.dir.join("DMI");
        let entry_point = fs::read(&entry_path).map_err(AcquireError::io(&entry_path))?;
        let table = fs::read(&table_path).map_err(AcquireError::io(&table_path))?;

        log::debug!(
            "sysfs: {} byte entry point, {} byte table",
            entry_point.len(),
            table.len()
        );
        Ok(AcquiredTable::Split { entry_point, table })
    }
}

/// Legacy BIOS window read through a physical memory device
#[derive(Debug, Clone)]
pub struct DevMemSource {
    path: PathBuf,
}

impl DevMemSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for DevMemSource {
    fn default() -> Self {
        Self::new(DEV_MEM)
    }
}

impl FirmwareSource for DevMemSource {
    type Error = AcquireError;

    fn acquire(&self) -> Result<AcquiredTable, Self::Error> {
        let wrap = AcquireError::io(&self.path);
        let read_window = || -> io::Result<Vec<u8>> {
            let mut file = File::open(&self.path)?;
            file.seek(SeekFrom::Start(LEGACY_WINDOW_BASE))?;
            let mut bytes = vec![0u8; LEGACY_WINDOW_LENGTH];
            file.read_exact(&mut bytes)?;
            Ok(bytes)
        };

        let bytes = read_window().map_err(wrap)?;
        log::debug!(
            "{}: read window {:#x}..{:#x}",
            self.path.display(),
            LEGACY_WINDOW_BASE,
            LEGACY_WINDOW_BASE + LEGACY_WINDOW_LENGTH as u64
        );
        Ok(AcquiredTable::legacy_window(bytes))
    }
}

/// Raw dump file, scanned as a window based at address 0
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FirmwareSource for FileSource {
    type Error = AcquireError;

    fn acquire(&self) -> Result<AcquiredTable, Self::Error> {
        let bytes = fs::read(&self.path).map_err(AcquireError::io(&self.path))?;
        Ok(AcquiredTable::Window { base_address: 0, bytes })
    }
}

/// Acquire from the configured source, falling back from sysfs to /dev/mem
pub fn acquire(choice: &SourceChoice) -> Result<AcquiredTable, AcquireError> {
    match choice {
        SourceChoice::File(path) => FileSource::new(path.clone()).acquire(),
        SourceChoice::DevMem => DevMemSource::default().acquire(),
        SourceChoice::Auto => {
            first_available(&[&SysfsSource::default(), &DevMemSource::default()])
        }
    }
}

fn first_available(
    sources: &[&dyn FirmwareSource<Error = AcquireError>],
) -> Result<AcquiredTable, AcquireError> {
    let mut errors = Vec::new();
    for source in sources {
        match source.acquire() {
            Ok(table) => return Ok(table),
            Err(err) => {
                log::info!("{}", err);
                errors.push(err);
            }
        }
    }
    Err(AcquireError::Exhausted(errors))
}
