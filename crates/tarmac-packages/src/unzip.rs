//! External decompression for entries the zip reader cannot decode

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{PackageError, Result};

/// Default external decompression utility
pub const DEFAULT_UNZIP_PROGRAM: &str = "unzip";

/// Info-ZIP exit status for "completed with warnings", e.g. extra bytes
/// before the archive. The entry is still written to stdout.
const WARNING_STATUS: i32 = 1;

/// Reads a single archive entry out of process.
///
/// Implementations receive the archive path and the exact entry name and
/// return the entry's decoded bytes.
pub trait Unzipper {
    /// Return the decoded contents of `entry` inside `archive`
    fn extract_entry(&self, archive: &Path, entry: &str) -> Result<Vec<u8>>;
}

/// Runs `<program> -p <archive> <entry>` and captures stdout.
///
/// Exit status 0 is success. Status 1 with output is accepted as a warning;
/// status 1 without output means the entry was skipped and is an error, as
/// is any other status.
#[derive(Debug, Clone)]
pub struct SystemUnzip {
    program: PathBuf,
}

impl SystemUnzip {
    /// Use the given unzip-compatible program
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program that will be invoked
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for SystemUnzip {
    fn default() -> Self {
        Self::new(DEFAULT_UNZIP_PROGRAM)
    }
}

impl Unzipper for SystemUnzip {
    fn extract_entry(&self, archive: &Path, entry: &str) -> Result<Vec<u8>> {
        debug!(
            program = %self.program.display(),
            archive = %archive.display(),
            entry,
            "extracting entry with external unzip"
        );

        let output = Command::new(&self.program)
            .arg("-p")
            .arg(archive)
            .arg(entry)
            .output()?;

        let status = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        match status {
            0 => Ok(output.stdout),
            WARNING_STATUS if !output.stdout.is_empty() => {
                warn!(
                    program = %self.program.display(),
                    entry,
                    %stderr,
                    "unzip reported warnings, using its output"
                );
                Ok(output.stdout)
            }
            _ => Err(PackageError::CommandFailed {
                command: self.program.display().to_string(),
                status,
                stderr,
            }),
        }
    }
}
