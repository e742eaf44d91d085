/*!
Compression adapters for archive outputs.

Compression is delegated to an external tool rather than performed in
process. The stock implementation shells out to `zip`, producing a
self-contained archive next to each modified child; the trait keeps the
engine decoupled from any particular tool.
*/

use std::path::Path;
use std::process::Command;

use crate::{Result, StewardError};

/// Compression abstraction for archive outputs
///
/// Implementations take a source path (file or directory) and produce a
/// finished archive at the destination path. Invocations block until the
/// tool exits; there is no timeout and no retry. `Sync` because the engine
/// may drive independent invocations from worker threads.
pub trait Compressor: Sync {
    /// Compress `source` recursively into `destination`.
    fn compress(&self, source: &Path, destination: &Path) -> Result<()>;

    /// Name of the tool, for logs and reports.
    fn tool_name(&self) -> &str;
}

/// Archiver shelling out to the `zip` command-line tool
///
/// Runs `<program> -r -q <destination> <name>` with the working directory set
/// to the source's parent, so archive members carry paths relative to the
/// archive root rather than absolute ones.
///
/// # Example
/// ```rust,no_run
/// use std::path::Path;
/// use steward_core::{Compressor, ZipCommand};
///
/// let archiver = ZipCommand::new();
/// archiver.compress(
///     Path::new("/backups/data/photos"),
///     Path::new("/backups/data/photos.zip"),
/// )?;
/// # Ok::<(), steward_core::StewardError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ZipCommand {
    program: String,
}

impl ZipCommand {
    /// Create an archiver invoking the system `zip`.
    pub fn new() -> Self {
        Self {
            program: "zip".to_string(),
        }
    }

    /// Create an archiver invoking a specific zip-compatible program.
    pub fn with_program<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ZipCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for ZipCommand {
    fn compress(&self, source: &Path, destination: &Path) -> Result<()> {
        let parent = source.parent().filter(|p| !p.as_os_str().is_empty());

        let mut command = Command::new(&self.program);
        command.arg("-r").arg("-q");

        match (parent, source.file_name()) {
            (Some(parent), Some(name)) => {
                // Run from the parent so archive members carry relative paths.
                let destination = if destination.is_absolute() {
                    destination.to_path_buf()
                } else {
                    std::env::current_dir()?.join(destination)
                };
                command.current_dir(parent).arg(destination).arg(name);
            }
            _ => {
                command.arg(destination).arg(source);
            }
        }

        let output = command.output().map_err(|e| {
            StewardError::archive(
                source.to_string_lossy(),
                format!("failed to invoke {}: {}", self.program, e),
            )
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StewardError::archive(
                source.to_string_lossy(),
                format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                ),
            ));
        }
        Ok(())
    }

    fn tool_name(&self) -> &str {
        &self.program
    }
}

/// Pass-through adapter that runs no external tool
///
/// Every invocation succeeds without producing an archive. Useful for tests
/// that only exercise the manifest lifecycle.
#[derive(Debug, Clone)]
pub struct NoopCompressor;

impl NoopCompressor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoopCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for NoopCompressor {
    fn compress(&self, _source: &Path, _destination: &Path) -> Result<()> {
        Ok(())
    }

    fn tool_name(&self) -> &str {
        "noop"
    }
}

/// Recording stand-in for tests: remembers every invocation and fails for
/// sources it was told to reject.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingCompressor {
    invocations: std::sync::Mutex<Vec<(std::path::PathBuf, std::path::PathBuf)>>,
    rejected: Vec<std::path::PathBuf>,
}

#[cfg(test)]
impl RecordingCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation for `source` fail.
    pub fn failing_for<P: Into<std::path::PathBuf>>(mut self, source: P) -> Self {
        self.rejected.push(source.into());
        self
    }

    /// The `(source, destination)` pairs passed to `compress` so far.
    pub fn invocations(&self) -> Vec<(std::path::PathBuf, std::path::PathBuf)> {
        self.invocations.lock().unwrap().clone()
    }

    /// Just the sources passed to `compress` so far.
    pub fn invoked_sources(&self) -> Vec<std::path::PathBuf> {
        self.invocations()
            .into_iter()
            .map(|(source, _)| source)
            .collect()
    }
}

#[cfg(test)]
impl Compressor for RecordingCompressor {
    fn compress(&self, source: &Path, destination: &Path) -> Result<()> {
        self.invocations
            .lock()
            .unwrap()
            .push((source.to_path_buf(), destination.to_path_buf()));
        if self.rejected.iter().any(|p| p == source) {
            return Err(StewardError::archive(
                source.to_string_lossy(),
                "injected failure",
            ));
        }
        Ok(())
    }

    fn tool_name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_zip_command_success_with_substitute_program() {
        // `true` accepts any arguments and exits zero.
        let archiver = ZipCommand::with_program("true");
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photos");
        std::fs::create_dir(&source).unwrap();

        let result = archiver.compress(&source, &dir.path().join("photos.zip"));
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_command_nonzero_exit_is_an_error() {
        let archiver = ZipCommand::with_program("false");
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photos");
        std::fs::create_dir(&source).unwrap();

        let err = archiver
            .compress(&source, &dir.path().join("photos.zip"))
            .unwrap_err();
        assert!(matches!(err, StewardError::Archive { .. }));
    }

    #[test]
    fn test_zip_command_missing_program_is_an_error() {
        let archiver = ZipCommand::with_program("steward-no-such-zip-binary");
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photos");
        std::fs::create_dir(&source).unwrap();

        let err = archiver
            .compress(&source, &dir.path().join("photos.zip"))
            .unwrap_err();
        match err {
            StewardError::Archive { reason, .. } => assert!(reason.contains("failed to invoke")),
            other => panic!("expected an archive error, got {other:?}"),
        }
    }

    #[test]
    fn test_recording_compressor_remembers_and_rejects() {
        let recorder = RecordingCompressor::new().failing_for("/backups/bad");

        assert!(recorder
            .compress(Path::new("/backups/good"), Path::new("/backups/good.zip"))
            .is_ok());
        assert!(recorder
            .compress(Path::new("/backups/bad"), Path::new("/backups/bad.zip"))
            .is_err());

        let sources = recorder.invoked_sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0], Path::new("/backups/good"));
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(ZipCommand::new().tool_name(), "zip");
        assert_eq!(ZipCommand::with_program("7z").tool_name(), "7z");
        assert_eq!(NoopCompressor::new().tool_name(), "noop");
    }
}
