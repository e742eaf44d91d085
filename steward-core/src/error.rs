/*!
Error types for the steward core engine.
*/

use thiserror::Error;

/// Result type used throughout the steward core.
pub type Result<T> = std::result::Result<T, StewardError>;

/// Errors that can occur while running maintenance rules.
#[derive(Error, Debug)]
pub enum StewardError {
    /// I/O errors during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rule file parse errors; fatal, nothing runs when one occurs
    #[error("Invalid rule on line {line}: {reason}")]
    Rule { line: usize, reason: String },

    /// A directory named by a rule could not be listed
    #[error("Cannot scan {path}: {source}")]
    Scan { path: String, source: std::io::Error },

    /// The external compression tool failed for one entry
    #[error("Archiving {path} failed: {reason}")]
    Archive { path: String, reason: String },

    /// The manifest sidecar could not be rewritten
    #[error("Cannot write manifest in {root}: {source}")]
    Manifest { root: String, source: std::io::Error },
}

impl StewardError {
    /// Create a new rule parse error
    pub fn rule<S: Into<String>>(line: usize, reason: S) -> Self {
        Self::Rule {
            line,
            reason: reason.into(),
        }
    }

    /// Create a new scan error
    pub fn scan<S: Into<String>>(path: S, source: std::io::Error) -> Self {
        Self::Scan {
            path: path.into(),
            source,
        }
    }

    /// Create a new archive error
    pub fn archive<S1: Into<String>, S2: Into<String>>(path: S1, reason: S2) -> Self {
        Self::Archive {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new manifest error
    pub fn manifest<S: Into<String>>(root: S, source: std::io::Error) -> Self {
        Self::Manifest {
            root: root.into(),
            source,
        }
    }
}
