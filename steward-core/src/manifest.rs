/*!
The `.steward` manifest sidecar: last-observed state of an archive root.

The manifest is a plain text file living inside the archive root it
describes, one entry per line in the form `<changeToken><space><path>`. The
token is everything before the first space; the remainder of the line is the
path, verbatim. A fresh manifest is staged to a temp sibling and renamed into
place, so there is never a moment with no manifest on disk.
*/

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{Result, StewardError};

/// File name of the manifest sidecar inside an archive root.
pub const MANIFEST_FILE_NAME: &str = ".steward";

/// Staging name used while rewriting the manifest.
pub const MANIFEST_STAGING_NAME: &str = ".steward.tmp";

/// Last-observed state of one tracked child of an archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Path of the tracked child, verbatim.
    pub path: String,
    /// Opaque change token; currently the mtime as decimal epoch seconds.
    pub change_token: String,
    /// Set by the resolver when the child needs archiving. Never persisted.
    pub modified: bool,
}

impl ManifestEntry {
    /// Create an entry with the modified flag cleared.
    pub fn new<S1, S2>(path: S1, change_token: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            path: path.into(),
            change_token: change_token.into(),
            modified: false,
        }
    }

    /// Set the transient modified flag.
    pub fn with_modified(mut self, modified: bool) -> Self {
        self.modified = modified;
        self
    }
}

/// Read the manifest for `root`.
///
/// Never fails the caller: a missing or unreadable sidecar yields an empty
/// manifest, which makes every child look new, and malformed lines are
/// skipped. Loaded entries start with `modified == false`.
pub fn load(root: &Path) -> Vec<ManifestEntry> {
    let manifest_path = root.join(MANIFEST_FILE_NAME);
    let contents = match fs::read_to_string(&manifest_path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!("no readable manifest at {}: {}", manifest_path.display(), e);
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for line in contents.lines() {
        if line.is_empty() {
            continue;
        }
        match line.split_once(' ') {
            Some((token, path)) if !token.is_empty() && !path.is_empty() => {
                entries.push(ManifestEntry::new(path, token));
            }
            _ => debug!("skipping malformed manifest line: {:?}", line),
        }
    }
    entries
}

/// Rewrite the manifest for `root` from `entries`, replacing it wholesale.
///
/// The new contents go to a staging sibling first and are renamed over the
/// old sidecar, so a crash mid-write leaves the previous manifest intact.
pub fn save(root: &Path, entries: &[ManifestEntry]) -> Result<()> {
    let mut contents = String::new();
    for entry in entries {
        contents.push_str(&entry.change_token);
        contents.push(' ');
        contents.push_str(&entry.path);
        contents.push('\n');
    }

    let staging_path = root.join(MANIFEST_STAGING_NAME);
    let manifest_path = root.join(MANIFEST_FILE_NAME);

    fs::write(&staging_path, contents)
        .map_err(|e| StewardError::manifest(root.to_string_lossy(), e))?;
    fs::rename(&staging_path, &manifest_path)
        .map_err(|e| StewardError::manifest(root.to_string_lossy(), e))?;

    debug!(
        "rewrote {} with {} entries",
        manifest_path.display(),
        entries.len()
    );
    Ok(())
}
