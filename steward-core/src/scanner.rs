/*!
Directory scanner producing the current observation of an archive root.

A scan lists the immediate children of a directory, never recursing, and
derives a change token for each from its mtime. Tokens are opaque to every
other component; only equality against the recorded token matters.
*/

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use tracing::warn;

use crate::archive::ARCHIVE_SUFFIX;
use crate::manifest::{MANIFEST_FILE_NAME, MANIFEST_STAGING_NAME};
use crate::{Result, StewardError};

/// One observed child of an archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// Child path, verbatim.
    pub path: String,
    /// Last-modified time as decimal seconds since the Unix epoch.
    pub change_token: String,
}

/// List the immediate children of `dir` with their change tokens.
///
/// The manifest sidecar, its staging sibling, and prior archive outputs
/// (anything named `*.zip`) are excluded, so the agent never tracks its own
/// products. Children whose metadata cannot be read are skipped with a
/// warning. Order is filesystem iteration order; callers must not rely on
/// it.
pub fn scan(dir: &Path) -> Result<Vec<ScanEntry>> {
    let read_dir = fs::read_dir(dir).map_err(|e| StewardError::scan(dir.to_string_lossy(), e))?;

    let mut entries = Vec::new();
    for child in read_dir {
        let child = child.map_err(|e| StewardError::scan(dir.to_string_lossy(), e))?;
        let name = child.file_name();
        if is_excluded(&name.to_string_lossy()) {
            continue;
        }

        let path = child.path();
        let metadata = match child.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("skipping unreadable child {}: {}", path.display(), e);
                continue;
            }
        };
        match change_token(&metadata) {
            Some(change_token) => entries.push(ScanEntry {
                path: path.to_string_lossy().into_owned(),
                change_token,
            }),
            None => warn!("skipping child with unreadable mtime: {}", path.display()),
        }
    }
    Ok(entries)
}

fn is_excluded(name: &str) -> bool {
    name == MANIFEST_FILE_NAME || name == MANIFEST_STAGING_NAME || name.ends_with(ARCHIVE_SUFFIX)
}

fn change_token(metadata: &fs::Metadata) -> Option<String> {
    let modified = metadata.modified().ok()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
    Some(since_epoch.as_secs().to_string())
}
