/*!
Archive executor: drives the external compressor over modified entries.

Each modified entry is archived independently to `<path>.zip`. One failed
invocation is reported and never stops the remaining entries; the engine
settles up afterwards when it rewrites the manifest.
*/

use std::path::Path;

use rayon::prelude::*;
use tracing::{error, info};

use crate::compress::Compressor;
use crate::manifest::ManifestEntry;

/// Suffix appended to a child's path to name its archive output.
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Result of one archive invocation.
#[derive(Debug, Clone)]
pub struct ArchiveOutcome {
    /// Path of the child that was archived.
    pub path: String,
    /// Path the archive was written to, or would have been.
    pub archive_path: String,
    /// Error message when the invocation failed.
    pub error: Option<String>,
}

impl ArchiveOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Invoke the compressor for every modified entry.
///
/// Returns one outcome per attempted entry, in entry order. With `parallel`
/// set, entries are archived on the rayon pool; modified children never
/// interact, and all outcomes are collected before this returns, so callers
/// see the same accounting either way.
pub fn archive_modified<C: Compressor>(
    entries: &[ManifestEntry],
    compressor: &C,
    parallel: bool,
) -> Vec<ArchiveOutcome> {
    let pending: Vec<&ManifestEntry> = entries.iter().filter(|entry| entry.modified).collect();

    if parallel {
        pending
            .par_iter()
            .map(|entry| archive_one(entry, compressor))
            .collect()
    } else {
        pending
            .iter()
            .map(|entry| archive_one(entry, compressor))
            .collect()
    }
}

fn archive_one<C: Compressor>(entry: &ManifestEntry, compressor: &C) -> ArchiveOutcome {
    let archive_path = format!("{}{}", entry.path, ARCHIVE_SUFFIX);
    info!("archiving {} -> {}", entry.path, archive_path);

    match compressor.compress(Path::new(&entry.path), Path::new(&archive_path)) {
        Ok(()) => ArchiveOutcome {
            path: entry.path.clone(),
            archive_path,
            error: None,
        },
        Err(e) => {
            error!("archiving {} failed: {}", entry.path, e);
            ArchiveOutcome {
                path: entry.path.clone(),
                archive_path,
                error: Some(e.to_string()),
            }
        }
    }
}
