/*!
Change-set resolution: the current scan against the recorded manifest.

Pure classification, no I/O. Every currently observed child ends up in the
result exactly once; children recorded previously but absent from the scan
are dropped, so the manifest only ever tracks what exists right now.
*/

use std::collections::HashMap;

use crate::manifest::ManifestEntry;
use crate::scanner::ScanEntry;

/// Classify the current scan against the previous manifest.
///
/// A child is modified when it is new (no recorded entry for its path) or
/// when its change token differs from the recorded one. Paths compare by
/// exact string equality; should the previous manifest hold duplicate paths,
/// the first one wins. Result order follows scan order, and the recorded
/// order never influences classification.
pub fn resolve(previous: &[ManifestEntry], current: Vec<ScanEntry>) -> Vec<ManifestEntry> {
    let mut recorded: HashMap<&str, &str> = HashMap::with_capacity(previous.len());
    for entry in previous {
        recorded
            .entry(entry.path.as_str())
            .or_insert(entry.change_token.as_str());
    }

    current
        .into_iter()
        .map(|scanned| {
            let modified = match recorded.get(scanned.path.as_str()) {
                Some(token) => *token != scanned.change_token,
                None => true,
            };
            ManifestEntry::new(scanned.path, scanned.change_token).with_modified(modified)
        })
        .collect()
}
