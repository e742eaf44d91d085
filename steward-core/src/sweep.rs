/*!
Retention sweeper: deletes children of a temp directory past an age threshold.

The sweep is stateless; nothing records what was deleted. Age is measured
from the child's mtime and compared in whole seconds, strictly greater than
the threshold, so a child exactly at the limit survives.
*/

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::report::SweepReport;
use crate::{Result, StewardError};

/// Seconds per day, the unit rule thresholds are declared in.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Delete every immediate child of `dir` older than `max_age_secs`.
///
/// Directories are removed recursively, files directly; there is no trash
/// and no confirmation. A child whose metadata cannot be read or whose
/// removal fails is counted, logged, and skipped without aborting the sweep.
/// An unlistable `dir` is an error.
pub fn sweep(dir: &Path, max_age_secs: u64) -> Result<SweepReport> {
    let read_dir = fs::read_dir(dir).map_err(|e| StewardError::scan(dir.to_string_lossy(), e))?;

    let now = SystemTime::now();
    let mut report = SweepReport::new(dir.to_string_lossy());

    for child in read_dir {
        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!("unreadable entry under {}: {}", dir.display(), e);
                report.failed += 1;
                continue;
            }
        };
        let path = child.path();
        report.examined += 1;

        let metadata = match child.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("cannot read metadata of {}: {}", path.display(), e);
                report.failed += 1;
                continue;
            }
        };
        let age_secs = match age_in_secs(&metadata, now) {
            Some(age_secs) => age_secs,
            None => {
                warn!("cannot read mtime of {}", path.display());
                report.failed += 1;
                continue;
            }
        };

        if age_secs <= max_age_secs {
            continue;
        }

        let removal = if metadata.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match removal {
            Ok(()) => {
                debug!("removed expired {} (age {}s)", path.display(), age_secs);
                report.removed += 1;
            }
            Err(e) => {
                warn!("cannot remove {}: {}", path.display(), e);
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

// A child stamped in the future counts as age zero.
fn age_in_secs(metadata: &fs::Metadata, now: SystemTime) -> Option<u64> {
    let modified = metadata.modified().ok()?;
    Some(
        now.duration_since(modified)
            .map(|age| age.as_secs())
            .unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::time::Duration;
    use tempfile::TempDir;

    fn backdate(path: &Path, secs_ago: u64) {
        let mtime =
            FileTime::from_system_time(SystemTime::now() - Duration::from_secs(secs_ago));
        filetime::set_file_mtime(path, mtime).unwrap();
    }

    #[test]
    fn test_age_boundary_is_strictly_greater_than() {
        let dir = TempDir::new().unwrap();
        let at_limit = dir.path().join("at_limit");
        let past_limit = dir.path().join("past_limit");
        fs::write(&at_limit, "a").unwrap();
        fs::write(&past_limit, "b").unwrap();
        backdate(&at_limit, 1000);
        backdate(&past_limit, 1001);

        let report = sweep(dir.path(), 1000).unwrap();

        assert!(at_limit.exists());
        assert!(!past_limit.exists());
        assert_eq!(report.examined, 2);
        assert_eq!(report.removed, 1);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_directories_are_removed_recursively() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("stale");
        fs::create_dir(&stale).unwrap();
        fs::write(stale.join("nested.txt"), "old").unwrap();
        backdate(&stale, SECONDS_PER_DAY * 31);

        let report = sweep(dir.path(), SECONDS_PER_DAY * 30).unwrap();

        assert!(!stale.exists());
        assert_eq!(report.removed, 1);
    }

    #[test]
    fn test_fresh_children_survive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fresh.txt"), "new").unwrap();
        fs::create_dir(dir.path().join("fresh_dir")).unwrap();

        let report = sweep(dir.path(), SECONDS_PER_DAY * 30).unwrap();

        assert_eq!(report.examined, 2);
        assert_eq!(report.removed, 0);
        assert!(dir.path().join("fresh.txt").exists());
        assert!(dir.path().join("fresh_dir").exists());
    }

    #[test]
    fn test_zero_threshold_spares_brand_new_children() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("now.txt"), "n").unwrap();
        let old = dir.path().join("old.txt");
        fs::write(&old, "o").unwrap();
        backdate(&old, 5);

        let report = sweep(dir.path(), 0).unwrap();

        assert!(dir.path().join("now.txt").exists());
        assert!(!old.exists());
        assert_eq!(report.removed, 1);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(sweep(&dir.path().join("nope"), 0).is_err());
    }
}
