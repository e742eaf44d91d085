/*!
The rule engine: dispatches parsed rules and drives the archival pipeline.

Rules run strictly in declaration order. A rule that cannot run at all, for
instance because its directory cannot be scanned, is reported and the run
moves on to the next rule; only rule-file parse errors stop a run before it
starts, and the parser enforces that by refusing to produce any rules.
*/

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{info, warn};

use crate::archive::{archive_modified, ArchiveOutcome};
use crate::compress::{Compressor, ZipCommand};
use crate::manifest::{self, ManifestEntry};
use crate::report::{ArchiveFailure, ArchiveReport, RuleOutcome, RunReport};
use crate::resolver;
use crate::rules::{Rule, RuleKind};
use crate::scanner;
use crate::sweep::{sweep, SECONDS_PER_DAY};
use crate::{Result, StewardError};

/// Maintenance engine generic over the external compressor.
///
/// # Example
/// ```rust,no_run
/// use steward_core::{create_default_engine, parse_rules};
///
/// let rules = parse_rules("tempFolder 30 /tmp/cache\narchiveFolder /backups/data")?;
/// let report = create_default_engine().run(&rules);
/// assert_eq!(report.outcomes.len(), 2);
/// # Ok::<(), steward_core::StewardError>(())
/// ```
pub struct RuleEngine<C: Compressor> {
    compressor: C,
    parallel_archiving: bool,
}

impl<C: Compressor> RuleEngine<C> {
    /// Create an engine driving the given compressor.
    pub fn new(compressor: C) -> Self {
        Self {
            compressor,
            parallel_archiving: false,
        }
    }

    /// Archive independent modified children on the rayon pool instead of
    /// one at a time. The manifest is still only rewritten after every
    /// invocation has completed and been accounted for.
    pub fn with_parallel_archiving(mut self, parallel: bool) -> Self {
        self.parallel_archiving = parallel;
        self
    }

    /// Run every rule in declaration order, collecting one outcome each.
    ///
    /// Per-rule failures never abort the run; callers inspect the report to
    /// find out what happened.
    pub fn run(&self, rules: &[Rule]) -> RunReport {
        let mut report = RunReport::default();
        for rule in rules {
            let outcome = match rule.kind {
                RuleKind::TempFolder { max_age_days } => {
                    info!("sweeping {} (older than {} days)", rule.path, max_age_days);
                    let max_age_secs = max_age_days.saturating_mul(SECONDS_PER_DAY);
                    match sweep(Path::new(&rule.path), max_age_secs) {
                        Ok(sweep_report) => RuleOutcome::Sweep(sweep_report),
                        Err(e) => rule_failed(&rule.path, e),
                    }
                }
                RuleKind::ArchiveFolder => {
                    info!("archiving changed children of {}", rule.path);
                    match self.run_archive_rule(Path::new(&rule.path)) {
                        Ok(archive_report) => RuleOutcome::Archive(archive_report),
                        Err(e) => rule_failed(&rule.path, e),
                    }
                }
            };
            report.outcomes.push(outcome);
        }
        report
    }

    /// Run one archive-folder rule to completion.
    ///
    /// Loads the recorded manifest, scans the root, resolves the change set,
    /// archives every modified child, and rewrites the manifest. The phases
    /// are strictly ordered; the manifest is only touched once every archive
    /// invocation has finished.
    pub fn run_archive_rule(&self, root: &Path) -> Result<ArchiveReport> {
        let previous = manifest::load(root);
        let current = scanner::scan(root)?;
        let entries = resolver::resolve(&previous, current);

        let outcomes = archive_modified(&entries, &self.compressor, self.parallel_archiving);
        let next_manifest = finalize_manifest(&previous, &entries, &outcomes);
        manifest::save(root, &next_manifest)?;

        Ok(build_archive_report(root, &entries, outcomes))
    }

    /// The read-only front half of an archive rule: load, scan, resolve.
    ///
    /// Nothing is archived and the manifest is left untouched, so callers
    /// can inspect what the next run would do.
    pub fn plan(&self, root: &Path) -> Result<Vec<ManifestEntry>> {
        let previous = manifest::load(root);
        let current = scanner::scan(root)?;
        Ok(resolver::resolve(&previous, current))
    }
}

/// Convenience function to create an engine with the stock `zip` archiver.
pub fn create_default_engine() -> RuleEngine<ZipCommand> {
    RuleEngine::new(ZipCommand::new())
}

/// Decide what the rewritten manifest records.
///
/// Unchanged children and successfully archived children carry their current
/// token. A modified child whose archive invocation failed keeps the token
/// the previous manifest had for it, or stays out entirely if it was new, so
/// it is detected again on the next run instead of being recorded as
/// current.
fn finalize_manifest(
    previous: &[ManifestEntry],
    entries: &[ManifestEntry],
    outcomes: &[ArchiveOutcome],
) -> Vec<ManifestEntry> {
    let failed: HashSet<&str> = outcomes
        .iter()
        .filter(|outcome| !outcome.succeeded())
        .map(|outcome| outcome.path.as_str())
        .collect();
    if failed.is_empty() {
        return entries.to_vec();
    }

    let mut recorded: HashMap<&str, &str> = HashMap::with_capacity(previous.len());
    for entry in previous {
        recorded
            .entry(entry.path.as_str())
            .or_insert(entry.change_token.as_str());
    }

    let mut next = Vec::with_capacity(entries.len());
    for entry in entries {
        if !failed.contains(entry.path.as_str()) {
            next.push(entry.clone());
            continue;
        }
        match recorded.get(entry.path.as_str()) {
            Some(token) => {
                warn!("{} failed to archive, keeping its recorded state", entry.path);
                next.push(ManifestEntry::new(entry.path.clone(), (*token).to_string()));
            }
            None => {
                warn!("{} failed to archive, leaving it untracked", entry.path);
            }
        }
    }
    next
}

fn build_archive_report(
    root: &Path,
    entries: &[ManifestEntry],
    outcomes: Vec<ArchiveOutcome>,
) -> ArchiveReport {
    let tracked = entries.len();
    let unchanged = entries.iter().filter(|entry| !entry.modified).count();

    let mut archived = Vec::new();
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome.error {
            None => archived.push(outcome.path),
            Some(reason) => failed.push(ArchiveFailure {
                path: outcome.path,
                reason,
            }),
        }
    }

    ArchiveReport {
        root: root.to_string_lossy().into_owned(),
        tracked,
        unchanged,
        archived,
        failed,
    }
}

fn rule_failed(path: &str, error: StewardError) -> RuleOutcome {
    warn!("rule for {} could not run: {}", path, error);
    RuleOutcome::Failed {
        path: path.to_string(),
        error: error.to_string(),
    }
}
