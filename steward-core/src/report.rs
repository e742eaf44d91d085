/*!
Run reports: what one maintenance run did, rule by rule.

Reports are plain data. The engine never prints; callers render these as a
table, as JSON, or not at all.
*/

use serde::{Deserialize, Serialize};

/// Counters for one retention sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Directory the sweep ran over.
    pub path: String,
    /// Children examined.
    pub examined: usize,
    /// Children removed.
    pub removed: usize,
    /// Children skipped because metadata or removal failed.
    pub failed: usize,
}

impl SweepReport {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            examined: 0,
            removed: 0,
            failed: 0,
        }
    }
}

/// One failed archive invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveFailure {
    pub path: String,
    pub reason: String,
}

/// What one archive-folder rule did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReport {
    /// Archive root the rule ran over.
    pub root: String,
    /// Children tracked by the scan, after exclusions.
    pub tracked: usize,
    /// Children left untouched because their change token matched.
    pub unchanged: usize,
    /// Children archived this run.
    pub archived: Vec<String>,
    /// Children whose archive invocation failed; they stay pending.
    pub failed: Vec<ArchiveFailure>,
}

/// Outcome of one rule, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleOutcome {
    /// A tempFolder rule completed, possibly with per-child failures.
    Sweep(SweepReport),
    /// An archiveFolder rule completed, possibly with per-entry failures.
    Archive(ArchiveReport),
    /// The rule could not run at all; later rules still ran.
    Failed { path: String, error: String },
}

/// Everything one run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcomes: Vec<RuleOutcome>,
}

impl RunReport {
    /// True when every rule ran and nothing failed along the way.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|outcome| match outcome {
            RuleOutcome::Sweep(sweep) => sweep.failed == 0,
            RuleOutcome::Archive(archive) => archive.failed.is_empty(),
            RuleOutcome::Failed { .. } => false,
        })
    }
}
