/*!
# Steward Core

Rule-driven filesystem maintenance: retention sweeps for temp directories and
incremental, manifest-backed archival of changed children of archive roots.

The library is organized as a small pipeline:

- a rule file declares what to do (`rules`);
- an archive root's last-observed state lives in a `.steward` sidecar inside
  the root itself (`manifest`);
- a scan observes the present (`scanner`) and the resolver classifies the
  difference (`resolver`);
- modified children are handed to an external compressor (`compress`,
  `archive`), and the sidecar is rewritten to match what actually succeeded;
- temp directories are swept by age (`sweep`);
- the engine ties the pieces together per rule (`engine`) and returns plain
  reports instead of printing (`report`).

Change detection is deliberately cheap: a child's change token is its mtime
in epoch seconds, so nothing is ever hashed and a changed child is always
re-archived in full.

## Usage

```rust,no_run
use steward_core::{create_default_engine, parse_rules};

let rules = parse_rules("tempFolder 30 /tmp/scratch\narchiveFolder /srv/backups")?;
let report = create_default_engine().run(&rules);
for outcome in &report.outcomes {
    println!("{outcome:?}");
}
# Ok::<(), steward_core::StewardError>(())
```
*/

pub mod archive;
pub mod compress;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod report;
pub mod resolver;
pub mod rules;
pub mod scanner;
pub mod sweep;


pub use archive::{archive_modified, ArchiveOutcome, ARCHIVE_SUFFIX};
pub use compress::{Compressor, NoopCompressor, ZipCommand};
pub use engine::{create_default_engine, RuleEngine};
pub use error::{Result, StewardError};
pub use manifest::{ManifestEntry, MANIFEST_FILE_NAME};
pub use report::{ArchiveFailure, ArchiveReport, RuleOutcome, RunReport, SweepReport};
pub use resolver::resolve;
pub use rules::{parse_rules, Rule, RuleKind};
pub use scanner::{scan, ScanEntry};
pub use sweep::{sweep, SECONDS_PER_DAY};
