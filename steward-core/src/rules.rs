/*!
Rule declarations and the rule-file parser.

A rule file drives one maintenance run, one rule per line:

```text
tempFolder <maxAgeDays> <path>
archiveFolder <path>
```

The command is everything before the first space. For `tempFolder` the next
space-delimited field is the age threshold in days; whatever remains after
that is the path, taken verbatim (spaces allowed, no quoting or escaping).
*/

use crate::{Result, StewardError};

const TEMP_FOLDER_COMMAND: &str = "tempFolder";
const ARCHIVE_FOLDER_COMMAND: &str = "archiveFolder";

/// What a single rule asks the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Delete children of the directory older than `max_age_days` days.
    TempFolder { max_age_days: u64 },
    /// Archive children of the directory that changed since the last run.
    ArchiveFolder,
}

/// One parsed maintenance rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Directory the rule operates on, verbatim from the rule file.
    pub path: String,
    pub kind: RuleKind,
}

/// Parse a complete rule file.
///
/// Rules come back in declaration order, which is also execution order.
/// An unrecognized command, an unparsable age field, or a missing path is a
/// fatal error carrying the 1-based line number; callers must not run any
/// rule when parsing fails. Blank lines are skipped.
pub fn parse_rules(contents: &str) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        rules.push(parse_rule_line(line, index + 1)?);
    }
    Ok(rules)
}

fn parse_rule_line(line: &str, line_no: usize) -> Result<Rule> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

    match command {
        TEMP_FOLDER_COMMAND => {
            let (age, path) = rest.split_once(' ').ok_or_else(|| {
                StewardError::rule(line_no, "tempFolder requires an age in days and a path")
            })?;
            let max_age_days = age
                .parse::<u64>()
                .map_err(|_| StewardError::rule(line_no, format!("invalid age in days: {age:?}")))?;
            if path.is_empty() {
                return Err(StewardError::rule(line_no, "missing path"));
            }
            Ok(Rule {
                path: path.to_string(),
                kind: RuleKind::TempFolder { max_age_days },
            })
        }
        ARCHIVE_FOLDER_COMMAND => {
            if rest.is_empty() {
                return Err(StewardError::rule(line_no, "missing path"));
            }
            Ok(Rule {
                path: rest.to_string(),
                kind: RuleKind::ArchiveFolder,
            })
        }
        other => Err(StewardError::rule(
            line_no,
            format!("unknown command {other:?}"),
        )),
    }
}
