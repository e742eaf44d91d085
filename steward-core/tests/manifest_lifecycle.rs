/*!
End-to-end runs over a real directory tree: the manifest lifecycle across
several runs, and rule dispatch from a parsed rule file.
*/

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use steward_core::{manifest, parse_rules, NoopCompressor, RuleEngine, RuleOutcome};
use tempfile::TempDir;

fn engine() -> RuleEngine<NoopCompressor> {
    RuleEngine::new(NoopCompressor::new())
}

fn populate(root: &Path, names: &[&str]) {
    for name in names {
        let child = root.join(name);
        fs::create_dir(&child).unwrap();
        fs::write(child.join("payload.txt"), *name).unwrap();
    }
}

#[test]
fn test_manifest_lifecycle_across_runs() {
    let root = TempDir::new().unwrap();
    populate(root.path(), &["docs", "media", "mail"]);

    // First run: no manifest yet, so everything is new.
    let first = engine().run_archive_rule(root.path()).unwrap();
    assert_eq!(first.tracked, 3);
    assert_eq!(first.archived.len(), 3);
    assert!(root.path().join(manifest::MANIFEST_FILE_NAME).exists());

    // Second run: nothing changed, nothing to do.
    let second = engine().run_archive_rule(root.path()).unwrap();
    assert_eq!(second.unchanged, 3);
    assert!(second.archived.is_empty());

    // Touch one child and only it is picked up.
    let touched = root.path().join("media");
    filetime::set_file_mtime(&touched, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();

    let third = engine().run_archive_rule(root.path()).unwrap();
    assert_eq!(third.unchanged, 2);
    assert_eq!(
        third.archived,
        vec![touched.to_string_lossy().into_owned()]
    );

    let recorded = manifest::load(root.path());
    assert_eq!(recorded.len(), 3);
    let media = recorded
        .iter()
        .find(|entry| entry.path.ends_with("media"))
        .unwrap();
    assert_eq!(media.change_token, "1700000000");
}

#[test]
fn test_deleted_child_leaves_the_manifest() {
    let root = TempDir::new().unwrap();
    populate(root.path(), &["keep", "drop"]);

    engine().run_archive_rule(root.path()).unwrap();
    fs::remove_dir_all(root.path().join("drop")).unwrap();

    let report = engine().run_archive_rule(root.path()).unwrap();
    assert_eq!(report.tracked, 1);

    let recorded = manifest::load(root.path());
    assert_eq!(recorded.len(), 1);
    assert!(recorded[0].path.ends_with("keep"));
}

#[test]
fn test_rule_file_drives_sweep_and_archive_in_order() {
    let scratch = TempDir::new().unwrap();
    let backups = TempDir::new().unwrap();
    populate(backups.path(), &["docs"]);

    let stale = scratch.path().join("stale.log");
    let fresh = scratch.path().join("fresh.log");
    fs::write(&stale, "old").unwrap();
    fs::write(&fresh, "new").unwrap();
    let a_month_ago = SystemTime::now() - Duration::from_secs(31 * 24 * 3600);
    filetime::set_file_mtime(&stale, FileTime::from_system_time(a_month_ago)).unwrap();

    let contents = format!(
        "tempFolder 30 {}\narchiveFolder {}\n",
        scratch.path().display(),
        backups.path().display()
    );
    let rules = parse_rules(&contents).unwrap();

    let report = engine().run(&rules);

    assert_eq!(report.outcomes.len(), 2);
    match &report.outcomes[0] {
        RuleOutcome::Sweep(sweep) => {
            assert_eq!(sweep.removed, 1);
            assert_eq!(sweep.examined, 2);
        }
        other => panic!("expected a sweep outcome first, got {other:?}"),
    }
    match &report.outcomes[1] {
        RuleOutcome::Archive(archive) => assert_eq!(archive.archived.len(), 1),
        other => panic!("expected an archive outcome second, got {other:?}"),
    }

    assert!(!stale.exists());
    assert!(fresh.exists());
}

#[test]
fn test_unparseable_rule_file_runs_nothing() {
    let scratch = TempDir::new().unwrap();
    fs::write(scratch.path().join("victim.txt"), "still here").unwrap();

    let contents = format!("tempFolder 0 {}\nnonsense /x\n", scratch.path().display());
    assert!(parse_rules(&contents).is_err());

    // The parser refused, so no engine ever saw the first rule.
    assert!(scratch.path().join("victim.txt").exists());
}
