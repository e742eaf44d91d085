/*!
Steward CLI - rule-driven filesystem maintenance from the command line.

Runs tempFolder / archiveFolder rule files, validates them without executing
anything, and inspects the pending state of an archive root.
*/

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use steward_core::{
    parse_rules, ManifestEntry, Rule, RuleEngine, RuleKind, RuleOutcome, RunReport, ZipCommand,
};
use tabled::{Table, Tabled};
use tracing::info;

#[derive(Parser)]
#[command(name = "steward")]
#[command(about = "Rule-driven retention sweeps and incremental archival")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every rule in a rule file, in declaration order
    Run {
        /// Path to the rule file
        rules_file: PathBuf,

        /// Archive independent children in parallel
        #[arg(long)]
        parallel: bool,

        /// Print the run report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Zip-compatible program invoked to archive each child
        #[arg(long, env = "STEWARD_ZIP", default_value = "zip")]
        zip_program: String,
    },
    /// Parse and display a rule file without running anything
    Check {
        /// Path to the rule file
        rules_file: PathBuf,
    },
    /// Show which children of an archive root are pending archival
    Status {
        /// Archive root directory
        root: PathBuf,

        /// Print the entries as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Rule")]
    kind: String,
    #[tabled(rename = "Age (days)")]
    age: String,
    #[tabled(rename = "Path")]
    path: String,
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Rule")]
    kind: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Result")]
    result: String,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Child")]
    path: String,
    #[tabled(rename = "Last Modified")]
    modified_at: String,
    #[tabled(rename = "State")]
    state: String,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            rules_file,
            parallel,
            json,
            zip_program,
        } => run_rules(&rules_file, parallel, json, &zip_program),
        Commands::Check { rules_file } => check_rules(&rules_file),
        Commands::Status { root, json } => show_status(&root, json),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_rules(
    rules_file: &Path,
    parallel: bool,
    json: bool,
    zip_program: &str,
) -> Result<(), anyhow::Error> {
    let rules = read_rules(rules_file)?;
    if rules.is_empty() {
        println!("No rules in {}", rules_file.display());
        return Ok(());
    }
    info!(
        "running {} rules from {}",
        rules.len(),
        rules_file.display()
    );

    let engine =
        RuleEngine::new(ZipCommand::with_program(zip_program)).with_parallel_archiving(parallel);
    let report = engine.run(&rules);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn check_rules(rules_file: &Path) -> Result<(), anyhow::Error> {
    let rules = read_rules(rules_file)?;
    if rules.is_empty() {
        println!("No rules in {}", rules_file.display());
        return Ok(());
    }

    let rows: Vec<RuleRow> = rules.iter().map(rule_row).collect();
    println!("{}", Table::new(rows));
    Ok(())
}

fn show_status(root: &Path, json: bool) -> Result<(), anyhow::Error> {
    // Archival never happens here, so the compressor is never invoked.
    let engine = RuleEngine::new(ZipCommand::new());
    let entries = engine.plan(root)?;

    if json {
        let value: Vec<serde_json::Value> = entries.iter().map(status_value).collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No tracked children in {}", root.display());
        return Ok(());
    }

    let pending = entries.iter().filter(|entry| entry.modified).count();
    let rows: Vec<StatusRow> = entries.iter().map(status_row).collect();
    println!("{}", Table::new(rows));
    println!("{pending} of {} pending archival", entries.len());
    Ok(())
}

fn read_rules(rules_file: &Path) -> Result<Vec<Rule>, anyhow::Error> {
    let contents = fs::read_to_string(rules_file)
        .map_err(|e| anyhow::anyhow!("cannot read rule file {}: {}", rules_file.display(), e))?;
    Ok(parse_rules(&contents)?)
}

fn rule_row(rule: &Rule) -> RuleRow {
    match rule.kind {
        RuleKind::TempFolder { max_age_days } => RuleRow {
            kind: "tempFolder".to_string(),
            age: max_age_days.to_string(),
            path: rule.path.clone(),
        },
        RuleKind::ArchiveFolder => RuleRow {
            kind: "archiveFolder".to_string(),
            age: "-".to_string(),
            path: rule.path.clone(),
        },
    }
}

fn print_report(report: &RunReport) {
    let rows: Vec<OutcomeRow> = report.outcomes.iter().map(outcome_row).collect();
    println!("{}", Table::new(rows));

    if !report.is_clean() {
        println!("Completed with failures; re-run with --verbose for details");
    }
}

fn outcome_row(outcome: &RuleOutcome) -> OutcomeRow {
    match outcome {
        RuleOutcome::Sweep(sweep) => OutcomeRow {
            kind: "sweep".to_string(),
            path: sweep.path.clone(),
            result: format!(
                "{} of {} removed, {} failed",
                sweep.removed, sweep.examined, sweep.failed
            ),
        },
        RuleOutcome::Archive(archive) => OutcomeRow {
            kind: "archive".to_string(),
            path: archive.root.clone(),
            result: format!(
                "{} archived, {} unchanged, {} failed",
                archive.archived.len(),
                archive.unchanged,
                archive.failed.len()
            ),
        },
        RuleOutcome::Failed { path, error } => OutcomeRow {
            kind: "failed".to_string(),
            path: path.clone(),
            result: error.clone(),
        },
    }
}

fn status_row(entry: &ManifestEntry) -> StatusRow {
    StatusRow {
        path: entry.path.clone(),
        modified_at: format_change_token(&entry.change_token),
        state: if entry.modified {
            "pending".to_string()
        } else {
            "current".to_string()
        },
    }
}

fn status_value(entry: &ManifestEntry) -> serde_json::Value {
    serde_json::json!({
        "path": entry.path,
        "change_token": entry.change_token,
        "pending": entry.modified,
    })
}

fn format_change_token(token: &str) -> String {
    use chrono::{Local, TimeZone};

    match token.parse::<i64>() {
        Ok(secs) => match Local.timestamp_opt(secs, 0) {
            chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            _ => token.to_string(),
        },
        Err(_) => token.to_string(),
    }
}
