//! Console output for a sorting run.

use colored::Colorize;

use sorting_core::ManifestWarning;
use sorting_engine::{Outcome, RunSummary, SortRecord};

pub fn warning(warning: &ManifestWarning) {
    eprintln!("{} {warning}", "WARNING".bold().yellow());
}

pub fn dry_run(phase: &str) {
    println!("{}: {phase}", "DRY RUN".bold().magenta());
}

pub fn inputs(inputs: &[String]) {
    println!("{}: {}", "INPUT PATTERNS".bold().blue(), inputs.join(", "));
}

/// One line per record, printed as the record is produced.
pub fn record(record: &SortRecord) {
    let label = record.strategy.italic();
    let source = record.source.display();
    let arrow = |target: &std::path::Path| format!("{source} -> {}", target.display());

    match &record.outcome {
        Outcome::Skipped => println!("{} {label}: {source}", "SKIPPING".bold().yellow()),
        Outcome::WouldMove { target } | Outcome::Moved { target } => {
            println!("{} {label}: {}", "MOVING".bold().green(), arrow(target))
        }
        Outcome::WouldConvert { target, .. } | Outcome::Converted { target, .. } => {
            println!("{} {label}: {}", "CONVERTING".bold().green(), arrow(target))
        }
        Outcome::Failed { target, failure } => {
            let path = match target {
                Some(target) => arrow(target),
                None => source.to_string(),
            };
            eprintln!(
                "{} {}: {path} ({failure})",
                "FAILED".red(),
                record.strategy.cyan()
            );
        }
    }
}

pub fn summary(summary: &RunSummary, dry_run: bool) {
    let line = if dry_run {
        format!(
            "{} planned, {} skipped, {} failed",
            summary.planned(),
            summary.skipped(),
            summary.failed()
        )
    } else {
        format!(
            "{} moved, {} converted, {} skipped, {} failed",
            summary.moved(),
            summary.converted(),
            summary.skipped(),
            summary.failed()
        )
    };
    if summary.failed() > 0 {
        println!("{}", line.yellow());
    } else {
        println!("{}", line.dimmed());
    }
}
