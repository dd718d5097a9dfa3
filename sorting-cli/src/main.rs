//! Sorting Machine: declutter folders by moving and converting files
//! according to a sorting manifest.
//!
//! # Usage
//!
//! ```text
//! sorting-machine [--config <FILE>] [--dry-run] [--strict] [-v...] [PATHS]...
//! ```

mod report;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{ArgAction, Parser};

use sorting_core::manifest;
use sorting_engine::{Context, OperationFlags, Sorter};
use sorting_renderer::BaseModel;

/// Exit status when `--strict` is given and some file could not be sorted.
const STRICT_FAILURE_STATUS: i32 = 2;

const TEMPLATE_HELP: &str = "\
DEFAULT PATHS TEMPLATE ARGS:
    CWD                Absolute path to current working directory
    HOME               Absolute path to home directory

CONVERSION CLI TEMPLATE ARGS:
    CWD                Absolute path to current working directory
    HOME               Absolute path to home directory
    SOURCE             Input file path
    TARGET             Output file path

STRATEGY TARGET TEMPLATE ARGS:
    CWD                Absolute path to current working directory
    HOME               Absolute path to home directory
    DIRECTORY          Absolute path to directory of source file (e.g. \"/var/www/html\")
    BASENAME           Name of source file without extension (e.g. \"index\")
    FILENAME           Name of source file with extension (e.g. \"index.html\")
    EXTENSION          Extension of source file (e.g. \".html\")
    CREATION_TIME      Source file's creation time (e.g. 22-08-15_08-44-87)
    ACCESS_TIME        Source file's last access time (e.g. 22-08-15_08-44-87)
    MODIFICATION_TIME  Source file's last modification time (e.g. 22-08-15_08-44-87)";

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sorting-machine",
    version,
    about = "Declutter folders by moving and converting files according to a sorting manifest",
    long_about = None,
    after_help = TEMPLATE_HELP,
)]
struct Cli {
    /// Files and directories to sort. Defaults to the manifest's `defaultPaths`.
    paths: Vec<String>,

    /// Sorting manifest to use instead of `config.toml` next to the executable.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the sorting plan without moving or converting anything.
    #[arg(long)]
    dry_run: bool,

    /// Exit with status 2 if any file could not be sorted.
    #[arg(long)]
    strict: bool,

    /// Log more (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loaded = match &cli.config {
        Some(path) => manifest::load_at(path),
        None => manifest::load(),
    }
    .context("failed to load sorting manifest")?;
    tracing::debug!(manifest = %loaded.path.display(), "manifest loaded");
    for warning in &loaded.warnings {
        report::warning(warning);
    }

    let model = BaseModel::detect().context("could not determine working directory")?;
    let flags = OperationFlags {
        dry_run: cli.dry_run,
    };
    let ctx = Context::new(loaded.manifest, flags, model);
    let mut sorter = Sorter::new(ctx)
        .with_context(|| format!("invalid template in {}", loaded.path.display()))?
        .with_observer(report::record);

    if cli.dry_run {
        report::dry_run("starting");
    }
    let inputs = sorter
        .input_paths(&cli.paths)
        .context("could not render default paths")?;
    report::inputs(&inputs);

    let summary = sorter.sort_inputs(&inputs).context("sorting aborted")?;

    if cli.dry_run {
        report::dry_run("ending");
    }
    report::summary(&summary, cli.dry_run);

    if cli.strict && summary.failed() > 0 {
        std::process::exit(STRICT_FAILURE_STATUS);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
