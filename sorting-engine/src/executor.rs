//! Applying one strategy to one source file.
//!
//! ## `apply`: steps
//!
//! 1. Stat the source and build its [`TargetModel`](sorting_renderer::TargetModel).
//! 2. Resolve the target → [`Outcome::Skipped`] if it is the source.
//! 3. Dry run → [`Outcome::WouldConvert`] / [`Outcome::WouldMove`].
//! 4. Create the target's parent directory.
//! 5. Convert (render `cmd`, run, delete source on success) or rename.
//!
//! Failures in steps 2 (collision exhaustion), 4 and 5 belong to this file
//! only and come back as [`Outcome::Failed`]. Directories created in step 4
//! are removed again when a later step fails, as long as they are empty. A source that cannot be
//! stat'ed or a template that cannot render aborts the run.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use sorting_core::{ConversionName, Strategy};
use sorting_renderer::{ConversionModel, TemplateRenderer};

use crate::context::Context;
use crate::error::{io_err, EngineError};
use crate::process::ProcessRunner;
use crate::resolver::{self, Resolution};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A problem confined to a single source file. The source is left in place.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("conversion '{conversion}' exited with {}", describe_code(.code))]
    ConversionFailed {
        conversion: ConversionName,
        code: Option<i32>,
    },

    #[error("conversion '{conversion}' could not be started: {source}")]
    ConversionSpawn {
        conversion: ConversionName,
        #[source]
        source: io::Error,
    },

    #[error("converted, but the source could not be removed: {0}")]
    SourceRemoval(#[source] io::Error),

    #[error("move failed: {0}")]
    MoveFailed(#[source] io::Error),

    #[error("cannot create target directory: {0}")]
    TargetDirectory(#[source] io::Error),

    #[error("no free target name after {attempts} attempts")]
    CollisionExhausted { attempts: u32 },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// What happened to a source file.
#[derive(Debug)]
pub enum Outcome {
    /// Already at its target.
    Skipped,
    /// Dry run: would be renamed to `target`.
    WouldMove { target: PathBuf },
    /// Dry run: would be converted into `target`.
    WouldConvert {
        target: PathBuf,
        conversion: ConversionName,
    },
    Moved { target: PathBuf },
    Converted {
        target: PathBuf,
        conversion: ConversionName,
    },
    Failed {
        target: Option<PathBuf>,
        failure: Failure,
    },
}

/// One source file handled by one strategy.
#[derive(Debug)]
pub struct SortRecord {
    /// The strategy's `type` label.
    pub strategy: String,
    pub source: PathBuf,
    pub outcome: Outcome,
}

impl SortRecord {
    pub fn target(&self) -> Option<&Path> {
        match &self.outcome {
            Outcome::Skipped => None,
            Outcome::WouldMove { target }
            | Outcome::WouldConvert { target, .. }
            | Outcome::Moved { target }
            | Outcome::Converted { target, .. } => Some(target),
            Outcome::Failed { target, .. } => target.as_deref(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

/// Sort `source` according to `strategy`.
pub fn apply(
    ctx: &Context,
    renderer: &TemplateRenderer,
    runner: &dyn ProcessRunner,
    strategy: &Strategy,
    source: &Path,
) -> Result<SortRecord, EngineError> {
    let record = |outcome| SortRecord {
        strategy: strategy.strategy_type.clone(),
        source: source.to_path_buf(),
        outcome,
    };

    let metadata = std::fs::metadata(source).map_err(|e| io_err(source, e))?;
    let model = resolver::target_model(ctx.model.clone(), source, &metadata);
    let resolution = resolver::resolve_target(
        renderer,
        &strategy.output,
        &model,
        source,
        ctx.manifest.options.max_collision_attempts,
    );

    let target = match resolution {
        Ok(Resolution::Skip) => {
            tracing::debug!(strategy = %strategy.strategy_type, source = %source.display(), "already in place");
            return Ok(record(Outcome::Skipped));
        }
        Ok(Resolution::Target(target)) => target,
        Err(EngineError::CollisionExhausted { candidate, attempts }) => {
            tracing::warn!(source = %source.display(), target = %candidate.display(), attempts, "no free target name");
            return Ok(record(Outcome::Failed {
                target: Some(candidate),
                failure: Failure::CollisionExhausted { attempts },
            }));
        }
        Err(e) => return Err(e),
    };

    let conversion = ctx
        .manifest
        .conversion_for(strategy)
        .zip(strategy.convert.clone());

    if ctx.flags.dry_run {
        tracing::info!(strategy = %strategy.strategy_type, source = %source.display(), target = %target.display(), "[dry-run] planned");
        return Ok(record(match conversion {
            Some((_, name)) => Outcome::WouldConvert {
                target,
                conversion: name,
            },
            None => Outcome::WouldMove { target },
        }));
    }

    let created = target.parent().and_then(outermost_missing);
    if let Some(parent) = target.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            prune_created(&target, created.as_deref());
            return Ok(failed(record, source, target, Failure::TargetDirectory(e)));
        }
    }

    let Some((conversion, name)) = conversion else {
        if let Err(e) = std::fs::rename(source, &target) {
            prune_created(&target, created.as_deref());
            return Ok(failed(record, source, target, Failure::MoveFailed(e)));
        }
        tracing::info!(source = %source.display(), target = %target.display(), "moved");
        return Ok(record(Outcome::Moved { target }));
    };

    let model = ConversionModel::new(ctx.model.clone(), source, &target);
    let argv = conversion
        .cmd
        .iter()
        .map(|token| renderer.render(token, &model))
        .collect::<Result<Vec<_>, _>>()?;

    let failure = match runner.run(&argv) {
        Err(err) => Some(Failure::ConversionSpawn {
            conversion: name.clone(),
            source: err,
        }),
        Ok(status) if !status.success => Some(Failure::ConversionFailed {
            conversion: name.clone(),
            code: status.code,
        }),
        Ok(_) => std::fs::remove_file(source).err().map(Failure::SourceRemoval),
    };
    if let Some(failure) = failure {
        prune_created(&target, created.as_deref());
        return Ok(failed(record, source, target, failure));
    }

    tracing::info!(conversion = %name, source = %source.display(), target = %target.display(), "converted");
    Ok(record(Outcome::Converted {
        target,
        conversion: name,
    }))
}

/// The outermost ancestor of `dir`, `dir` included, that does not exist.
fn outermost_missing(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .take_while(|ancestor| std::fs::symlink_metadata(ancestor).is_err())
        .last()
        .map(Path::to_path_buf)
}

/// Remove the directories `apply` created for `target`, innermost first, up
/// to and including `top`. Stops at the first one that is not empty.
fn prune_created(target: &Path, top: Option<&Path>) {
    let (Some(parent), Some(top)) = (target.parent(), top) else {
        return;
    };
    for dir in parent.ancestors() {
        if std::fs::remove_dir(dir).is_err() || dir == top {
            break;
        }
    }
}

fn failed(
    record: impl FnOnce(Outcome) -> SortRecord,
    source: &Path,
    target: PathBuf,
    failure: Failure,
) -> SortRecord {
    tracing::warn!(source = %source.display(), target = %target.display(), error = %failure, "sort failed");
    record(Outcome::Failed {
        target: Some(target),
        failure,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
