//! # sorting-engine
//!
//! Applies a manifest's strategies to files on disk.
//!
//! Build a [`Context`] from a loaded manifest, wrap it in a [`Sorter`], and
//! call [`Sorter::run`]. Each file handled produces a [`SortRecord`]; fatal
//! problems surface as [`EngineError`].

pub mod context;
pub mod error;
pub mod executor;
pub mod matcher;
pub mod orchestrator;
pub mod paths;
pub mod process;
pub mod resolver;

pub use context::{Context, OperationFlags};
pub use error::EngineError;
pub use executor::{apply, Failure, Outcome, SortRecord};
pub use matcher::{GlobMatcher, PathMatcher};
pub use orchestrator::{RunSummary, Sorter};
pub use process::{ProcessRunner, RunStatus, SystemRunner};
pub use resolver::{format_timestamp, resolve_target, Resolution};
