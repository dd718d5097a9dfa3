//! Error types for sorting-engine.
//!
//! Everything here aborts the run. Problems confined to a single file are
//! reported through [`crate::executor::Failure`] instead.

use std::path::PathBuf;

use thiserror::Error;

use sorting_renderer::RenderError;

/// All fatal errors that can arise while sorting.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A template failed to render.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Stat of an input path or source file failed.
    #[error("cannot inspect {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed part-way through an enumeration.
    #[error("cannot enumerate {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A strategy's input is not a valid glob.
    #[error("invalid input pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Every numbered variant of a target name is already taken.
    #[error("no free target name near {candidate} after {attempts} attempts")]
    CollisionExhausted { candidate: PathBuf, attempts: u32 },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> EngineError {
    EngineError::Discovery {
        path: path.into(),
        source,
    }
}
