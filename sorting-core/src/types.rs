//! Domain types for the sorting manifest.
//!
//! Field names follow the manifest's camelCase keys. Unknown keys are
//! rejected at parse time so typos surface as validation errors instead of
//! being silently ignored.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound on numbered collision candidates when the manifest does not
/// set `options.maxCollisionAttempts`.
pub const DEFAULT_MAX_COLLISION_ATTEMPTS: u32 = 10_000;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Key of an entry in the manifest's `conversions` table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionName(pub String);

impl fmt::Display for ConversionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ConversionName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConversionName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Run-wide options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
    /// Path templates sorted when no paths are given on the command line.
    pub default_paths: Vec<String>,
    /// How many `name (n).ext` candidates to probe before giving up on a target.
    #[serde(default = "default_max_collision_attempts")]
    pub max_collision_attempts: u32,
}

fn default_max_collision_attempts() -> u32 {
    DEFAULT_MAX_COLLISION_ATTEMPTS
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_paths: Vec::new(),
            max_collision_attempts: DEFAULT_MAX_COLLISION_ATTEMPTS,
        }
    }
}

/// An external command template. Each `cmd` token is rendered on its own,
/// so a rendered path containing spaces stays a single argv entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Conversion {
    pub cmd: Vec<String>,
}

/// A sorting rule. Order within the manifest is priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Strategy {
    /// Free-form label shown in reports.
    #[serde(rename = "type")]
    pub strategy_type: String,
    /// Glob pattern, relative to the directory being sorted.
    pub input: String,
    /// Destination path template.
    pub output: String,
    /// Name of a conversion to pipe the file through; `None` means move.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convert: Option<ConversionName>,
}

/// Root of a sorting manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub options: Options,
    #[serde(default)]
    pub conversions: BTreeMap<ConversionName, Conversion>,
    #[serde(default)]
    pub strategies: Vec<Strategy>,
}

impl Manifest {
    /// The conversion a strategy refers to, if it names one that exists.
    ///
    /// Dangling names resolve to `None`, which callers treat as a plain move.
    pub fn conversion_for(&self, strategy: &Strategy) -> Option<&Conversion> {
        strategy
            .convert
            .as_ref()
            .and_then(|name| self.conversions.get(name))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
