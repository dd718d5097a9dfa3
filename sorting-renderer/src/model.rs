//! Variable models: the named values a template may reference.
//!
//! | Model             | Variables                                                   |
//! |-------------------|-------------------------------------------------------------|
//! | [`BaseModel`]       | `CWD`, `HOME`                                             |
//! | [`TargetModel`]     | base + `DIRECTORY`, `BASENAME`, `FILENAME`, `EXTENSION`,  |
//! |                   | `CREATION_TIME`, `ACCESS_TIME`, `MODIFICATION_TIME`         |
//! | [`ConversionModel`] | base + `SOURCE`, `TARGET`                                 |

use std::path::Path;

use crate::error::RenderError;

/// Named-variable lookup used by the renderer.
pub trait VariableModel {
    /// Value of `name`, or `None` when the model does not define it.
    fn lookup(&self, name: &str) -> Option<&str>;
}

// ---------------------------------------------------------------------------
// BaseModel
// ---------------------------------------------------------------------------

/// Variables available to every template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseModel {
    pub cwd: String,
    pub home: String,
}

impl BaseModel {
    pub fn new(cwd: impl AsRef<Path>, home: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_string_lossy().into_owned(),
            home: home.as_ref().to_string_lossy().into_owned(),
        }
    }

    /// Read `CWD` from the process and `HOME` from the platform's home
    /// directory, falling back to `"."` when there is none.
    pub fn detect() -> Result<Self, RenderError> {
        let cwd = std::env::current_dir().map_err(RenderError::CurrentDir)?;
        let home = dirs::home_dir().unwrap_or_else(|| ".".into());
        Ok(Self::new(cwd, home))
    }
}

impl VariableModel for BaseModel {
    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "CWD" => Some(self.cwd.as_str()),
            "HOME" => Some(self.home.as_str()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TargetModel
// ---------------------------------------------------------------------------

/// Variables describing a source file, used to render a strategy's `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetModel {
    pub base: BaseModel,
    /// Absolute directory containing the source.
    pub directory: String,
    /// File name without its final extension.
    pub basename: String,
    /// File name with extension.
    pub filename: String,
    /// Final extension including the leading dot, or empty.
    pub extension: String,
    pub creation_time: String,
    pub access_time: String,
    pub modification_time: String,
}

impl VariableModel for TargetModel {
    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "DIRECTORY" => Some(self.directory.as_str()),
            "BASENAME" => Some(self.basename.as_str()),
            "FILENAME" => Some(self.filename.as_str()),
            "EXTENSION" => Some(self.extension.as_str()),
            "CREATION_TIME" => Some(self.creation_time.as_str()),
            "ACCESS_TIME" => Some(self.access_time.as_str()),
            "MODIFICATION_TIME" => Some(self.modification_time.as_str()),
            _ => self.base.lookup(name),
        }
    }
}

// ---------------------------------------------------------------------------
// ConversionModel
// ---------------------------------------------------------------------------

/// Variables available to a conversion's `cmd` tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionModel {
    pub base: BaseModel,
    pub source: String,
    pub target: String,
}

impl ConversionModel {
    pub fn new(base: BaseModel, source: impl AsRef<Path>, target: impl AsRef<Path>) -> Self {
        Self {
            base,
            source: source.as_ref().to_string_lossy().into_owned(),
            target: target.as_ref().to_string_lossy().into_owned(),
        }
    }
}

impl VariableModel for ConversionModel {
    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "SOURCE" => Some(self.source.as_str()),
            "TARGET" => Some(self.target.as_str()),
            _ => self.base.lookup(name),
        }
    }
}
