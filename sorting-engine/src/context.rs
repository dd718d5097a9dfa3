//! Run context: manifest, flags, and base variables for one run.

use sorting_core::Manifest;
use sorting_renderer::{BaseModel, TemplateRenderer};

use crate::error::EngineError;

/// Flags that change what a run does, as opposed to what it sorts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationFlags {
    /// Report planned actions without touching the filesystem.
    pub dry_run: bool,
}

/// Read-only state shared by every step of a run.
#[derive(Debug, Clone)]
pub struct Context {
    pub manifest: Manifest,
    pub flags: OperationFlags,
    pub model: BaseModel,
}

impl Context {
    pub fn new(manifest: Manifest, flags: OperationFlags, model: BaseModel) -> Self {
        Self {
            manifest,
            flags,
            model,
        }
    }

    /// Compile every template in the manifest so syntax errors surface
    /// before any file is touched.
    pub fn check_templates(&self, renderer: &TemplateRenderer) -> Result<(), EngineError> {
        let manifest = &self.manifest;
        let templates = manifest
            .options
            .default_paths
            .iter()
            .chain(manifest.strategies.iter().map(|s| &s.output))
            .chain(manifest.conversions.values().flat_map(|c| c.cmd.iter()));
        for template in templates {
            renderer.check(template)?;
        }
        Ok(())
    }
}
