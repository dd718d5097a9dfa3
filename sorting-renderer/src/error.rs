//! Error types for sorting-renderer.

use thiserror::Error;

/// All errors that can arise from template rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template is not valid Tera syntax, or failed while rendering.
    #[error("cannot render template '{template}': {source}")]
    Template {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// The process working directory could not be read.
    #[error("cannot determine current working directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}
