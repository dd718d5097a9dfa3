//! Error types for sorting-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while locating, parsing, or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("cannot read manifest at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parse or schema error.
    #[error("failed to parse manifest at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// YAML parse or schema error: includes line context from serde_yaml.
    #[error("failed to parse manifest at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed but describes an unusable manifest.
    #[error("invalid manifest: {0}")]
    Validation(String),

    /// The running executable's location is unknown, so the bundled
    /// manifest cannot be found.
    #[error("cannot locate bundled manifest: {0}")]
    DefaultPath(#[source] std::io::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ManifestError {
    ManifestError::Io {
        path: path.into(),
        source,
    }
}
