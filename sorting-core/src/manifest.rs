//! Manifest loading and validation.
//!
//! # Formats
//!
//! | Extension        | Format |
//! |------------------|--------|
//! | `.yaml`, `.yml`  | YAML   |
//! | anything else    | TOML   |
//!
//! # API pattern
//!
//! - `load_at(path)`: explicit manifest path; used by tests and `--config`
//! - `load()`: the manifest bundled next to the executable, delegates to `load_at`

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ManifestError};
use crate::types::{ConversionName, Manifest};

/// File name of the manifest shipped alongside the binary.
pub const DEFAULT_MANIFEST_NAME: &str = "config.toml";

/// Serialization format of a manifest document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Yaml,
}

impl ManifestFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => ManifestFormat::Yaml,
            _ => ManifestFormat::Toml,
        }
    }
}

/// A non-fatal manifest problem, reported at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestWarning {
    /// A strategy's `convert` names no entry in `conversions`; matching
    /// files are moved instead of converted.
    UnknownConversion {
        strategy: String,
        conversion: ConversionName,
    },
}

impl fmt::Display for ManifestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestWarning::UnknownConversion {
                strategy,
                conversion,
            } => write!(
                f,
                "strategy '{strategy}' refers to unknown conversion '{conversion}'; files will be moved unconverted"
            ),
        }
    }
}

/// A parsed, validated manifest plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub path: PathBuf,
    pub manifest: Manifest,
    pub warnings: Vec<ManifestWarning>,
}

// ---------------------------------------------------------------------------
// 1. Parse
// ---------------------------------------------------------------------------

fn parse_at(path: &Path, text: &str, format: ManifestFormat) -> Result<Manifest, ManifestError> {
    match format {
        ManifestFormat::Toml => toml::from_str(text).map_err(|source| ManifestError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        ManifestFormat::Yaml => serde_yaml::from_str(text).map_err(|source| ManifestError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parse a manifest held in memory. Schema errors are reported against the
/// placeholder path `<inline>`.
pub fn parse(text: &str, format: ManifestFormat) -> Result<Manifest, ManifestError> {
    parse_at(Path::new("<inline>"), text, format)
}

// ---------------------------------------------------------------------------
// 2. Validate
// ---------------------------------------------------------------------------

impl Manifest {
    /// Reject manifests the engine cannot run; collect the ones it can run
    /// with degraded behaviour as warnings.
    pub fn validate(&self) -> Result<Vec<ManifestWarning>, ManifestError> {
        if self.options.max_collision_attempts == 0 {
            return Err(ManifestError::Validation(
                "options.maxCollisionAttempts must be at least 1".to_string(),
            ));
        }

        for (name, conversion) in &self.conversions {
            if conversion.cmd.is_empty() {
                return Err(ManifestError::Validation(format!(
                    "conversion '{name}' has an empty cmd"
                )));
            }
        }

        let mut warnings = Vec::new();
        for (index, strategy) in self.strategies.iter().enumerate() {
            if strategy.input.trim().is_empty() {
                return Err(ManifestError::Validation(format!(
                    "strategy #{} ('{}') has an empty input pattern",
                    index + 1,
                    strategy.strategy_type
                )));
            }
            if strategy.output.trim().is_empty() {
                return Err(ManifestError::Validation(format!(
                    "strategy #{} ('{}') has an empty output template",
                    index + 1,
                    strategy.strategy_type
                )));
            }
            if let Some(name) = &strategy.convert {
                if !self.conversions.contains_key(name) {
                    warnings.push(ManifestWarning::UnknownConversion {
                        strategy: strategy.strategy_type.clone(),
                        conversion: name.clone(),
                    });
                }
            }
        }
        Ok(warnings)
    }
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Read, parse, and validate the manifest at `path`.
pub fn load_at(path: &Path) -> Result<LoadedManifest, ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let manifest = parse_at(path, &text, ManifestFormat::from_path(path))?;
    let warnings = manifest.validate()?;
    Ok(LoadedManifest {
        path: path.to_path_buf(),
        manifest,
        warnings,
    })
}

/// `<directory of the running executable>/config.toml`.
pub fn default_path() -> Result<PathBuf, ManifestError> {
    let exe = std::env::current_exe().map_err(ManifestError::DefaultPath)?;
    let dir = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir.join(DEFAULT_MANIFEST_NAME))
}

/// `load_at` convenience wrapper for the bundled manifest.
pub fn load() -> Result<LoadedManifest, ManifestError> {
    load_at(&default_path()?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[options]
defaultPaths = ["{{HOME}}/Downloads"]

[[strategies]]
type = "logs"
input = "*.log"
output = "archive/{{FILENAME}}"
"#;

    #[test]
    fn format_from_extension() {
        assert_eq!(ManifestFormat::from_path(Path::new("a.yaml")), ManifestFormat::Yaml);
        assert_eq!(ManifestFormat::from_path(Path::new("a.YML")), ManifestFormat::Yaml);
        assert_eq!(ManifestFormat::from_path(Path::new("a.toml")), ManifestFormat::Toml);
        assert_eq!(ManifestFormat::from_path(Path::new("manifest")), ManifestFormat::Toml);
    }

    #[test]
    fn parse_minimal_toml() {
        let manifest = parse(MINIMAL, ManifestFormat::Toml).expect("parse");
        assert_eq!(manifest.options.default_paths, vec!["{{HOME}}/Downloads"]);
        assert!(manifest.conversions.is_empty());
        assert_eq!(manifest.strategies.len(), 1);
        assert_eq!(manifest.strategies[0].strategy_type, "logs");
        assert!(manifest.strategies[0].convert.is_none());
    }

    #[test]
    fn zero_collision_attempts_is_rejected() {
        let mut manifest = parse(MINIMAL, ManifestFormat::Toml).expect("parse");
        manifest.options.max_collision_attempts = 0;
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("maxCollisionAttempts"), "got: {err}");
    }

    #[test]
    fn parse_error_mentions_inline_origin() {
        let err = parse("options = 3", ManifestFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("<inline>"), "got: {err}");
    }
}
