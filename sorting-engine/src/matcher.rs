//! Strategy input matching.
//!
//! Two modes back the two kinds of input:
//!
//! - **enumerate**: directory input: yield every file under a root that
//!   matches `root/<input>`.
//! - **matches**: single-file input: test one path against an absolute
//!   pattern.
//!
//! Both are case-insensitive. `*`, `?` and `[...]` stay within one path
//! component, `**` spans any number of directories, and `{a,b}` alternates.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use globset::{GlobBuilder, GlobMatcher as CompiledGlob};
use walkdir::WalkDir;

use crate::error::EngineError;
use crate::paths;

/// Lazily produced paths from an enumeration.
pub type PathIter<'a> = Box<dyn Iterator<Item = Result<PathBuf, EngineError>> + 'a>;

/// Glob matching and enumeration.
pub trait PathMatcher {
    /// Whether `path` satisfies the absolute glob `pattern`, typically built
    /// with [`anchored_glob`].
    fn matches(&self, pattern: &str, path: &Path) -> Result<bool, EngineError>;

    /// Files (never directories) under `root` matching `pattern`, which is
    /// interpreted relative to `root`. The sequence is finite and can only
    /// be consumed once.
    fn enumerate<'a>(&'a self, root: &Path, pattern: &str) -> Result<PathIter<'a>, EngineError>;
}

fn compile(pattern: &str) -> Result<CompiledGlob, EngineError> {
    GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| EngineError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn is_glob_component(part: &str) -> bool {
    part.contains(['*', '?', '[', '{'])
}

/// Split `pattern` at its first wildcard component into the literal
/// directory it starts from, resolved against `root`, and the glob
/// components below it.
fn anchor(root: &Path, pattern: &str) -> (PathBuf, Vec<String>) {
    let mut literal = PathBuf::new();
    let mut rest = Vec::new();
    for component in Path::new(pattern).components() {
        let part = component.as_os_str().to_string_lossy();
        if rest.is_empty() && !is_glob_component(&part) {
            literal.push(component.as_os_str());
        } else {
            rest.push(part.into_owned());
        }
    }
    (paths::resolve(root, &literal), rest)
}

fn join_glob(base: &Path, rest: &[String]) -> String {
    let mut glob = globset::escape(&base.to_string_lossy());
    for part in rest {
        if !glob.ends_with(MAIN_SEPARATOR) {
            glob.push(MAIN_SEPARATOR);
        }
        glob.push_str(part);
    }
    glob
}

/// `pattern` anchored at `root` as one absolute glob for
/// [`PathMatcher::matches`].
///
/// Wildcard characters in `root` and in the literal directories leading
/// `pattern` are escaped, so `Photos [2020]` only matches itself.
pub fn anchored_glob(root: &Path, pattern: &str) -> String {
    let (base, rest) = anchor(root, pattern);
    join_glob(&base, &rest)
}

/// Production matcher backed by `globset` and `walkdir`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobMatcher;

impl PathMatcher for GlobMatcher {
    fn matches(&self, pattern: &str, path: &Path) -> Result<bool, EngineError> {
        Ok(compile(pattern)?.is_match(path))
    }

    fn enumerate<'a>(&'a self, root: &Path, pattern: &str) -> Result<PathIter<'a>, EngineError> {
        let (base, rest) = anchor(root, pattern);

        if rest.is_empty() {
            // No wildcards: the pattern names at most one file.
            let hit = std::fs::metadata(&base)
                .map(|m| !m.is_dir())
                .unwrap_or(false);
            let single: Option<Result<PathBuf, EngineError>> = hit.then_some(Ok(base));
            return Ok(Box::new(single.into_iter()));
        }
        if std::fs::symlink_metadata(&base).is_err() {
            return Ok(Box::new(std::iter::empty::<Result<PathBuf, EngineError>>()));
        }

        let glob = join_glob(&base, &rest);
        let matcher = compile(&glob)?;
        let mut walk = WalkDir::new(&base).min_depth(1).sort_by_file_name();
        if !rest.iter().any(|part| part.contains("**")) {
            walk = walk.max_depth(rest.len());
        }

        tracing::debug!(base = %base.display(), pattern = %glob, "enumerating");
        let iter = walk.into_iter().filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => None,
            Ok(entry) => matcher
                .is_match(entry.path())
                .then(|| Ok(entry.into_path())),
            Err(source) => Some(Err(EngineError::Walk {
                root: base.clone(),
                source,
            })),
        });
        Ok(Box::new(iter))
    }
}
