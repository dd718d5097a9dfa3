//! Lexical path resolution.
//!
//! Paths handed to the engine (CLI arguments, rendered templates, glob
//! patterns joined onto a root) are made absolute and normalised without
//! touching the filesystem, so a target that does not exist yet can still
//! be compared against its source.

use std::path::{Component, Path, PathBuf};

/// Join `path` onto `base` (unless already absolute) and fold `.` / `..`.
///
/// `..` never climbs above the root.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
