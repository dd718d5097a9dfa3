//! Target path computation.
//!
//! A strategy's `output` template is rendered against the source file's
//! [`TargetModel`] and resolved against `CWD`. If that path is the source
//! itself the file is already sorted. If it is taken, `name (1).ext`,
//! `name (2).ext`, … are probed until a free one turns up or the manifest's
//! `maxCollisionAttempts` is spent.

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use sorting_renderer::{BaseModel, TargetModel, TemplateRenderer};

use crate::error::EngineError;
use crate::paths;

/// Where a source file should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The rendered target is the source itself; nothing to do.
    Skip,
    /// A path that did not exist when probed.
    Target(PathBuf),
}

// ---------------------------------------------------------------------------
// Target model
// ---------------------------------------------------------------------------

/// `yy-MM-dd_HH-mm-SS` in local time, where `SS` is hundredths of a second.
pub fn format_timestamp(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    format!(
        "{}{:02}",
        local.format("%y-%m-%d_%H-%M-"),
        local.timestamp_subsec_millis() / 10
    )
}

fn timestamp(time: io::Result<SystemTime>) -> String {
    time.map(format_timestamp).unwrap_or_default()
}

fn lossy(part: Option<&std::ffi::OsStr>) -> String {
    part.map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Build the variables describing `source` for its strategy's `output`.
///
/// Timestamps the platform cannot report render as empty text.
pub fn target_model(base: BaseModel, source: &Path, metadata: &Metadata) -> TargetModel {
    TargetModel {
        base,
        directory: lossy(source.parent().map(Path::as_os_str)),
        basename: lossy(source.file_stem()),
        filename: lossy(source.file_name()),
        extension: extension_of(source),
        creation_time: timestamp(metadata.created()),
        access_time: timestamp(metadata.accessed()),
        modification_time: timestamp(metadata.modified()),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// resolve_target
// ---------------------------------------------------------------------------

fn occupied(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// `<dir>/<name> (<n>)<ext>` for a taken `<dir>/<name><ext>`.
pub fn numbered_candidate(target: &Path, n: u32) -> PathBuf {
    let name = lossy(target.file_stem());
    let ext = extension_of(target);
    let file = format!("{name} ({n}){ext}");
    match target.parent() {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}

/// Compute the destination for `source` from `output`.
///
/// The returned [`Resolution::Target`] did not exist at the moment it was
/// probed; another process may still create it before the caller uses it.
pub fn resolve_target(
    renderer: &TemplateRenderer,
    output: &str,
    model: &TargetModel,
    source: &Path,
    max_attempts: u32,
) -> Result<Resolution, EngineError> {
    let rendered = renderer.render(output, model)?;
    let target = paths::resolve(Path::new(&model.base.cwd), Path::new(&rendered));

    if target == source {
        return Ok(Resolution::Skip);
    }
    if !occupied(&target) {
        return Ok(Resolution::Target(target));
    }

    for n in 1..=max_attempts {
        let candidate = numbered_candidate(&target, n);
        if !occupied(&candidate) {
            return Ok(Resolution::Target(candidate));
        }
    }
    Err(EngineError::CollisionExhausted {
        candidate: target,
        attempts: max_attempts,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn model_for(cwd: &Path, source: &Path) -> TargetModel {
        let meta = fs::metadata(source).unwrap();
        target_model(BaseModel::new(cwd, "/home/me"), source, &meta)
    }

    #[test]
    fn model_splits_the_source_name() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("archive.tar.gz");
        fs::write(&source, "x").unwrap();
        let m = model_for(tmp.path(), &source);
        assert_eq!(m.directory, tmp.path().to_string_lossy());
        assert_eq!(m.basename, "archive.tar");
        assert_eq!(m.filename, "archive.tar.gz");
        assert_eq!(m.extension, ".gz");
        assert!(!m.modification_time.is_empty());
    }

    #[test]
    fn dotfiles_have_no_extension() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join(".bashrc");
        fs::write(&source, "x").unwrap();
        let m = model_for(tmp.path(), &source);
        assert_eq!(m.basename, ".bashrc");
        assert_eq!(m.extension, "");
    }

    #[test]
    fn timestamp_uses_hundredths_of_a_second() {
        let time = SystemTime::UNIX_EPOCH + Duration::new(1_660_552_000, 870_000_000);
        let formatted = format_timestamp(time);
        let local: DateTime<Local> = time.into();
        let expected = format!("{}87", local.format("%y-%m-%d_%H-%M-"));
        assert_eq!(formatted, expected);
        assert_eq!(formatted.len(), "22-08-15_08-44-87".len());
    }

    #[test]
    fn numbered_candidate_keeps_extension() {
        assert_eq!(
            numbered_candidate(Path::new("/a/report.txt"), 2),
            PathBuf::from("/a/report (2).txt")
        );
        assert_eq!(
            numbered_candidate(Path::new("/a/README"), 1),
            PathBuf::from("/a/README (1)")
        );
    }

    #[test]
    fn free_target_is_returned_as_is() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.log");
        fs::write(&source, "x").unwrap();
        let m = model_for(tmp.path(), &source);
        let r = resolve_target(&TemplateRenderer::new(), "archive/{{FILENAME}}", &m, &source, 5)
            .unwrap();
        assert_eq!(r, Resolution::Target(tmp.path().join("archive").join("a.log")));
    }

    #[test]
    fn target_equal_to_source_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.log");
        fs::write(&source, "x").unwrap();
        let m = model_for(tmp.path(), &source);
        let r = resolve_target(
            &TemplateRenderer::new(),
            "{{DIRECTORY}}/{{FILENAME}}",
            &m,
            &source,
            5,
        )
        .unwrap();
        assert_eq!(r, Resolution::Skip);
    }

    #[test]
    fn collisions_take_the_next_free_number() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("inbox").join("report.txt");
        let out = tmp.path().join("out");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::create_dir_all(&out).unwrap();
        fs::write(&source, "new").unwrap();
        fs::write(out.join("report.txt"), "old").unwrap();
        fs::write(out.join("report (1).txt"), "older").unwrap();

        let m = model_for(tmp.path(), &source);
        let r = resolve_target(&TemplateRenderer::new(), "out/{{FILENAME}}", &m, &source, 5)
            .unwrap();
        assert_eq!(r, Resolution::Target(out.join("report (2).txt")));
    }

    #[test]
    fn exhausted_collisions_are_an_error() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("inbox").join("report.txt");
        let out = tmp.path().join("out");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::create_dir_all(&out).unwrap();
        fs::write(&source, "new").unwrap();
        fs::write(out.join("report.txt"), "").unwrap();
        fs::write(out.join("report (1).txt"), "").unwrap();
        fs::write(out.join("report (2).txt"), "").unwrap();

        let m = model_for(tmp.path(), &source);
        let err = resolve_target(&TemplateRenderer::new(), "out/{{FILENAME}}", &m, &source, 2)
            .unwrap_err();
        match err {
            EngineError::CollisionExhausted { candidate, attempts } => {
                assert_eq!(candidate, out.join("report.txt"));
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn absolute_output_ignores_cwd() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.log");
        fs::write(&source, "x").unwrap();
        let m = model_for(Path::new("/somewhere/else"), &source);
        let output = format!("{}/sorted/{{{{FILENAME}}}}", tmp.path().display());
        let r = resolve_target(&TemplateRenderer::new(), &output, &m, &source, 5).unwrap();
        assert_eq!(r, Resolution::Target(tmp.path().join("sorted").join("a.log")));
    }
}
