//! Sorting orchestration: [`Sorter`].
//!
//! | Input kind | Strategy selection                                         |
//! |------------|------------------------------------------------------------|
//! | directory  | every strategy enumerates; a path is claimed by the first  |
//! |            | strategy that surfaces it and never revisited in that call |
//! | file       | the first strategy whose pattern matches, then stop        |
//!
//! Everything runs sequentially, in manifest order and then enumeration
//! order, so two runs over the same tree report in the same order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use sorting_renderer::TemplateRenderer;

use crate::context::Context;
use crate::error::{io_err, EngineError};
use crate::executor::{self, Outcome, SortRecord};
use crate::matcher::{self, GlobMatcher, PathMatcher};
use crate::paths;
use crate::process::{ProcessRunner, SystemRunner};

/// Callback receiving each record as soon as it is produced.
pub type Observer = Box<dyn FnMut(&SortRecord)>;

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// Every record produced by a run, in order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub records: Vec<SortRecord>,
}

impl RunSummary {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn moved(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Moved { .. }))
    }

    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Converted { .. }))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, Outcome::WouldMove { .. } | Outcome::WouldConvert { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }
}

// ---------------------------------------------------------------------------
// Sorter
// ---------------------------------------------------------------------------

/// Drives a run over directories and single files.
pub struct Sorter {
    ctx: Context,
    renderer: TemplateRenderer,
    matcher: Box<dyn PathMatcher>,
    runner: Box<dyn ProcessRunner>,
    observer: Option<Observer>,
}

impl Sorter {
    /// Build a sorter with the glob matcher and real process spawning.
    ///
    /// Fails if any manifest template is malformed.
    pub fn new(ctx: Context) -> Result<Self, EngineError> {
        let renderer = TemplateRenderer::new();
        ctx.check_templates(&renderer)?;
        Ok(Self {
            ctx,
            renderer,
            matcher: Box::new(GlobMatcher),
            runner: Box::new(SystemRunner),
            observer: None,
        })
    }

    pub fn with_matcher(mut self, matcher: impl PathMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn with_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_observer(mut self, observer: impl FnMut(&SortRecord) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    fn cwd(&self) -> &Path {
        Path::new(&self.ctx.model.cwd)
    }

    fn execute(
        &mut self,
        strategy_index: usize,
        source: &Path,
    ) -> Result<SortRecord, EngineError> {
        let strategy = &self.ctx.manifest.strategies[strategy_index];
        let record = executor::apply(
            &self.ctx,
            &self.renderer,
            self.runner.as_ref(),
            strategy,
            source,
        )?;
        if let Some(observer) = self.observer.as_mut() {
            observer(&record);
        }
        Ok(record)
    }

    /// Apply every strategy to the files under `directory`.
    ///
    /// A path already handled by an earlier strategy in this call is not
    /// offered to later ones, whatever its outcome was.
    pub fn sort_directory(&mut self, directory: &Path) -> Result<Vec<SortRecord>, EngineError> {
        let root = paths::resolve(self.cwd(), directory);
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut records = Vec::new();

        for index in 0..self.ctx.manifest.strategies.len() {
            let input = self.ctx.manifest.strategies[index].input.clone();
            let found: Vec<PathBuf> = self
                .matcher
                .enumerate(&root, &input)?
                .filter(|entry| !matches!(entry, Ok(path) if visited.contains(path)))
                .collect::<Result<_, _>>()?;

            for path in found {
                if !visited.insert(path.clone()) {
                    continue;
                }
                records.push(self.execute(index, &path)?);
            }
        }
        Ok(records)
    }

    /// Apply the first strategy whose pattern, anchored at the file's
    /// directory, matches `file`. `None` when no strategy matches.
    pub fn sort_file(&mut self, file: &Path) -> Result<Option<SortRecord>, EngineError> {
        let full = paths::resolve(self.cwd(), file);
        let dir = full.parent().unwrap_or(&full).to_path_buf();

        for index in 0..self.ctx.manifest.strategies.len() {
            let strategy = &self.ctx.manifest.strategies[index];
            let pattern = matcher::anchored_glob(&dir, &strategy.input);
            if self.matcher.matches(&pattern, &full)? {
                return self.execute(index, &full).map(Some);
            }
        }
        tracing::debug!(file = %full.display(), "no strategy matches");
        Ok(None)
    }

    /// The paths a run covers: `cli_paths` if any, otherwise the manifest's
    /// `defaultPaths` rendered against `CWD` / `HOME`.
    pub fn input_paths(&self, cli_paths: &[String]) -> Result<Vec<String>, EngineError> {
        if !cli_paths.is_empty() {
            return Ok(cli_paths.to_vec());
        }
        self.ctx
            .manifest
            .options
            .default_paths
            .iter()
            .map(|template| {
                self.renderer
                    .render(template, &self.ctx.model)
                    .map_err(EngineError::from)
            })
            .collect()
    }

    /// Sort each input: directories via [`Sorter::sort_directory`], regular
    /// files via [`Sorter::sort_file`]. Anything else is ignored. An input
    /// that cannot be stat'ed aborts the run.
    pub fn sort_inputs(&mut self, inputs: &[String]) -> Result<RunSummary, EngineError> {
        let mut summary = RunSummary::default();
        for input in inputs {
            let path = paths::resolve(self.cwd(), Path::new(input));
            let metadata = std::fs::metadata(&path).map_err(|e| io_err(&path, e))?;
            if metadata.is_dir() {
                summary.records.extend(self.sort_directory(&path)?);
            } else if metadata.is_file() {
                summary.records.extend(self.sort_file(&path)?);
            } else {
                tracing::debug!(path = %path.display(), "neither file nor directory; ignored");
            }
        }
        Ok(summary)
    }

    /// [`Sorter::input_paths`] followed by [`Sorter::sort_inputs`].
    pub fn run(&mut self, cli_paths: &[String]) -> Result<RunSummary, EngineError> {
        let inputs = self.input_paths(cli_paths)?;
        self.sort_inputs(&inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OperationFlags;
    use crate::process::RunStatus;
    use sorting_core::manifest::{self, ManifestFormat};
    use sorting_renderer::BaseModel;
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct NoSpawn;

    impl ProcessRunner for NoSpawn {
        fn run(&self, _argv: &[String]) -> io::Result<RunStatus> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such program"))
        }
    }

    const MANIFEST: &str = r#"
[options]
defaultPaths = ["{{CWD}}/inbox"]

[[strategies]]
type = "photos"
input = "*.jpg"
output = "photos/{{FILENAME}}"

[[strategies]]
type = "anything"
input = "*.*"
output = "misc/{{FILENAME}}"
"#;

    fn sorter(tmp: &TempDir, dry_run: bool) -> Sorter {
        let manifest = manifest::parse(MANIFEST, ManifestFormat::Toml).unwrap();
        let ctx = Context::new(
            manifest,
            OperationFlags { dry_run },
            BaseModel::new(tmp.path(), tmp.path()),
        );
        Sorter::new(ctx).unwrap().with_runner(NoSpawn)
    }

    fn touch(tmp: &TempDir, rel: &str) -> PathBuf {
        let path = tmp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel).unwrap();
        path
    }

    #[test]
    fn earlier_strategy_claims_a_file_in_directory_mode() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp, "inbox/a.jpg");
        touch(&tmp, "inbox/b.txt");
        let records = sorter(&tmp, true)
            .sort_directory(&tmp.path().join("inbox"))
            .unwrap();
        let seen: Vec<(&str, String)> = records
            .iter()
            .map(|r| {
                (
                    r.strategy.as_str(),
                    r.source.file_name().unwrap().to_string_lossy().into_owned(),
                )
            })
            .collect();
        assert_eq!(
            seen,
            [("photos", "a.jpg".to_string()), ("anything", "b.txt".to_string())]
        );
    }

    #[test]
    fn first_matching_strategy_wins_in_file_mode() {
        let tmp = TempDir::new().unwrap();
        let jpg = touch(&tmp, "inbox/a.jpg");
        let txt = touch(&tmp, "inbox/b.txt");
        let mut s = sorter(&tmp, false);

        let rec = s.sort_file(&jpg).unwrap().unwrap();
        assert_eq!(rec.strategy, "photos");
        assert!(tmp.path().join("photos/a.jpg").exists());

        let rec = s.sort_file(&txt).unwrap().unwrap();
        assert_eq!(rec.strategy, "anything");
        assert!(tmp.path().join("misc/b.txt").exists());
    }

    #[test]
    fn unmatched_file_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        let bare = touch(&tmp, "inbox/README");
        assert!(sorter(&tmp, false).sort_file(&bare).unwrap().is_none());
        assert!(bare.exists());
    }

    #[test]
    fn input_paths_prefer_cli_arguments() {
        let tmp = TempDir::new().unwrap();
        let s = sorter(&tmp, true);
        assert_eq!(s.input_paths(&["x".to_string()]).unwrap(), ["x"]);
        let defaults = s.input_paths(&[]).unwrap();
        assert_eq!(defaults, [format!("{}/inbox", tmp.path().display())]);
    }

    #[test]
    fn run_uses_default_paths_and_counts_outcomes() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp, "inbox/a.jpg");
        touch(&tmp, "inbox/b.txt");
        let summary = sorter(&tmp, false).run(&[]).unwrap();
        assert_eq!(summary.moved(), 2);
        assert_eq!(summary.failed(), 0);
        assert_eq!(summary.planned(), 0);
    }

    #[test]
    fn missing_input_aborts_the_run() {
        let tmp = TempDir::new().unwrap();
        let err = sorter(&tmp, false)
            .run(&["nowhere".to_string()])
            .unwrap_err();
        assert!(matches!(err, EngineError::Discovery { .. }), "got: {err}");
    }

    #[test]
    fn observer_sees_every_record_in_order() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp, "inbox/a.jpg");
        touch(&tmp, "inbox/b.txt");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let summary = sorter(&tmp, true)
            .with_observer(move |r| sink.borrow_mut().push(r.source.clone()))
            .run(&[])
            .unwrap();
        let from_summary: Vec<PathBuf> = summary.records.iter().map(|r| r.source.clone()).collect();
        assert_eq!(*seen.borrow(), from_summary);
        assert_eq!(summary.planned(), 2);
    }

    #[test]
    fn glob_characters_in_directory_names_are_literal() {
        let tmp = TempDir::new().unwrap();
        for dir in ["Photos [2020]", "notes{draft"] {
            touch(&tmp, &format!("{dir}/a.jpg"));
            touch(&tmp, &format!("{dir}/b.txt"));

            let records = sorter(&tmp, true)
                .sort_directory(&tmp.path().join(dir))
                .unwrap();
            assert_eq!(records.len(), 2, "directory {dir}");

            let rec = sorter(&tmp, true)
                .sort_file(&tmp.path().join(dir).join("a.jpg"))
                .unwrap()
                .unwrap();
            assert_eq!(rec.strategy, "photos", "directory {dir}");
        }
    }

    #[test]
    fn malformed_output_template_is_rejected_up_front() {
        let manifest = manifest::parse(
            r#"
[options]
defaultPaths = []
[[strategies]]
type = "broken"
input = "*"
output = "{{FILENAME"
"#,
            ManifestFormat::Toml,
        )
        .unwrap();
        let ctx = Context::new(manifest, OperationFlags::default(), BaseModel::new("/w", "/h"));
        assert!(matches!(Sorter::new(ctx), Err(EngineError::Render(_))));
    }
}
