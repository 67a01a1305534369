use std::fs::{self, File};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use derive_more::Display;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::report::{EntryEvent, Reporter, Summary};
use crate::tree::{EntryKind, TreeLine, parse_tree};

/// What happens to the lines nested under a directory that could not be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
pub enum DirectoryFailurePolicy {
    /// Nested lines attach to the nearest ancestor that was created.
    #[default]
    #[display("reattach")]
    Reattach,
    /// Nested lines are not created and are reported as failures.
    #[display("skip-descendants")]
    SkipDescendants,
}

/// An open directory on the ancestor chain.
#[derive(Debug, Clone)]
struct Frame {
    width: usize,
    path: PathBuf,
    failed: bool,
}

/// Ancestor chain keyed by indentation width.
///
/// The base path acts as the bottom frame of width -1: it is never popped, so
/// it is kept outside of `frames`. Widths in `frames` strictly increase from
/// bottom to top.
#[derive(Debug)]
struct AncestorStack {
    base: PathBuf,
    frames: Vec<Frame>,
}

/// The directory a line resolves into.
struct Parent {
    path: PathBuf,
    failed_ancestor: Option<PathBuf>,
}

impl AncestorStack {
    fn new(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
            frames: Vec::new(),
        }
    }

    /// Drops every frame that is not strictly shallower than `width` and
    /// returns the remaining top.
    fn parent_for(&mut self, width: usize) -> Parent {
        while self.frames.last().is_some_and(|frame| frame.width >= width) {
            self.frames.pop();
        }

        match self.frames.last() {
            Some(frame) => Parent {
                path: frame.path.clone(),
                failed_ancestor: frame.failed.then(|| frame.path.clone()),
            },
            None => Parent {
                path: self.base.clone(),
                failed_ancestor: None,
            },
        }
    }

    fn push(&mut self, width: usize, path: PathBuf, failed: bool) {
        self.frames.push(Frame {
            width,
            path,
            failed,
        });
    }
}

/// Creates the directories and empty files described by a tree listing.
#[derive(Debug, Clone)]
pub struct Materializer {
    base: PathBuf,
    policy: DirectoryFailurePolicy,
}

impl Materializer {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            policy: DirectoryFailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DirectoryFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Materializes `tree_text` under the base path.
    ///
    /// Lines are handled strictly in input order. A failing entry is reported
    /// to `reporter` and never stops the run.
    pub fn run(&self, tree_text: &str, reporter: &mut impl Reporter) -> Summary {
        let lines = parse_tree(tree_text);
        debug!(
            "Parsed {} entries, materializing under {} with policy {}",
            lines.len(),
            self.base.display(),
            self.policy
        );

        reporter.start(&self.base);

        let mut stack = AncestorStack::new(&self.base);
        let mut summary = Summary::default();
        for line in &lines {
            let event = self.materialize_line(line, &mut stack);
            summary.record(&event);
            reporter.entry(&event);
        }

        reporter.finish(&summary);
        summary
    }

    fn materialize_line(&self, line: &TreeLine, stack: &mut AncestorStack) -> EntryEvent {
        let parent = stack.parent_for(line.width);
        let path = parent.path.join(&line.name);
        debug!(
            "Resolved {} '{}' to {}",
            line.kind,
            line.raw.trim_end(),
            path.display()
        );

        let result = match (&parent.failed_ancestor, self.policy) {
            (Some(ancestor), DirectoryFailurePolicy::SkipDescendants) => {
                AncestorFailedSnafu {
                    path: path.clone(),
                    ancestor: ancestor.clone(),
                }
                .fail()
            }
            _ => validate_name(&line.name, &path).and_then(|()| match line.kind {
                EntryKind::Directory => create_directory(&path),
                EntryKind::File => create_file(&path),
            }),
        };

        match (&result, line.kind) {
            (Ok(()), EntryKind::Directory) => stack.push(line.width, path.clone(), false),
            (Err(_), EntryKind::Directory)
                if self.policy == DirectoryFailurePolicy::SkipDescendants
                    && parent.failed_ancestor.is_none() =>
            {
                stack.push(line.width, path.clone(), true)
            }
            _ => {}
        }

        if let Err(error) = &result {
            debug!("Entry failed: {error}");
        }

        EntryEvent {
            kind: line.kind,
            path,
            result,
        }
    }
}

fn validate_name(name: &str, path: &Path) -> Result<(), EntryCreationError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('\0')
        || name.chars().any(std::path::is_separator);

    if invalid {
        return InvalidNameSnafu {
            path: path.to_path_buf(),
            name: name.to_string(),
        }
        .fail();
    }
    Ok(())
}

fn create_directory(path: &Path) -> Result<(), EntryCreationError> {
    fs::create_dir_all(path).context(CreateDirectorySnafu {
        path: path.to_path_buf(),
    })
}

fn create_file(path: &Path) -> Result<(), EntryCreationError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context(CreateFileSnafu {
            path: path.to_path_buf(),
        })?;
    }
    File::create(path)
        .map(drop)
        .context(CreateFileSnafu {
            path: path.to_path_buf(),
        })
}

#[derive(Debug, Snafu)]
pub enum EntryCreationError {
    #[snafu(display("Error creating dir {}: {}", path.display(), source))]
    CreateDirectoryError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Error creating file {}: {}", path.display(), source))]
    CreateFileError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Error creating {}: invalid entry name '{}'", path.display(), name))]
    InvalidNameError { path: PathBuf, name: String },
    #[snafu(display(
        "Skipped {}: ancestor directory {} was not created",
        path.display(),
        ancestor.display()
    ))]
    AncestorFailedError { path: PathBuf, ancestor: PathBuf },
}

impl EntryCreationError {
    pub fn is_skipped_descendant(&self) -> bool {
        matches!(self, EntryCreationError::AncestorFailedError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use crate::tree::EXAMPLE_TREE;
    use rstest::*;
    use tempfile::TempDir;

    fn materialize(text: &str, base: &Path) -> (Summary, RecordingReporter) {
        materialize_with(text, base, DirectoryFailurePolicy::Reattach)
    }

    fn materialize_with(
        text: &str,
        base: &Path,
        policy: DirectoryFailurePolicy,
    ) -> (Summary, RecordingReporter) {
        let mut reporter = RecordingReporter::default();
        let summary = Materializer::new(base)
            .with_policy(policy)
            .run(text, &mut reporter);
        (summary, reporter)
    }

    #[test]
    fn creates_nested_scenario_under_base() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let (summary, reporter) = materialize("root/\n  a.txt\n  sub/\n    b.txt", base);

        assert!(base.join("root").is_dir());
        assert!(base.join("root/a.txt").is_file());
        assert!(base.join("root/sub").is_dir());
        assert!(base.join("root/sub/b.txt").is_file());
        assert_eq!(summary.directories, 2);
        assert_eq!(summary.files, 2);
        assert_eq!(summary.failures, 0);
        assert_eq!(
            reporter.paths(),
            vec![
                base.join("root"),
                base.join("root/a.txt"),
                base.join("root/sub"),
                base.join("root/sub/b.txt"),
            ]
        );
    }

    #[test]
    fn shallower_line_pops_deeper_siblings() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        // widths 0, 2, 2, 1, 3
        let text = "r/\n  a/\n  b/\n s/\n   c.txt";
        materialize(text, base);

        assert!(base.join("r/a").is_dir());
        assert!(base.join("r/b").is_dir());
        assert!(!base.join("r/a/b").exists());
        assert!(base.join("r/s").is_dir());
        assert!(!base.join("r/b/s").exists());
        assert!(base.join("r/s/c.txt").is_file());
    }

    #[test]
    fn siblings_share_parent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        materialize("p/\n├── x/\n├── y.txt\n└── z/", base);

        assert!(base.join("p/x").is_dir());
        assert!(base.join("p/y.txt").is_file());
        assert!(base.join("p/z").is_dir());
        assert!(!base.join("p/x/z").exists());
    }

    #[rstest]
    #[case("docs/", "docs", true)]
    #[case("README.md", "README.md", false)]
    fn classifies_directories_and_files(
        #[case] line: &str,
        #[case] name: &str,
        #[case] is_dir: bool,
    ) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(name);

        materialize(line, temp_dir.path());

        assert_eq!(path.is_dir(), is_dir);
        assert_eq!(path.is_file(), !is_dir);
        if !is_dir {
            assert_eq!(fs::metadata(&path).unwrap().len(), 0);
        }
    }

    #[test]
    fn rerun_is_idempotent_and_truncates_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let text = "app/\n├── src/\n│   └── main.rs\n└── Cargo.toml";

        let (first, _) = materialize(text, base);
        fs::write(base.join("app/src/main.rs"), "fn main() {}").unwrap();
        let (second, _) = materialize(text, base);

        assert_eq!(first, second);
        assert_eq!(second.failures, 0);
        assert!(base.join("app/src").is_dir());
        assert_eq!(fs::read(base.join("app/src/main.rs")).unwrap().len(), 0);
        assert_eq!(fs::read(base.join("app/Cargo.toml")).unwrap().len(), 0);
    }

    #[test]
    fn glyph_only_lines_produce_no_events() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let (summary, reporter) = materialize("a/\n│\n│   \n└── b.txt", temp_dir.path());

        assert_eq!(reporter.events.len(), 2);
        assert_eq!(reporter.events[0].kind, EntryKind::Directory);
        assert_eq!(reporter.events[1].kind, EntryKind::File);
        assert_eq!(summary.failures, 0);
    }

    #[rstest]
    #[case("/")]
    #[case("../")]
    #[case("./")]
    #[case("nested/path.txt")]
    fn invalid_names_are_reported_per_entry(#[case] bad: &str) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let text = format!("top/\n  {bad}\n  ok.txt");

        let (summary, reporter) = materialize(&text, temp_dir.path());

        assert_eq!(summary.failures, 1);
        assert!(!reporter.events[1].ok);
        assert!(temp_dir.path().join("top/ok.txt").is_file());
        assert!(!temp_dir.path().join("top/nested").exists());
    }

    #[test]
    fn failed_directory_reattaches_children_by_default() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("blocker"), "").unwrap();

        let (summary, reporter) = materialize("blocker/\n  child.txt\nafter.txt", base);

        assert_eq!(summary.failures, 1);
        assert!(!reporter.events[0].ok);
        assert!(base.join("child.txt").is_file());
        assert!(base.join("after.txt").is_file());
    }

    #[test]
    fn failed_directory_skips_descendants_when_requested() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("blocker"), "").unwrap();

        let text = "blocker/\n  child.txt\n  deeper/\n    leaf.txt\nafter.txt";
        let (summary, reporter) =
            materialize_with(text, base, DirectoryFailurePolicy::SkipDescendants);

        assert_eq!(summary.failures, 4);
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.files, 1);
        assert!(!base.join("child.txt").exists());
        assert!(!base.join("deeper").exists());
        assert!(base.join("after.txt").is_file());
        assert_eq!(reporter.paths()[3], base.join("blocker/leaf.txt"));
    }

    #[test]
    fn reports_start_and_finish_once() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let (summary, reporter) = materialize("", temp_dir.path());

        assert_eq!(reporter.started.as_deref(), Some(temp_dir.path()));
        assert_eq!(reporter.finished, Some(summary));
        assert!(reporter.events.is_empty());
    }

    #[test]
    fn materializes_the_builtin_example() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let (summary, _) = materialize(EXAMPLE_TREE, base);

        assert_eq!(summary.failures, 0);
        assert!(base.join("vidflow/vidflow/presets/styles.yaml").is_file());
        assert!(base.join("vidflow/vidflow/config/loader.py").is_file());
        assert!(base.join("vidflow/vidflow/cli.py").is_file());
        assert!(base.join("vidflow/docs/presets/faceless.md").is_file());
        assert!(base.join("vidflow/examples/README.md").is_file());
        assert!(base.join("vidflow/pyproject.toml").is_file());
        assert!(!base.join("vidflow/docs/presets/README.md").exists());
    }
}
