//! Fluent builder API for a lift run.
//!
//! Drives the whole pipeline: walk the root, extract spans from each file,
//! record them in a shared [`ResourceTree`], rewrite the file, and finally
//! write the resource file.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::LiftError;
use crate::extract::{extract_spans, Grammar};
use crate::keys::FileKey;
use crate::output::{write_resource, DEFAULT_OUTPUT};
use crate::resource::{accumulate, Replacement, ResourceTree};
use crate::rewrite::rewrite;
use crate::walker::{walk_sources, WalkOptions};

/// Builder for a lift run.
///
/// # Examples
///
/// ```no_run
/// use hanlift::builder::Lift;
///
/// let report = Lift::new("./app")
///     .output("./app/locales/ko.json")
///     .sorted(true)
///     .run()
///     .unwrap();
///
/// println!("{} strings extracted", report.replacement_count());
/// ```
pub struct Lift {
    root: PathBuf,
    output: PathBuf,
    walk_options: WalkOptions,
    dry_run: bool,
}

impl Lift {
    /// Create a new builder for the given root path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            walk_options: WalkOptions::default(),
            dry_run: false,
        }
    }

    /// Where to write the resource file.
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    /// Replace the set of directory names that are never entered.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.walk_options = self.walk_options.excluded_dirs(names);
        self
    }

    /// Target file extension (with or without the leading dot).
    pub fn extension(mut self, ext: &str) -> Self {
        self.walk_options = self.walk_options.extension(ext);
        self
    }

    /// Visit directory entries in name order.
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.walk_options.sorted = sorted;
        self
    }

    /// Compute everything but leave source files and the output path untouched.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the pipeline. Stops at the first error; files already rewritten stay rewritten.
    pub fn run(self) -> Result<LiftReport, LiftError> {
        if !self.root.exists() {
            return Err(LiftError::PathNotFound(self.root));
        }

        let grammar = Grammar::from_extension(&self.walk_options.extension);
        let mut resource = ResourceTree::new();
        let mut files = Vec::new();
        let mut files_scanned = 0;

        for path in walk_sources(&self.root, &self.walk_options) {
            let path = path?;
            files_scanned += 1;
            tracing::debug!(path = %path.display(), "scanning");

            if let Some(file) = self.process_file(&path, grammar, &mut resource)? {
                files.push(file);
            }
        }

        let output = if self.dry_run {
            None
        } else {
            write_resource(&resource, &self.output)?;
            Some(self.output)
        };

        Ok(LiftReport {
            files_scanned,
            files,
            resource,
            output,
        })
    }

    fn process_file(
        &self,
        path: &Path,
        grammar: Grammar,
        resource: &mut ResourceTree,
    ) -> Result<Option<FileReport>, LiftError> {
        let content = std::fs::read_to_string(path).map_err(|source| LiftError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let key = FileKey::from_path(&self.root, path, &self.walk_options.extension);
        let Some(lifted) = lift_source(path, &content, &key, grammar, resource)? else {
            return Ok(None);
        };

        if !self.dry_run {
            std::fs::write(path, &lifted.content).map_err(|source| LiftError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!(
                path = %path.display(),
                replacements = lifted.replacements.len(),
                "rewrote file"
            );
        }

        Ok(Some(FileReport {
            path: path.to_path_buf(),
            replacements: lifted.replacements,
        }))
    }
}

/// A rewritten buffer and the replacements that produced it.
#[derive(Debug, Clone)]
pub struct LiftedSource {
    pub content: String,
    pub replacements: Vec<Replacement>,
}

/// Extract, record, and rewrite one file's content without touching the filesystem.
///
/// Returns `None` when the content holds no target-script text. `path` is
/// only used for error context.
pub fn lift_source(
    path: &Path,
    content: &str,
    key: &FileKey,
    grammar: Grammar,
    resource: &mut ResourceTree,
) -> Result<Option<LiftedSource>, LiftError> {
    let groups = extract_spans(content, grammar).map_err(|source| LiftError::Extract {
        path: path.to_path_buf(),
        source,
    })?;
    if groups.is_empty() {
        return Ok(None);
    }

    let replacements = accumulate(resource, key, &groups);
    let content = rewrite(content, &replacements).map_err(|source| LiftError::Rewrite {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(LiftedSource {
        content,
        replacements,
    }))
}

/// Replacements applied to one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub replacements: Vec<Replacement>,
}

/// Result of a lift run.
#[derive(Debug, Serialize)]
pub struct LiftReport {
    /// Files matching the target extension.
    pub files_scanned: usize,
    /// Files that contained target-script text.
    pub files: Vec<FileReport>,
    /// Everything extracted during the run.
    #[serde(skip)]
    pub resource: ResourceTree,
    /// Where the resource file was written; `None` on a dry run.
    pub output: Option<PathBuf>,
}

impl LiftReport {
    /// Total replacements across all files.
    pub fn replacement_count(&self) -> usize {
        self.files.iter().map(|f| f.replacements.len()).sum()
    }
}
