//! Source file discovery.
//!
//! Uses the `ignore` crate's walker with its standard filters turned off:
//! every directory is entered unless its base name is in the exclusion set,
//! and only files ending in the target extension are yielded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;

/// Directory names skipped when no explicit exclusion set is configured.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "lib",
    "apis",
    "styles",
    "utils",
    "public",
    ".next",
];

/// Extension matched when none is configured.
pub const DEFAULT_EXTENSION: &str = "tsx";

/// Errors that can occur during directory walking.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symlink loop detected: {path}")]
    SymlinkLoop { path: PathBuf },

    #[error("walk failed: {message}")]
    Other { message: String },
}

/// Options for directory walking.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Directory base names that are never entered.
    pub excluded_dirs: HashSet<String>,
    /// File suffix to match, without the leading dot.
    pub extension: String,
    /// Sort entries by file name before descending, for reproducible key assignment.
    pub sorted: bool,
    /// Follow symbolic links.
    pub follow_symlinks: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            extension: DEFAULT_EXTENSION.to_string(),
            sorted: false,
            follow_symlinks: true,
        }
    }
}

impl WalkOptions {
    /// Replace the exclusion set.
    pub fn excluded_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_dirs = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the target extension. A leading dot is accepted and dropped.
    pub fn extension(mut self, ext: &str) -> Self {
        self.extension = normalize_extension(ext);
        self
    }

    /// Sort directory entries by name.
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// Whether `name` carries the target extension.
    pub fn matches(&self, name: &str) -> bool {
        name.len() > self.extension.len()
            && name.ends_with(self.extension.as_str())
            && name.as_bytes()[name.len() - self.extension.len() - 1] == b'.'
    }
}

/// Strip a leading dot from a configured extension.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_string()
}

/// Walk `root` depth-first, yielding every matching source file.
///
/// Errors are yielded in place; callers abort on the first one.
///
/// # Examples
///
/// ```no_run
/// use hanlift::walker::{walk_sources, WalkOptions};
/// use std::path::Path;
///
/// for path in walk_sources(Path::new("./app"), &WalkOptions::default()).flatten() {
///     println!("{}", path.display());
/// }
/// ```
pub fn walk_sources(
    root: &Path,
    options: &WalkOptions,
) -> impl Iterator<Item = Result<PathBuf, WalkError>> {
    let root = root.to_path_buf();

    if !root.exists() {
        return itertools_lite::Either::Left(std::iter::once(Err(WalkError::NotFound {
            path: root,
        })));
    }
    if !root.is_dir() {
        return itertools_lite::Either::Left(std::iter::once(Err(WalkError::NotADirectory {
            path: root,
        })));
    }

    let mut builder = WalkBuilder::new(&root);

    builder
        .standard_filters(false)
        .follow_links(options.follow_symlinks);

    if options.sorted {
        builder.sort_by_file_name(|a, b| a.cmp(b));
    }

    let excluded = options.excluded_dirs.clone();
    builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        if !is_dir || entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !excluded.contains(name.as_ref())
    });

    let options = options.clone();
    let walker = builder.build();

    itertools_lite::Either::Right(walker.filter_map(move |result| match result {
        Ok(entry) => {
            let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
            if !is_file {
                return None;
            }
            let name = entry.file_name().to_string_lossy();
            if options.matches(&name) {
                Some(Ok(entry.into_path()))
            } else {
                None
            }
        }
        Err(e) => Some(Err(convert_error(e))),
    }))
}

/// Collect every matching file, stopping at the first error.
pub fn collect_sources(root: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>, WalkError> {
    walk_sources(root, options).collect()
}

fn convert_error(err: ignore::Error) -> WalkError {
    if let ignore::Error::Loop { child, .. } = innermost(&err) {
        return WalkError::SymlinkLoop {
            path: child.clone(),
        };
    }

    let path = error_path(&err).unwrap_or_else(|| PathBuf::from("<walk error>"));
    let message = err.to_string();
    match err.into_io_error() {
        Some(io_err) if io_err.kind() == std::io::ErrorKind::PermissionDenied => {
            WalkError::PermissionDenied { path }
        }
        Some(io_err) => WalkError::Io {
            path,
            source: io_err,
        },
        None => WalkError::Other { message },
    }
}

fn innermost(err: &ignore::Error) -> &ignore::Error {
    match err {
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => innermost(err),
        other => other,
    }
}

fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

/// Simple Either type to avoid adding itertools dependency.
mod itertools_lite {
    pub enum Either<L, R> {
        Left(L),
        Right(R),
    }

    impl<L, R, T> Iterator for Either<L, R>
    where
        L: Iterator<Item = T>,
        R: Iterator<Item = T>,
    {
        type Item = T;

        fn next(&mut self) -> Option<Self::Item> {
            match self {
                Either::Left(l) => l.next(),
                Either::Right(r) => r.next(),
            }
        }
    }
}
