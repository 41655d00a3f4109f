//! Key path derivation.
//!
//! A key path addresses one extracted string: the file's directory segments
//! relative to the scan root, the file stem, then `line_<L>_<I>` with a
//! 1-based line and 1-based occurrence within that line.

use std::path::{Component, Path};

use compact_str::{format_compact, CompactString};
use smallvec::SmallVec;

/// Leaf key for a 0-indexed line and 0-indexed occurrence.
pub fn leaf_key(line: usize, index: usize) -> CompactString {
    format_compact!("line_{}_{}", line + 1, index + 1)
}

/// Build `seg1.seg2.file.line_<line+1>_<index+1>`.
pub fn build_key_path<S: AsRef<str>>(
    dirs: &[S],
    file_name: &str,
    line: usize,
    index: usize,
) -> String {
    let mut key = String::new();
    for dir in dirs {
        key.push_str(dir.as_ref());
        key.push('.');
    }
    key.push_str(file_name);
    key.push('.');
    key.push_str(&leaf_key(line, index));
    key
}

/// The resource location of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKey {
    /// Directory names between the scan root and the file.
    pub dirs: SmallVec<[CompactString; 4]>,
    /// File name with the target extension removed.
    pub file_name: CompactString,
}

impl FileKey {
    pub fn new<I, S>(dirs: I, file_name: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            dirs: dirs.into_iter().map(|d| CompactString::from(d.as_ref())).collect(),
            file_name: CompactString::from(file_name),
        }
    }

    /// Derive the key for `path`, which must live under `root`.
    ///
    /// `extension` is given without its dot. Paths outside `root` use their
    /// full directory chain.
    pub fn from_path(root: &Path, path: &Path, extension: &str) -> Self {
        let relative = path.strip_prefix(root).unwrap_or(path);

        let dirs = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(name) => Some(CompactString::from(name.to_string_lossy())),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = format!(".{extension}");
        let file_name = name.strip_suffix(suffix.as_str()).unwrap_or(&name);

        let key = Self {
            dirs,
            file_name: CompactString::from(file_name),
        };
        if !key.is_quote_safe() {
            tracing::warn!(
                path = %path.display(),
                "path contains quote or backslash characters; generated keys are not escaped"
            );
        }
        key
    }

    /// Key path for a 0-indexed line and occurrence.
    pub fn key_path(&self, line: usize, index: usize) -> String {
        build_key_path(self.dirs.as_slice(), &self.file_name, line, index)
    }

    /// Segments addressing the file's table in the resource tree.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.dirs
            .iter()
            .map(|d| d.as_str())
            .chain(std::iter::once(self.file_name.as_str()))
    }

    fn is_quote_safe(&self) -> bool {
        self.segments()
            .all(|s| !s.contains(['"', '\'', '\\', '`']))
    }
}
