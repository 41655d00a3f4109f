//! Resource accumulation.
//!
//! Every extracted string is stored in a nested table that mirrors the
//! directory layout, and a [`Replacement`] is produced for the rewriter.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::extract::LineGroups;
use crate::keys::{leaf_key, FileKey};

/// One span to replace in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    /// Dotted key path embedded in the replacement token.
    pub key_path: String,
    /// Start byte offset in the original buffer.
    pub start: usize,
    /// End byte offset in the original buffer (exclusive).
    pub end: usize,
    /// The extracted text.
    pub original: String,
}

/// Nested key → (table | text) mapping built across a whole run.
///
/// Keys keep insertion order, so the serialized file follows traversal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResourceTree {
    root: Map<String, Value>,
}

impl ResourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` at `segments` followed by `leaf`, creating tables on demand.
    ///
    /// An existing leaf at the same address is overwritten. A text leaf
    /// standing where a table is needed is replaced by that table.
    pub fn insert<'a, I>(&mut self, segments: I, leaf: &str, text: &str)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut table = &mut self.root;
        for segment in segments {
            let slot = table
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                tracing::warn!(segment, "replacing text leaf with a nested table");
                *slot = Value::Object(Map::new());
            }
            let Value::Object(map) = slot else {
                return;
            };
            table = map;
        }

        if let Some(previous) = table.insert(leaf.to_string(), Value::String(text.to_string())) {
            tracing::warn!(leaf, ?previous, "resource key collision; overwriting");
        }
    }

    /// Look up the text stored under a dotted key path.
    pub fn get(&self, key_path: &str) -> Option<&str> {
        let mut segments = key_path.split('.').peekable();
        let mut table = &self.root;
        while let Some(segment) = segments.next() {
            let value = table.get(segment)?;
            if segments.peek().is_none() {
                return value.as_str();
            }
            table = value.as_object()?;
        }
        None
    }

    /// Number of text leaves.
    pub fn leaf_count(&self) -> usize {
        fn count(map: &Map<String, Value>) -> usize {
            map.values()
                .map(|v| match v {
                    Value::Object(inner) => count(inner),
                    _ => 1,
                })
                .sum()
        }
        count(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.root)
    }
}

/// Record every span of one file in `tree` and return the file's replacements.
///
/// Spans are visited line by line, then in occurrence order within a line.
pub fn accumulate(tree: &mut ResourceTree, file: &FileKey, groups: &LineGroups) -> Vec<Replacement> {
    let mut replacements = Vec::with_capacity(groups.len());

    for (line, spans) in groups.iter() {
        for (index, span) in spans.iter().enumerate() {
            let leaf = leaf_key(line, index);
            tree.insert(file.segments(), &leaf, &span.text);

            replacements.push(Replacement {
                key_path: file.key_path(line, index),
                start: span.start,
                end: span.end,
                original: span.text.clone(),
            });
        }
    }

    replacements
}
