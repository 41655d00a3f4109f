//! Text spans and per-line grouping.

use std::collections::BTreeMap;

use smallvec::SmallVec;

/// A candidate string found in a source buffer.
///
/// Offsets are byte offsets into the original, unmodified buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    /// Trimmed text, as stored in the resource.
    pub text: String,
    /// Start of the region to replace (inclusive).
    pub start: usize,
    /// End of the region to replace (exclusive).
    pub end: usize,
    /// 0-indexed line the text starts on.
    pub line: usize,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, start: usize, end: usize, line: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            line,
        }
    }
}

/// Spans grouped by line, each group in traversal order.
///
/// Position within a group is the span's occurrence index on that line.
/// Spans with the same text and start offset are kept once.
#[derive(Debug, Clone, Default)]
pub struct LineGroups {
    lines: BTreeMap<usize, SmallVec<[TextSpan; 4]>>,
}

impl LineGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a span. Returns false if an identical (text, start) span was already on its line.
    pub fn push(&mut self, span: TextSpan) -> bool {
        let group = self.lines.entry(span.line).or_default();
        if group
            .iter()
            .any(|s| s.start == span.start && s.text == span.text)
        {
            return false;
        }
        group.push(span);
        true
    }

    /// Iterate `(line, spans)` in ascending line order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[TextSpan])> {
        self.lines.iter().map(|(line, spans)| (*line, spans.as_slice()))
    }

    /// Spans recorded on a 0-indexed line.
    pub fn line(&self, line: usize) -> &[TextSpan] {
        self.lines.get(&line).map_or(&[][..], |s| s.as_slice())
    }

    /// Total number of spans.
    pub fn len(&self) -> usize {
        self.lines.values().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Maps byte offsets to 0-indexed line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// Line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_span_collapses() {
        let mut groups = LineGroups::new();
        assert!(groups.push(TextSpan::new("경고", 10, 12, 3)));
        assert!(!groups.push(TextSpan::new("경고", 10, 12, 3)));
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_same_text_different_offset_kept() {
        let mut groups = LineGroups::new();
        groups.push(TextSpan::new("경고", 10, 16, 3));
        groups.push(TextSpan::new("경고", 20, 26, 3));
        assert_eq!(groups.line(3).len(), 2);
    }

    #[test]
    fn test_groups_preserve_insertion_order() {
        let mut groups = LineGroups::new();
        groups.push(TextSpan::new("둘", 30, 33, 1));
        groups.push(TextSpan::new("하나", 5, 11, 1));
        groups.push(TextSpan::new("셋", 50, 53, 0));

        let line_one: Vec<_> = groups.line(1).iter().map(|s| s.text.as_str()).collect();
        assert_eq!(line_one, vec!["둘", "하나"]);

        let lines: Vec<_> = groups.iter().map(|(line, _)| line).collect();
        assert_eq!(lines, vec![0, 1]);
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_of(0), 0);
        assert_eq!(index.line_of(2), 0);
        assert_eq!(index.line_of(3), 1);
        assert_eq!(index.line_of(6), 2);
        assert_eq!(index.line_of(7), 3);
        assert_eq!(index.line_of(100), 3);
    }
}
