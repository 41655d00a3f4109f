//! Candidate text extraction using tree-sitter.
//!
//! Parses a TSX/TypeScript buffer and collects markup text, plain string
//! literals, substitution-free template literals, and literal attribute
//! values that contain target-script text.
//!
//! String and template literal text is stored with escapes resolved; markup
//! text and attribute values are stored as written.

mod escape;
mod spans;

pub use escape::unescape;
pub use spans::{LineGroups, LineIndex, TextSpan};

use std::borrow::Cow;
use std::cell::RefCell;

use thiserror::Error;
use tree_sitter::{Node, Parser};

use crate::script::contains_target_script;

// Thread-local parser caching to avoid re-initialization overhead.
// Initialization can fail (grammar ABI mismatch), so it is surfaced as an error.
thread_local! {
    static TS_PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
    static TSX_PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

fn init_ts_parser() -> Result<Parser, ()> {
    let mut p = Parser::new();
    p.set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
        .map_err(|_| ())?;
    Ok(p)
}

fn init_tsx_parser() -> Result<Parser, ()> {
    let mut p = Parser::new();
    p.set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
        .map_err(|_| ())?;
    Ok(p)
}

fn with_cached_parser<F, R>(
    cell: &'static std::thread::LocalKey<RefCell<Option<Parser>>>,
    init: fn() -> Result<Parser, ()>,
    grammar: Grammar,
    f: F,
) -> Result<R, ExtractError>
where
    F: FnOnce(&mut Parser) -> R,
{
    cell.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(init().map_err(|()| ExtractError::ParserInit { grammar })?);
        }

        let parser = slot
            .as_mut()
            .ok_or(ExtractError::ParserInit { grammar })?;
        Ok(f(parser))
    })
}

/// Grammar used to parse a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// TypeScript with JSX. Also handles `.jsx` and `.js`.
    Tsx,
    /// Plain TypeScript, where `<T>expr` is a cast rather than markup.
    TypeScript,
}

impl Grammar {
    /// Pick a grammar from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "ts" | "mts" | "cts" => Grammar::TypeScript,
            _ => Grammar::Tsx,
        }
    }
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grammar::Tsx => write!(f, "TSX"),
            Grammar::TypeScript => write!(f, "TypeScript"),
        }
    }
}

/// Errors during text extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to initialize {grammar} parser")]
    ParserInit { grammar: Grammar },

    #[error("{grammar} parser produced no tree")]
    NoTree { grammar: Grammar },
}

/// The node kinds the extractor cares about.
#[derive(Debug, Clone, Copy)]
enum Candidate<'tree> {
    /// Text between markup tags, including any entity references inside it.
    MarkupText { start: usize, end: usize },
    /// `'...'` or `"..."`.
    StringLiteral(Node<'tree>),
    /// `` `...` `` without `${}` substitutions.
    TemplateLiteral(Node<'tree>),
    /// The value node of `name="..."` on a markup element.
    Attribute(Node<'tree>),
}

impl<'tree> Candidate<'tree> {
    fn classify(node: Node<'tree>) -> Option<Self> {
        match node.kind() {
            "jsx_text" | "html_character_reference" => markup_run(node),
            // `name="..."` values are raw text, never escape-processed.
            "string" if node.parent().is_some_and(|p| p.kind() == "jsx_attribute") => {
                Some(Candidate::Attribute(node))
            }
            "string" => Some(Candidate::StringLiteral(node)),
            "template_string" if !has_substitution(node) => Some(Candidate::TemplateLiteral(node)),
            _ => None,
        }
    }

    /// Resolve the candidate to a span, if it holds non-empty target-script text.
    fn span(self, content: &str, lines: &LineIndex) -> Option<TextSpan> {
        let (start, end, text, line) = match self {
            Candidate::MarkupText { start, end } => {
                let raw = &content[start..end];
                // Keyed by where the text begins, not where the whitespace before it does.
                let leading = raw.len() - raw.trim_start().len();
                (start, end, Cow::Borrowed(raw), lines.line_of(start + leading))
            }
            Candidate::StringLiteral(node) | Candidate::TemplateLiteral(node) => {
                let (start, end) = inner_range(node, content)?;
                (start, end, unescape(&content[start..end]), lines.line_of(start))
            }
            Candidate::Attribute(node) => {
                let (start, end) = inner_range(node, content)?;
                (start, end, Cow::Borrowed(&content[start..end]), lines.line_of(start))
            }
        };

        let text = text.trim();
        if text.is_empty() || !contains_target_script(text) {
            return None;
        }
        Some(TextSpan::new(text, start, end, line))
    }
}

fn is_markup_piece(node: Node) -> bool {
    matches!(node.kind(), "jsx_text" | "html_character_reference")
}

/// Merge a maximal run of sibling text and entity nodes into one candidate.
///
/// Only the first node of a run yields a candidate; runs without any
/// `jsx_text` (entities inside attribute strings) are ignored.
fn markup_run<'tree>(first: Node<'tree>) -> Option<Candidate<'tree>> {
    if first.prev_sibling().is_some_and(is_markup_piece) {
        return None;
    }

    let mut has_text = first.kind() == "jsx_text";
    let mut last = first;
    while let Some(next) = last.next_sibling().filter(|n| is_markup_piece(*n)) {
        has_text |= next.kind() == "jsx_text";
        last = next;
    }

    has_text.then_some(Candidate::MarkupText {
        start: first.start_byte(),
        end: last.end_byte(),
    })
}

fn has_substitution(node: Node) -> bool {
    node.children(&mut node.walk())
        .any(|c| c.kind() == "template_substitution")
}

/// Byte range of a quoted literal with its delimiters removed.
///
/// Unterminated literals recovered from broken input are skipped.
fn inner_range(node: Node, content: &str) -> Option<(usize, usize)> {
    let (start, end) = (node.start_byte(), node.end_byte());
    if end < start + 2 {
        return None;
    }
    let bytes = content.as_bytes();
    let is_quote = |b: u8| matches!(b, b'"' | b'\'' | b'`');
    if !is_quote(bytes[start]) || bytes[end - 1] != bytes[start] {
        return None;
    }
    Some((start + 1, end - 1))
}

/// Visit every node of the tree in pre-order.
fn visit_preorder<'tree>(root: Node<'tree>, mut visit: impl FnMut(Node<'tree>)) {
    let mut cursor = root.walk();
    loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Collect target-script spans from one file's content, grouped by line.
///
/// Malformed input still yields whatever the parser recovered.
pub fn extract_spans(content: &str, grammar: Grammar) -> Result<LineGroups, ExtractError> {
    let extract_fn = |parser: &mut Parser| -> Result<LineGroups, ExtractError> {
        let tree = parser
            .parse(content, None)
            .ok_or(ExtractError::NoTree { grammar })?;

        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!(%grammar, "source has syntax errors; extracting from recovered tree");
        }

        let lines = LineIndex::new(content);
        let mut groups = LineGroups::new();

        visit_preorder(root, |node| {
            if let Some(span) = Candidate::classify(node).and_then(|c| c.span(content, &lines)) {
                groups.push(span);
            }
        });

        Ok(groups)
    };

    match grammar {
        Grammar::Tsx => with_cached_parser(&TSX_PARSER, init_tsx_parser, grammar, extract_fn)?,
        Grammar::TypeScript => with_cached_parser(&TS_PARSER, init_ts_parser, grammar, extract_fn)?,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(groups: &LineGroups) -> Vec<(usize, String)> {
        groups
            .iter()
            .flat_map(|(line, spans)| spans.iter().map(move |s| (line, s.text.clone())))
            .collect()
    }

    #[test]
    fn test_markup_text_extracted() {
        let src = "export const A = () => <div>안녕하세요</div>;\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        assert_eq!(texts(&groups), vec![(0, "안녕하세요".to_string())]);
        let span = &groups.line(0)[0];
        assert_eq!(&src[span.start..span.end], "안녕하세요");
    }

    #[test]
    fn test_markup_text_keyed_by_first_character_line() {
        let src = "const A = () => (\n  <p>\n    반갑습니다\n  </p>\n);\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        let spans = groups.line(2);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "반갑습니다");
        assert!(src[spans[0].start..spans[0].end].contains("반갑습니다"));
    }

    #[test]
    fn test_string_literal_inner_span() {
        let src = "const msg = \"텍스트\";\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        let span = &groups.line(0)[0];
        let quote = src.find('"').unwrap();
        let close = src.rfind('"').unwrap();
        assert_eq!(span.start, quote + 1);
        assert_eq!(span.end, close);
        assert_eq!(span.text, "텍스트");
    }

    #[test]
    fn test_string_literal_text_is_trimmed() {
        let src = "const msg = '  공백  ';\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        let span = &groups.line(0)[0];
        assert_eq!(span.text, "공백");
        assert_eq!(&src[span.start..span.end], "  공백  ");
    }

    #[test]
    fn test_template_literal_without_substitution() {
        let src = "const a = `확인`;\nconst b = `${name}님 환영합니다`;\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        assert_eq!(texts(&groups), vec![(0, "확인".to_string())]);
    }

    #[test]
    fn test_attribute_value_collapses_with_string_literal() {
        let src = "const A = () => <img alt=\"경고\" />;\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups.line(0)[0].text, "경고");
    }

    #[test]
    fn test_expression_attribute_ignored_as_attribute() {
        let src = "const A = () => <img alt={label} />;\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_markup_and_attribute_on_same_line_in_traversal_order() {
        let src = "const A = () => <button title=\"저장\">저장하기</button>;\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        let order: Vec<_> = groups.line(0).iter().map(|s| s.text.as_str()).collect();
        assert_eq!(order, vec!["저장", "저장하기"]);
    }

    #[test]
    fn test_markup_text_with_entity_is_one_span() {
        let src = "const A = () => <p>저장 &amp; 취소</p>;\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        assert_eq!(groups.len(), 1);
        let span = &groups.line(0)[0];
        assert_eq!(span.text, "저장 &amp; 취소");
        assert_eq!(&src[span.start..span.end], "저장 &amp; 취소");
    }

    #[test]
    fn test_markup_text_starting_with_entity() {
        let src = "const A = () => <p>&lt;주의&gt;</p>;\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        assert_eq!(texts(&groups), vec![(0, "&lt;주의&gt;".to_string())]);
    }

    #[test]
    fn test_string_literal_escapes_resolved() {
        let src = "const a = \"그는 \\\"안녕\\\" 했다\";\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        let span = &groups.line(0)[0];
        assert_eq!(span.text, "그는 \"안녕\" 했다");
        assert_eq!(&src[span.start..span.end], "그는 \\\"안녕\\\" 했다");
    }

    #[test]
    fn test_unicode_escaped_literal_detected() {
        let src = "const a = '\\uD55C\\uAE00';\nconst b = `\\u{D655}\\u{C778}`;\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        assert_eq!(
            texts(&groups),
            vec![(0, "한글".to_string()), (1, "확인".to_string())]
        );
    }

    #[test]
    fn test_attribute_value_kept_raw() {
        let src = "const A = () => <img alt=\"경고\\n\" />;\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups.line(0)[0].text, "경고\\n");
    }

    #[test]
    fn test_multiline_template_keyed_by_opening_quote_line() {
        let src = "const a = `\n  안내 문구`;\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();

        assert_eq!(texts(&groups), vec![(0, "안내 문구".to_string())]);
    }

    #[test]
    fn test_non_target_text_ignored() {
        let src = "import React from 'react';\nconst A = () => <div>Hello</div>;\n";
        let groups = extract_spans(src, Grammar::Tsx).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_typescript_grammar() {
        let src = "export const TITLE: string = '제목';\nconst n = <number>value;\n";
        let groups = extract_spans(src, Grammar::TypeScript).unwrap();
        assert_eq!(texts(&groups), vec![(0, "제목".to_string())]);
    }

    #[test]
    fn test_malformed_input_is_best_effort() {
        let src = "const A = () => <div>깨진 마크업\n";
        assert!(extract_spans(src, Grammar::Tsx).is_ok());
    }

    #[test]
    fn test_unterminated_string_skipped() {
        let src = "const a = '미완성\n";
        assert!(extract_spans(src, Grammar::Tsx).is_ok());
    }

    #[test]
    fn test_grammar_from_extension() {
        assert_eq!(Grammar::from_extension("tsx"), Grammar::Tsx);
        assert_eq!(Grammar::from_extension("jsx"), Grammar::Tsx);
        assert_eq!(Grammar::from_extension("ts"), Grammar::TypeScript);
    }
}
