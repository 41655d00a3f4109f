//! Splicing replacement tokens into a source buffer.
//!
//! Replacements carry offsets into the original buffer. They are applied
//! from the highest start offset down, so every offset still to be applied
//! points at text that has not moved yet.

use thiserror::Error;

use crate::resource::Replacement;

/// Errors while rewriting a buffer.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("span {start}..{end} is outside a buffer of {len} bytes")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("span {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },

    #[error("span for {first} ({first_start}..{first_end}) overlaps span for {second} ({second_start}..{second_end})")]
    Overlap {
        first: String,
        first_start: usize,
        first_end: usize,
        second: String,
        second_start: usize,
        second_end: usize,
    },
}

/// The call expression that replaces extracted text.
pub fn replacement_token(key_path: &str) -> String {
    format!("{{t(\"{key_path}\")}}")
}

/// Produce a new buffer with every replacement's span substituted by its token.
///
/// The input is not modified. Fails without partial output if any span is
/// out of bounds, splits a character, or overlaps another span.
pub fn rewrite(content: &str, replacements: &[Replacement]) -> Result<String, RewriteError> {
    let mut sorted: Vec<&Replacement> = replacements.iter().collect();
    sorted.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    for r in &sorted {
        check_bounds(content, r)?;
    }
    for pair in sorted.windows(2) {
        let (later, earlier) = (pair[0], pair[1]);
        if earlier.end > later.start || earlier.start == later.start {
            return Err(RewriteError::Overlap {
                first: earlier.key_path.clone(),
                first_start: earlier.start,
                first_end: earlier.end,
                second: later.key_path.clone(),
                second_start: later.start,
                second_end: later.end,
            });
        }
    }

    let mut out = content.to_string();
    for r in sorted {
        tracing::debug!(
            key = %r.key_path,
            start = r.start,
            end = r.end,
            text = &content[r.start..r.end],
            "replacing span"
        );
        out.replace_range(r.start..r.end, &replacement_token(&r.key_path));
    }

    Ok(out)
}

fn check_bounds(content: &str, r: &Replacement) -> Result<(), RewriteError> {
    if r.start > r.end || r.end > content.len() {
        return Err(RewriteError::OutOfBounds {
            start: r.start,
            end: r.end,
            len: content.len(),
        });
    }
    if !content.is_char_boundary(r.start) || !content.is_char_boundary(r.end) {
        return Err(RewriteError::NotCharBoundary {
            start: r.start,
            end: r.end,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replacement(key: &str, content: &str, needle: &str) -> Replacement {
        let start = content.find(needle).unwrap();
        Replacement {
            key_path: key.to_string(),
            start,
            end: start + needle.len(),
            original: needle.to_string(),
        }
    }

    /// Reference result: substitute all spans in one left-to-right pass.
    fn simultaneous(content: &str, replacements: &[Replacement]) -> String {
        let mut sorted: Vec<_> = replacements.iter().collect();
        sorted.sort_by_key(|r| r.start);
        let mut out = String::new();
        let mut cursor = 0;
        for r in sorted {
            out.push_str(&content[cursor..r.start]);
            out.push_str(&replacement_token(&r.key_path));
            cursor = r.end;
        }
        out.push_str(&content[cursor..]);
        out
    }

    #[test]
    fn test_token_format() {
        assert_eq!(
            replacement_token("components.Banner.line_5_1"),
            "{t(\"components.Banner.line_5_1\")}"
        );
    }

    #[test]
    fn test_single_replacement() {
        let content = "<div>안녕하세요</div>";
        let r = replacement("components.Banner.line_5_1", content, "안녕하세요");

        let out = rewrite(content, &[r]).unwrap();
        assert_eq!(out, "<div>{t(\"components.Banner.line_5_1\")}</div>");
    }

    #[test]
    fn test_order_of_input_does_not_matter() {
        let content = "<a title=\"하나\">둘</a><b>셋</b>";
        let reps = vec![
            replacement("k.line_1_1", content, "하나"),
            replacement("k.line_1_2", content, "둘"),
            replacement("k.line_1_3", content, "셋"),
        ];

        let expected = simultaneous(content, &reps);
        let mut reversed = reps.clone();
        reversed.reverse();

        assert_eq!(rewrite(content, &reps).unwrap(), expected);
        assert_eq!(rewrite(content, &reversed).unwrap(), expected);
    }

    #[test]
    fn test_many_replacements_match_simultaneous_substitution() {
        let words = ["가", "나다", "라마바", "사", "아자차카"];
        let mut content = String::new();
        let mut reps = Vec::new();
        for (i, word) in words.iter().enumerate() {
            content.push_str("<p>");
            let start = content.len();
            content.push_str(word);
            reps.push(Replacement {
                key_path: format!("page.line_{}_1", i + 1),
                start,
                end: content.len(),
                original: word.to_string(),
            });
            content.push_str("</p>\n");
        }

        for n in 1..=reps.len() {
            let subset = &reps[..n];
            assert_eq!(rewrite(&content, subset).unwrap(), simultaneous(&content, subset));
        }
    }

    #[test]
    fn test_no_replacements_is_identity() {
        let content = "const a = 1;\n";
        assert_eq!(rewrite(content, &[]).unwrap(), content);
    }

    #[test]
    fn test_overlap_rejected() {
        let content = "<p>안녕하세요 여러분</p>";
        let outer = replacement("k.line_1_1", content, "안녕하세요 여러분");
        let inner = replacement("k.line_1_2", content, "여러분");

        let err = rewrite(content, &[outer, inner]).unwrap_err();
        assert!(matches!(err, RewriteError::Overlap { .. }));
    }

    #[test]
    fn test_adjacent_spans_allowed() {
        let content = "가나";
        let reps = vec![
            replacement("k.a", content, "가"),
            replacement("k.b", content, "나"),
        ];
        assert_eq!(rewrite(content, &reps).unwrap(), "{t(\"k.a\")}{t(\"k.b\")}");
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let r = Replacement {
            key_path: "k".into(),
            start: 2,
            end: 50,
            original: String::new(),
        };
        assert!(matches!(
            rewrite("abc", &[r]),
            Err(RewriteError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_split_character_rejected() {
        let r = Replacement {
            key_path: "k".into(),
            start: 1,
            end: 3,
            original: String::new(),
        };
        assert!(matches!(
            rewrite("가", &[r]),
            Err(RewriteError::NotCharBoundary { .. })
        ));
    }
}
