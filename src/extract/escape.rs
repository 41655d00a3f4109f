//! Escape resolution for string and template literal bodies.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

/// Resolve JavaScript escape sequences in a literal body (quotes excluded).
///
/// Unknown escapes yield the escaped character, line continuations are
/// dropped, and malformed or lone-surrogate `\u` escapes become U+FFFD.
pub fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|d| d.is_ascii_digit()) => out.push('\0'),
            'x' => out.push(hex_escape(&mut chars, 2).and_then(char::from_u32).unwrap_or('\u{FFFD}')),
            'u' => out.push(unicode_escape(&mut chars)),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }

    Cow::Owned(out)
}

fn hex_escape(chars: &mut Peekable<Chars<'_>>, digits: usize) -> Option<u32> {
    let mut value = 0;
    for _ in 0..digits {
        let digit = chars.peek()?.to_digit(16)?;
        chars.next();
        value = value * 16 + digit;
    }
    Some(value)
}

fn unicode_escape(chars: &mut Peekable<Chars<'_>>) -> char {
    if chars.peek() == Some(&'{') {
        chars.next();
        let mut value: u32 = 0;
        while let Some(&c) = chars.peek() {
            chars.next();
            if c == '}' {
                return char::from_u32(value).unwrap_or('\u{FFFD}');
            }
            match c.to_digit(16) {
                Some(digit) => value = value.saturating_mul(16).saturating_add(digit),
                None => return '\u{FFFD}',
            }
        }
        return '\u{FFFD}';
    }

    let Some(unit) = hex_escape(chars, 4) else {
        return '\u{FFFD}';
    };
    if !(0xD800..0xDC00).contains(&unit) {
        return char::from_u32(unit).unwrap_or('\u{FFFD}');
    }

    // High surrogate: only valid when a `\uDC00..\uDFFF` escape follows.
    let mut lookahead = chars.clone();
    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
        if let Some(low) = hex_escape(&mut lookahead, 4).filter(|l| (0xDC00..0xE000).contains(l)) {
            *chars = lookahead;
            let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(combined).unwrap_or('\u{FFFD}');
        }
    }
    '\u{FFFD}'
}
