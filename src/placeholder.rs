//! Placeholder token scanning and segmentation.
//!
//! A placeholder is a `{{name}}` marker embedded in free text. The functions here
//! are pure: they derive token matches and display segments from a text buffer and
//! never keep anything across edits. Offsets are byte offsets into the scanned text;
//! braces are ASCII so every offset lands on a char boundary.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Two open braces, a non-empty run without `}`, two close braces.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("token pattern is valid"));

/// A single `{{name}}` occurrence found in a text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    /// The text between the braces.
    pub name: String,
    /// The exact `{{name}}` substring.
    pub literal: String,
    pub start: usize,
    pub end: usize,
}

impl TokenMatch {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Find every placeholder in `text`, ordered by start offset.
///
/// Malformed input (unterminated `{{`, empty body `{{}}`, a `}` inside the body)
/// simply produces fewer matches.
pub fn scan(text: &str) -> Vec<TokenMatch> {
    TOKEN_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(TokenMatch {
                name: name.as_str().to_string(),
                literal: whole.as_str().to_string(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Returns true if `text` contains at least one placeholder.
pub fn has_tokens(text: &str) -> bool {
    TOKEN_PATTERN.is_match(text)
}

/// Distinct placeholder names in order of first appearance.
pub fn token_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in scan(text) {
        if !names.contains(&token.name) {
            names.push(token.name);
        }
    }
    names
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Literal,
    /// A chip bound to the match at this index of the list used to build the segments.
    Token { match_index: usize },
}

/// A contiguous piece of the buffer, either plain text or a token chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub range: Range<usize>,
    pub text: &'a str,
}

impl Segment<'_> {
    pub fn is_token(&self) -> bool {
        matches!(self.kind, SegmentKind::Token { .. })
    }
}

/// Split `text` into literal and token segments covering `0..text.len()` with no gaps.
///
/// `matches` must come from [`scan`] on the same text. With no matches the whole text
/// comes back as a single literal segment, even when it is empty.
pub fn render<'a>(text: &'a str, matches: &[TokenMatch]) -> Vec<Segment<'a>> {
    if matches.is_empty() {
        return vec![Segment {
            kind: SegmentKind::Literal,
            range: 0..text.len(),
            text,
        }];
    }

    let mut segments = Vec::with_capacity(matches.len() * 2 + 1);
    let mut cursor = 0;

    for (match_index, token) in matches.iter().enumerate() {
        if token.start > cursor {
            segments.push(Segment {
                kind: SegmentKind::Literal,
                range: cursor..token.start,
                text: &text[cursor..token.start],
            });
        }
        segments.push(Segment {
            kind: SegmentKind::Token { match_index },
            range: token.range(),
            text: &text[token.range()],
        });
        cursor = token.end;
    }

    if cursor < text.len() {
        segments.push(Segment {
            kind: SegmentKind::Literal,
            range: cursor..text.len(),
            text: &text[cursor..],
        });
    }

    segments
}

/// Index of the match whose literal covers the byte at `offset`.
pub fn match_at(matches: &[TokenMatch], offset: usize) -> Option<usize> {
    matches
        .iter()
        .position(|token| token.start <= offset && offset < token.end)
}

/// Replace the bytes covered by `token` with `value`.
pub fn splice(text: &str, token: &TokenMatch, value: &str) -> String {
    let mut result = String::with_capacity(text.len() - token.literal.len() + value.len());
    result.push_str(&text[..token.start]);
    result.push_str(value);
    result.push_str(&text[token.end..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(segments: &[Segment<'_>]) -> String {
        segments.iter().map(|s| s.text).collect()
    }

    // ============ scan tests ============

    #[test]
    fn test_scan_bearer_token() {
        let matches = scan("Bearer {{token}}");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "token");
        assert_eq!(matches[0].literal, "{{token}}");
        assert_eq!(matches[0].start, 7);
        assert_eq!(matches[0].end, 16);
        assert_eq!(matches[0].end - matches[0].start, matches[0].literal.len());
    }

    #[test]
    fn test_scan_no_tokens() {
        assert!(scan("https://example.com/path").is_empty());
        assert!(scan("").is_empty());
    }

    #[test]
    fn test_scan_unterminated_and_empty() {
        assert!(scan("{{unterminated").is_empty());
        assert!(scan("{{}}").is_empty());
        assert!(scan("{{a}").is_empty());
    }

    #[test]
    fn test_scan_brace_inside_body_terminates() {
        assert!(scan("{{a}b}}").is_empty());
        let matches = scan("{{a}b}} {{c}}");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "c");
    }

    #[test]
    fn test_scan_adjacent_tokens() {
        let matches = scan("{{a}}{{b}}");
        assert_eq!(matches.len(), 2);
        assert_eq!((matches[0].start, matches[0].end), (0, 5));
        assert_eq!((matches[1].start, matches[1].end), (5, 10));
    }

    #[test]
    fn test_scan_duplicate_names_are_distinct() {
        let matches = scan("A {{x}} B {{x}} C");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name, matches[1].name);
        assert!(matches[0].start < matches[1].start);
    }

    #[test]
    fn test_scan_empty_body_then_real_token() {
        let matches = scan("{{}}{{id}}");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "id");
        assert_eq!(matches[0].start, 4);
    }

    #[test]
    fn test_scan_multibyte_text() {
        let text = "héllo {{wörld}} ✓";
        let matches = scan(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].range()], "{{wörld}}");
    }

    #[test]
    fn test_token_names_dedup_in_order() {
        assert_eq!(
            token_names("{{b}} {{a}} {{b}}"),
            vec!["b".to_string(), "a".to_string()]
        );
        assert!(has_tokens("x {{y}}"));
        assert!(!has_tokens("x {{}}"));
    }

    // ============ render tests ============

    #[test]
    fn test_render_round_trip() {
        let inputs = [
            "",
            "plain text",
            "Bearer {{token}}",
            "{{a}}{{b}}",
            "{{lead}} middle {{trail}}",
            "A {{x}} B {{x}} C",
            "{{unterminated",
            "line one\n{{name}}\nline three",
        ];
        for input in inputs {
            let matches = scan(input);
            let segments = render(input, &matches);
            assert_eq!(joined(&segments), input, "round trip failed for {input:?}");
        }
    }

    #[test]
    fn test_render_without_matches_is_single_literal() {
        let segments = render("no tokens here", &[]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Literal);
        assert_eq!(segments[0].range, 0..14);

        let empty = render("", &[]);
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].text, "");
    }

    #[test]
    fn test_render_adjacent_tokens_have_no_gap() {
        let text = "{{a}}{{b}}";
        let segments = render(text, &scan(text));
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].kind, SegmentKind::Token { match_index: 0 });
        assert_eq!(segments[1].kind, SegmentKind::Token { match_index: 1 });
        assert_eq!(segments[0].range.end, segments[1].range.start);
    }

    #[test]
    fn test_render_segments_are_contiguous() {
        let text = "x {{a}} y {{b}}";
        let segments = render(text, &scan(text));
        let mut cursor = 0;
        for segment in &segments {
            assert_eq!(segment.range.start, cursor);
            cursor = segment.range.end;
        }
        assert_eq!(cursor, text.len());
        assert!(segments.last().unwrap().is_token());
    }

    // ============ hit tests ============

    #[test]
    fn test_match_at_covers_whole_literal() {
        let matches = scan("a {{x}}{{y}} b");
        assert_eq!(match_at(&matches, 1), None);
        assert_eq!(match_at(&matches, 2), Some(0));
        assert_eq!(match_at(&matches, 6), Some(0));
        assert_eq!(match_at(&matches, 7), Some(1));
        assert_eq!(match_at(&matches, 12), None);
    }

    // ============ splice tests ============

    #[test]
    fn test_splice_replaces_only_given_match() {
        let text = "A {{x}} B {{x}} C";
        let matches = scan(text);
        assert_eq!(splice(text, &matches[1], "y"), "A {{x}} B y C");
        assert_eq!(splice(text, &matches[0], "y"), "A y B {{x}} C");
    }

    #[test]
    fn test_splice_with_same_name_is_identity() {
        let text = "Bearer {{token}}";
        let matches = scan(text);
        assert_eq!(splice(text, &matches[0], "{{token}}"), text);
        assert_eq!(splice(text, &matches[0], "abc123"), "Bearer abc123");
    }
}
