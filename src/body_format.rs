//! JSON formatting for request bodies that may contain placeholders.
//!
//! `{{token}}` markers are not valid JSON on their own. Before parsing, each token is
//! swapped for a sentinel: inside a string literal the bare sentinel text, elsewhere a
//! quoted sentinel so it parses as a string value. After pretty-printing the sentinels
//! are swapped back.

use crate::placeholder::{self, TokenMatch};

const SENTINEL_PREFIX: &str = "__stencil_token_";

/// Pretty-print a JSON body with 2-space indentation, keeping placeholders intact.
///
/// # Returns
/// * `Ok(String)` - Formatted body
/// * `Err(String)` - Parse error message
pub fn format_json_body(input: &str) -> Result<String, String> {
    if input.trim().is_empty() {
        return Err("Empty input".to_string());
    }

    let matches = placeholder::scan(input);
    let masked = mask_tokens(input, &matches);

    let value: serde_json::Value =
        serde_json::from_str(&masked).map_err(|e| format!("JSON parse error: {}", e))?;
    let pretty =
        serde_json::to_string_pretty(&value).map_err(|e| format!("JSON format error: {}", e))?;

    Ok(unmask_tokens(&pretty, &matches))
}

/// Whether the body parses as JSON once placeholders are accounted for.
pub fn is_json_body(input: &str) -> bool {
    if input.trim().is_empty() {
        return false;
    }
    let matches = placeholder::scan(input);
    serde_json::from_str::<serde_json::Value>(&mask_tokens(input, &matches)).is_ok()
}

fn sentinel(index: usize) -> String {
    format!("{}{}__", SENTINEL_PREFIX, index)
}

fn mask_tokens(input: &str, matches: &[TokenMatch]) -> String {
    let mut masked = String::with_capacity(input.len());
    let mut cursor = 0;

    for (index, token) in matches.iter().enumerate() {
        masked.push_str(&input[cursor..token.start]);
        // Earlier tokens are already masked, so quotes inside their names do not count.
        if inside_string(&masked) {
            masked.push_str(&sentinel(index));
        } else {
            masked.push('"');
            masked.push_str(&sentinel(index));
            masked.push('"');
        }
        cursor = token.end;
    }
    masked.push_str(&input[cursor..]);
    masked
}

fn unmask_tokens(formatted: &str, matches: &[TokenMatch]) -> String {
    let mut result = formatted.to_string();
    // Highest index first so `_1__` never clobbers part of `_10__`.
    for (index, token) in matches.iter().enumerate().rev() {
        let quoted = format!("\"{}\"", sentinel(index));
        result = result.replace(&quoted, &token.literal);
        result = result.replace(&sentinel(index), &token.literal);
    }
    result
}

/// True when the end of `prefix` sits inside a JSON string literal.
fn inside_string(prefix: &str) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    for c in prefix.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ => {}
        }
    }
    in_string
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ format tests ============

    #[test]
    fn test_format_plain_json() {
        let result = format_json_body(r#"{"key":"value"}"#).unwrap();
        assert_eq!(result, "{\n  \"key\": \"value\"\n}");
    }

    #[test]
    fn test_format_keeps_token_in_value_position() {
        let result = format_json_body(r#"{"id":{{id}},"tags":[{{tag}}]}"#).unwrap();
        assert!(result.contains("\"id\": {{id}}"));
        assert!(result.contains("{{tag}}"));
        assert!(!result.contains(SENTINEL_PREFIX));
    }

    #[test]
    fn test_format_keeps_token_inside_string() {
        let result = format_json_body(r#"{"auth":"Bearer {{token}}"}"#).unwrap();
        assert_eq!(result, "{\n  \"auth\": \"Bearer {{token}}\"\n}");
    }

    #[test]
    fn test_format_with_escaped_quote_before_token() {
        let result = format_json_body(r#"{"q":"say \"hi\" {{name}}"}"#).unwrap();
        assert!(result.contains(r#"say \"hi\" {{name}}"#));
    }

    #[test]
    fn test_format_token_name_with_quote() {
        let result = format_json_body(r#"{"a": {{x"y}}, "b": "pre {{z}}"}"#).unwrap();
        assert_eq!(result, "{\n  \"a\": {{x\"y}},\n  \"b\": \"pre {{z}}\"\n}");
    }

    #[test]
    fn test_format_many_tokens() {
        let body: Vec<String> = (0..12).map(|i| format!("\"k{i}\": {{{{v{i}}}}}")).collect();
        let input = format!("{{{}}}", body.join(","));
        let result = format_json_body(&input).unwrap();
        for i in 0..12 {
            assert!(result.contains(&format!("\"k{i}\": {{{{v{i}}}}}")));
        }
    }

    #[test]
    fn test_format_invalid() {
        let result = format_json_body(r#"{"key": invalid}"#);
        assert!(result.unwrap_err().contains("parse error"));
    }

    #[test]
    fn test_format_empty() {
        assert!(format_json_body("  ").unwrap_err().contains("Empty"));
    }

    // ============ detection tests ============

    #[test]
    fn test_is_json_body() {
        assert!(is_json_body(r#"{"a": {{b}}}"#));
        assert!(is_json_body("[1, 2]"));
        assert!(!is_json_body("hello {{name}}"));
        assert!(!is_json_body(""));
    }
}
