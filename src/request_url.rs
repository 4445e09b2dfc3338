//! Pure functions for composing and checking request URLs.

use url::Url;

use crate::placeholder;
use crate::types::KeyValuePair;

/// Append query parameters to `url`, keeping any query string it already has.
///
/// Rows with an empty key are skipped. Keys and values are URL-encoded.
///
/// # Examples
/// ```ignore
/// let params = vec![KeyValuePair::new("page", "2")];
/// assert_eq!(compose_url("https://example.com/items?sort=asc", &params),
///            "https://example.com/items?sort=asc&page=2");
/// ```
pub fn compose_url(url: &str, params: &[KeyValuePair]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter(|p| !p.key.trim().is_empty())
        .map(|p| {
            format!(
                "{}={}",
                urlencoding::encode(p.key.trim()),
                urlencoding::encode(&p.value)
            )
        })
        .collect();

    if query.is_empty() {
        return url.to_string();
    }

    let separator = match url.find('?') {
        Some(pos) if pos + 1 == url.len() || url.ends_with('&') => "",
        Some(_) => "&",
        None => "?",
    };
    format!("{}{}{}", url, separator, query.join("&"))
}

/// Check a URL typed into the request form.
///
/// Empty input and URLs that still contain placeholders are accepted as-is, since
/// they only become real URLs once their tokens are filled in.
pub fn validate_url(url: &str) -> Result<(), String> {
    let url = url.trim();
    if url.is_empty() || placeholder::has_tokens(url) {
        return Ok(());
    }

    let parsed = Url::parse(url).map_err(|e| format!("Invalid URL: {}", e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("Unsupported scheme \"{}\" (use http or https)", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ compose_url tests ============

    #[test]
    fn test_compose_without_params() {
        assert_eq!(
            compose_url("https://example.com/api", &[]),
            "https://example.com/api"
        );
    }

    #[test]
    fn test_compose_appends_query() {
        let params = vec![
            KeyValuePair::new("foo", "bar"),
            KeyValuePair::new("", "ignored"),
            KeyValuePair::new("baz", "a b&c"),
        ];
        assert_eq!(
            compose_url("https://example.com/api", &params),
            "https://example.com/api?foo=bar&baz=a%20b%26c"
        );
    }

    #[test]
    fn test_compose_extends_existing_query() {
        let params = vec![KeyValuePair::new("page", "2")];
        assert_eq!(
            compose_url("https://example.com/items?sort=asc", &params),
            "https://example.com/items?sort=asc&page=2"
        );
        assert_eq!(
            compose_url("https://example.com/items?", &params),
            "https://example.com/items?page=2"
        );
    }

    #[test]
    fn test_compose_encodes_placeholders() {
        let params = vec![KeyValuePair::new("token", "{{token}}")];
        assert_eq!(
            compose_url("https://example.com", &params),
            "https://example.com?token=%7B%7Btoken%7D%7D"
        );
    }

    // ============ validate_url tests ============

    #[test]
    fn test_validate_accepts_http() {
        assert!(validate_url("https://example.com/path").is_ok());
        assert!(validate_url("http://localhost:3030").is_ok());
        assert!(validate_url("").is_ok());
    }

    #[test]
    fn test_validate_skips_placeholder_urls() {
        assert!(validate_url("{{base_url}}/users").is_ok());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        assert!(validate_url("not a url").is_err());
        let err = validate_url("ftp://example.com").unwrap_err();
        assert!(err.contains("ftp"));
    }
}
