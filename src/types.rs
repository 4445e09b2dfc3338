use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP methods supported by the request form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            HttpMethod::GET,
            HttpMethod::POST,
            HttpMethod::PUT,
            HttpMethod::DELETE,
            HttpMethod::PATCH,
            HttpMethod::HEAD,
            HttpMethod::OPTIONS,
        ]
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    /// Position in the method selector
    pub fn index(&self) -> usize {
        Self::all().iter().position(|m| m == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Self {
        Self::all().get(index).copied().unwrap_or(HttpMethod::GET)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A header or query parameter row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty() && self.value.trim().is_empty()
    }
}

/// Request data structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestData {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<KeyValuePair>,
    pub query_params: Vec<KeyValuePair>,
    pub body: String,
}

impl RequestData {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            url: String::new(),
            headers: vec![],
            query_params: vec![],
            body: String::new(),
        }
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|h| h.key.trim().eq_ignore_ascii_case(name))
    }

    /// Placeholders still present anywhere in the request
    pub fn unresolved_tokens(&self) -> Vec<String> {
        let mut fields: Vec<&str> = vec![self.url.as_str(), self.body.as_str()];
        for pair in self.headers.iter().chain(self.query_params.iter()) {
            fields.push(pair.key.as_str());
            fields.push(pair.value.as_str());
        }

        let mut names: Vec<String> = Vec::new();
        for name in fields
            .into_iter()
            .flat_map(crate::placeholder::token_names)
        {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Response data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseData {
    pub status: Option<u16>,
    pub duration_ms: u64,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ResponseData {
    pub fn status_text(&self) -> &'static str {
        match self.status {
            Some(200) => "OK",
            Some(201) => "Created",
            Some(204) => "No Content",
            Some(400) => "Bad Request",
            Some(401) => "Unauthorized",
            Some(403) => "Forbidden",
            Some(404) => "Not Found",
            Some(500) => "Internal Server Error",
            Some(502) => "Bad Gateway",
            Some(503) => "Service Unavailable",
            Some(_) => "Unknown",
            None => "Network Error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(status) if (200..300).contains(&status))
    }

    pub fn is_error(&self) -> bool {
        // Network errors count as errors
        self.status.map_or(true, |status| status >= 400)
    }

    pub fn is_network_error(&self) -> bool {
        self.status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_lookup() {
        assert_eq!(HttpMethod::from_str(" post "), Some(HttpMethod::POST));
        assert_eq!(HttpMethod::from_str("fetch"), None);
        assert_eq!(HttpMethod::from_index(HttpMethod::PATCH.index()), HttpMethod::PATCH);
        assert_eq!(HttpMethod::from_index(99), HttpMethod::GET);
    }

    #[test]
    fn test_unresolved_tokens_across_fields() {
        let mut request = RequestData::new(HttpMethod::POST);
        request.url = "https://{{host}}/users/{{id}}".to_string();
        request.headers = vec![KeyValuePair::new("Authorization", "Bearer {{token}}")];
        request.query_params = vec![KeyValuePair::new("page", "{{id}}")];
        request.body = r#"{"name": "{{name}}"}"#.to_string();

        assert_eq!(
            request.unresolved_tokens(),
            vec!["host", "id", "name", "token"]
        );
    }

    #[test]
    fn test_has_header_ignores_case() {
        let mut request = RequestData::new(HttpMethod::GET);
        request.headers = vec![KeyValuePair::new("content-type", "text/plain")];
        assert!(request.has_header("Content-Type"));
        assert!(!request.has_header("Accept"));
    }

    #[test]
    fn test_response_classification() {
        let response = |status| ResponseData {
            status,
            duration_ms: 0,
            headers: vec![],
            body: String::new(),
        };
        assert!(response(Some(204)).is_success());
        assert!(response(Some(404)).is_error());
        assert!(response(None).is_error());
        assert!(response(None).is_network_error());
        assert_eq!(response(Some(418)).status_text(), "Unknown");
    }
}
