//! Assistant intent-parsing response and its mapping onto the request form.

use serde::{Deserialize, Serialize};

use crate::types::{HttpMethod, KeyValuePair};

/// Response of the assistant's schema endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub schema: Option<ActionSchema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Intent {
    pub vendor: String,
    pub action: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionSchema {
    pub action_type: String,
    pub base_url: String,
    pub action_url: String,
    pub action_headers: Vec<KeyValuePair>,
    pub action_query_params: Vec<KeyValuePair>,
    pub action_body: Option<ActionBody>,
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionBody {
    pub action_body: Option<serde_json::Value>,
    pub action_query_params: Vec<KeyValuePair>,
}

/// Request form contents suggested by the assistant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpConfig {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<KeyValuePair>,
    pub query_params: Vec<KeyValuePair>,
    pub body: String,
}

/// Request body sent to the schema endpoint
#[derive(Debug, Serialize)]
pub struct IntentRequest<'a> {
    pub prompt: &'a str,
}

impl IntentResponse {
    /// Form contents for a successful parse, or `None` when the parse failed.
    pub fn http_config(&self) -> Option<HttpConfig> {
        if !self.success {
            return None;
        }
        let schema = self.schema.as_ref()?;

        let body_value = schema
            .action_body
            .as_ref()
            .and_then(|b| b.action_body.clone())
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

        let mut query_params: Vec<KeyValuePair> = schema
            .action_body
            .as_ref()
            .map(|b| b.action_query_params.clone())
            .unwrap_or_default();
        query_params.extend(schema.action_query_params.iter().cloned());

        Some(HttpConfig {
            method: HttpMethod::from_str(&schema.action_type).unwrap_or(HttpMethod::POST),
            url: format!("{}{}", schema.base_url, schema.action_url),
            headers: schema.action_headers.clone(),
            query_params,
            body: body_value.to_string(),
        })
    }

    pub fn citations(&self) -> Vec<String> {
        self.schema
            .as_ref()
            .map(|s| s.citations.clone())
            .unwrap_or_default()
    }

    /// Text of the assistant's reply in the chat.
    pub fn reply(&self) -> String {
        match (&self.intent, self.http_config()) {
            (Some(intent), Some(_)) => format!(
                "I've parsed your request for \"{}\" with {}. I've populated the HTTP connector with these details.",
                intent.action, intent.vendor
            ),
            _ => UNPARSED_REPLY.to_string(),
        }
    }
}

pub const UNPARSED_REPLY: &str = "I couldn't parse your request. Please try rephrasing it or provide more specific details about the API you want to call.";

pub const FAILED_REPLY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";
