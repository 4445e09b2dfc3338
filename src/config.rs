use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::HttpMethod;

const ASSISTANT_URL_ENV: &str = "STENCIL_ASSISTANT_URL";
const STATUS_FEED_URL_ENV: &str = "STENCIL_STATUS_FEED_URL";

/// Application configuration, read from `<config_dir>/stencil/config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Endpoint that turns a chat prompt into a request schema
    pub assistant_url: String,
    /// Websocket that streams server status lines into the chat
    pub status_feed_url: Option<String>,
    /// Method preselected in a fresh request form
    pub default_method: HttpMethod,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assistant_url: "http://localhost:3030/api/v1/http/schema".to_string(),
            status_feed_url: Some("ws://localhost:3030/ws".to_string()),
            default_method: HttpMethod::POST,
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stencil")
            .join("config.json")
    }

    /// Load from the default location, falling back to defaults, then apply env overrides.
    pub fn load() -> Self {
        let path = Self::path();
        let mut config = if path.exists() {
            Self::load_from(&path).unwrap_or_else(|e| {
                log::warn!("Ignoring config at {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        };

        config.apply_overrides(
            std::env::var(ASSISTANT_URL_ENV).ok(),
            std::env::var(STATUS_FEED_URL_ENV).ok(),
        );
        config
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("parsing config JSON")
    }

    /// An empty feed override turns the status feed off.
    fn apply_overrides(&mut self, assistant_url: Option<String>, status_feed_url: Option<String>) {
        if let Some(url) = assistant_url.filter(|u| !u.trim().is_empty()) {
            self.assistant_url = url;
        }
        if let Some(url) = status_feed_url {
            self.status_feed_url = if url.trim().is_empty() { None } else { Some(url) };
        }
    }
}
