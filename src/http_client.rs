use anyhow::{Context as _, Result};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

use crate::body_format;
use crate::intent::{IntentRequest, IntentResponse};
use crate::request_url;
use crate::types::{HttpMethod, RequestData, ResponseData};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Shared tokio runtime for all network work; GPUI's executor does not drive tokio IO.
pub fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("Failed to initialize tokio runtime")
    })
}

/// HTTP client for the request form and the assistant
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to initialize HTTP client")?;

        Ok(Self { client })
    }

    /// Send a request built in the form and collect the full response
    pub async fn send(&self, request: &RequestData) -> Result<ResponseData> {
        let url = request_url::compose_url(request.url.trim(), &request.query_params);
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())?;

        let mut req = self.client.request(method, url);
        for header in &request.headers {
            let key = header.key.trim();
            if !key.is_empty() {
                req = req.header(key, header.value.as_str());
            }
        }

        let sends_body = !matches!(request.method, HttpMethod::GET | HttpMethod::HEAD);
        if sends_body && !request.body.is_empty() {
            if !request.has_header("Content-Type") && body_format::is_json_body(&request.body) {
                req = req.header("Content-Type", "application/json");
            }
            req = req.body(request.body.clone());
        }

        let start = Instant::now();
        let (status, headers, body) = runtime()
            .spawn(async move {
                let response = req.send().await?;
                let status = response.status().as_u16();
                let headers: Vec<(String, String)> = response
                    .headers()
                    .iter()
                    .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
                    .collect();
                let body = response.text().await?;
                Ok::<_, reqwest::Error>((status, headers, body))
            })
            .await??;

        Ok(ResponseData {
            status: Some(status),
            duration_ms: start.elapsed().as_millis() as u64,
            headers,
            body,
        })
    }

    /// Ask the assistant endpoint to turn a prompt into a request schema
    pub async fn parse_intent(&self, endpoint: &str, prompt: &str) -> Result<IntentResponse> {
        let req = self
            .client
            .post(endpoint)
            .json(&IntentRequest { prompt });

        let response = runtime()
            .spawn(async move {
                let response = req.send().await?.error_for_status()?;
                response.json::<IntentResponse>().await
            })
            .await?
            .with_context(|| format!("calling assistant at {}", endpoint))?;

        Ok(response)
    }
}
