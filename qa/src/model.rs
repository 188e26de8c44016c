//! Language model client for the OpenAI Responses API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Prompt in, generated text out.
pub trait LanguageModel {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Connection settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Responses API payload; only the generated text is read.
#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesResponse {
    /// Concatenation of every `output_text` part, in order.
    fn output_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|item| &item.content)
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

/// Blocking client for an OpenAI-compatible `/responses` endpoint.
pub struct OpenAiClient {
    config: ModelConfig,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("build http client")?;
        Ok(Self { config, client })
    }
}

impl LanguageModel for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.config.model))]
    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/responses", self.config.base_url.trim_end_matches('/'));
        info!(url = %url, "requesting model response");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "model": self.config.model,
                "input": prompt,
            }))
            .send()
            .with_context(|| format!("POST {url}"))?;

        let status = response.status();
        let body = response.text().context("read model response body")?;
        report_from_response(status, &body)
    }
}

/// Turn a raw HTTP reply into report text. Non-2xx replies and replies with
/// no text are errors.
fn report_from_response(status: StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        bail!("model API returned {status}: {body}");
    }

    let parsed: ResponsesResponse = serde_json::from_str(body).context("parse model response")?;
    let text = parsed.output_text();
    debug!(chars = text.chars().count(), "model response received");
    if text.trim().is_empty() {
        return Err(anyhow!("model returned an empty report"));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_text_joins_text_parts_only() {
        let body = r#"{
            "id": "resp_1",
            "output": [
                {"type": "reasoning", "content": []},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": "CRASH & STABILITY → SAFE\n", "annotations": []},
                    {"type": "refusal", "refusal": "no"},
                    {"type": "output_text", "text": "FINAL DECISION → SAFE TO SHIP"}
                ]}
            ]
        }"#;
        let parsed: ResponsesResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(
            parsed.output_text(),
            "CRASH & STABILITY → SAFE\nFINAL DECISION → SAFE TO SHIP"
        );
    }

    #[test]
    fn missing_output_is_empty_text() {
        let parsed: ResponsesResponse = serde_json::from_str(r#"{"id": "x"}"#).expect("parse");
        assert_eq!(parsed.output_text(), "");
    }

    #[test]
    fn config_builders_override_defaults() {
        let cfg = ModelConfig::new("sk-test")
            .with_base_url("http://localhost:8000/v1")
            .with_model("local-model")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(cfg.base_url, "http://localhost:8000/v1");
        assert_eq!(cfg.model, "local-model");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.api_key, "sk-test");
    }

    #[test]
    fn error_status_carries_status_and_body() {
        let err = report_from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": {"message": "upstream overloaded"}}"#,
        )
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("500"));
        assert!(message.contains("upstream overloaded"));
    }

    #[test]
    fn success_without_output_text_is_an_error() {
        let body = r#"{"output": [{"type": "message", "content": [{"type": "refusal", "refusal": "no"}]}]}"#;
        let err = report_from_response(StatusCode::OK, body).unwrap_err();
        assert!(format!("{err:#}").contains("empty report"));
    }

    #[test]
    fn whitespace_only_report_is_an_error() {
        let body = r#"{"output": [{"content": [{"type": "output_text", "text": "  \n\t "}]}]}"#;
        let err = report_from_response(StatusCode::OK, body).unwrap_err();
        assert!(format!("{err:#}").contains("empty report"));
    }

    #[test]
    fn success_returns_report_text() {
        let body = r#"{"output": [{"content": [{"type": "output_text", "text": "SAFE TO SHIP"}]}]}"#;
        let report = report_from_response(StatusCode::OK, body).expect("report");
        assert_eq!(report, "SAFE TO SHIP");
    }

    #[test]
    fn malformed_body_is_an_error() {
        let err = report_from_response(StatusCode::OK, "not json").unwrap_err();
        assert!(format!("{err:#}").contains("parse model response"));
    }
}
