//! LLM API client abstraction for Gemini, OpenAI and Anthropic.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use strum::Display as StrumDisplay;
use tracing::{debug, error, info, instrument};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini.
    Gemini,
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

impl LlmProvider {
    /// Model used when the configuration names none.
    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini-3-flash-preview",
            LlmProvider::OpenAI => "gpt-4o-mini",
            LlmProvider::Anthropic => "claude-3-5-haiku-20241022",
        }
    }

    /// Public API endpoint root.
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
            LlmProvider::OpenAI => "https://api.openai.com",
            LlmProvider::Anthropic => "https://api.anthropic.com",
        }
    }

    /// Environment variables that may hold the API key, in lookup order.
    pub fn api_key_vars(self) -> &'static [&'static str] {
        match self {
            LlmProvider::Gemini => &["GEMINI_API_KEY", "API_KEY"],
            LlmProvider::OpenAI => &["OPENAI_API_KEY"],
            LlmProvider::Anthropic => &["ANTHROPIC_API_KEY"],
        }
    }
}

/// Configuration for LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: Option<String>,
    timeout: Duration,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(provider = %provider, model = %model))]
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
            base_url: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Overrides the provider's endpoint root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Gets the provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Gets the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the max tokens.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Gets the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Endpoint root, honoring any override.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
    }
}

/// LLM client that abstracts over multiple providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    #[instrument(skip(config), fields(provider = %config.provider()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM client");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Generates a free-text completion from a system prompt and user message.
    #[instrument(skip(self, system_prompt, user_message), fields(provider = %self.config.provider, model = %self.config.model))]
    pub async fn generate(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError> {
        debug!("Generating completion");
        let text = match self.config.provider {
            LlmProvider::Gemini => {
                let response = self
                    .post_gemini(gemini_body(system_prompt, user_message, None))
                    .await?;
                gemini_text(&response)?
            }
            LlmProvider::OpenAI => {
                let body = self.openai_body(system_prompt, user_message, None);
                let response = self.post_openai(body).await?;
                openai_text(&response)?
            }
            LlmProvider::Anthropic => {
                let body = self.anthropic_body(system_prompt, user_message, None);
                let response = self.post_anthropic(body).await?;
                anthropic_text(&response)?
            }
        };

        info!(content_length = text.len(), "Generated completion");
        Ok(text)
    }

    /// Generates a reply constrained to `schema` and returns it as JSON.
    ///
    /// Gemini and OpenAI receive the schema as a structured-output response
    /// format. Anthropic receives it as the input schema of a single forced
    /// tool, whose arguments become the reply.
    #[instrument(skip(self, system_prompt, user_message, schema), fields(provider = %self.config.provider, schema = schema_name))]
    pub async fn generate_structured(
        &self,
        system_prompt: &str,
        user_message: &str,
        schema_name: &str,
        schema: &Value,
    ) -> Result<Value, LlmError> {
        debug!("Generating structured completion");
        match self.config.provider {
            LlmProvider::Gemini => {
                let response = self
                    .post_gemini(gemini_body(system_prompt, user_message, Some(schema)))
                    .await?;
                parse_json_text(&gemini_text(&response)?)
            }
            LlmProvider::OpenAI => {
                let body = self.openai_body(system_prompt, user_message, Some((schema_name, schema)));
                let response = self.post_openai(body).await?;
                parse_json_text(&openai_text(&response)?)
            }
            LlmProvider::Anthropic => {
                let body = self.anthropic_body(system_prompt, user_message, Some((schema_name, schema)));
                let response = self.post_anthropic(body).await?;
                anthropic_tool_input(&response, schema_name)
            }
        }
    }

    async fn post_gemini(&self, body: Value) -> Result<Value, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url(),
            self.config.model
        );
        let request = self
            .http
            .post(url)
            .header("x-goog-api-key", self.config.api_key.clone());
        self.send(request, body).await
    }

    fn openai_body(&self, system_prompt: &str, user_message: &str, schema: Option<(&str, &Value)>) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message }
            ]
        });
        if let Some((name, schema)) = schema {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": { "name": name, "schema": schema, "strict": true }
            });
        }
        body
    }

    async fn post_openai(&self, body: Value) -> Result<Value, LlmError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());
        let request = self.http.post(url).bearer_auth(&self.config.api_key);
        self.send(request, body).await
    }

    fn anthropic_body(&self, system_prompt: &str, user_message: &str, tool: Option<(&str, &Value)>) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": system_prompt,
            "messages": [
                { "role": "user", "content": user_message }
            ]
        });
        if let Some((name, schema)) = tool {
            body["tools"] = json!([{
                "name": name,
                "description": "Submit your answer.",
                "input_schema": schema
            }]);
            body["tool_choice"] = json!({ "type": "tool", "name": name });
        }
        body
    }

    async fn post_anthropic(&self, body: Value) -> Result<Value, LlmError> {
        let url = format!("{}/v1/messages", self.config.base_url());
        let request = self
            .http
            .post(url)
            .header("x-api-key", self.config.api_key.clone())
            .header("anthropic-version", "2023-06-01");
        self.send(request, body).await
    }

    /// Sends a JSON request and returns the parsed JSON body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder, body: Value) -> Result<Value, LlmError> {
        let provider = self.config.provider;
        debug!(%provider, "Sending request");
        let response = request
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::new(format!("{provider} request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| LlmError::new(format!("Failed to read {provider} response: {e}")))?;

        if !status.is_success() {
            error!(%status, response = %response_text, "{provider} API error");
            return Err(LlmError::new(format!(
                "{provider} API error {status}: {response_text}"
            )));
        }

        debug!(response_length = response_text.len(), "Parsing response");
        serde_json::from_str(&response_text)
            .map_err(|e| LlmError::new(format!("Failed to parse {provider} response: {e}")))
    }
}

fn gemini_body(system_prompt: &str, user_message: &str, schema: Option<&Value>) -> Value {
    let mut body = json!({
        "systemInstruction": { "parts": [{ "text": system_prompt }] },
        "contents": [
            { "role": "user", "parts": [{ "text": user_message }] }
        ]
    });
    if let Some(schema) = schema {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseJsonSchema": schema
        });
    }
    body
}

fn gemini_text(response: &Value) -> Result<String, LlmError> {
    response["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<String>()
        })
        .filter(|text| !text.is_empty())
        .ok_or_else(|| LlmError::new("No text content in Gemini response".to_string()))
}

fn openai_text(response: &Value) -> Result<String, LlmError> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LlmError::new("No content in OpenAI response".to_string()))
}

fn anthropic_text(response: &Value) -> Result<String, LlmError> {
    response["content"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LlmError::new("No text content in Anthropic response".to_string()))
}

fn anthropic_tool_input(response: &Value, tool_name: &str) -> Result<Value, LlmError> {
    response["content"]
        .as_array()
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|b| b["type"] == "tool_use" && b["name"] == tool_name)
        })
        .map(|block| block["input"].clone())
        .ok_or_else(|| LlmError::new(format!("No {tool_name} tool call in Anthropic response")))
}

fn parse_json_text(text: &str) -> Result<Value, LlmError> {
    serde_json::from_str(text.trim())
        .map_err(|e| LlmError::new(format!("Structured reply is not JSON: {e}")))
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// What went wrong.
    pub message: String,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_text_joins_parts() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"choice\":" }, { "text": "\"rock\"}" }] } }]
        });
        assert_eq!(gemini_text(&response).unwrap(), "{\"choice\":\"rock\"}");
    }

    #[test]
    fn test_gemini_text_missing_is_error() {
        assert!(gemini_text(&json!({ "candidates": [] })).is_err());
    }

    #[test]
    fn test_anthropic_tool_input_found() {
        let response = json!({
            "content": [
                { "type": "text", "text": "thinking" },
                { "type": "tool_use", "name": "move_reply", "input": { "choice": "paper" } }
            ]
        });
        assert_eq!(
            anthropic_tool_input(&response, "move_reply").unwrap(),
            json!({ "choice": "paper" })
        );
    }

    #[test]
    fn test_openai_body_carries_schema() {
        let client = LlmClient::new(LlmConfig::new(
            LlmProvider::OpenAI,
            "key".to_string(),
            "gpt-4o-mini".to_string(),
            20,
        ));
        let schema = json!({ "type": "object" });
        let body = client.openai_body("sys", "user", Some(("move_reply", &schema)));
        assert_eq!(body["response_format"]["json_schema"]["name"], "move_reply");
        assert_eq!(body["messages"][1]["content"], "user");
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let config = LlmConfig::new(LlmProvider::Gemini, String::new(), "m".into(), 1)
            .with_base_url("http://127.0.0.1:9/");
        assert_eq!(config.base_url(), "http://127.0.0.1:9");
    }
}
