//! Reasoning client for OpenAI-compatible chat completion endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::prompt::{render_system, render_user};
use super::reasoning_client::ReasoningClient;
use super::types::{StepDecision, StepRequest};
use crate::config::ModelConfig;
use crate::error::{ModelError, ToolOptError};
use crate::logging::LLMCallEvent;
use crate::utils::extract_json_object;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum LLMMessage {
    System { content: String },
    User { content: String },
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<LLMMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

/// Asks a chat model for the next step as a JSON object.
#[derive(Debug, Clone)]
pub struct OpenAiReasoningClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiReasoningClient {
    /// Build a client from configuration, reading the API key from the
    /// configured environment variable if it is set.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ToolOptError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ModelError::RequestFailed {
                details: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: std::env::var(&config.api_key_env).ok(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Turn a model reply into a decision.
pub fn parse_decision(reply: &str) -> Result<StepDecision, ModelError> {
    let mut object = extract_json_object(reply)?;
    // Some models return arguments as a JSON-encoded string.
    if let Some(Value::String(raw)) = object.get("args").cloned() {
        let parsed: Value = serde_json::from_str(&raw).map_err(|e| ModelError::ResponseParsingFailed {
            details: format!("args is not a JSON object: {}", e),
        })?;
        object["args"] = parsed;
    }
    if object.get("args").is_some_and(Value::is_null) {
        object["args"] = Value::Object(Default::default());
    }
    serde_json::from_value(object).map_err(|e| ModelError::ResponseParsingFailed {
        details: e.to_string(),
    })
}

#[async_trait]
impl ReasoningClient for OpenAiReasoningClient {
    async fn next_step(&self, request: &StepRequest) -> Result<StepDecision, ModelError> {
        let system = render_system(request);
        let user = render_user(request);
        let prompt_chars = system.len() + user.len();

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                LLMMessage::System { content: system },
                LLMMessage::User { content: user },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: serde_json::json!({ "type": "json_object" }),
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %self.model, "requesting next step");
        let mut builder = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| ModelError::RequestFailed {
            details: e.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ModelError::RequestFailed {
                details: format!("{} from {}: {}", status, url, text),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| ModelError::ResponseParsingFailed {
            details: e.to_string(),
        })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::ResponseParsingFailed {
                details: "response has no message content".to_string(),
            })?;

        let event = LLMCallEvent::new(&self.model, prompt_chars, content.clone()).with_usage(
            parsed.usage.as_ref().and_then(|u| u.prompt_tokens),
            parsed.usage.as_ref().and_then(|u| u.completion_tokens),
        );
        info!("{}", event);

        parse_decision(&content)
    }
}
