//! Tracing setup and structured log events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{Result, ToolOptError};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Calling this
/// twice returns an error instead of replacing the first subscriber.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| ToolOptError::other(format!("invalid log filter '{}': {}", config.filter, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ToolOptError::other(format!("failed to install tracing subscriber: {}", e)))
}

/// Event for logging tool calls
#[derive(Debug, Serialize, Deserialize)]
pub struct ToolCallEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub tool_name: String,
    pub arguments: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ToolCallEvent {
    pub fn new(
        tool_name: impl Into<String>,
        arguments: &HashMap<String, Value>,
        result: Option<String>,
        error: Option<String>,
    ) -> Self {
        Self {
            event_type: "ToolCall".to_string(),
            tool_name: tool_name.into(),
            arguments: arguments.clone().into_iter().collect(),
            result,
            error,
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for ToolCallEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "ToolCallEvent serialization error"),
        }
    }
}

/// Event for logging reasoning-client calls
#[derive(Debug, Serialize, Deserialize)]
pub struct LLMCallEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub model: String,
    pub prompt_chars: usize,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
}

impl LLMCallEvent {
    pub fn new(model: impl Into<String>, prompt_chars: usize, response: impl Into<String>) -> Self {
        Self {
            event_type: "LLMCall".to_string(),
            model: model.into(),
            prompt_chars,
            response: response.into(),
            prompt_tokens: None,
            completion_tokens: None,
        }
    }

    pub fn with_usage(mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) -> Self {
        self.prompt_tokens = prompt_tokens;
        self.completion_tokens = completion_tokens;
        self
    }
}

impl std::fmt::Display for LLMCallEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "LLMCallEvent serialization error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_call_event_renders_json() {
        let args = HashMap::from([("a".to_string(), json!(1))]);
        let event = ToolCallEvent::new("add", &args, Some("3".to_string()), None);
        let rendered: Value = serde_json::from_str(&event.to_string()).unwrap();
        assert_eq!(rendered["type"], "ToolCall");
        assert_eq!(rendered["tool_name"], "add");
        assert_eq!(rendered["arguments"]["a"], 1);
        assert!(rendered.get("error").is_none());
    }
}
