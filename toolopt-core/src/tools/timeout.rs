//! Time-bounded tool invocation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::base_tool::{Tool, ToolArgs};
use crate::error::ToolError;
use crate::logging::ToolCallEvent;

/// Default per-call budget.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one tool invocation.
///
/// Exactly one of the two fields is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub return_value: Option<Value>,
    pub errors: Option<String>,
}

impl ToolOutcome {
    pub fn success(value: Value) -> Self {
        Self {
            return_value: Some(value),
            errors: None,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            return_value: None,
            errors: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.errors.is_some()
    }
}

impl From<Result<Value, ToolError>> for ToolOutcome {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(value) => ToolOutcome::success(value),
            Err(e) => ToolOutcome::failure(e),
        }
    }
}

/// Run `tool` with `args`, giving up after `timeout`.
///
/// Never fails: invalid arguments, tool errors and timeouts all come back as
/// a [`ToolOutcome`] with `errors` set. On timeout the tool's cancellation
/// token is fired so interpreter-backed tools kill their child process.
pub async fn invoke_with_timeout(tool: &dyn Tool, args: &ToolArgs, timeout: Duration) -> ToolOutcome {
    if let Err(e) = tool.schema().validate_args(args) {
        warn!(tool = tool.name(), error = %e, "rejected tool arguments");
        return ToolOutcome::failure(e);
    }

    let token = CancellationToken::new();
    let result = match tokio::time::timeout(timeout, tool.run_json(args, token.clone())).await {
        Ok(result) => result,
        Err(_) => {
            token.cancel();
            Err(ToolError::Timeout {
                tool: tool.name().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    };

    let outcome = ToolOutcome::from(result);
    let event = ToolCallEvent::new(
        tool.name(),
        args,
        outcome
            .return_value
            .as_ref()
            .map(|v| tool.return_value_as_string(v)),
        outcome.errors.clone(),
    );
    if outcome.is_error() {
        warn!("{}", event);
    } else {
        info!("{}", event);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::create_function_tool;
    use serde_json::json;

    #[tokio::test]
    async fn test_slow_tool_times_out_without_panicking() {
        let slow = create_function_tool("slow", "Sleeps", None, |_args, _token| async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(json!("late"))
        });

        let outcome = invoke_with_timeout(&slow, &ToolArgs::new(), Duration::from_millis(20)).await;
        assert!(outcome.return_value.is_none());
        assert!(outcome.errors.unwrap().contains("timed out after 20 ms"));
    }

    #[tokio::test]
    async fn test_timeout_fires_cancellation_token() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let tx = std::sync::Mutex::new(Some(tx));
        let watcher = create_function_tool("watcher", "Waits for cancellation", None, move |_args, token| {
            let tx = tx.lock().unwrap().take();
            async move {
                tokio::spawn(async move {
                    token.cancelled().await;
                    if let Some(tx) = tx {
                        let _ = tx.send(());
                    }
                });
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Value::Null)
            }
        });

        let outcome = invoke_with_timeout(&watcher, &ToolArgs::new(), Duration::from_millis(20)).await;
        assert!(outcome.is_error());
        tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .expect("token should be cancelled")
            .unwrap();
    }

    #[tokio::test]
    async fn test_tool_error_becomes_outcome() {
        let failing = create_function_tool("boom", "Fails", None, |_args, _token| async move {
            Err(ToolError::ExecutionFailed {
                tool: "boom".to_string(),
                reason: "ZeroDivisionError: division by zero".to_string(),
            })
        });

        let outcome = invoke_with_timeout(&failing, &ToolArgs::new(), DEFAULT_TOOL_TIMEOUT).await;
        assert_eq!(outcome.return_value, None);
        assert_eq!(
            outcome.errors.as_deref(),
            Some("Tool 'boom' failed: ZeroDivisionError: division by zero")
        );
    }
}
