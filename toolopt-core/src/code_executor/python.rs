//! Child-process interpreter used to run source-defined tools.
//!
//! Every call spawns a fresh interpreter, hands it the function source and
//! keyword arguments as JSON on stdin, and reads a single JSON envelope back
//! from stdout. Nothing is shared between calls, so a crashing or hanging
//! tool cannot affect the next one.

use std::collections::HashMap;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::source::FunctionSource;
use crate::config::InterpreterConfig;
use crate::error::ToolError;

/// Harness executed by the child interpreter.
const HARNESS: &str = r#"
import json, sys
request = json.load(sys.stdin)
namespace = {}
try:
    exec(request["source"], namespace)
    result = namespace[request["name"]](**request["kwargs"])
    out = {"ok": result}
except BaseException as exc:
    out = {"error": "%s: %s" % (type(exc).__name__, exc)}
sys.stdout.write(json.dumps(out, default=str))
"#;

#[derive(Serialize)]
struct CallRequest<'a> {
    source: &'a str,
    name: &'a str,
    kwargs: &'a HashMap<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum CallResponse {
    Ok(Value),
    Error(String),
}

/// Runs function sources in a child interpreter process.
#[derive(Debug, Clone)]
pub struct PythonInterpreter {
    program: String,
    args: Vec<String>,
}

impl Default for PythonInterpreter {
    fn default() -> Self {
        Self::from_config(&InterpreterConfig::default())
    }
}

impl PythonInterpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn from_config(config: &InterpreterConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Call `function` with keyword arguments.
    ///
    /// The child is killed when `cancellation_token` fires or when the
    /// returned future is dropped.
    pub async fn call(
        &self,
        function: &FunctionSource,
        kwargs: &HashMap<String, Value>,
        cancellation_token: CancellationToken,
    ) -> Result<Value, ToolError> {
        let payload = serde_json::to_vec(&CallRequest {
            source: &function.code,
            name: &function.name,
            kwargs,
        })
        .map_err(|e| ToolError::InvalidArguments {
            tool: function.name.clone(),
            reason: e.to_string(),
        })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("-c")
            .arg(HARNESS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::Interpreter {
                reason: format!("failed to start '{}': {}", self.program, e),
            })?;
        debug!(tool = %function.name, pid = ?child.id(), "spawned interpreter");

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| ToolError::Interpreter {
                    reason: format!("failed to write request: {}", e),
                })?;
        }

        let output = tokio::select! {
            output = child.wait_with_output() => output.map_err(|e| ToolError::Interpreter {
                reason: e.to_string(),
            })?,
            _ = cancellation_token.cancelled() => {
                return Err(ToolError::Cancelled { tool: function.name.clone() });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!(tool = %function.name, status = ?output.status, stdout = %stdout, "interpreter finished");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ToolError::Interpreter {
                reason: format!("exited with {}: {}", output.status, stderr.trim()),
            });
        }

        match serde_json::from_str::<CallResponse>(stdout.trim()) {
            Ok(CallResponse::Ok(value)) => Ok(value),
            Ok(CallResponse::Error(reason)) => Err(ToolError::ExecutionFailed {
                tool: function.name.clone(),
                reason,
            }),
            Err(e) => Err(ToolError::Interpreter {
                reason: format!("malformed reply '{}': {}", stdout.trim(), e),
            }),
        }
    }
}
