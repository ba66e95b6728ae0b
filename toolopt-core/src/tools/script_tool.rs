//! Tools compiled from function source text.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::base_tool::{Tool, ToolArgs, ToolSchema};
use crate::code_executor::{FunctionSource, PythonInterpreter};
use crate::error::ToolError;

/// A tool whose body runs in a child interpreter.
pub struct ScriptTool {
    source: FunctionSource,
    schema: ToolSchema,
    interpreter: Arc<PythonInterpreter>,
}

impl ScriptTool {
    /// Parse `code` and bind it to `interpreter`.
    ///
    /// Returns `None` when no function name can be parsed.
    pub fn from_source(code: &str, interpreter: Arc<PythonInterpreter>) -> Option<Self> {
        FunctionSource::parse(code).map(|source| Self::new(source, interpreter))
    }

    pub fn new(source: FunctionSource, interpreter: Arc<PythonInterpreter>) -> Self {
        let schema = ToolSchema::new(
            source.name.clone(),
            source.docstring.clone().unwrap_or_default(),
        )
        .with_parameters(source.parameters_schema())
        .with_signature(source.signature());

        Self {
            source,
            schema,
            interpreter,
        }
    }

    pub fn function(&self) -> &FunctionSource {
        &self.source
    }
}

#[async_trait]
impl Tool for ScriptTool {
    fn name(&self) -> &str {
        &self.source.name
    }

    fn description(&self) -> &str {
        &self.schema.description
    }

    fn schema(&self) -> ToolSchema {
        self.schema.clone()
    }

    fn source(&self) -> Option<&str> {
        Some(&self.source.code)
    }

    async fn run_json(
        &self,
        args: &ToolArgs,
        cancellation_token: CancellationToken,
    ) -> Result<Value, ToolError> {
        self.interpreter
            .call(&self.source, args, cancellation_token)
            .await
    }
}
