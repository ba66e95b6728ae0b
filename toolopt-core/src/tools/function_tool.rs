//! Tools backed by Rust closures.

use std::future::Future;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::base_tool::{ParametersSchema, Tool, ToolArgs, ToolSchema};
use crate::error::ToolError;

/// Boxed closure behind a [`FunctionTool`].
pub type AsyncToolFunction =
    Box<dyn Fn(ToolArgs, CancellationToken) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

/// A native tool. Useful for tests, demos and tools that need no
/// interpreter.
///
/// # Example
///
/// ```rust
/// use toolopt_core::tools::{create_function_tool, ParametersSchema, Tool, ToolArgs};
/// use tokio_util::sync::CancellationToken;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let add = create_function_tool(
///     "add",
///     "Add two numbers together",
///     Some(ParametersSchema::required_properties([
///         ("a", json!({"type": "number"})),
///         ("b", json!({"type": "number"})),
///     ])),
///     |args, _token| async move {
///         let a = args.get("a").and_then(|v| v.as_f64()).unwrap_or(0.0);
///         let b = args.get("b").and_then(|v| v.as_f64()).unwrap_or(0.0);
///         Ok(json!(a + b))
///     },
/// );
///
/// let args = ToolArgs::from([("a".to_string(), json!(5)), ("b".to_string(), json!(3))]);
/// assert_eq!(add.run_json(&args, CancellationToken::new()).await?, json!(8.0));
/// # Ok(())
/// # }
/// ```
pub struct FunctionTool {
    schema: ToolSchema,
    function: AsyncToolFunction,
}

impl FunctionTool {
    pub fn new(schema: ToolSchema, function: AsyncToolFunction) -> Self {
        Self { schema, function }
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.schema.name
    }

    fn description(&self) -> &str {
        &self.schema.description
    }

    fn schema(&self) -> ToolSchema {
        self.schema.clone()
    }

    async fn run_json(
        &self,
        args: &ToolArgs,
        cancellation_token: CancellationToken,
    ) -> Result<Value, ToolError> {
        (self.function)(args.clone(), cancellation_token).await
    }
}

/// Wrap an async closure as a [`FunctionTool`].
pub fn create_function_tool<F, Fut>(
    name: &str,
    description: &str,
    parameters: Option<ParametersSchema>,
    func: F,
) -> FunctionTool
where
    F: Fn(ToolArgs, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    let mut schema = ToolSchema::new(name, description);
    schema.parameters = parameters;
    FunctionTool::new(schema, Box::new(move |args, token| func(args, token).boxed()))
}
