//! Tool system for agent function calling.
//!
//! This module provides the [`Tool`] trait, closure-backed and
//! source-backed tool implementations, the per-example [`ToolRegistry`] and
//! time-bounded invocation.

mod base_tool;
mod function_tool;
mod registry;
mod script_tool;
mod timeout;

pub use base_tool::{ParametersSchema, Tool, ToolArgs, ToolSchema};
pub use function_tool::{create_function_tool, AsyncToolFunction, FunctionTool};
pub use registry::{finish_tool, ToolRegistry, ToolRegistryBuilder, FINISH_TOOL};
pub use script_tool::ScriptTool;
pub use timeout::{invoke_with_timeout, ToolOutcome, DEFAULT_TOOL_TIMEOUT};
