//! Per-example tool registries.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use super::base_tool::{ParametersSchema, Tool, ToolSchema};
use super::function_tool::create_function_tool;
use super::script_tool::ScriptTool;
use crate::code_executor::PythonInterpreter;
use crate::error::ToolError;

/// Name of the tool that ends an agent run.
pub const FINISH_TOOL: &str = "finish";

/// The terminal tool: returns its `answer` argument unchanged.
///
/// `answer` is required but may be any JSON value; numbers and lists are
/// rendered as text when the prediction is built.
pub fn finish_tool() -> impl Tool {
    create_function_tool(
        FINISH_TOOL,
        "Conclude the task and return the final answer.",
        Some(ParametersSchema::required_properties([("answer", json!({}))])),
        |args, _token| async move { Ok(args.get("answer").cloned().unwrap_or(Value::Null)) },
    )
}

/// The set of tools available to one example, keyed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    /// Build a registry from source strings using the default interpreter.
    pub fn from_sources<I, S>(sources: I) -> Result<Self, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::builder().add_sources(sources).build()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|tool| tool.schema()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Collects tools and checks them for name clashes.
///
/// `build` always adds the [`FINISH_TOOL`].
pub struct ToolRegistryBuilder {
    interpreter: Arc<PythonInterpreter>,
    tools: Vec<Arc<dyn Tool>>,
    skipped: usize,
}

impl Default for ToolRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self {
            interpreter: Arc::new(PythonInterpreter::default()),
            tools: Vec::new(),
            skipped: 0,
        }
    }

    /// Interpreter used for tools added with [`add_source`](Self::add_source) afterwards.
    pub fn with_interpreter(mut self, interpreter: Arc<PythonInterpreter>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Add a tool defined by source text. Sources without a parseable
    /// function name are skipped.
    pub fn add_source(mut self, code: impl AsRef<str>) -> Self {
        match ScriptTool::from_source(code.as_ref(), self.interpreter.clone()) {
            Some(tool) => self.tools.push(Arc::new(tool)),
            None => {
                self.skipped += 1;
                debug!("skipping tool source without a function name");
            }
        }
        self
    }

    pub fn add_sources<I, S>(self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        sources.into_iter().fold(self, |builder, code| builder.add_source(code))
    }

    pub fn add_tool<T: Tool + 'static>(self, tool: T) -> Self {
        self.add_shared(Arc::new(tool))
    }

    pub fn add_shared(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Number of sources skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Finish the registry.
    ///
    /// Fails with [`ToolError::DuplicateTool`] if two different tools share a
    /// name. The same source text registered twice is kept once.
    pub fn build(self) -> Result<ToolRegistry, ToolError> {
        let mut tools: BTreeMap<String, Arc<dyn Tool>> = BTreeMap::new();
        let finish: Arc<dyn Tool> = Arc::new(finish_tool());

        for tool in self.tools.into_iter().chain(std::iter::once(finish)) {
            let name = tool.name().to_string();
            if let Some(existing) = tools.get(&name) {
                match (existing.source(), tool.source()) {
                    (Some(a), Some(b)) if a == b => {
                        debug!(tool = %name, "ignoring repeated tool source");
                        continue;
                    }
                    _ => return Err(ToolError::DuplicateTool { name }),
                }
            }
            tools.insert(name, tool);
        }

        Ok(ToolRegistry { tools })
    }
}
