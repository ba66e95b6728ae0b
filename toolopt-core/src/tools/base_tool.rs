//! Base tool traits and types.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::ToolError;

/// Keyword arguments passed to a tool.
pub type ToolArgs = HashMap<String, Value>;

/// Schema for tool parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametersSchema {
    /// The type of the parameters (always "object")
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Properties of the parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Value>>,
    /// Required parameter names, in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl ParametersSchema {
    /// An object schema with the given properties, all required.
    pub fn required_properties<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut props = BTreeMap::new();
        let mut required = Vec::new();
        for (name, schema) in properties {
            let name = name.into();
            required.push(name.clone());
            props.insert(name, schema);
        }
        Self {
            schema_type: "object".to_string(),
            properties: Some(props),
            required: Some(required),
        }
    }
}

/// Metadata describing a tool to the reasoning client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// The name of the tool
    pub name: String,
    /// Description of what the tool does (the docstring for source tools)
    pub description: String,
    /// Parameters schema for the tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParametersSchema>,
    /// Declared signature, when the tool has one in source form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
            signature: None,
        }
    }

    pub fn with_parameters(mut self, parameters: ParametersSchema) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Rendered argument signature, e.g. `add(a, b)`.
    ///
    /// Falls back to the parameter schema when no declared signature exists:
    /// required parameters in order, then optional ones alphabetically.
    pub fn render_signature(&self) -> String {
        if let Some(signature) = &self.signature {
            return signature.clone();
        }
        let mut names: Vec<String> = Vec::new();
        if let Some(params) = &self.parameters {
            if let Some(required) = &params.required {
                names.extend(required.iter().cloned());
            }
            if let Some(props) = &params.properties {
                for name in props.keys() {
                    if !names.contains(name) {
                        names.push(format!("{}=None", name));
                    }
                }
            }
        }
        format!("{}({})", self.name, names.join(", "))
    }

    /// Validate arguments against the parameter schema
    pub fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        let Some(parameters) = &self.parameters else {
            return Ok(());
        };
        let schema = serde_json::to_value(parameters).map_err(|e| ToolError::InvalidArguments {
            tool: self.name.clone(),
            reason: e.to_string(),
        })?;
        let compiled = JSONSchema::compile(&schema).map_err(|e| ToolError::InvalidArguments {
            tool: self.name.clone(),
            reason: format!("invalid parameter schema: {}", e),
        })?;
        let instance = Value::Object(args.clone().into_iter().collect());
        if let Err(errors) = compiled.validate(&instance) {
            let messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect();
            return Err(ToolError::InvalidArguments {
                tool: self.name.clone(),
                reason: messages.join("; "),
            });
        }
        Ok(())
    }
}

/// Base trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Get the schema for this tool
    fn schema(&self) -> ToolSchema;

    /// Source text backing this tool, if it was built from source.
    ///
    /// Two tools with the same name and the same source are the same tool.
    fn source(&self) -> Option<&str> {
        None
    }

    /// Convert a return value to its string representation
    fn return_value_as_string(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            _ => value.to_string(),
        }
    }

    /// Run the tool with keyword arguments
    ///
    /// # Arguments
    /// * `args` - The keyword arguments
    /// * `cancellation_token` - Fires when the caller gives up on this call
    async fn run_json(
        &self,
        args: &ToolArgs,
        cancellation_token: CancellationToken,
    ) -> Result<Value, ToolError>;
}
