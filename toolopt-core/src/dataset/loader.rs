//! Reading question/answer/tool records and preparing examples.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;

use crate::code_executor::PythonInterpreter;
use crate::error::{DatasetError, ToolOptError};
use crate::tools::ToolRegistry;

/// Tool sources as stored on disk: a list, or a map keyed by tool name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionSources {
    List(Vec<String>),
    Named(BTreeMap<String, String>),
}

impl Default for FunctionSources {
    fn default() -> Self {
        FunctionSources::List(Vec::new())
    }
}

impl FunctionSources {
    pub fn sources(&self) -> Vec<&str> {
        match self {
            FunctionSources::List(list) => list.iter().map(String::as_str).collect(),
            FunctionSources::Named(map) => map.values().map(String::as_str).collect(),
        }
    }
}

/// One raw dataset entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub question: String,
    #[serde(deserialize_with = "answer_as_string")]
    pub answer: String,
    #[serde(default)]
    pub functions: FunctionSources,
}

fn answer_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// A prepared example: question, gold answer and its own tools.
#[derive(Debug, Clone)]
pub struct Example {
    pub question: String,
    pub answer: String,
    pub tools: ToolRegistry,
}

impl Example {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, tools: ToolRegistry) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            tools,
        }
    }

    /// Compile a record's tool sources with `interpreter`.
    pub fn from_record(record: &DatasetRecord, interpreter: Arc<PythonInterpreter>) -> Result<Self, ToolOptError> {
        let tools = ToolRegistry::builder()
            .with_interpreter(interpreter)
            .add_sources(record.functions.sources())
            .build()?;
        Ok(Self::new(record.question.clone(), record.answer.clone(), tools))
    }
}

/// Read a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<DatasetRecord>, DatasetError> {
    let text = std::fs::read_to_string(path).map_err(|e| DatasetError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let records: Vec<DatasetRecord> = serde_json::from_str(&text).map_err(|e| DatasetError::ParsingFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    info!(path = %path.display(), records = records.len(), "loaded dataset");
    Ok(records)
}

/// Prepare every record, failing on the first one whose tools clash.
pub fn prepare_examples(
    records: &[DatasetRecord],
    interpreter: Arc<PythonInterpreter>,
) -> Result<Vec<Example>, ToolOptError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Example::from_record(record, interpreter.clone()).map_err(|e| {
                ToolOptError::from(DatasetError::InvalidRecord {
                    index,
                    reason: e.to_string(),
                })
            })
        })
        .collect()
}
