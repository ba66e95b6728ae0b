use std::sync::OnceLock;

use regex::Regex;
use serde_json::{from_str, Value};

use crate::error::ModelError;

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"```(?:[ \t]*([\w\+\-]+))?[ \t]*\n([\s\S]*?)```").expect("fence pattern is valid")
    })
}

/// Extract JSON values from a string. Supports backtick enclosed JSON blocks.
pub fn extract_json_from_str(content: &str) -> Result<Vec<Value>, ModelError> {
    let matches: Vec<_> = fence_pattern().captures_iter(content).collect();

    if matches.is_empty() {
        let value: Value = from_str(content.trim()).map_err(|e| ModelError::ResponseParsingFailed {
            details: e.to_string(),
        })?;
        return Ok(vec![value]);
    }

    let mut ret = Vec::new();
    for cap in matches {
        if let Some(language) = cap.get(1) {
            let language = language.as_str().trim();
            if !language.is_empty() && !language.eq_ignore_ascii_case("json") {
                return Err(ModelError::ResponseParsingFailed {
                    details: format!("expected JSON block, found language: {}", language),
                });
            }
        }
        if let Some(body) = cap.get(2) {
            let value: Value = from_str(body.as_str()).map_err(|e| ModelError::ResponseParsingFailed {
                details: e.to_string(),
            })?;
            ret.push(value);
        }
    }
    Ok(ret)
}

/// Extract the first JSON object from a model reply.
///
/// Tries fenced blocks and the bare reply first, then falls back to the
/// outermost `{ ... }` span for replies that wrap JSON in prose.
pub fn extract_json_object(content: &str) -> Result<Value, ModelError> {
    if let Ok(values) = extract_json_from_str(content) {
        if let Some(object) = values.into_iter().find(Value::is_object) {
            return Ok(object);
        }
    }

    let start = content.find('{');
    let end = content.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            from_str::<Value>(&content[start..=end])
                .ok()
                .filter(Value::is_object)
                .ok_or_else(|| ModelError::ResponseParsingFailed {
                    details: format!("no JSON object in reply: {}", content),
                })
        }
        _ => Err(ModelError::ResponseParsingFailed {
            details: format!("no JSON object in reply: {}", content),
        }),
    }
}
