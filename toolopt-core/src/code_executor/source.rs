//! Parsing of tool function source text.
//!
//! Tool bodies are kept as opaque text for the interpreter; only the header
//! and docstring are read here so the tool can be registered with a name,
//! a parameter list and a description.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ParametersSchema;

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(?:async[ \t]+)?def[ \t]+([A-Za-z_][A-Za-z0-9_]*)[ \t]*\(")
            .expect("header pattern is valid")
    })
}

fn docstring_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^\s*(?:[rRuU])?(?:"""((?s:.*?))"""|'''((?s:.*?))''')"#)
            .expect("docstring pattern is valid")
    })
}

/// A single declared parameter of a tool function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ParamSpec {
    fn render(&self) -> String {
        let mut out = self.name.clone();
        if let Some(annotation) = &self.annotation {
            out.push_str(": ");
            out.push_str(annotation);
        }
        if let Some(default) = &self.default {
            out.push_str(if self.annotation.is_some() { " = " } else { "=" });
            out.push_str(default);
        }
        out
    }
}

/// Function source with the metadata extracted from its header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSource {
    pub name: String,
    pub params: Vec<ParamSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub code: String,
}

impl FunctionSource {
    /// Parse the first function definition in `code`.
    ///
    /// Returns `None` when no function header can be found, which callers
    /// treat as "skip this entry".
    pub fn parse(code: &str) -> Option<Self> {
        let caps = header_pattern().captures(code)?;
        let name = caps.get(1)?.as_str().to_string();
        let open = caps.get(0)?.end();

        let (raw_params, close) = balanced_params(&code[open..])?;
        let params = split_top_level(raw_params)
            .into_iter()
            .filter_map(parse_param)
            .collect();

        let after_header = &code[open + close + 1..];
        let body = after_header.find(':').map(|colon| &after_header[colon + 1..]);
        let docstring = body.and_then(|body| {
            docstring_pattern().captures(body).and_then(|c| {
                c.get(1)
                    .or_else(|| c.get(2))
                    .map(|m| dedent(m.as_str()))
                    .filter(|s| !s.is_empty())
            })
        });

        Some(Self {
            name,
            params,
            docstring,
            code: code.to_string(),
        })
    }

    /// Rendered signature, e.g. `add(a: int, b: int)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ParamSpec::render).collect();
        format!("{}({})", self.name, params.join(", "))
    }

    /// Parameter schema derived from the declared parameters.
    ///
    /// Parameters without a default are required. Annotations only show up
    /// in the signature; the interpreter does not enforce them, so neither
    /// does the schema.
    pub fn parameters_schema(&self) -> ParametersSchema {
        let mut properties = BTreeMap::new();
        let mut required = Vec::new();
        for param in &self.params {
            properties.insert(param.name.clone(), Value::Object(Default::default()));
            if param.default.is_none() {
                required.push(param.name.clone());
            }
        }
        ParametersSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(required),
        }
    }
}

/// Returns the text between the opening parenthesis (already consumed) and
/// its matching close, plus the close's offset.
fn balanced_params(rest: &str) -> Option<(&str, usize)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, ch) in rest.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' if depth == 0 => return Some((&rest[..i], i)),
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

fn split_top_level(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in raw.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}

fn parse_param(raw: &str) -> Option<ParamSpec> {
    let raw = raw.trim();
    // Bare `*`/`/` markers and variadics cannot be passed by keyword name.
    if raw.is_empty() || raw.starts_with('*') || raw == "/" || raw == "self" {
        return None;
    }

    let (head, default) = match split_once_top_level(raw, '=') {
        Some((head, default)) => (head.trim(), Some(default.trim().to_string())),
        None => (raw, None),
    };
    let (name, annotation) = match head.split_once(':') {
        Some((name, annotation)) => (name.trim(), Some(annotation.trim().to_string())),
        None => (head, None),
    };
    if name.is_empty() {
        return None;
    }
    Some(ParamSpec {
        name: name.to_string(),
        annotation,
        default,
    })
}

fn split_once_top_level(raw: &str, needle: char) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, ch) in raw.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            c if c == needle && depth == 0 => return Some((&raw[..i], &raw[i + 1..])),
            _ => {}
        }
    }
    None
}

fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    // Only ASCII indentation is stripped, so every cut lands on a char boundary.
    let leading = |line: &str| line.len() - line.trim_start_matches([' ', '\t']).len();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading(line))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim()
            } else {
                &line[leading(line).min(indent)..]
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
