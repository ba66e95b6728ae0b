//! Interpreter boundary for tools defined as source text.
//!
//! Source strings are never evaluated in-process. [`FunctionSource`] reads
//! the header and docstring to build tool metadata, and
//! [`PythonInterpreter`] executes the body in a child process.

mod python;
mod source;

pub use python::PythonInterpreter;
pub use source::{FunctionSource, ParamSpec};
