//! Utility functions used across toolopt-core.

pub mod load_json;

pub use load_json::{extract_json_from_str, extract_json_object};
