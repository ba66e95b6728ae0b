//! Dataset loading, seeded splitting and example preparation.

mod loader;
mod split;

use std::path::Path;
use std::sync::Arc;

pub use loader::{load_records, prepare_examples, DatasetRecord, Example, FunctionSources};
pub use split::{split_dataset, SplitSizes, Splits};

use crate::code_executor::PythonInterpreter;
use crate::config::DatasetConfig;
use crate::error::{Result, ToolOptError};

/// Load `path`, shuffle with the configured seed, split, and prepare every
/// record's tools with `interpreter`.
pub fn load_splits(
    path: &Path,
    config: &DatasetConfig,
    interpreter: Arc<PythonInterpreter>,
) -> Result<Splits<Example>> {
    let records = load_records(path)?;
    split_dataset(records, config.seed, SplitSizes::from(config))
        .map(|records| prepare_examples(&records, interpreter.clone()))
}

/// [`load_splits`] using the path from configuration.
pub fn load_configured_splits(config: &DatasetConfig, interpreter: Arc<PythonInterpreter>) -> Result<Splits<Example>> {
    let path = config
        .path
        .as_deref()
        .ok_or_else(|| ToolOptError::other("dataset.path is not configured"))?;
    load_splits(path, config, interpreter)
}
