//! Integration tests for dataset loading and splitting

use std::io::Write;
use std::sync::Arc;

use serde_json::json;
use toolopt_core::code_executor::PythonInterpreter;
use toolopt_core::config::DatasetConfig;
use toolopt_core::dataset::{load_configured_splits, load_records, load_splits};
use toolopt_core::error::DatasetError;
use toolopt_core::ToolOptError;

const ADD: &str = "def add(a: int, b: int):\n    \"\"\"Add two integers.\"\"\"\n    return a + b\n";

fn write_dataset(count: usize) -> tempfile::NamedTempFile {
    let records: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "question": format!("What is {} + 1?", i),
                "answer": (i + 1) as f64,
                "functions": [ADD],
            })
        })
        .collect();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&records).unwrap().as_bytes())
        .unwrap();
    file
}

fn config(train: usize, dev: usize) -> DatasetConfig {
    DatasetConfig {
        train_size: train,
        dev_size: dev,
        seed: 3,
        ..DatasetConfig::default()
    }
}

fn interpreter() -> Arc<PythonInterpreter> {
    Arc::new(PythonInterpreter::default())
}

/// Test loading splits gives the requested sizes and per-example tools
#[test]
fn test_load_splits() {
    let file = write_dataset(20);
    let splits = load_splits(file.path(), &config(8, 5), interpreter()).unwrap();

    assert_eq!(splits.train.len(), 8);
    assert_eq!(splits.dev.len(), 5);
    assert_eq!(splits.test.len(), 7);

    let example = &splits.train[0];
    assert_eq!(example.tools.names(), vec!["add".to_string(), "finish".to_string()]);
    assert!(!example.answer.ends_with(".0"));
}

/// Test the same seed reproduces the same partitions
#[test]
fn test_split_is_deterministic() {
    let file = write_dataset(30);
    let questions = |seed: u64| {
        let cfg = DatasetConfig {
            seed,
            ..config(10, 10)
        };
        let splits = load_splits(file.path(), &cfg, interpreter()).unwrap();
        splits
            .train
            .iter()
            .map(|e| e.question.clone())
            .collect::<Vec<_>>()
    };

    assert_eq!(questions(3), questions(3));
    assert_ne!(questions(3), questions(4));
}

/// Test a configured path is used and a missing one is reported
#[test]
fn test_load_configured_splits() {
    let file = write_dataset(5);
    let cfg = DatasetConfig {
        path: Some(file.path().to_path_buf()),
        ..config(2, 2)
    };
    let splits = load_configured_splits(&cfg, interpreter()).unwrap();
    assert_eq!(splits.test.len(), 1);

    let err = load_configured_splits(&config(2, 2), interpreter()).unwrap_err();
    assert!(err.to_string().contains("dataset.path"));
}

/// Test unreadable and malformed files are reported
#[test]
fn test_bad_dataset_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(
        load_records(&missing),
        Err(DatasetError::ReadFailed { .. })
    ));

    let malformed = dir.path().join("malformed.json");
    std::fs::write(&malformed, "{ not json").unwrap();
    assert!(matches!(
        load_records(&malformed),
        Err(DatasetError::ParsingFailed { .. })
    ));
}

/// Test a record with clashing tool names fails the load
#[test]
fn test_duplicate_tools_fail_load() {
    let other_add = "def add(x, y):\n    return x - y\n";
    let records = json!([
        { "question": "q", "answer": "1", "functions": [ADD, other_add] }
    ]);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(records.to_string().as_bytes()).unwrap();

    let err = load_splits(file.path(), &config(1, 0), interpreter()).unwrap_err();
    assert!(matches!(
        err,
        ToolOptError::Dataset(DatasetError::InvalidRecord { index: 0, .. })
    ));
}
