#![warn(missing_docs)]
//! # dashprint-contract-tests
//!
//! Helpers for validating JSON documents against the frozen schemas under
//! the workspace `contracts/` directory. The tests live in `tests/`.

use std::path::PathBuf;

use jsonschema::JSONSchema;
use serde_json::Value;

/// Absolute path of a file under `contracts/`.
pub fn contract_path(relative: &str) -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../contracts")).join(relative)
}

/// Reads and parses a JSON file under `contracts/`.
///
/// # Panics
/// Panics when the file is missing or not valid JSON.
pub fn load_json(relative: &str) -> Value {
    let path = contract_path(relative);
    let raw = std::fs::read_to_string(&path)
        .unwrap_or_else(|error| panic!("{} should be readable: {error}", path.display()));
    serde_json::from_str(&raw)
        .unwrap_or_else(|error| panic!("{} should be valid json: {error}", path.display()))
}

/// Compiles the schema stored at `relative`.
///
/// # Panics
/// Panics when the schema does not compile.
pub fn compile_validator(relative: &str) -> JSONSchema {
    let schema = load_json(relative);
    JSONSchema::compile(&schema).unwrap_or_else(|error| panic!("{relative} should compile: {error}"))
}

/// Returns the elements of a JSON array fixture.
///
/// # Panics
/// Panics when the fixture is not an array.
pub fn fixture_items(relative: &str) -> Vec<Value> {
    match load_json(relative) {
        Value::Array(items) => items,
        other => panic!("{relative} should be an array, got {other}"),
    }
}
