//! Fixture loading from YAML files

use serde::Deserialize;
use std::path::Path;

/// A single test case from a fixture file.
///
/// `values` are written as plain YAML and compared after conversion, so
/// `1` expects an integer and `1.0` a float.
#[derive(Debug, Clone, Deserialize)]
pub struct Case {
    pub id: String,
    pub desc: String,
    pub json: String,
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
    /// Number of failures the input must produce.
    #[serde(default)]
    pub errors: usize,
    /// Parse with `allow_multiple_values = false`.
    #[serde(default)]
    pub single: bool,
}

/// Load all test cases from a YAML fixture file
pub fn load_fixtures(path: &Path) -> Vec<Case> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

/// Load fixtures from the standard fixtures directory
pub fn load_fixtures_by_name(name: &str) -> Vec<Case> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.yaml", name));
    load_fixtures(&path)
}
