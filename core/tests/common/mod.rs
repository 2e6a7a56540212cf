//! Common test utilities and helpers for integration tests

use std::path::{Path, PathBuf};
use wisp_core::config::{FlowConf, Master};
use wisp_core::context::FlowContext;

pub const SAMPLE_LINES: [&str; 4] = [
    "Hello Spark",
    "Spark is powerful",
    "Hello world",
    "This is a simple example for Spark",
];

/// Create a test context with a given name
pub fn create_test_context(name: &str) -> FlowContext {
    create_test_context_with_threads(name, 4)
}

/// Create a test context with specific thread count
pub fn create_test_context_with_threads(name: &str, threads: usize) -> FlowContext {
    FlowContext::new(FlowConf::new(name, Master::LocalN(threads))).unwrap()
}

/// Write `lines` to `name` inside `dir`, one per line with a trailing newline
#[allow(dead_code)]
pub fn write_lines(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(&path, content).unwrap();
    path
}

/// Create test data for key-value pairs (String, i32)
#[allow(dead_code)]
pub fn create_test_string_i32_data() -> Vec<(String, i32)> {
    vec![
        ("a".to_string(), 1),
        ("b".to_string(), 2),
        ("a".to_string(), 3),
        ("c".to_string(), 4),
        ("b".to_string(), 5),
    ]
}

/// Assert that two vectors contain the same elements (order-independent)
#[allow(dead_code)]
pub fn assert_same_elements<T: Ord + std::fmt::Debug>(mut actual: Vec<T>, mut expected: Vec<T>) {
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}
