//! Runs the `wordcount` binary and checks its output and exit codes

use std::process::{Command, Output};

fn wordcount(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wordcount"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_prints_sections_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let output = wordcount(&["--master", "local[2]", "--dir", dir.path().to_str().unwrap()]);

    assert!(output.status.success(), "{:?}", output);
    assert!(dir.path().join("sample_text.txt").is_file());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let headings = [
        "Session initialized successfully.",
        "--- Original Lines (RDD) ---",
        "--- Individual Words (RDD) ---",
        "--- Word Pairs (RDD) ---",
        "--- Word Counts (Result) ---",
        "--- Word Count using DataFrames ---",
        "Session stopped.",
    ];
    let positions: Vec<usize> = headings
        .iter()
        .map(|h| stdout.find(h).unwrap_or_else(|| panic!("missing {h:?} in\n{stdout}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{stdout}");

    assert!(stdout.contains("('hello', 1)"));
    assert!(stdout.contains("'spark': 3"));
    assert!(stdout.contains("'hello': 2"));
}

#[test]
fn test_invalid_master_exits_with_1() {
    let dir = tempfile::tempdir().unwrap();
    let output = wordcount(&["--master", "yarn", "--dir", dir.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("sample_text.txt").exists());
}

#[test]
fn test_unwritable_dir_exits_with_2() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");
    let output = wordcount(&["--master", "local", "--dir", missing.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_input_exits_with_3() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nothing.txt");
    let output = wordcount(&["--master", "local", "--input", missing.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(3));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("--- Word Count"));
}
