//! Tests for reading text files as RDDs

mod common;

use common::*;
use wisp_core::PairRdd;

#[test]
fn test_text_file_yields_lines_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(dir.path(), "sample_text.txt", &SAMPLE_LINES);
    let context = create_test_context("text-file-test");

    let rdd = context.text_file(&path).unwrap();
    assert_eq!(rdd.num_partitions(), 2);
    assert_eq!(rdd.collect().unwrap(), SAMPLE_LINES.to_vec());
}

#[test]
fn test_partition_count_does_not_change_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(dir.path(), "sample_text.txt", &SAMPLE_LINES);
    let context = create_test_context("text-file-partitions-test");

    for min_partitions in [1, 2, 3, 7, 64] {
        let lines = context
            .text_file_with_partitions(&path, min_partitions)
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(lines, SAMPLE_LINES.to_vec(), "min_partitions={min_partitions}");
    }
}

#[test]
fn test_crlf_and_missing_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crlf.txt");
    std::fs::write(&path, "Hello Spark\r\nHello world").unwrap();
    let context = create_test_context("crlf-test");

    let lines = context.text_file(&path).unwrap().collect().unwrap();
    assert_eq!(lines, vec!["Hello Spark", "Hello world"]);
}

#[test]
fn test_empty_file_has_no_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    std::fs::write(&path, "").unwrap();
    let context = create_test_context("empty-file-test");

    let rdd = context.text_file(&path).unwrap();
    assert_eq!(rdd.count().unwrap(), 0);
    assert!(
        rdd.map(|line| (line, 1))
            .reduce_by_key(|a, b| a + b)
            .collect_as_map()
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let context = create_test_context("missing-file-test");

    let err = context
        .text_file(dir.path().join("sample_text.txt"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_file_removed_before_job_fails_the_job() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(dir.path(), "sample_text.txt", &SAMPLE_LINES);
    let context = create_test_context("removed-file-test");

    let rdd = context.text_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(rdd.collect(), Err(wisp_core::RddError::IoError(_))));
}
