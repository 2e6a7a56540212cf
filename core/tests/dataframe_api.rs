//! Integration tests for the DataFrame API over text input

mod common;

use common::*;
use wisp_core::WispSession;
use wisp_core::sql::arrow::array::{Array, Int64Array, StringArray};
use wisp_core::sql::arrow::compute::cast;
use wisp_core::sql::arrow::datatypes::DataType;
use wisp_core::sql::functions::{col, lit, lower, split};
use wisp_core::sql::DataFrame;

fn session(name: &str) -> WispSession {
    WispSession::builder()
        .app_name(name)
        .master("local[2]")
        .create()
        .unwrap()
}

async fn word_rows(df: &DataFrame) -> Vec<(String, i64)> {
    let mut rows = Vec::new();
    for batch in df.collect().await.unwrap() {
        let words = cast(batch.column(0), &DataType::Utf8).unwrap();
        let words = words.as_any().downcast_ref::<StringArray>().unwrap();
        let counts = batch
            .column(1)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        for i in 0..batch.num_rows() {
            rows.push((words.value(i).to_string(), counts.value(i)));
        }
    }
    rows
}

fn word_counts(df: &DataFrame) -> DataFrame {
    df.select(vec![split(lower(col("value")), " ").alias("words")])
        .unwrap()
        .explode("words", "word")
        .unwrap()
        .group_by(&["word"])
        .count()
        .unwrap()
        .order_by(&["word"])
        .unwrap()
}

#[tokio::test]
async fn test_text_reader_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(dir.path(), "sample_text.txt", &SAMPLE_LINES);
    let session = session("text-reader-test");

    let df = session.read().text(&path).unwrap();
    let schema = df.schema();
    assert_eq!(schema.fields().len(), 1);
    assert_eq!(schema.field(0).name(), "value");
    assert!(!schema.field(0).is_nullable());
    assert_eq!(df.count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_word_count_is_sorted_by_word() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(dir.path(), "sample_text.txt", &SAMPLE_LINES);
    let session = session("df-word-count-test");

    let counts = word_counts(&session.read().text(&path).unwrap());
    let rows = word_rows(&counts).await;

    let expected = vec![
        ("a", 1),
        ("example", 1),
        ("for", 1),
        ("hello", 2),
        ("is", 2),
        ("powerful", 1),
        ("simple", 1),
        ("spark", 3),
        ("this", 1),
        ("world", 1),
    ];
    let expected: Vec<(String, i64)> = expected
        .into_iter()
        .map(|(w, c)| (w.to_string(), c))
        .collect();
    assert_eq!(rows, expected);
}

#[tokio::test]
async fn test_show_renders_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(dir.path(), "sample_text.txt", &SAMPLE_LINES);
    let session = session("df-show-test");

    let counts = word_counts(&session.read().text(&path).unwrap());
    let table = counts.to_table_string().await.unwrap();
    assert!(table.contains("| word"));
    assert!(table.contains("| count"));
    assert!(table.contains("spark"));
    counts.show().await.unwrap();
}

#[tokio::test]
async fn test_filter_on_words() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(dir.path(), "sample_text.txt", &SAMPLE_LINES);
    let session = session("df-filter-test");

    let sparks = session
        .read()
        .text(&path)
        .unwrap()
        .select(vec![split(lower(col("value")), " ").alias("words")])
        .unwrap()
        .explode("words", "word")
        .unwrap()
        .filter(col("word").eq(lit("spark")))
        .unwrap();
    assert_eq!(sparks.count().await.unwrap(), 3);
}

#[test]
fn test_missing_text_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let session = session("df-missing-test");

    let err = session
        .read()
        .text(dir.path().join("sample_text.txt"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_stopped_session_cannot_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(dir.path(), "sample_text.txt", &SAMPLE_LINES);
    let session = session("df-stopped-test");
    session.stop();

    assert!(session.read().text(&path).is_err());
}
