//! Tests for key-value RDD operations and the hash shuffle behind them

mod common;

use common::*;
use std::collections::HashMap;
use std::sync::Arc;
use wisp_core::PairRdd;
use wisp_core::shuffle::{Aggregator, CombineAggregator, HashPartitioner, SumAggregator};
use wisp_core::traits::Dependency;

#[test]
fn test_reduce_by_key_sums_values() {
    let context = create_test_context("reduce-by-key-test");
    let rdd = context.parallelize_with_partitions(create_test_string_i32_data(), 3);

    let reduced = rdd.reduce_by_key(|a, b| a + b);
    assert_eq!(reduced.num_partitions(), 4);
    assert!(matches!(
        reduced.dependencies().as_slice(),
        [Dependency::Shuffle { .. }]
    ));

    assert_same_elements(
        reduced.collect().unwrap(),
        vec![
            ("a".to_string(), 4),
            ("b".to_string(), 7),
            ("c".to_string(), 4),
        ],
    );
}

#[test]
fn test_reduce_by_key_with_explicit_partitioner() {
    let context = create_test_context("reduce-by-key-with-test");
    let rdd = context.parallelize_with_partitions(create_test_string_i32_data(), 2);

    let reduced = rdd.reduce_by_key_with(|a, b| a * b, Arc::new(HashPartitioner::new(7)));
    assert_eq!(reduced.num_partitions(), 7);

    let result = reduced.collect_as_map().unwrap();
    let expected: HashMap<String, i32> = [("a", 3), ("b", 10), ("c", 4)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    assert_eq!(result, expected);
}

#[test]
fn test_word_count_pipeline() {
    let context = create_test_context("word-count-pipeline-test");
    let lines: Vec<String> = SAMPLE_LINES.iter().map(|l| l.to_string()).collect();

    let counts = context
        .parallelize_with_partitions(lines, 2)
        .flat_map(|line: String| {
            line.to_lowercase()
                .split(' ')
                .map(str::to_string)
                .collect::<Vec<String>>()
        })
        .map(|word| (word, 1u64))
        .reduce_by_key(|a, b| a + b)
        .collect_as_map()
        .unwrap();

    assert_eq!(counts.len(), 10);
    assert_eq!(counts.values().sum::<u64>(), 14);
    assert_eq!(counts["spark"], 3);
    assert_eq!(counts["hello"], 2);
    assert_eq!(counts["is"], 2);
    assert_eq!(counts["powerful"], 1);
}

#[test]
fn test_shuffle_result_is_reusable() {
    let context = create_test_context("shuffle-reuse-test");
    let reduced = context
        .parallelize(create_test_string_i32_data())
        .reduce_by_key(|a, b| a + b);

    let first = reduced.collect_as_map().unwrap();
    let second = reduced.collect_as_map().unwrap();
    assert_eq!(first, second);

    let keys = reduced.map(|(k, _)| k).count().unwrap();
    assert_eq!(keys, 3);
}

#[test]
fn test_chained_shuffles() {
    let context = create_test_context("chained-shuffle-test");
    // Count words, then count how many words share each count.
    let histogram = context
        .parallelize(
            ["x", "y", "x", "z", "x", "y"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>(),
        )
        .map(|w| (w, 1u32))
        .reduce_by_key(|a, b| a + b)
        .map(|(_, n)| (n, 1u32))
        .reduce_by_key(|a, b| a + b)
        .collect_as_map()
        .unwrap();

    assert_eq!(histogram, HashMap::from([(3, 1), (2, 1), (1, 1)]));
}

#[test]
fn test_combine_by_key_with_sum_aggregator() {
    let context = create_test_context("sum-aggregator-test");
    let rdd = context.parallelize_with_partitions(create_test_string_i32_data(), 3);

    let sums = rdd
        .combine_by_key::<i32>(
            Arc::new(SumAggregator::<i32>::new()),
            Arc::new(HashPartitioner::with_seed(2, 42)),
        )
        .collect_as_map()
        .unwrap();
    assert_eq!(sums["a"], 4);
    assert_eq!(sums["b"], 7);
    assert_eq!(sums["c"], 4);
}

#[test]
fn test_count_by_key() {
    let context = create_test_context("count-by-key-test");
    let rdd = context.parallelize(create_test_string_i32_data());

    let counts = rdd.count_by_key().unwrap();
    assert_eq!(counts["a"], 2);
    assert_eq!(counts["b"], 2);
    assert_eq!(counts["c"], 1);
}

#[test]
fn test_combine_by_key_builds_lists() {
    let context = create_test_context("combine-by-key-test");
    let rdd = context.parallelize_with_partitions(create_test_string_i32_data(), 2);

    let aggregator: Arc<dyn Aggregator<String, i32, Vec<i32>>> = Arc::new(CombineAggregator::new(
        |v: i32| vec![v],
        |mut c: Vec<i32>, v: i32| {
            c.push(v);
            c
        },
        |mut a: Vec<i32>, b: Vec<i32>| {
            a.extend(b);
            a
        },
    ));
    let grouped = rdd
        .combine_by_key(aggregator, Arc::new(HashPartitioner::new(2)))
        .collect_as_map()
        .unwrap();

    let mut a = grouped["a"].clone();
    a.sort();
    assert_eq!(a, vec![1, 3]);
    assert_eq!(grouped["c"], vec![4]);
}

#[test]
fn test_reduce_by_key_on_empty_rdd() {
    let context = create_test_context("empty-shuffle-test");
    let rdd = context.parallelize(Vec::<(String, i32)>::new());

    assert!(rdd.reduce_by_key(|a, b| a + b).collect().unwrap().is_empty());
}
