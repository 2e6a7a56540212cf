//! Integration tests for RDD transformations and actions in local mode

mod common;

use common::*;
use wisp_core::RddError;

#[test]
fn test_basic_rdd_creation_and_collection() {
    let context = create_test_context("basic-rdd-test");
    let data: Vec<i32> = (1..=20).collect();
    let rdd = context.parallelize(data.clone());

    assert_eq!(rdd.collect().unwrap(), data);
}

#[test]
fn test_rdd_with_multiple_partitions() {
    let context = create_test_context("partitioned-rdd-test");
    let data: Vec<i32> = (1..=20).collect();
    let rdd = context.parallelize_with_partitions(data.clone(), 6);

    assert_eq!(rdd.num_partitions(), 6);
    assert_eq!(rdd.collect().unwrap(), data);
    assert_eq!(rdd.count().unwrap(), 20);
}

#[test]
fn test_more_partitions_than_elements() {
    let context = create_test_context("sparse-partitions-test");
    let rdd = context.parallelize_with_partitions(vec![1, 2], 5);

    assert_eq!(rdd.num_partitions(), 5);
    assert_eq!(rdd.collect().unwrap(), vec![1, 2]);
}

#[test]
fn test_chained_transformations() {
    let context = create_test_context("chained-test");
    let rdd = context.parallelize((1..=10).collect::<Vec<i32>>());

    let result = rdd
        .map(|x| x * x)
        .filter(|x| *x > 20)
        .map(|x| x + 5)
        .collect()
        .unwrap();

    assert_eq!(result, vec![30, 41, 54, 69, 86, 105]);
}

#[test]
fn test_flat_map_splits_on_single_space() {
    let context = create_test_context("flat-map-test");
    let rdd = context.parallelize(vec!["Hello Spark".to_string(), "a  b".to_string()]);

    let tokens = rdd
        .flat_map(|line: String| {
            line.split(' ')
                .map(str::to_string)
                .collect::<Vec<String>>()
        })
        .collect()
        .unwrap();

    assert_eq!(tokens, vec!["Hello", "Spark", "a", "", "b"]);
}

#[test]
fn test_take_first_and_reduce() {
    let context = create_test_context("actions-test");
    let rdd = context.parallelize_with_partitions((1..=10).collect::<Vec<i32>>(), 3);

    assert_eq!(rdd.take(4).unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(rdd.take(0).unwrap(), Vec::<i32>::new());
    assert_eq!(rdd.first().unwrap(), Some(1));
    assert_eq!(rdd.reduce(|a, b| a + b).unwrap(), Some(55));

    let empty = context.parallelize(Vec::<i32>::new());
    assert_eq!(empty.first().unwrap(), None);
    assert_eq!(empty.reduce(|a, b| a + b).unwrap(), None);
}

#[test]
fn test_map_partitions_sees_whole_partition() {
    let context = create_test_context("map-partitions-test");
    let rdd = context.parallelize_with_partitions((1..=8).collect::<Vec<i32>>(), 2);

    let sums = rdd
        .map_partitions(|iter| {
            Box::new(std::iter::once(iter.sum::<i32>())) as Box<dyn Iterator<Item = i32>>
        })
        .collect()
        .unwrap();

    assert_eq!(sums, vec![10, 26]);
}

#[test]
fn test_jobs_fail_after_stop() {
    let context = create_test_context_with_threads("stop-test", 1);
    let rdd = context.parallelize(vec![1, 2, 3]).map(|x| x * 2);
    assert_eq!(rdd.count().unwrap(), 3);

    context.stop();
    assert!(matches!(rdd.count(), Err(RddError::ContextError(_))));
}
