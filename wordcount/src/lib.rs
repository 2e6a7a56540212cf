//! Word count over a small sample file, computed once with the RDD API and
//! once with the DataFrame API.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use wisp_common::error::{CommonError, ErrorContext, Result};
use wisp_core::context::FlowContext;
use wisp_core::rdd::PairRdd;
use wisp_core::sql::arrow::array::{Array, Int64Array, StringArray};
use wisp_core::sql::arrow::compute::cast;
use wisp_core::sql::arrow::datatypes::DataType;
use wisp_core::sql::arrow::record_batch::RecordBatch;
use wisp_core::sql::functions::{col, lower, split};
use wisp_core::sql::{DataFrame, WispSession};

pub const SAMPLE_FILE_NAME: &str = "sample_text.txt";

pub const SAMPLE_LINES: [&str; 4] = [
    "Hello Spark",
    "Spark is powerful",
    "Hello world",
    "This is a simple example for Spark",
];

/// Writes [`SAMPLE_LINES`] to `dir/sample_text.txt`, replacing any existing
/// file, and returns the path written.
pub fn write_sample_file(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(SAMPLE_FILE_NAME);
    let mut content = SAMPLE_LINES.join("\n");
    content.push('\n');
    std::fs::write(&path, content)
        .with_io_context(|| format!("Failed to write sample file {}", path.display()))?;
    info!("Wrote sample file {}", path.display());
    Ok(path)
}

/// Lower-cases `line` and splits it on single spaces.
///
/// Every space is a separator, so runs of spaces yield empty tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    line.to_lowercase().split(' ').map(str::to_string).collect()
}

/// Token counts in token order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCounts {
    counts: BTreeMap<String, u64>,
}

impl WordCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` occurrences of `word`
    pub fn add(&mut self, word: impl Into<String>, count: u64) {
        *self.counts.entry(word.into()).or_insert(0) += count;
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.counts.get(word).copied()
    }

    /// Sum of all counts: the number of tokens counted
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct tokens
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(w, c)| (w.as_str(), *c))
    }
}

impl FromIterator<(String, u64)> for WordCounts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counts = WordCounts::new();
        for (word, count) in iter {
            counts.add(word, count);
        }
        counts
    }
}

/// One `'word': count` line per token, in token order
impl fmt::Display for WordCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (word, count) in self.iter() {
            writeln!(f, "'{}': {}", word, count)?;
        }
        Ok(())
    }
}

/// Result of the RDD pipeline, with the intermediate stages kept for display.
#[derive(Debug, Clone)]
pub struct RddWordCount {
    pub lines: Vec<String>,
    pub tokens: Vec<String>,
    pub pairs: Vec<(String, u64)>,
    pub counts: WordCounts,
}

impl RddWordCount {
    /// Runs `text_file -> flat_map(tokenize) -> map((w, 1)) -> reduce_by_key(+)`
    /// over `path`.
    pub fn run(context: &FlowContext, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let lines = context.text_file(path)?;
        let words = lines.flat_map(|line: String| tokenize(&line));
        let pairs = words.map(|word| (word, 1u64));
        let counts = pairs.reduce_by_key(|a, b| a + b);

        let result = Self {
            lines: lines.collect()?,
            tokens: words.collect()?,
            pairs: pairs.collect()?,
            counts: counts.collect_as_map()?.into_iter().collect(),
        };
        debug!(
            "RDD word count of {}: {} tokens, {} distinct",
            path.display(),
            result.counts.total(),
            result.counts.distinct()
        );
        Ok(result)
    }
}

/// Result of the DataFrame pipeline.
#[derive(Debug, Clone)]
pub struct DataFrameWordCount {
    pub counts: WordCounts,
    /// The result rendered as a text table
    pub table: String,
}

impl DataFrameWordCount {
    /// Builds the word count query over `path`: one row per distinct word with
    /// columns `word` and `count`, ordered by word.
    pub fn query(session: &WispSession, path: impl AsRef<Path>) -> Result<DataFrame> {
        session
            .read()
            .text(path)?
            .select(vec![split(lower(col("value")), " ").alias("words")])?
            .explode("words", "word")?
            .group_by(&["word"])
            .count()?
            .order_by(&["word"])
    }

    pub async fn run(session: &WispSession, path: impl AsRef<Path>) -> Result<Self> {
        let df = Self::query(session, path)?;
        let batches = df.collect().await?;
        let counts = counts_from_batches(&batches)?;
        let table = wisp_core::sql::arrow::util::pretty::pretty_format_batches(&batches)
            .with_execution_context(|| "Failed to render word counts".to_string())?
            .to_string();
        Ok(Self { counts, table })
    }
}

/// Reads `(word, count)` rows from batches whose first two columns are the
/// word and its count.
fn counts_from_batches(batches: &[RecordBatch]) -> Result<WordCounts> {
    let mut counts = WordCounts::new();
    for batch in batches {
        if batch.num_columns() < 2 {
            return Err(CommonError::internal_error(format!(
                "Expected word and count columns, found {}",
                batch.num_columns()
            )));
        }
        let words = cast(batch.column(0), &DataType::Utf8)
            .with_execution_context(|| "Word column is not a string".to_string())?;
        let words = words
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| CommonError::internal_error("Word column is not Utf8"))?;
        let values = cast(batch.column(1), &DataType::Int64)
            .with_execution_context(|| "Count column is not an integer".to_string())?;
        let values = values
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| CommonError::internal_error("Count column is not Int64"))?;

        for (word, count) in words.iter().zip(values.iter()) {
            match (word, count) {
                (Some(word), Some(count)) => {
                    let count = u64::try_from(count).with_execution_context(|| {
                        format!("Negative count {} for '{}'", count, word)
                    })?;
                    counts.add(word, count);
                }
                _ => return Err(CommonError::internal_error("Null in word count result")),
            }
        }
    }
    Ok(counts)
}
