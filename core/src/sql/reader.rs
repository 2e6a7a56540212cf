//! Loading external data into DataFrames.

use crate::input::TextInput;
use crate::sql::dataframe::DataFrame;
use crate::sql::session::WispSession;
use datafusion::arrow::array::{ArrayRef, StringArray};
use datafusion::arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use wisp_common::error::{ErrorContext, Result};

/// Name of the single column produced by [`DataFrameReader::text`]
pub const TEXT_COLUMN: &str = "value";

/// Interface for loading data into a [`DataFrame`], obtained from
/// [`WispSession::read`].
#[derive(Debug)]
pub struct DataFrameReader<'a> {
    session: &'a WispSession,
}

impl<'a> DataFrameReader<'a> {
    pub(crate) fn new(session: &'a WispSession) -> Self {
        Self { session }
    }

    /// Load a text file as a DataFrame with one non-null string column,
    /// `value`, holding one row per line.
    ///
    /// Rows are partitioned with the same byte-range splits as
    /// [`FlowContext::text_file`](crate::context::FlowContext::text_file).
    pub fn text(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let context = self.session.flow_context();
        context.ensure_active()?;

        let input = TextInput::open(path, context.default_min_partitions())?;
        let partitions = input
            .read_all()
            .with_io_context(|| format!("Failed to read {}", input.path().display()))?;

        let schema = text_schema();
        let batch_size = self.session.conf().batch_size;
        let mut table_partitions = Vec::with_capacity(partitions.len());
        for lines in partitions {
            let batches = lines
                .chunks(batch_size)
                .map(|chunk| {
                    let values = StringArray::from_iter_values(chunk.iter());
                    RecordBatch::try_new(schema.clone(), vec![Arc::new(values) as ArrayRef])
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .with_execution_context(|| "Failed to build text batches".to_string())?;
            table_partitions.push(batches);
        }

        debug!(
            "Loaded {} as a table with {} partitions",
            input.path().display(),
            table_partitions.len()
        );

        let table = MemTable::try_new(schema, table_partitions)
            .with_execution_context(|| "Failed to create text table".to_string())?;
        let df = self
            .session
            .df_session_ctx()
            .read_table(Arc::new(table))
            .with_execution_context(|| format!("Failed to scan {}", input.path().display()))?;
        Ok(DataFrame::new(df))
    }
}

fn text_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![Field::new(
        TEXT_COLUMN,
        DataType::Utf8,
        false,
    )]))
}
