//! DataFrame wrapper over DataFusion's lazy logical plans.
//!
//! Transformations build a new plan and never execute anything; `collect`,
//! `count`, `show` and `to_table_string` run the plan on the tokio runtime.

use crate::sql::functions::{col, lit};
use datafusion::arrow::array::{Array, ArrayRef, StringArray};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::arrow::util::pretty::pretty_format_batches;
use datafusion::functions_aggregate::expr_fn::count;
use datafusion::prelude::Expr;
use std::sync::Arc;
use tracing::debug;
use wisp_common::error::{CommonError, ErrorContext, Result};

/// Name of the column produced by [`GroupedData::count`]
pub const COUNT_COLUMN: &str = "count";

/// Rows printed by [`DataFrame::show`]
pub const DEFAULT_SHOW_ROWS: usize = 20;

/// String cells longer than this are cut when shown
pub const SHOW_CELL_WIDTH: usize = 20;

/// A distributed collection of rows organised into named columns.
#[derive(Debug, Clone)]
pub struct DataFrame {
    inner: datafusion::dataframe::DataFrame,
}

impl DataFrame {
    pub(crate) fn new(inner: datafusion::dataframe::DataFrame) -> Self {
        Self { inner }
    }

    /// The underlying DataFusion DataFrame
    pub fn inner(&self) -> &datafusion::dataframe::DataFrame {
        &self.inner
    }

    pub fn schema(&self) -> SchemaRef {
        Arc::new(self.inner.schema().as_arrow().clone())
    }

    /// Project the given expressions
    pub fn select(&self, exprs: Vec<Expr>) -> Result<DataFrame> {
        let df = self
            .inner
            .clone()
            .select(exprs)
            .with_execution_context(|| "Invalid select".to_string())?;
        Ok(Self::new(df))
    }

    /// Produce one row per element of the array column `column`, naming the
    /// element column `alias`. Rows whose array is empty produce no output.
    pub fn explode(&self, column: &str, alias: &str) -> Result<DataFrame> {
        let mut df = self.inner.clone();
        if column != alias {
            df = df
                .with_column_renamed(column, alias)
                .with_execution_context(|| format!("Unknown column '{}'", column))?;
        }
        let df = df
            .unnest_columns(&[alias])
            .with_execution_context(|| format!("Cannot explode column '{}'", column))?;
        Ok(Self::new(df))
    }

    /// Keep the rows for which `predicate` is true
    pub fn filter(&self, predicate: Expr) -> Result<DataFrame> {
        let df = self
            .inner
            .clone()
            .filter(predicate)
            .with_execution_context(|| "Invalid filter".to_string())?;
        Ok(Self::new(df))
    }

    /// Group rows by the named columns
    pub fn group_by(&self, columns: &[&str]) -> GroupedData {
        GroupedData {
            df: self.inner.clone(),
            group_exprs: columns.iter().map(|c| col(c)).collect(),
        }
    }

    /// Sort by the named columns, ascending with nulls last
    pub fn order_by(&self, columns: &[&str]) -> Result<DataFrame> {
        let sort_exprs = columns.iter().map(|c| col(c).sort(true, false)).collect();
        let df = self
            .inner
            .clone()
            .sort(sort_exprs)
            .with_execution_context(|| format!("Cannot order by {:?}", columns))?;
        Ok(Self::new(df))
    }

    /// Execute the plan and return all batches
    pub async fn collect(&self) -> Result<Vec<RecordBatch>> {
        debug!("Executing DataFrame plan");
        self.inner
            .clone()
            .collect()
            .await
            .with_execution_context(|| "Failed to execute DataFrame".to_string())
    }

    /// Number of rows
    pub async fn count(&self) -> Result<usize> {
        self.inner
            .clone()
            .count()
            .await
            .with_execution_context(|| "Failed to count DataFrame rows".to_string())
    }

    /// Execute the plan and render all rows as a text table
    pub async fn to_table_string(&self) -> Result<String> {
        let batches = self.collect().await?;
        let table = pretty_format_batches(&batches)
            .with_execution_context(|| "Failed to render DataFrame".to_string())?;
        Ok(table.to_string())
    }

    /// Print the first 20 rows to stdout as a table
    pub async fn show(&self) -> Result<()> {
        self.show_n(DEFAULT_SHOW_ROWS).await
    }

    /// Print the first `num_rows` rows to stdout as a table, cutting string
    /// cells longer than [`SHOW_CELL_WIDTH`] characters
    pub async fn show_n(&self, num_rows: usize) -> Result<()> {
        println!("{}", self.to_show_string(num_rows).await?);
        Ok(())
    }

    /// Render the table printed by [`DataFrame::show_n`]. A footer names the
    /// row limit when rows were left out.
    pub async fn to_show_string(&self, num_rows: usize) -> Result<String> {
        let batches = self
            .inner
            .clone()
            .limit(0, Some(num_rows.saturating_add(1)))
            .with_execution_context(|| "Invalid row limit".to_string())?
            .collect()
            .await
            .with_execution_context(|| "Failed to execute DataFrame".to_string())?;

        let mut remaining = num_rows;
        let mut shown = Vec::new();
        for batch in &batches {
            if remaining == 0 {
                break;
            }
            let rows = batch.num_rows().min(remaining);
            shown.push(truncate_cells(&batch.slice(0, rows))?);
            remaining -= rows;
        }

        let mut table = pretty_format_batches(&shown)
            .with_execution_context(|| "Failed to render DataFrame".to_string())?
            .to_string();
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();
        if total > num_rows {
            let plural = if num_rows == 1 { "" } else { "s" };
            table.push_str(&format!("\nonly showing top {} row{}", num_rows, plural));
        }
        Ok(table)
    }
}

/// Cut the string columns of `batch` to [`SHOW_CELL_WIDTH`] characters
fn truncate_cells(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Field> = Vec::with_capacity(batch.num_columns());
    let mut columns = Vec::with_capacity(batch.num_columns());
    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        match field.data_type() {
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
                let strings = cast(column, &DataType::Utf8)
                    .with_execution_context(|| format!("Cannot render column '{}'", field.name()))?;
                let strings = strings
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| CommonError::internal_error("String cast did not yield Utf8"))?;
                let cut: StringArray = strings.iter().map(|v| v.map(truncate_cell)).collect();
                fields.push(Field::new(field.name(), DataType::Utf8, field.is_nullable()));
                columns.push(Arc::new(cut) as ArrayRef);
            }
            _ => {
                fields.push(Field::clone(field));
                columns.push(column.clone());
            }
        }
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .with_execution_context(|| "Failed to build display batch".to_string())
}

fn truncate_cell(value: &str) -> String {
    if value.chars().count() <= SHOW_CELL_WIDTH {
        return value.to_string();
    }
    let kept: String = value.chars().take(SHOW_CELL_WIDTH - 3).collect();
    format!("{}...", kept)
}

/// A DataFrame grouped by key columns, waiting for an aggregation.
#[derive(Debug, Clone)]
pub struct GroupedData {
    df: datafusion::dataframe::DataFrame,
    group_exprs: Vec<Expr>,
}

impl GroupedData {
    /// Count the rows of each group into an Int64 column named `count`
    pub fn count(self) -> Result<DataFrame> {
        let df = self
            .df
            .aggregate(self.group_exprs, vec![count(lit(1)).alias(COUNT_COLUMN)])
            .with_execution_context(|| "Invalid group by".to_string())?;
        Ok(DataFrame::new(df))
    }
}
