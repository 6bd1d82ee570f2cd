use std::collections::BTreeSet;

use ams_core::errors::{ErrorInfo, GradeError};
use serde::{Deserialize, Serialize};

use crate::frame::Series;
use crate::value::Value;

fn table_error(code: &str, message: impl Into<String>) -> GradeError {
    GradeError::Table(ErrorInfo::new(code, message.into()))
}

/// Reduction axis for [`ContingencyTable::sum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Reduce down the rows, producing one total per column (`axis=0`).
    Index,
    /// Reduce across the columns, producing one total per row (`axis=1`).
    Columns,
}

impl Axis {
    /// Maps the numeric axis argument used by notebook code.
    pub fn from_number(axis: i64) -> Option<Self> {
        match axis {
            0 => Some(Axis::Index),
            1 => Some(Axis::Columns),
            _ => None,
        }
    }
}

/// Unvalidated table payload accepted during deserialization.
#[derive(Debug, Clone, Deserialize)]
struct TableRecord {
    #[serde(default)]
    index_name: Option<String>,
    #[serde(default)]
    columns_name: Option<String>,
    rows: Vec<String>,
    columns: Vec<String>,
    counts: Vec<Vec<i64>>,
}

impl TryFrom<TableRecord> for ContingencyTable {
    type Error = GradeError;

    fn try_from(record: TableRecord) -> Result<Self, Self::Error> {
        let table = ContingencyTable::new(record.rows, record.columns, record.counts)?;
        Ok(table.with_axis_names(record.index_name, record.columns_name))
    }
}

/// Joint counts of two categorical variables.
///
/// Row labels index the first variable, column labels the second. Counts are
/// stored row-major and are always non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableRecord")]
pub struct ContingencyTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    index_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns_name: Option<String>,
    rows: Vec<String>,
    columns: Vec<String>,
    counts: Vec<Vec<i64>>,
}

impl ContingencyTable {
    /// Builds a table after checking shape, label uniqueness and signs.
    pub fn new(
        rows: Vec<String>,
        columns: Vec<String>,
        counts: Vec<Vec<i64>>,
    ) -> Result<Self, GradeError> {
        if rows.is_empty() || columns.is_empty() {
            return Err(table_error(
                "empty-table",
                "a contingency table needs at least one row and one column",
            ));
        }
        ensure_unique(&rows, "row")?;
        ensure_unique(&columns, "column")?;
        if counts.len() != rows.len() {
            return Err(GradeError::Table(
                ErrorInfo::new("shape-mismatch", "count rows do not match row labels")
                    .with_context("rows", rows.len().to_string())
                    .with_context("count_rows", counts.len().to_string()),
            ));
        }
        for (label, row) in rows.iter().zip(&counts) {
            if row.len() != columns.len() {
                return Err(GradeError::Table(
                    ErrorInfo::new("ragged-counts", "row length does not match column labels")
                        .with_context("row", label.clone())
                        .with_context("expected", columns.len().to_string())
                        .with_context("found", row.len().to_string()),
                ));
            }
            if let Some(negative) = row.iter().find(|count| **count < 0) {
                return Err(GradeError::Table(
                    ErrorInfo::new("negative-count", "counts must be non-negative")
                        .with_context("row", label.clone())
                        .with_context("count", negative.to_string()),
                ));
            }
        }
        Ok(Self {
            index_name: None,
            columns_name: None,
            rows,
            columns,
            counts,
        })
    }

    /// Attaches the names of the row and column variables.
    pub fn with_axis_names(mut self, index: Option<String>, columns: Option<String>) -> Self {
        self.index_name = index;
        self.columns_name = columns;
        self
    }

    /// Row labels in table order.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Column labels in table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row-major counts.
    pub fn counts(&self) -> &[Vec<i64>] {
        &self.counts
    }

    /// Name of the row variable, if any.
    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    /// Name of the column variable, if any.
    pub fn columns_name(&self) -> Option<&str> {
        self.columns_name.as_deref()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Count for a labelled cell.
    pub fn get(&self, row: &str, column: &str) -> Option<i64> {
        let r = self.rows.iter().position(|label| label == row)?;
        let c = self.columns.iter().position(|label| label == column)?;
        Some(self.counts[r][c])
    }

    /// Counts of a single column, in row order.
    pub fn column(&self, column: &str) -> Option<Vec<i64>> {
        let c = self.columns.iter().position(|label| label == column)?;
        Some(self.counts.iter().map(|row| row[c]).collect())
    }

    /// Per-column totals.
    pub fn column_sums(&self) -> Vec<i64> {
        (0..self.columns.len())
            .map(|c| self.counts.iter().map(|row| row[c]).sum())
            .collect()
    }

    /// Per-row totals.
    pub fn row_sums(&self) -> Vec<i64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    /// Total number of observations.
    pub fn total(&self) -> i64 {
        self.counts.iter().flatten().sum()
    }

    /// Totals along `axis` as a labelled series.
    pub fn sum(&self, axis: Axis) -> Series {
        let (labels, totals) = match axis {
            Axis::Index => (&self.columns, self.column_sums()),
            Axis::Columns => (&self.rows, self.row_sums()),
        };
        Series::labelled(
            None,
            labels.iter().cloned().map(Value::Str).collect(),
            totals.into_iter().map(Value::Int).collect(),
        )
    }

    /// Same labels in the same order and the same counts. Axis names are
    /// not compared.
    pub fn equals(&self, other: &ContingencyTable) -> bool {
        self.rows == other.rows && self.columns == other.columns && self.counts == other.counts
    }
}

fn ensure_unique(labels: &[String], axis: &str) -> Result<(), GradeError> {
    let mut seen = BTreeSet::new();
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(GradeError::Table(
                ErrorInfo::new("duplicate-label", format!("duplicate {axis} label"))
                    .with_context("label", label.clone()),
            ));
        }
    }
    Ok(())
}
