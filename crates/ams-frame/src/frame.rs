use std::collections::BTreeSet;

use ams_core::errors::{ErrorInfo, GradeError};
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Labelled one-dimensional column of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Optional series name (the column it was taken from).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Index labels, one per value.
    pub index: Vec<Value>,
    /// Scalar values.
    pub values: Vec<Value>,
}

impl Series {
    /// Series with a positional `0..n` index.
    pub fn from_values(name: Option<String>, values: Vec<Value>) -> Self {
        let index = (0..values.len() as i64).map(Value::Int).collect();
        Self {
            name,
            index,
            values,
        }
    }

    /// Series with explicit index labels. The caller guarantees equal lengths.
    pub(crate) fn labelled(name: Option<String>, index: Vec<Value>, values: Vec<Value>) -> Self {
        debug_assert_eq!(index.len(), values.len());
        Self {
            name,
            index,
            values,
        }
    }

    /// Series with explicit index labels, checking that the lengths agree.
    pub fn with_index(
        name: Option<String>,
        index: Vec<Value>,
        values: Vec<Value>,
    ) -> Result<Self, GradeError> {
        if index.len() != values.len() {
            return Err(GradeError::Table(
                ErrorInfo::new("index-length", "index and values differ in length")
                    .with_context("index", index.len().to_string())
                    .with_context("values", values.len().to_string()),
            ));
        }
        Ok(Self::labelled(name, index, values))
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value stored under an index label.
    pub fn get(&self, label: &Value) -> Option<&Value> {
        self.index
            .iter()
            .position(|candidate| candidate == label)
            .map(|pos| &self.values[pos])
    }

    /// Same index and same values; names are not compared.
    pub fn equals(&self, other: &Series) -> bool {
        self.index == other.index && self.values == other.values
    }
}

/// Named column of a [`Frame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Scalar values, one per row.
    pub values: Vec<Value>,
}

impl Column {
    /// Creates a column.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FrameRecord {
    columns: Vec<Column>,
}

impl TryFrom<FrameRecord> for Frame {
    type Error = GradeError;

    fn try_from(record: FrameRecord) -> Result<Self, Self::Error> {
        Frame::new(record.columns)
    }
}

/// Rectangular collection of equally long named columns with a positional
/// row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameRecord")]
pub struct Frame {
    columns: Vec<Column>,
}

impl Frame {
    /// Builds a frame, rejecting duplicate names and ragged columns.
    pub fn new(columns: Vec<Column>) -> Result<Self, GradeError> {
        let mut names = BTreeSet::new();
        for column in &columns {
            if !names.insert(column.name.as_str()) {
                return Err(GradeError::Table(
                    ErrorInfo::new("duplicate-column", "duplicate frame column")
                        .with_context("column", column.name.clone()),
                ));
            }
        }
        if let Some(first) = columns.first() {
            let rows = first.values.len();
            if let Some(bad) = columns.iter().find(|column| column.values.len() != rows) {
                return Err(GradeError::Table(
                    ErrorInfo::new("ragged-frame", "frame columns differ in length")
                        .with_context("column", bad.name.clone())
                        .with_context("expected", rows.to_string())
                        .with_context("found", bad.values.len().to_string()),
                ));
            }
        }
        Ok(Self { columns })
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, |column| column.values.len())
    }

    /// Column names in frame order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    /// Columns in frame order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Extracts a column as a named series.
    pub fn column(&self, name: &str) -> Option<Series> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| Series::from_values(Some(column.name.clone()), column.values.clone()))
    }

    /// Same column names, order and values.
    pub fn equals(&self, other: &Frame) -> bool {
        self.columns == other.columns
    }
}
