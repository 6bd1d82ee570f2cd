use std::collections::{BTreeMap, BTreeSet};

use ams_core::errors::{ErrorInfo, GradeError};

use crate::table::ContingencyTable;

/// Cross-tabulates two equally long label sequences.
///
/// Row and column labels are the sorted unique labels of each sequence.
pub fn crosstab<R, C>(rows: &[R], columns: &[C]) -> Result<ContingencyTable, GradeError>
where
    R: AsRef<str>,
    C: AsRef<str>,
{
    let row_labels: Vec<String> = rows
        .iter()
        .map(|label| label.as_ref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let column_labels: Vec<String> = columns
        .iter()
        .map(|label| label.as_ref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    crosstab_with_labels(rows, columns, &row_labels, &column_labels)
}

/// Cross-tabulates two label sequences onto a fixed label layout.
///
/// Labels absent from the data keep a zero count; data labels absent from the
/// layout are an error.
pub fn crosstab_with_labels<R, C>(
    rows: &[R],
    columns: &[C],
    row_labels: &[String],
    column_labels: &[String],
) -> Result<ContingencyTable, GradeError>
where
    R: AsRef<str>,
    C: AsRef<str>,
{
    if rows.len() != columns.len() {
        return Err(GradeError::Table(
            ErrorInfo::new("length-mismatch", "crosstab inputs differ in length")
                .with_context("rows", rows.len().to_string())
                .with_context("columns", columns.len().to_string()),
        ));
    }
    if rows.is_empty() {
        return Err(GradeError::Table(ErrorInfo::new(
            "empty-crosstab",
            "cannot cross-tabulate empty sequences",
        )));
    }
    let row_pos: BTreeMap<&str, usize> = row_labels
        .iter()
        .enumerate()
        .map(|(idx, label)| (label.as_str(), idx))
        .collect();
    let column_pos: BTreeMap<&str, usize> = column_labels
        .iter()
        .enumerate()
        .map(|(idx, label)| (label.as_str(), idx))
        .collect();
    let mut counts = vec![vec![0i64; column_labels.len()]; row_labels.len()];
    for (row, column) in rows.iter().zip(columns) {
        let r = *row_pos
            .get(row.as_ref())
            .ok_or_else(|| unknown_label("row", row.as_ref()))?;
        let c = *column_pos
            .get(column.as_ref())
            .ok_or_else(|| unknown_label("column", column.as_ref()))?;
        counts[r][c] += 1;
    }
    ContingencyTable::new(row_labels.to_vec(), column_labels.to_vec(), counts)
}

fn unknown_label(axis: &str, label: &str) -> GradeError {
    GradeError::Table(
        ErrorInfo::new("unknown-label", format!("{axis} label not present in layout"))
            .with_context("label", label.to_string()),
    )
}
