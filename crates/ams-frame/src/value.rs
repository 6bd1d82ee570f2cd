use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::frame::{Frame, Series};
use crate::table::ContingencyTable;

/// Library namespaces reachable from assertion code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Tabular-data library (`pd`).
    Pandas,
    /// Numeric-array library (`np`).
    Numpy,
}

impl Module {
    /// Conventional alias the module is imported under.
    pub fn alias(&self) -> &'static str {
        match self {
            Module::Pandas => "pd",
            Module::Numpy => "np",
        }
    }
}

/// Dynamically typed value seen by assertion code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Absence of a value.
    None,
    /// The `...` placeholder an exercise variable starts out as.
    Ellipsis,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating point scalar.
    Float(f64),
    /// String scalar.
    Str(String),
    /// Heterogeneous list.
    List(Vec<Value>),
    /// Immutable sequence (shapes, pairs).
    Tuple(Vec<Value>),
    /// Numeric array of scalars supporting elementwise operations.
    Array(Vec<Value>),
    /// Labelled one-dimensional data.
    Series(Series),
    /// Observation-per-row frame.
    Frame(Frame),
    /// Contingency table of counts.
    Table(ContingencyTable),
    /// Variable names visible to the code (`vars()`).
    Names(Vec<String>),
    /// Library namespace.
    Module(Module),
}

impl Value {
    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Ellipsis => "ellipsis",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Array(_) => "ndarray",
            Value::Series(_) => "Series",
            Value::Frame(_) | Value::Table(_) => "DataFrame",
            Value::Names(_) => "dict",
            Value::Module(_) => "module",
        }
    }

    /// Whether the value is a bool, number or string.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
        )
    }

    /// Numeric view of bools, ints and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Value::Int(int) => Some(*int as f64),
            Value::Float(float) => Some(*float),
            _ => None,
        }
    }

    /// Text used when the value serves as a category label.
    pub fn label_text(&self) -> String {
        match self {
            Value::Str(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Formats a float the way notebook output shows it (`1.0`, `0.2`, `1e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let rendered = format!("{value:e}");
        return match rendered.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => rendered,
        };
    }
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn format_str(text: &str) -> String {
    if text.contains('\'') && !text.contains('"') {
        format!("\"{text}\"")
    } else {
        format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

fn join(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn cell(value: &Value) -> String {
    match value {
        Value::Str(text) => text.clone(),
        other => other.to_string(),
    }
}

fn dtype(values: &[Value]) -> &'static str {
    if values.iter().all(|value| matches!(value, Value::Bool(_))) {
        "bool"
    } else if values.iter().all(|value| matches!(value, Value::Int(_))) {
        "int64"
    } else if values
        .iter()
        .all(|value| matches!(value, Value::Int(_) | Value::Float(_)))
    {
        "float64"
    } else {
        "object"
    }
}

fn write_grid(f: &mut fmt::Formatter<'_>, grid: &[Vec<String>]) -> fmt::Result {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; width];
    for row in grid {
        for (idx, text) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(text.chars().count());
        }
    }
    for (line, row) in grid.iter().enumerate() {
        if line > 0 {
            writeln!(f)?;
        }
        let mut rendered = String::new();
        for (idx, text) in row.iter().enumerate() {
            if idx == 0 {
                rendered.push_str(&format!("{text:<w$}", w = widths[0]));
            } else {
                rendered.push_str(&format!("  {text:>w$}", w = widths[idx]));
            }
        }
        write!(f, "{}", rendered.trim_end())?;
    }
    Ok(())
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Ellipsis => write!(f, "Ellipsis"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(int) => write!(f, "{int}"),
            Value::Float(float) => write!(f, "{}", format_float(*float)),
            Value::Str(text) => write!(f, "{}", format_str(text)),
            Value::List(items) => write!(f, "[{}]", join(items)),
            Value::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            Value::Tuple(items) => write!(f, "({})", join(items)),
            Value::Array(items) => write!(f, "array([{}])", join(items)),
            Value::Names(names) => {
                let keys = names
                    .iter()
                    .map(|name| format_str(name))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "dict_keys([{keys}])")
            }
            Value::Module(module) => write!(f, "<module '{}'>", module.alias()),
            Value::Series(series) => {
                let grid: Vec<Vec<String>> = series
                    .index
                    .iter()
                    .zip(&series.values)
                    .map(|(label, value)| vec![cell(label), cell(value)])
                    .collect();
                write_grid(f, &grid)?;
                if !grid.is_empty() {
                    writeln!(f)?;
                }
                match &series.name {
                    Some(name) => write!(f, "Name: {name}, dtype: {}", dtype(&series.values)),
                    None => write!(f, "dtype: {}", dtype(&series.values)),
                }
            }
            Value::Frame(frame) => {
                let mut grid = vec![std::iter::once(String::new())
                    .chain(frame.column_names())
                    .collect::<Vec<_>>()];
                for row in 0..frame.nrows() {
                    let mut line = vec![row.to_string()];
                    line.extend(frame.columns().iter().map(|column| cell(&column.values[row])));
                    grid.push(line);
                }
                write_grid(f, &grid)
            }
            Value::Table(table) => {
                let mut grid = vec![std::iter::once(
                    table.columns_name().unwrap_or_default().to_string(),
                )
                .chain(table.columns().iter().cloned())
                .collect::<Vec<_>>()];
                if let Some(index) = table.index_name() {
                    grid.push(vec![index.to_string()]);
                }
                for (label, counts) in table.rows().iter().zip(table.counts()) {
                    let mut line = vec![label.clone()];
                    line.extend(counts.iter().map(i64::to_string));
                    grid.push(line);
                }
                write_grid(f, &grid)
            }
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(int: i64) -> Self {
        Value::Int(int)
    }
}

impl From<f64> for Value {
    fn from(float: f64) -> Self {
        Value::Float(float)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Str(text.to_string())
    }
}

impl From<ContingencyTable> for Value {
    fn from(table: ContingencyTable) -> Self {
        Value::Table(table)
    }
}

impl From<Frame> for Value {
    fn from(frame: Frame) -> Self {
        Value::Frame(frame)
    }
}

impl From<Series> for Value {
    fn from(series: Series) -> Self {
        Value::Series(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_render_like_notebook_output() {
        assert_eq!(format_float(0.2), "0.2");
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(-2.5), "-2.5");
    }

    #[test]
    fn scalars_and_lists_render() {
        let row = Value::List(vec![Value::from("Had AMS"), Value::from("Placebo")]);
        assert_eq!(row.to_string(), "['Had AMS', 'Placebo']");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Tuple(vec![Value::Int(2), Value::Int(2)]).to_string(), "(2, 2)");
    }
}
