//! Builtin functions, the `pd`/`np` namespaces, methods, attributes and
//! subscripts available to assertion code.

use ams_core::errors::{ErrorInfo, GradeError};
use ams_frame::{crosstab, Axis, Module, Series, Value};

use crate::ast::BinOp;
use crate::ops::{self, eval_error, truthy, type_error, value_error};

/// Keyword arguments in call order.
pub type Kwargs = Vec<(String, Value)>;

const BUILTINS: &[&str] = &["len", "list", "vars", "sum", "min", "max", "abs", "sorted"];

/// Whether `name` is a builtin function.
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Library namespace bound to a conventional alias.
pub fn module_for(name: &str) -> Option<Module> {
    match name {
        "pd" | "pandas" => Some(Module::Pandas),
        "np" | "numpy" => Some(Module::Numpy),
        _ => None,
    }
}

fn attribute_error(owner: &str, name: &str) -> GradeError {
    GradeError::Eval(
        ErrorInfo::new(
            "attribute-error",
            format!("'{owner}' object has no attribute '{name}'"),
        )
        .with_context("attribute", name.to_string()),
    )
}

fn key_error(key: &Value) -> GradeError {
    GradeError::Eval(ErrorInfo::new("key-error", key.to_string()))
}

fn index_error(owner: &str) -> GradeError {
    eval_error("index-error", format!("{owner} index out of range"))
}

fn arity(function: &str, args: &[Value], expected: usize) -> Result<(), GradeError> {
    if args.len() != expected {
        return Err(type_error(format!(
            "{function}() takes exactly {expected} argument(s) ({} given)",
            args.len()
        )));
    }
    Ok(())
}

fn no_kwargs(function: &str, kwargs: &Kwargs) -> Result<(), GradeError> {
    match kwargs.first() {
        Some((name, _)) => Err(type_error(format!(
            "{function}() got an unexpected keyword argument '{name}'"
        ))),
        None => Ok(()),
    }
}

/// Items produced by iterating over a value.
pub fn iterate(value: &Value) -> Result<Vec<Value>, GradeError> {
    match value {
        Value::List(items) | Value::Tuple(items) | Value::Array(items) => Ok(items.clone()),
        Value::Str(text) => Ok(text.chars().map(|ch| Value::Str(ch.to_string())).collect()),
        Value::Names(names) => Ok(names.iter().cloned().map(Value::Str).collect()),
        Value::Series(series) => Ok(series.values.clone()),
        Value::Frame(frame) => Ok(frame.column_names().into_iter().map(Value::Str).collect()),
        Value::Table(table) => Ok(table.columns().iter().cloned().map(Value::Str).collect()),
        other => Err(type_error(format!(
            "'{}' object is not iterable",
            other.type_name()
        ))),
    }
}

/// `len(value)`.
pub fn length(value: &Value) -> Result<usize, GradeError> {
    match value {
        Value::Str(text) => Ok(text.chars().count()),
        Value::List(items) | Value::Tuple(items) | Value::Array(items) => Ok(items.len()),
        Value::Names(names) => Ok(names.len()),
        Value::Series(series) => Ok(series.len()),
        Value::Frame(frame) => Ok(frame.nrows()),
        Value::Table(table) => Ok(table.rows().len()),
        other => Err(type_error(format!(
            "object of type '{}' has no len()",
            other.type_name()
        ))),
    }
}

fn int_len(len: usize) -> Value {
    Value::Int(i64::try_from(len).unwrap_or(i64::MAX))
}

fn sum_values(items: &[Value]) -> Result<Value, GradeError> {
    items
        .iter()
        .try_fold(Value::Int(0), |acc, item| ops::binary(BinOp::Add, &acc, item))
}

fn mean_values(items: &[Value]) -> Result<Value, GradeError> {
    if items.is_empty() {
        return Ok(Value::Float(f64::NAN));
    }
    let total = sum_values(items)?;
    ops::binary(BinOp::Div, &total, &int_len(items.len()))
}

fn extreme(function: &str, items: Vec<Value>, want_max: bool) -> Result<Value, GradeError> {
    let mut iter = items.into_iter();
    let mut best = iter
        .next()
        .ok_or_else(|| value_error(format!("{function}() arg is an empty sequence")))?;
    for item in iter {
        let replace = if want_max {
            ops::less_than(&best, &item)?
        } else {
            ops::less_than(&item, &best)?
        };
        if replace {
            best = item;
        }
    }
    Ok(best)
}

fn sort_values(mut items: Vec<Value>) -> Result<Vec<Value>, GradeError> {
    // insertion sort keeps comparison errors propagating
    for idx in 1..items.len() {
        let mut pos = idx;
        while pos > 0 && ops::less_than(&items[pos], &items[pos - 1])? {
            items.swap(pos, pos - 1);
            pos -= 1;
        }
    }
    Ok(items)
}

/// Calls a builtin other than `vars`, which needs the interpreter scope.
pub fn call_builtin(name: &str, args: Vec<Value>, kwargs: Kwargs) -> Result<Value, GradeError> {
    no_kwargs(name, &kwargs)?;
    match name {
        "len" => {
            arity(name, &args, 1)?;
            length(&args[0]).map(int_len)
        }
        "list" => match args.as_slice() {
            [] => Ok(Value::List(Vec::new())),
            [value] => iterate(value).map(Value::List),
            _ => Err(type_error("list expected at most 1 argument")),
        },
        "sum" => {
            arity(name, &args, 1)?;
            sum_values(&iterate(&args[0])?)
        }
        "min" | "max" => {
            let items = match args.as_slice() {
                [single] => iterate(single)?,
                [] => return Err(type_error(format!("{name} expected at least 1 argument"))),
                _ => args,
            };
            extreme(name, items, name == "max")
        }
        "abs" => {
            arity(name, &args, 1)?;
            match &args[0] {
                Value::Float(float) => Ok(Value::Float(float.abs())),
                Value::Int(int) => int
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or_else(|| eval_error("overflow-error", "integer result out of range")),
                Value::Bool(flag) => Ok(Value::Int(i64::from(*flag))),
                other => Err(type_error(format!(
                    "bad operand type for abs(): '{}'",
                    other.type_name()
                ))),
            }
        }
        "sorted" => {
            arity(name, &args, 1)?;
            sort_values(iterate(&args[0])?).map(Value::List)
        }
        other => Err(GradeError::Eval(
            ErrorInfo::new("name-error", format!("name '{other}' is not defined"))
                .with_context("name", other.to_string()),
        )),
    }
}

fn labels_of(value: &Value) -> Result<(Vec<String>, Option<String>), GradeError> {
    match value {
        Value::Series(series) => Ok((
            series.values.iter().map(Value::label_text).collect(),
            series.name.clone(),
        )),
        Value::List(items) | Value::Tuple(items) | Value::Array(items) => {
            Ok((items.iter().map(Value::label_text).collect(), None))
        }
        other => Err(type_error(format!(
            "crosstab expects a sequence of labels, got '{}'",
            other.type_name()
        ))),
    }
}

fn pandas(name: &str, args: Vec<Value>, kwargs: Kwargs) -> Result<Value, GradeError> {
    match name {
        "crosstab" => {
            no_kwargs("crosstab", &kwargs)?;
            arity("crosstab", &args, 2)?;
            let (rows, row_name) = labels_of(&args[0])?;
            let (columns, column_name) = labels_of(&args[1])?;
            let table = crosstab(&rows, &columns)?.with_axis_names(
                Some(row_name.unwrap_or_else(|| "row_0".to_string())),
                Some(column_name.unwrap_or_else(|| "col_0".to_string())),
            );
            Ok(Value::Table(table))
        }
        other => Err(GradeError::Eval(
            ErrorInfo::new(
                "attribute-error",
                format!("module 'pd' has no attribute '{other}'"),
            )
            .with_context("attribute", other.to_string()),
        )),
    }
}

fn flat_cells(value: &Value) -> Result<Vec<Value>, GradeError> {
    match value {
        Value::Table(table) => Ok(table.counts().iter().flatten().copied().map(Value::Int).collect()),
        Value::Frame(frame) => Ok(frame
            .columns()
            .iter()
            .flat_map(|column| column.values.iter().cloned())
            .collect()),
        Value::List(_) | Value::Tuple(_) | Value::Array(_) | Value::Series(_) => iterate(value),
        scalar if scalar.is_scalar() => Ok(vec![scalar.clone()]),
        other => Err(type_error(format!(
            "unsupported operand type '{}'",
            other.type_name()
        ))),
    }
}

fn to_array(value: &Value) -> Result<Value, GradeError> {
    let items = match value {
        Value::List(items) | Value::Tuple(items) | Value::Array(items) => items.clone(),
        Value::Series(series) => series.values.clone(),
        other => {
            return Err(type_error(format!(
                "cannot build an array from '{}'",
                other.type_name()
            )))
        }
    };
    if let Some(bad) = items.iter().find(|item| !item.is_scalar()) {
        return Err(type_error(format!(
            "only one-dimensional arrays of scalars are supported, found '{}'",
            bad.type_name()
        )));
    }
    Ok(Value::Array(items))
}

fn numpy(name: &str, args: Vec<Value>, kwargs: Kwargs) -> Result<Value, GradeError> {
    no_kwargs(name, &kwargs)?;
    arity(name, &args, 1)?;
    let target = &args[0];
    match name {
        "all" => {
            for cell in flat_cells(target)? {
                if !truthy(&cell)? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        "any" => {
            for cell in flat_cells(target)? {
                if truthy(&cell)? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        "sum" => sum_values(&flat_cells(target)?),
        "mean" => mean_values(&flat_cells(target)?),
        "count_nonzero" => {
            let mut count = 0;
            for cell in flat_cells(target)? {
                if truthy(&cell)? {
                    count += 1;
                }
            }
            Ok(int_len(count))
        }
        "array" => to_array(target),
        other => Err(GradeError::Eval(
            ErrorInfo::new(
                "attribute-error",
                format!("module 'np' has no attribute '{other}'"),
            )
            .with_context("attribute", other.to_string()),
        )),
    }
}

/// Calls `pd.<name>` or `np.<name>`.
pub fn call_module(
    module: Module,
    name: &str,
    args: Vec<Value>,
    kwargs: Kwargs,
) -> Result<Value, GradeError> {
    match module {
        Module::Pandas => pandas(name, args, kwargs),
        Module::Numpy => numpy(name, args, kwargs),
    }
}

fn axis_argument(args: &[Value], kwargs: &Kwargs) -> Result<Axis, GradeError> {
    let raw = match (args, kwargs.as_slice()) {
        ([], []) => return Ok(Axis::Index),
        ([axis], []) => axis,
        ([], [(key, axis)]) if key == "axis" => axis,
        _ => return Err(type_error("sum() accepts a single 'axis' argument")),
    };
    let axis = match raw {
        Value::Int(number) => Axis::from_number(*number),
        Value::Str(text) if text == "index" || text == "rows" => Some(Axis::Index),
        Value::Str(text) if text == "columns" => Some(Axis::Columns),
        _ => None,
    };
    axis.ok_or_else(|| value_error(format!("No axis named {raw} for object type DataFrame")))
}

fn one_other(method: &str, args: Vec<Value>, kwargs: &Kwargs) -> Result<Value, GradeError> {
    no_kwargs(method, kwargs)?;
    arity(method, &args, 1)?;
    Ok(args.into_iter().next().unwrap_or(Value::None))
}

/// Calls `receiver.<name>(...)`.
pub fn call_method(
    receiver: &Value,
    name: &str,
    args: Vec<Value>,
    kwargs: Kwargs,
) -> Result<Value, GradeError> {
    match (receiver, name) {
        (Value::Table(table), "sum") => Ok(Value::Series(table.sum(axis_argument(&args, &kwargs)?))),
        (Value::Table(table), "equals") => Ok(Value::Bool(matches!(
            one_other(name, args, &kwargs)?,
            Value::Table(other) if table.equals(&other)
        ))),
        (Value::Frame(frame), "equals") => Ok(Value::Bool(matches!(
            one_other(name, args, &kwargs)?,
            Value::Frame(other) if frame.equals(&other)
        ))),
        (Value::Series(series), "equals") => Ok(Value::Bool(matches!(
            one_other(name, args, &kwargs)?,
            Value::Series(other) if series.equals(&other)
        ))),
        (Value::Table(_) | Value::Frame(_) | Value::Series(_), "copy") => {
            arity(name, &args, 0)?;
            Ok(receiver.clone())
        }
        (Value::Series(_) | Value::Array(_), "sum" | "mean" | "all" | "any" | "tolist" | "to_list") => {
            no_kwargs(name, &kwargs)?;
            arity(name, &args, 0)?;
            let items = iterate(receiver)?;
            match name {
                "sum" => sum_values(&items),
                "mean" => mean_values(&items),
                "tolist" | "to_list" => Ok(Value::List(items)),
                reduction => numpy(reduction, vec![receiver.clone()], Vec::new()),
            }
        }
        (Value::List(items), "count") => {
            let needle = one_other(name, args, &kwargs)?;
            Ok(int_len(
                items
                    .iter()
                    .filter(|item| ops::values_equal(item, &needle))
                    .count(),
            ))
        }
        (Value::List(items), "index") => {
            let needle = one_other(name, args, &kwargs)?;
            items
                .iter()
                .position(|item| ops::values_equal(item, &needle))
                .map(int_len)
                .ok_or_else(|| value_error(format!("{needle} is not in list")))
        }
        _ => Err(attribute_error(receiver.type_name(), name)),
    }
}

fn labels(items: &[String]) -> Value {
    Value::List(items.iter().cloned().map(Value::Str).collect())
}

/// Reads `receiver.<name>` outside of a call.
pub fn attribute(receiver: &Value, name: &str) -> Result<Value, GradeError> {
    match (receiver, name) {
        (Value::Table(table), "shape") => {
            let (rows, columns) = table.shape();
            Ok(Value::Tuple(vec![int_len(rows), int_len(columns)]))
        }
        (Value::Table(table), "columns") => Ok(labels(table.columns())),
        (Value::Table(table), "index") => Ok(labels(table.rows())),
        (Value::Frame(frame), "shape") => Ok(Value::Tuple(vec![
            int_len(frame.nrows()),
            int_len(frame.columns().len()),
        ])),
        (Value::Frame(frame), "columns") => Ok(labels(&frame.column_names())),
        (Value::Series(series), "shape") => Ok(Value::Tuple(vec![int_len(series.len())])),
        (Value::Series(series), "name") => {
            Ok(series.name.clone().map_or(Value::None, Value::Str))
        }
        (Value::Series(series), "index") => Ok(Value::List(series.index.clone())),
        (Value::Series(series), "values") => Ok(Value::Array(series.values.clone())),
        (Value::Array(items), "shape") => Ok(Value::Tuple(vec![int_len(items.len())])),
        (Value::Array(items), "size") => Ok(int_len(items.len())),
        (Value::Module(module), other) => Err(GradeError::Eval(
            ErrorInfo::new(
                "attribute-error",
                format!("module '{}' has no attribute '{other}'", module.alias()),
            )
            .with_context("attribute", other.to_string()),
        )),
        _ => Err(attribute_error(receiver.type_name(), name)),
    }
}

fn position(len: usize, index: i64, owner: &str) -> Result<usize, GradeError> {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if index < 0 { index + len_i } else { index };
    if (0..len_i).contains(&resolved) {
        usize::try_from(resolved).map_err(|_| index_error(owner))
    } else {
        Err(index_error(owner))
    }
}

fn mask(items: &[Value], flags: &[Value]) -> Result<Vec<Value>, GradeError> {
    if items.len() != flags.len() {
        return Err(eval_error(
            "index-error",
            format!(
                "boolean index did not match indexed array; dimension is {} but corresponding \
                 boolean dimension is {}",
                items.len(),
                flags.len()
            ),
        ));
    }
    let mut kept = Vec::new();
    for (item, flag) in items.iter().zip(flags) {
        match flag {
            Value::Bool(true) => kept.push(item.clone()),
            Value::Bool(false) => {}
            other => {
                return Err(type_error(format!(
                    "boolean mask expected, found '{}'",
                    other.type_name()
                )))
            }
        }
    }
    Ok(kept)
}

/// Evaluates `object[index]`.
pub fn subscript(object: &Value, index: &Value) -> Result<Value, GradeError> {
    match (object, index) {
        (Value::List(items), Value::Int(idx)) => Ok(items[position(items.len(), *idx, "list")?].clone()),
        (Value::Tuple(items), Value::Int(idx)) => {
            Ok(items[position(items.len(), *idx, "tuple")?].clone())
        }
        (Value::Array(items), Value::Int(idx)) => {
            Ok(items[position(items.len(), *idx, "array")?].clone())
        }
        (Value::Array(items), Value::Array(flags)) => mask(items, flags).map(Value::Array),
        (Value::Str(text), Value::Int(idx)) => {
            let chars: Vec<char> = text.chars().collect();
            Ok(Value::Str(
                chars[position(chars.len(), *idx, "string")?].to_string(),
            ))
        }
        (Value::Series(series), Value::Series(flags)) if flags.index == series.index => {
            let values = mask(&series.values, &flags.values)?;
            let index = mask(&series.index, &flags.values)?;
            Series::with_index(series.name.clone(), index, values).map(Value::Series)
        }
        (Value::Series(series), label) => series.get(label).cloned().ok_or_else(|| key_error(label)),
        (Value::Frame(frame), Value::Str(name)) => frame
            .column(name)
            .map(Value::Series)
            .ok_or_else(|| key_error(index)),
        (Value::Table(table), Value::Str(name)) => {
            let counts = table.column(name).ok_or_else(|| key_error(index))?;
            Series::with_index(
                Some(name.clone()),
                table.rows().iter().cloned().map(Value::Str).collect(),
                counts.into_iter().map(Value::Int).collect(),
            )
            .map(Value::Series)
        }
        (Value::Frame(_) | Value::Table(_), other) => Err(key_error(other)),
        (Value::List(_) | Value::Tuple(_) | Value::Array(_) | Value::Str(_), other) => {
            Err(type_error(format!(
                "{} indices must be integers, not {}",
                object.type_name(),
                other.type_name()
            )))
        }
        (other, _) => Err(type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}
