//! Truthiness, equality, ordering and arithmetic over [`Value`]s, including
//! elementwise broadcasting for arrays and series.

use std::cmp::Ordering;

use ams_core::errors::{ErrorInfo, GradeError};
use ams_frame::{Series, Value};

use crate::ast::{BinOp, CmpOp, UnaryOp};

pub(crate) fn eval_error(code: &str, message: impl Into<String>) -> GradeError {
    GradeError::Eval(ErrorInfo::new(code, message.into()))
}

pub(crate) fn type_error(message: impl Into<String>) -> GradeError {
    eval_error("type-error", message)
}

pub(crate) fn value_error(message: impl Into<String>) -> GradeError {
    eval_error("value-error", message)
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(Num::Int(i64::from(*flag))),
            Value::Int(int) => Some(Num::Int(*int)),
            Value::Float(float) => Some(Num::Float(*float)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(int) => int as f64,
            Num::Float(float) => float,
        }
    }
}

fn overflow() -> GradeError {
    eval_error("overflow-error", "integer result out of range")
}

fn zero_division(message: &str) -> GradeError {
    eval_error("zero-division-error", message)
}

/// Truth value of a value, rejecting ambiguous multi-element containers.
pub fn truthy(value: &Value) -> Result<bool, GradeError> {
    Ok(match value {
        Value::None => false,
        Value::Ellipsis | Value::Module(_) => true,
        Value::Bool(flag) => *flag,
        Value::Int(int) => *int != 0,
        Value::Float(float) => *float != 0.0,
        Value::Str(text) => !text.is_empty(),
        Value::List(items) | Value::Tuple(items) => !items.is_empty(),
        Value::Names(names) => !names.is_empty(),
        Value::Array(items) => match items.as_slice() {
            [] => false,
            [single] => truthy(single)?,
            _ => {
                return Err(value_error(
                    "The truth value of an array with more than one element is ambiguous. \
                     Use a.any() or a.all()",
                ))
            }
        },
        Value::Series(_) | Value::Frame(_) | Value::Table(_) => {
            return Err(value_error(format!(
                "The truth value of a {} is ambiguous. Use a.empty, a.bool(), a.item(), \
                 a.any() or a.all().",
                value.type_name()
            )))
        }
    })
}

/// Structural equality: numbers compare by value across int/float/bool,
/// sequences element by element, tables by labels and counts.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    if let (Some(a), Some(b)) = (Num::of(left), Num::of(right)) {
        return match (a, b) {
            (Num::Int(a), Num::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        };
    }
    match (left, right) {
        (Value::None, Value::None) | (Value::Ellipsis, Value::Ellipsis) => true,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(a), Value::List(b))
        | (Value::Tuple(a), Value::Tuple(b))
        | (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Names(a), Value::Names(b)) => a == b,
        (Value::Series(a), Value::Series(b)) => a.equals(b),
        (Value::Frame(a), Value::Frame(b)) => a.equals(b),
        (Value::Table(a), Value::Table(b)) => a.equals(b),
        (Value::Module(a), Value::Module(b)) => a == b,
        _ => false,
    }
}

/// `is` semantics: singletons and booleans are identical to themselves.
pub fn identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::None, Value::None) | (Value::Ellipsis, Value::Ellipsis) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Module(a), Value::Module(b)) => a == b,
        _ => false,
    }
}

fn order(op: CmpOp, left: &Value, right: &Value) -> Result<Option<Ordering>, GradeError> {
    if let (Some(a), Some(b)) = (Num::of(left), Num::of(right)) {
        return Ok(match (a, b) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        });
    }
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
            for (x, y) in a.iter().zip(b) {
                if !values_equal(x, y) {
                    return order(op, x, y);
                }
            }
            Ok(Some(a.len().cmp(&b.len())))
        }
        _ => Err(type_error(format!(
            "'{}' not supported between instances of '{}' and '{}'",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Ordering used by `sorted`, `min` and `max`.
pub(crate) fn less_than(left: &Value, right: &Value) -> Result<bool, GradeError> {
    Ok(order(CmpOp::Lt, left, right)? == Some(Ordering::Less))
}

/// Membership test behind `in`.
pub fn contains(container: &Value, item: &Value) -> Result<bool, GradeError> {
    match container {
        Value::Names(names) => Ok(matches!(item, Value::Str(name) if names.contains(name))),
        Value::List(items) | Value::Tuple(items) | Value::Array(items) => {
            Ok(items.iter().any(|candidate| values_equal(candidate, item)))
        }
        Value::Str(text) => match item {
            Value::Str(needle) => Ok(text.contains(needle.as_str())),
            other => Err(type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::Series(series) => Ok(series.index.iter().any(|label| values_equal(label, item))),
        Value::Frame(frame) => {
            Ok(matches!(item, Value::Str(name) if frame.column_names().contains(name)))
        }
        Value::Table(table) => {
            Ok(matches!(item, Value::Str(name) if table.columns().contains(name)))
        }
        other => Err(type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

fn scalar_compare(op: CmpOp, left: &Value, right: &Value) -> Result<Value, GradeError> {
    let result = match op {
        CmpOp::Eq => values_equal(left, right),
        CmpOp::NotEq => !values_equal(left, right),
        CmpOp::Lt => order(op, left, right)? == Some(Ordering::Less),
        CmpOp::Le => matches!(
            order(op, left, right)?,
            Some(Ordering::Less | Ordering::Equal)
        ),
        CmpOp::Gt => order(op, left, right)? == Some(Ordering::Greater),
        CmpOp::Ge => matches!(
            order(op, left, right)?,
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CmpOp::In => contains(right, left)?,
        CmpOp::NotIn => !contains(right, left)?,
        CmpOp::Is => identical(left, right),
        CmpOp::IsNot => !identical(left, right),
    };
    Ok(Value::Bool(result))
}

/// Evaluates one comparison. `==`, `!=` and the orderings broadcast over
/// arrays and series; `in` and `is` never do.
pub fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<Value, GradeError> {
    if matches!(op, CmpOp::In | CmpOp::NotIn | CmpOp::Is | CmpOp::IsNot) {
        return scalar_compare(op, left, right);
    }
    if let Some(result) = broadcast(left, right, "compare", |a, b| scalar_compare(op, a, b)) {
        return result;
    }
    scalar_compare(op, left, right)
}

fn elements(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) | Value::List(items) | Value::Tuple(items) => Some(items),
        _ => None,
    }
}

fn shape_error(left: usize, right: usize) -> GradeError {
    value_error(format!(
        "operands could not be broadcast together with shapes ({left},) ({right},)"
    ))
}

fn zip_with<F>(left: &[Value], right: &[Value], f: &F) -> Result<Vec<Value>, GradeError>
where
    F: Fn(&Value, &Value) -> Result<Value, GradeError>,
{
    if left.len() != right.len() {
        return Err(shape_error(left.len(), right.len()));
    }
    left.iter().zip(right).map(|(a, b)| f(a, b)).collect()
}

fn series_like(template: &Series, values: Vec<Value>, name: Option<String>) -> Value {
    Value::Series(Series {
        name,
        index: template.index.clone(),
        values,
    })
}

/// Applies `f` elementwise when either side is an array or a series.
/// Returns `None` when neither operand broadcasts.
fn broadcast<F>(left: &Value, right: &Value, what: &str, f: F) -> Option<Result<Value, GradeError>>
where
    F: Fn(&Value, &Value) -> Result<Value, GradeError>,
{
    let result = match (left, right) {
        (Value::Series(a), Value::Series(b)) => {
            if a.index != b.index {
                return Some(Err(value_error(format!(
                    "Can only {what} identically-labeled Series objects"
                ))));
            }
            let name = if a.name == b.name { a.name.clone() } else { None };
            zip_with(&a.values, &b.values, &f).map(|values| series_like(a, values, name))
        }
        (Value::Series(a), other) => match elements(other) {
            Some(items) => {
                zip_with(&a.values, items, &f).map(|values| series_like(a, values, a.name.clone()))
            }
            None => a
                .values
                .iter()
                .map(|value| f(value, other))
                .collect::<Result<Vec<_>, _>>()
                .map(|values| series_like(a, values, a.name.clone())),
        },
        (other, Value::Series(b)) => match elements(other) {
            Some(items) => {
                zip_with(items, &b.values, &f).map(|values| series_like(b, values, b.name.clone()))
            }
            None => b
                .values
                .iter()
                .map(|value| f(other, value))
                .collect::<Result<Vec<_>, _>>()
                .map(|values| series_like(b, values, b.name.clone())),
        },
        (Value::Array(a), other) => match elements(other) {
            Some(items) => zip_with(a, items, &f).map(Value::Array),
            None => a
                .iter()
                .map(|value| f(value, other))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        },
        (other, Value::Array(b)) => match elements(other) {
            Some(items) => zip_with(items, b, &f).map(Value::Array),
            None => b
                .iter()
                .map(|value| f(other, value))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        },
        _ => return None,
    };
    Some(result)
}

fn unsupported(op: BinOp, left: &Value, right: &Value) -> GradeError {
    type_error(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

fn numeric(op: BinOp, a: Num, b: Num) -> Result<Value, GradeError> {
    if let (Num::Int(a), Num::Int(b)) = (a, b) {
        return match op {
            BinOp::Add => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
            BinOp::Sub => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
            BinOp::Mul => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
            BinOp::Div => {
                if b == 0 {
                    Err(zero_division("division by zero"))
                } else {
                    Ok(Value::Float(a as f64 / b as f64))
                }
            }
            BinOp::FloorDiv => {
                if b == 0 {
                    return Err(zero_division("integer division or modulo by zero"));
                }
                let quotient = a.checked_div(b).ok_or_else(overflow)?;
                let adjust = (a % b != 0) && ((a < 0) != (b < 0));
                Ok(Value::Int(if adjust { quotient - 1 } else { quotient }))
            }
            BinOp::Mod => {
                if b == 0 {
                    return Err(zero_division("integer division or modulo by zero"));
                }
                let rem = a.checked_rem(b).ok_or_else(overflow)?;
                Ok(Value::Int(if rem != 0 && ((rem < 0) != (b < 0)) {
                    rem + b
                } else {
                    rem
                }))
            }
            BinOp::Pow => {
                if b < 0 {
                    Ok(Value::Float((a as f64).powf(b as f64)))
                } else {
                    let exponent = u32::try_from(b).map_err(|_| overflow())?;
                    a.checked_pow(exponent).map(Value::Int).ok_or_else(overflow)
                }
            }
        };
    }
    let (a, b) = (a.as_f64(), b.as_f64());
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err(zero_division("float division by zero"));
            }
            a / b
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                return Err(zero_division("float floor division by zero"));
            }
            (a / b).floor()
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(zero_division("float modulo"));
            }
            a - b * (a / b).floor()
        }
        BinOp::Pow => a.powf(b),
    };
    Ok(Value::Float(result))
}

fn repeat(items: &[Value], times: i64) -> Vec<Value> {
    let times = usize::try_from(times).unwrap_or(0);
    items
        .iter()
        .cloned()
        .cycle()
        .take(items.len() * times)
        .collect()
}

fn scalar_binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, GradeError> {
    if let (Some(a), Some(b)) = (Num::of(left), Num::of(right)) {
        return numeric(op, a, b);
    }
    match (op, left, right) {
        (BinOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        (BinOp::Add, Value::List(a), Value::List(b)) => {
            Ok(Value::List(a.iter().chain(b).cloned().collect()))
        }
        (BinOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Ok(Value::Tuple(a.iter().chain(b).cloned().collect()))
        }
        (BinOp::Mul, Value::Str(text), Value::Int(times))
        | (BinOp::Mul, Value::Int(times), Value::Str(text)) => {
            Ok(Value::Str(text.repeat(usize::try_from(*times).unwrap_or(0))))
        }
        (BinOp::Mul, Value::List(items), Value::Int(times))
        | (BinOp::Mul, Value::Int(times), Value::List(items)) => {
            Ok(Value::List(repeat(items, *times)))
        }
        _ => Err(unsupported(op, left, right)),
    }
}

/// Evaluates an arithmetic operator, broadcasting over arrays and series.
pub fn binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, GradeError> {
    if let Some(result) = broadcast(left, right, "operate on", |a, b| scalar_binary(op, a, b)) {
        return result;
    }
    scalar_binary(op, left, right)
}

/// Evaluates a unary operator.
pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, GradeError> {
    if op == UnaryOp::Not {
        return Ok(Value::Bool(!truthy(operand)?));
    }
    let apply = |value: &Value| -> Result<Value, GradeError> {
        match (op, Num::of(value)) {
            (UnaryOp::Neg, Some(Num::Int(int))) => {
                int.checked_neg().map(Value::Int).ok_or_else(overflow)
            }
            (UnaryOp::Neg, Some(Num::Float(float))) => Ok(Value::Float(-float)),
            (UnaryOp::Pos, Some(Num::Int(int))) => Ok(Value::Int(int)),
            (UnaryOp::Pos, Some(Num::Float(float))) => Ok(Value::Float(float)),
            _ => Err(type_error(format!(
                "bad operand type for unary {}: '{}'",
                if op == UnaryOp::Neg { "-" } else { "+" },
                value.type_name()
            ))),
        }
    };
    match operand {
        Value::Array(items) => items
            .iter()
            .map(apply)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Series(series) => series
            .values
            .iter()
            .map(apply)
            .collect::<Result<Vec<_>, _>>()
            .map(|values| series_like(series, values, series.name.clone())),
        scalar => apply(scalar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_division_semantics() {
        assert_eq!(
            binary(BinOp::FloorDiv, &Value::Int(-7), &Value::Int(2)).unwrap(),
            Value::Int(-4)
        );
        assert_eq!(
            binary(BinOp::Mod, &Value::Int(-7), &Value::Int(2)).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            binary(BinOp::Div, &Value::Int(17), &Value::Int(1000)).unwrap(),
            Value::Float(0.017)
        );
        let err = binary(BinOp::Div, &Value::Int(1), &Value::Int(0)).unwrap_err();
        assert_eq!(err.code(), "zero-division-error");
    }

    #[test]
    fn mixed_numeric_equality() {
        assert!(values_equal(&Value::Int(1), &Value::Float(1.0)));
        assert!(values_equal(&Value::Bool(true), &Value::Int(1)));
        assert!(!values_equal(&Value::Str("1".into()), &Value::Int(1)));
    }

    #[test]
    fn arrays_broadcast_against_scalars() {
        let stats = Value::Array(vec![Value::Int(4), Value::Int(5), Value::Int(19)]);
        assert_eq!(
            compare(CmpOp::Ge, &stats, &Value::Int(5)).unwrap(),
            Value::Array(vec![Value::Bool(false), Value::Bool(true), Value::Bool(true)])
        );
        let err = truthy(&stats).unwrap_err();
        assert_eq!(err.code(), "value-error");
    }

    #[test]
    fn mismatched_series_labels_fail() {
        let a = Series::from_values(None, vec![Value::Int(1)]);
        let mut b = a.clone();
        b.index = vec![Value::from("x")];
        let err = compare(CmpOp::Eq, &Value::Series(a), &Value::Series(b)).unwrap_err();
        assert_eq!(err.code(), "value-error");
    }
}
