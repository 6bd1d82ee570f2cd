//! Canonical JSON for the grader's artefacts: environment files written by
//! `simulate`, exported check-group records and `grade_report.json`.
//!
//! Object keys are sorted recursively so equal values always produce equal
//! bytes, which is what the report and environment hashes rely on.

use std::collections::BTreeMap;
use std::iter::FromIterator;

use ams_core::errors::{ErrorInfo, GradeError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

fn serde_error(code: &str, err: impl ToString) -> GradeError {
    GradeError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, GradeError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| serde_error("json_write", err))?;
    Ok(bytes)
}

/// Deserializes a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, GradeError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json_deserialize", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn keys_are_sorted_at_every_depth() {
        let mut inner = HashMap::new();
        inner.insert("p_est", 0.004);
        inner.insert("fake_stats", 11.0);
        let mut outer = HashMap::new();
        outer.insert("zeta", inner.clone());
        outer.insert("alpha", inner);
        let text = String::from_utf8(to_canonical_json_bytes(&outer).unwrap()).unwrap();
        assert_eq!(
            text,
            r#"{"alpha":{"fake_stats":11.0,"p_est":0.004},"zeta":{"fake_stats":11.0,"p_est":0.004}}"#
        );
    }

    #[test]
    fn malformed_input_reports_serde_family() {
        let err = from_json_slice::<Vec<u8>>(b"[1,").unwrap_err();
        assert_eq!(err.code(), "json_deserialize");
        assert!(matches!(err, GradeError::Serde(_)));
    }
}
