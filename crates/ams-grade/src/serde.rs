//! Serialization helpers: canonical JSON for records and reports, YAML for
//! policy files.

use ams_core::errors::{ErrorInfo, GradeError};
use serde::{de::DeserializeOwned, Serialize};

pub use ams_frame::serde::{from_json_slice, to_canonical_json_bytes};

fn serde_error(code: &str, err: impl ToString) -> GradeError {
    GradeError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Serializes a value into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, GradeError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml_serialize", err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, GradeError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml_deserialize", err))
}
