use std::collections::BTreeMap;

use ams_core::errors::GradeError;
use serde::{Deserialize, Serialize};

use crate::hash::stable_hash_string;
use crate::serde::{from_json_slice, to_canonical_json_bytes};
use crate::value::Value;

/// State of a single exercise variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Binding {
    /// Still holds the `...` placeholder the exercise started with.
    Unset,
    /// Reassigned by the student.
    Set(Value),
}

impl Binding {
    /// The value assertion code observes; unset bindings read as `...`.
    pub fn value(&self) -> Value {
        match self {
            Binding::Unset => Value::Ellipsis,
            Binding::Set(value) => value.clone(),
        }
    }

    /// Whether the binding was reassigned.
    pub fn is_set(&self) -> bool {
        matches!(self, Binding::Set(_))
    }
}

/// Read-only variable bindings produced by a student's solution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    bindings: BTreeMap<String, Binding>,
}

impl Environment {
    /// Empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Environment::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Builder-style [`Environment::set_unset`].
    pub fn with_unset(mut self, name: impl Into<String>) -> Self {
        self.set_unset(name);
        self
    }

    /// Binds `name` to a value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name.into(), Binding::Set(value.into()));
    }

    /// Declares `name` but leaves it at its placeholder.
    pub fn set_unset(&mut self, name: impl Into<String>) {
        self.bindings.insert(name.into(), Binding::Unset);
    }

    /// Removes a binding entirely.
    pub fn remove(&mut self, name: &str) -> Option<Binding> {
        self.bindings.remove(name)
    }

    /// Binding for `name`.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Value observed for `name`, if declared.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).map(Binding::value)
    }

    /// Whether `name` is declared, set or not.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Declared names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Number of declared names.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Parses an environment file.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, GradeError> {
        from_json_slice(data)
    }

    /// Canonical JSON bytes of the environment.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GradeError> {
        to_canonical_json_bytes(self)
    }

    /// Content hash recorded in grading provenance.
    pub fn stable_hash(&self) -> Result<String, GradeError> {
        stable_hash_string(self)
    }
}
