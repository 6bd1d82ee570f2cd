//! Grading policy: failure flow, scoring and output comparison, loaded from YAML.

use ams_core::errors::GradeError;
use serde::{Deserialize, Serialize};

use crate::serde::from_yaml_slice;

/// What happens to the remaining cases of a group after one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Evaluate every case regardless of earlier failures.
    #[default]
    Continue,
    /// Mark the remaining cases of the group as skipped.
    StopGroup,
}

/// How points are derived from case outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    /// Full points only when every counted case passes.
    #[default]
    AllOrNothing,
    /// `points * passed / total`.
    Proportional,
}

impl Scoring {
    /// Points earned for `passed` of `total` counted cases.
    pub fn award(&self, points: f64, passed: usize, total: usize) -> f64 {
        match self {
            Scoring::AllOrNothing if passed == total => points,
            Scoring::AllOrNothing => 0.0,
            Scoring::Proportional if total == 0 => points,
            Scoring::Proportional => points * passed as f64 / total as f64,
        }
    }
}

/// Grading policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    /// Behaviour after a failed case.
    #[serde(default)]
    pub failure: FailurePolicy,
    /// Point computation.
    #[serde(default)]
    pub scoring: Scoring,
    /// Grade hidden cases; when false they are dropped from the totals.
    #[serde(default = "Policy::default_include_hidden")]
    pub include_hidden: bool,
    /// Compare outputs after trimming trailing whitespace and blank edge lines.
    #[serde(default = "Policy::default_normalize_whitespace")]
    pub normalize_whitespace: bool,
}

impl Policy {
    const fn default_include_hidden() -> bool {
        true
    }

    const fn default_normalize_whitespace() -> bool {
        true
    }

    /// Parses a YAML policy file; missing fields take their defaults.
    pub fn from_yaml_slice(data: &[u8]) -> Result<Self, GradeError> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        from_yaml_slice(data)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            failure: FailurePolicy::default(),
            scoring: Scoring::default(),
            include_hidden: Self::default_include_hidden(),
            normalize_whitespace: Self::default_normalize_whitespace(),
        }
    }
}
