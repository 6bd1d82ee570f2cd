use ams_core::errors::{ErrorInfo, GradeError};
use ams_core::provenance::SchemaVersion;
use ams_frame::hash::stable_hash_string;
use serde::{Deserialize, Serialize};

use crate::policies::Policy;
use crate::serde::to_canonical_json_bytes;

/// Outcome of a single case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Every example printed its expected output.
    Passed,
    /// An example printed something else.
    Failed,
    /// Parsing or evaluation raised an unexpected error.
    Errored,
    /// Locked case; never evaluated and never passes.
    Locked,
    /// Not evaluated because of the policy.
    Skipped,
}

/// Result of one case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionOutcome {
    /// Suite position within the group.
    pub suite: usize,
    /// Case position within the suite.
    pub case: usize,
    /// Final status.
    pub status: OutcomeStatus,
    /// Whether the case was hidden.
    pub hidden: bool,
    /// Whether the case contributes to the totals.
    pub counted: bool,
    /// Source of the first example that did not pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Output the example was expected to print.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Output it actually printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    /// Hint attached to the example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Error raised while evaluating the case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<GradeError>,
}

impl AssertionOutcome {
    pub(crate) fn new(suite: usize, case: usize, status: OutcomeStatus, hidden: bool) -> Self {
        Self {
            suite,
            case,
            status,
            hidden,
            counted: true,
            source: None,
            expected: None,
            actual: None,
            hint: None,
            error: None,
        }
    }

    /// Whether the case passed.
    pub fn passed(&self) -> bool {
        self.status == OutcomeStatus::Passed
    }
}

/// Score of one check group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupResult {
    /// Name of the graded group.
    pub group_name: String,
    /// Points awarded.
    pub points_earned: f64,
    /// Points the group is worth.
    pub points_possible: f64,
    /// Counted cases that passed.
    pub assertions_passed: usize,
    /// Counted cases.
    pub assertions_total: usize,
    /// Every case, counted or not, in evaluation order.
    pub outcomes: Vec<AssertionOutcome>,
    /// Setup and teardown diagnostics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl GroupResult {
    /// Whether every counted case passed.
    pub fn all_passed(&self) -> bool {
        self.assertions_passed == self.assertions_total
    }

    /// Counted cases that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &AssertionOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.counted && !outcome.passed())
    }
}

/// Provenance metadata attached to [`GradeReport`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeProvenance {
    /// Report schema.
    pub schema_version: SchemaVersion,
    /// Policy applied during grading.
    pub policy: Policy,
    /// Stable hash of the graded environment.
    pub environment_hash: String,
    /// Names of the graded groups in order.
    pub group_order: Vec<String>,
}

/// Aggregated report over every graded group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeReport {
    /// Content-addressed hash of the report payload.
    pub analysis_hash: String,
    /// Per-group results in grading order.
    pub groups: Vec<GroupResult>,
    /// Sum of points awarded.
    pub points_earned: f64,
    /// Sum of points available.
    pub points_possible: f64,
    /// Policy and input hashes.
    pub provenance: GradeProvenance,
}

impl GradeReport {
    /// Builds a report from group results while computing the stable hash.
    pub fn new(groups: Vec<GroupResult>, provenance: GradeProvenance) -> Result<Self, GradeError> {
        validate_results(&groups)?;
        let points_earned = groups.iter().map(|group| group.points_earned).sum();
        let points_possible = groups.iter().map(|group| group.points_possible).sum();
        let analysis_hash = stable_hash_string(&(&groups, &provenance))?;
        Ok(Self {
            analysis_hash,
            groups,
            points_earned,
            points_possible,
            provenance,
        })
    }

    /// Result for the named group.
    pub fn group(&self, name: &str) -> Option<&GroupResult> {
        self.groups.iter().find(|group| group.group_name == name)
    }

    /// Persists the report as canonical JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GradeError> {
        to_canonical_json_bytes(self)
    }
}

/// Validates that at least one group was graded.
pub fn validate_results(groups: &[GroupResult]) -> Result<(), GradeError> {
    if groups.is_empty() {
        return Err(GradeError::Registry(ErrorInfo::new(
            "empty-report",
            "at least one group must be graded",
        )));
    }
    Ok(())
}

/// Notebook-style exception name for an error.
pub fn exception_label(err: &GradeError) -> &'static str {
    if let GradeError::Syntax(_) = err {
        return "SyntaxError";
    }
    match err.code() {
        "name-error" => "NameError",
        "type-error" => "TypeError",
        "value-error" => "ValueError",
        "key-error" => "KeyError",
        "index-error" => "IndexError",
        "attribute-error" => "AttributeError",
        "zero-division-error" => "ZeroDivisionError",
        "overflow-error" => "OverflowError",
        _ => "Exception",
    }
}

/// Final traceback line for an error, e.g. `NameError: name 'x' is not defined`.
pub fn render_exception(err: &GradeError) -> String {
    format!("{}: {}", exception_label(err), err.info().message)
}
