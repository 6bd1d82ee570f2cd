//! The check groups of the AMS vs. Drug permutation exercise.

use std::collections::BTreeSet;

use ams_core::errors::{ErrorInfo, GradeError};
use serde::{Deserialize, Serialize};

use crate::doctest;
use crate::parser::parse_statement;
use crate::serde::{from_json_slice, to_canonical_json_bytes};

/// Execution mode of a suite. Only interactive transcripts exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteKind {
    /// `>>>` transcripts compared against expected output.
    #[default]
    Doctest,
}

/// A single assertion: a doctest transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Transcript source.
    pub code: String,
    /// Hidden from students; graded unless the policy excludes it.
    #[serde(default)]
    pub hidden: bool,
    /// Locked cases are never evaluated.
    #[serde(default)]
    pub locked: bool,
}

impl Case {
    /// Visible, unlocked case.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            hidden: false,
            locked: false,
        }
    }
}

/// Ordered cases sharing setup and teardown code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    /// Cases in evaluation order.
    pub cases: Vec<Case>,
    /// Whether the suite counts towards the score.
    #[serde(default = "Suite::default_scored")]
    pub scored: bool,
    /// Transcript executed before the first case.
    #[serde(default)]
    pub setup: String,
    /// Transcript executed after the last case.
    #[serde(default)]
    pub teardown: String,
    /// Execution mode.
    #[serde(rename = "type", default)]
    pub kind: SuiteKind,
}

impl Suite {
    const fn default_scored() -> bool {
        true
    }

    /// Scored doctest suite without setup or teardown.
    pub fn doctest(cases: Vec<Case>) -> Self {
        Self {
            cases,
            scored: true,
            setup: String::new(),
            teardown: String::new(),
            kind: SuiteKind::Doctest,
        }
    }
}

/// One graded question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckGroup {
    /// Display name, unique within a registry.
    pub name: String,
    /// Points awarded when the group passes.
    pub points: f64,
    /// Suites in evaluation order.
    pub suites: Vec<Suite>,
}

impl CheckGroup {
    /// All cases of all suites in evaluation order.
    pub fn cases(&self) -> impl Iterator<Item = &Case> {
        self.suites.iter().flat_map(|suite| suite.cases.iter())
    }

    /// Number of cases across suites.
    pub fn assertion_count(&self) -> usize {
        self.cases().count()
    }

    /// Parses a single exported record and validates it.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, GradeError> {
        let group: CheckGroup = from_json_slice(data)?;
        validate(std::slice::from_ref(&group))?;
        Ok(group)
    }

    /// Canonical JSON record consumed by external runners.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GradeError> {
        to_canonical_json_bytes(self)
    }
}

fn registry_error(code: &str, message: impl Into<String>, group: &str) -> GradeError {
    GradeError::Registry(ErrorInfo::new(code, message).with_context("group", group.to_string()))
}

/// "Variable exists" and "variable reassigned from its placeholder" cases.
pub fn presence_cases(name: &str) -> Vec<Case> {
    vec![
        Case::new(format!(
            ">>> # You need to set the value for '{name}'\n>>> '{name}' in vars()\nTrue\n"
        )),
        Case::new(format!(
            ">>> # You haven't changed the value for '{name}'\n\
             >>> # from its initial state (of ...)\n\
             >>> {name} is not ...\nTrue\n"
        )),
    ]
}

fn question(name: &str, cases: Vec<Case>) -> CheckGroup {
    CheckGroup {
        name: format!("Question {name}"),
        points: 1.0,
        suites: vec![Suite::doctest(cases)],
    }
}

fn checks(variables: &[&str], transcripts: &[&str]) -> Vec<Case> {
    variables
        .iter()
        .flat_map(|variable| presence_cases(variable))
        .chain(transcripts.iter().map(|code| Case::new(*code)))
        .collect()
}

/// Every check group in declaration order.
pub fn load() -> Vec<CheckGroup> {
    vec![
        question(
            "row_lists",
            checks(
                &["row_lists"],
                &[
                    ">>> len(row_lists) == ams_counts.sum().sum()\nTrue\n",
                    ">>> has_plac = [row for row in row_lists if row == ['Had AMS', 'Placebo']]\n\
                     >>> len(has_plac)\n17\n",
                ],
            ),
        ),
        question(
            "people",
            checks(
                &["people"],
                &[
                    ">>> len(people) == ams_counts.sum().sum()\nTrue\n",
                    ">>> list(people) == ['AMS', 'Drug']\nTrue\n",
                    ">>> pd.crosstab(people['AMS'], people['Drug']).equals(ams_counts)\nTrue\n",
                ],
            ),
        ),
        question(
            "ams",
            checks(
                &["ams", "drug"],
                &[">>> pd.crosstab(ams, drug).equals(ams_counts)\nTrue\n"],
            ),
        ),
        question(
            "04_fake_ams_counts",
            checks(
                &["fake_ams_counts"],
                &[
                    ">>> np.all(fake_ams_counts.sum() == ams_counts.sum())\nTrue\n",
                    ">>> np.all(fake_ams_counts.sum(axis=1) == ams_counts.sum(axis=1))\nTrue\n",
                ],
            ),
        ),
        question(
            "05_fake_counts",
            checks(
                &["fake_stats"],
                &[
                    ">>> len(fake_stats)\n1000\n",
                    ">>> np.all(fake_stats >= 5)\nTrue\n",
                    ">>> np.all(fake_stats <= 19)\nTrue\n",
                ],
            ),
        ),
        question(
            "06_p_est",
            checks(
                &["p_est"],
                &[
                    ">>> # Must be a proportion\n>>> 0 <= p_est <= 1\nTrue\n",
                    ">>> 0 <= p_est <= 0.01\nTrue\n",
                ],
            ),
        ),
    ]
}

/// Group with the given name.
pub fn find(name: &str) -> Option<CheckGroup> {
    load().into_iter().find(|group| group.name == name)
}

/// Checks that group names are unique, points positive, every group has at
/// least one case and every transcript parses.
pub fn validate(groups: &[CheckGroup]) -> Result<(), GradeError> {
    let mut seen = BTreeSet::new();
    for group in groups {
        if !seen.insert(group.name.as_str()) {
            return Err(registry_error(
                "duplicate-group",
                format!("group '{}' is declared twice", group.name),
                &group.name,
            ));
        }
        if !(group.points.is_finite() && group.points > 0.0) {
            return Err(registry_error(
                "non-positive-points",
                format!("group '{}' is worth {} points", group.name, group.points),
                &group.name,
            ));
        }
        if group.assertion_count() == 0 {
            return Err(registry_error(
                "empty-group",
                format!("group '{}' has no cases", group.name),
                &group.name,
            ));
        }
        for (idx, case) in group.cases().enumerate() {
            let parsed = doctest::parse(&case.code).and_then(|examples| {
                examples
                    .iter()
                    .try_for_each(|example| parse_statement(&example.source).map(|_| ()))
            });
            if let Err(err) = parsed {
                return Err(GradeError::Registry(
                    ErrorInfo::new("invalid-case", err.info().message.clone())
                        .with_context("group", group.name.clone())
                        .with_context("case", idx.to_string())
                        .with_context("cause", err.code().to_string()),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_cases_cover_both_checks() {
        let cases = presence_cases("p_est");
        assert_eq!(cases.len(), 2);
        assert!(cases[0].code.contains("'p_est' in vars()"));
        assert!(cases[1].code.contains("p_est is not ..."));
    }

    #[test]
    fn lookup_by_name() {
        let group = find("Question 06_p_est").unwrap();
        assert_eq!(group.assertion_count(), 4);
        assert!(find("Question 07").is_none());
    }
}
