//! Evaluates check groups against an environment and scores them.

use ams_core::errors::GradeError;
use ams_core::provenance::SchemaVersion;
use ams_frame::{Environment, Value};
use tracing::{debug, info, warn};

use crate::doctest::{self, normalize_output, Example};
use crate::eval::Interpreter;
use crate::policies::{FailurePolicy, Policy};
use crate::registry::{Case, CheckGroup, Suite};
use crate::report::{
    render_exception, AssertionOutcome, GradeProvenance, GradeReport, GroupResult, OutcomeStatus,
};

const TRACEBACK_HEADER: &str = "Traceback (most recent call last):";

/// Grades a group with the default policy.
pub fn run(group: &CheckGroup, environment: &Environment) -> GroupResult {
    run_with_policy(group, environment, &Policy::default())
}

/// Grades a group. Evaluation errors become failed outcomes; they never
/// abort the run.
pub fn run_with_policy(
    group: &CheckGroup,
    environment: &Environment,
    policy: &Policy,
) -> GroupResult {
    info!(group = %group.name, "grading group");
    let mut outcomes = Vec::with_capacity(group.assertion_count());
    let mut notes = Vec::new();
    let mut stopped = false;
    for (suite_idx, suite) in group.suites.iter().enumerate() {
        run_suite(
            suite_idx,
            suite,
            environment,
            policy,
            &mut stopped,
            &mut outcomes,
            &mut notes,
        );
    }
    let assertions_total = outcomes.iter().filter(|outcome| outcome.counted).count();
    let assertions_passed = outcomes
        .iter()
        .filter(|outcome| outcome.counted && outcome.passed())
        .count();
    let points_earned = policy
        .scoring
        .award(group.points, assertions_passed, assertions_total);
    info!(
        group = %group.name,
        passed = assertions_passed,
        total = assertions_total,
        points = points_earned,
        "group graded"
    );
    GroupResult {
        group_name: group.name.clone(),
        points_earned,
        points_possible: group.points,
        assertions_passed,
        assertions_total,
        outcomes,
        notes,
    }
}

/// Grades every group and assembles the hashed report. A failing group never
/// stops the others.
pub fn grade(
    groups: &[CheckGroup],
    environment: &Environment,
    policy: &Policy,
) -> Result<GradeReport, GradeError> {
    let results: Vec<GroupResult> = groups
        .iter()
        .map(|group| run_with_policy(group, environment, policy))
        .collect();
    let provenance = GradeProvenance {
        schema_version: SchemaVersion::default(),
        policy: policy.clone(),
        environment_hash: environment.stable_hash()?,
        group_order: groups.iter().map(|group| group.name.clone()).collect(),
    };
    GradeReport::new(results, provenance)
}

fn run_suite(
    suite_idx: usize,
    suite: &Suite,
    environment: &Environment,
    policy: &Policy,
    stopped: &mut bool,
    outcomes: &mut Vec<AssertionOutcome>,
    notes: &mut Vec<String>,
) {
    let mut interp = Interpreter::new(environment);
    let setup_error = run_script(&mut interp, &suite.setup).err();
    if let Some(err) = &setup_error {
        warn!(suite = suite_idx, error = %err, "suite setup failed");
        notes.push(format!("suite {suite_idx} setup failed: {}", render_exception(err)));
    }
    for (case_idx, case) in suite.cases.iter().enumerate() {
        let excluded = case.hidden && !policy.include_hidden;
        let counted = suite.scored && !excluded;
        let mut outcome = if excluded {
            AssertionOutcome::new(suite_idx, case_idx, OutcomeStatus::Skipped, true)
        } else if *stopped {
            AssertionOutcome::new(suite_idx, case_idx, OutcomeStatus::Skipped, case.hidden)
        } else if case.locked {
            AssertionOutcome::new(suite_idx, case_idx, OutcomeStatus::Locked, case.hidden)
        } else if let Some(err) = &setup_error {
            let mut outcome =
                AssertionOutcome::new(suite_idx, case_idx, OutcomeStatus::Errored, case.hidden);
            outcome.error = Some(err.clone());
            outcome
        } else {
            run_case(&mut interp, suite_idx, case_idx, case, policy)
        };
        outcome.counted = counted;
        debug!(
            suite = suite_idx,
            case = case_idx,
            status = ?outcome.status,
            counted,
            "case evaluated"
        );
        if counted
            && policy.failure == FailurePolicy::StopGroup
            && matches!(outcome.status, OutcomeStatus::Failed | OutcomeStatus::Errored)
        {
            *stopped = true;
        }
        outcomes.push(outcome);
    }
    if let Err(err) = run_script(&mut interp, &suite.teardown) {
        warn!(suite = suite_idx, error = %err, "suite teardown failed");
        notes.push(format!(
            "suite {suite_idx} teardown failed: {}",
            render_exception(&err)
        ));
    }
}

/// Runs setup or teardown code, either a transcript or plain statements one
/// per line. Output is discarded.
fn run_script(interp: &mut Interpreter<'_>, script: &str) -> Result<(), GradeError> {
    if script.trim().is_empty() {
        return Ok(());
    }
    if script.contains(">>>") {
        for example in doctest::parse(script)? {
            interp.run_source(&example.source)?;
        }
        return Ok(());
    }
    for line in script.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        interp.run_source(line)?;
    }
    Ok(())
}

fn run_case(
    interp: &mut Interpreter<'_>,
    suite_idx: usize,
    case_idx: usize,
    case: &Case,
    policy: &Policy,
) -> AssertionOutcome {
    let mut outcome =
        AssertionOutcome::new(suite_idx, case_idx, OutcomeStatus::Passed, case.hidden);
    let examples = match doctest::parse(&case.code) {
        Ok(examples) => examples,
        Err(err) => {
            warn!(suite = suite_idx, case = case_idx, error = %err, "case does not parse");
            outcome.status = OutcomeStatus::Errored;
            outcome.error = Some(err);
            return outcome;
        }
    };
    for example in &examples {
        let result = interp.run_source(&example.source);
        let (actual, error) = match result {
            Ok(value) => (echo(value), None),
            Err(err) => (render_exception(&err), Some(err)),
        };
        if outputs_match(example, &actual, error.as_ref(), policy) {
            continue;
        }
        outcome.status = if error.is_some() {
            OutcomeStatus::Errored
        } else {
            OutcomeStatus::Failed
        };
        if let Some(err) = &error {
            debug!(error = %err, source = %example.source, "example raised");
        }
        outcome.source = Some(example.source.clone());
        outcome.expected = Some(example.expected.clone());
        outcome.actual = Some(actual);
        outcome.hint = example.hint.clone();
        outcome.error = error;
        return outcome;
    }
    outcome
}

/// What a notebook prints for a statement result.
fn echo(value: Option<Value>) -> String {
    match value {
        None | Some(Value::None) => String::new(),
        Some(value) => value.to_string(),
    }
}

fn outputs_match(
    example: &Example,
    actual: &str,
    error: Option<&GradeError>,
    policy: &Policy,
) -> bool {
    let expected = if policy.normalize_whitespace {
        normalize_output(&example.expected)
    } else {
        example.expected.clone()
    };
    match error {
        // An expected traceback is matched on its final line only.
        Some(_) => {
            expected.starts_with(TRACEBACK_HEADER)
                && expected.lines().last().map(str::trim_end) == Some(actual)
        }
        None if policy.normalize_whitespace => expected == normalize_output(actual),
        None => expected == actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_tracebacks_match_on_last_line() {
        let example = Example {
            source: "x".into(),
            expected: format!("{TRACEBACK_HEADER}\n    ...\nNameError: name 'x' is not defined"),
            hint: None,
        };
        let env = Environment::new();
        let err = Interpreter::new(&env).run_source("x").unwrap_err();
        let actual = render_exception(&err);
        assert!(outputs_match(&example, &actual, Some(&err), &Policy::default()));
    }

    #[test]
    fn none_results_print_nothing() {
        assert_eq!(echo(Some(Value::None)), "");
        assert_eq!(echo(None), "");
        assert_eq!(echo(Some(Value::Bool(true))), "True");
    }
}
