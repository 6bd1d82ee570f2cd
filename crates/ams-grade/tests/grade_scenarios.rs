mod common;

use ams_frame::{Environment, Value};
use ams_grade::registry::{self, find};
use ams_grade::{grade, run, OutcomeStatus, Policy};
use ams_perm::{placeholder_environment, reference_table};

use common::{fake_stats, solved_environment};

#[test]
fn solved_environment_earns_full_points() {
    let env = solved_environment();
    for group in registry::load() {
        let result = run(&group, &env);
        assert_eq!(
            result.points_earned, group.points,
            "{} failed: {:?}",
            group.name, result.outcomes
        );
        assert_eq!(result.assertions_passed, result.assertions_total);
        assert_eq!(result.assertions_total, group.assertion_count());
    }
}

#[test]
fn missing_variable_fails_the_exists_check() {
    let mut env = solved_environment();
    env.remove("people");
    let group = find("Question people").unwrap();
    let result = run(&group, &env);
    assert_eq!(result.points_earned, 0.0);
    let first = &result.outcomes[0];
    assert_eq!(first.status, OutcomeStatus::Failed);
    assert_eq!(first.actual.as_deref(), Some("False"));
    assert_eq!(
        first.hint.as_deref(),
        Some("You need to set the value for 'people'")
    );
    let second = &result.outcomes[1];
    assert_eq!(second.status, OutcomeStatus::Errored);
    assert_eq!(
        second.actual.as_deref(),
        Some("NameError: name 'people' is not defined")
    );
    assert_eq!(second.error.as_ref().map(|err| err.code()), Some("name-error"));
}

#[test]
fn row_count_matches_table_total() {
    let env = solved_environment();
    let result = run(&find("Question row_lists").unwrap(), &env);
    assert!(result.outcomes[2].passed());
    assert!(result.outcomes[3].passed());
}

#[test]
fn fake_stats_length_is_checked() {
    let group = find("Question 05_fake_counts").unwrap();
    let env = solved_environment();
    assert_eq!(run(&group, &env).points_earned, 1.0);

    let short = solved_environment().with("fake_stats", fake_stats(999));
    let result = run(&group, &short);
    assert_eq!(result.points_earned, 0.0);
    let failed: Vec<_> = result.failures().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].source.as_deref(), Some("len(fake_stats)"));
    assert_eq!(failed[0].expected.as_deref(), Some("1000"));
    assert_eq!(failed[0].actual.as_deref(), Some("999"));
}

#[test]
fn out_of_range_fake_stats_fail() {
    let group = find("Question 05_fake_counts").unwrap();
    let mut stats: Vec<Value> = (0..1000).map(|_| Value::Int(10)).collect();
    stats[3] = Value::Int(20);
    let env = solved_environment().with("fake_stats", Value::Array(stats));
    let result = run(&group, &env);
    assert_eq!(result.points_earned, 0.0);
    assert_eq!(result.assertions_passed, result.assertions_total - 1);
}

#[test]
fn large_p_estimate_is_all_or_nothing() {
    let group = find("Question 06_p_est").unwrap();
    let env = solved_environment().with("p_est", 0.2);
    let result = run(&group, &env);
    assert!(result.outcomes[2].passed(), "0.2 is a proportion");
    assert_eq!(result.outcomes[3].status, OutcomeStatus::Failed);
    assert_eq!(result.outcomes[3].actual.as_deref(), Some("False"));
    assert_eq!(result.assertions_passed, 3);
    assert_eq!(result.points_earned, 0.0);
}

#[test]
fn placeholder_fails_every_reassignment_check() {
    let env = placeholder_environment(&reference_table().unwrap());
    for group in registry::load() {
        let result = run(&group, &env);
        assert_eq!(result.points_earned, 0.0, "{}", group.name);
        for outcome in &result.outcomes {
            if group.suites[outcome.suite].cases[outcome.case]
                .code
                .contains("is not ...")
            {
                assert_eq!(outcome.status, OutcomeStatus::Failed, "{}", group.name);
            }
        }
    }
}

#[test]
fn grading_continues_past_failing_groups() {
    let env = Environment::new();
    let report = grade(&registry::load(), &env, &Policy::default()).unwrap();
    assert_eq!(report.groups.len(), 6);
    assert_eq!(report.points_earned, 0.0);
    assert_eq!(report.points_possible, 6.0);
    for group in &report.groups {
        assert_eq!(group.outcomes.len(), find(&group.group_name).unwrap().assertion_count());
    }
}

#[test]
fn environment_is_not_mutated() {
    let env = solved_environment();
    let before = env.clone();
    let _ = grade(&registry::load(), &env, &Policy::default()).unwrap();
    assert_eq!(env, before);
}
