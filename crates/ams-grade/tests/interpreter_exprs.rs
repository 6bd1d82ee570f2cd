mod common;

use ams_frame::Environment;
use ams_grade::Interpreter;

use common::solved_environment;

fn echo(env: &Environment, source: &str) -> String {
    Interpreter::new(env)
        .run_source(source)
        .unwrap_or_else(|err| panic!("{source}: {err}"))
        .map(|value| value.to_string())
        .unwrap_or_default()
}

fn error_code(env: &Environment, source: &str) -> String {
    Interpreter::new(env)
        .run_source(source)
        .expect_err(source)
        .code()
        .to_string()
}

#[test]
fn table_reductions() {
    let env = solved_environment();
    assert_eq!(echo(&env, "ams_counts.sum().sum()"), "100");
    assert_eq!(echo(&env, "ams_counts.sum(axis=1)['Had AMS']"), "22");
    assert_eq!(echo(&env, "ams_counts.sum(axis='columns')['No AMS']"), "78");
    assert_eq!(echo(&env, "ams_counts['Placebo']['Had AMS']"), "17");
    assert_eq!(echo(&env, "ams_counts.shape"), "(2, 2)");
    assert_eq!(echo(&env, "np.sum(ams_counts)"), "100");
    assert_eq!(error_code(&env, "ams_counts.sum(axis=2)"), "value-error");
}

#[test]
fn crosstab_of_frame_columns() {
    let env = solved_environment();
    assert_eq!(
        echo(&env, "pd.crosstab(people['AMS'], people['Drug']).equals(ams_counts)"),
        "True"
    );
    assert_eq!(
        echo(&env, "pd.crosstab(people['Drug'], people['AMS']).equals(ams_counts)"),
        "False"
    );
    assert_eq!(echo(&env, "list(people)"), "['AMS', 'Drug']");
    assert_eq!(echo(&env, "len(people)"), "100");
}

#[test]
fn array_predicates() {
    let env = solved_environment();
    assert_eq!(echo(&env, "np.all(fake_stats >= 5)"), "True");
    assert_eq!(echo(&env, "np.any(fake_stats > 19)"), "False");
    assert_eq!(echo(&env, "np.count_nonzero(fake_stats == 5)"), "67");
    assert_eq!(echo(&env, "(min(fake_stats), max(fake_stats))"), "(5, 19)");
    assert_eq!(echo(&env, "np.mean(np.array([1, 2, 3, 4]))"), "2.5");
    assert_eq!(error_code(&env, "fake_stats >= 5 and True"), "value-error");
}

#[test]
fn python_style_reprs() {
    let env = Environment::new();
    assert_eq!(echo(&env, "17 / 1000"), "0.017");
    assert_eq!(echo(&env, "2 ** 10"), "1024");
    assert_eq!(echo(&env, "1e-5"), "1e-05");
    assert_eq!(echo(&env, "1.0"), "1.0");
    assert_eq!(echo(&env, "'Had AMS'"), "'Had AMS'");
    assert_eq!(echo(&env, "[1, 'a', None, ...]"), "[1, 'a', None, Ellipsis]");
    assert_eq!(echo(&env, "sorted([3, 1, 2])"), "[1, 2, 3]");
    assert_eq!(echo(&env, "not []"), "True");
    assert_eq!(echo(&env, "[] or 'fallback'"), "'fallback'");
}

#[test]
fn errors_surface_with_codes() {
    let env = Environment::new();
    assert_eq!(error_code(&env, "undefined"), "name-error");
    assert_eq!(error_code(&env, "1 / 0"), "zero-division-error");
    assert_eq!(error_code(&env, "'a' + 1"), "type-error");
    assert_eq!(error_code(&env, "[1, 2][5]"), "index-error");
    assert_eq!(error_code(&env, "np.median([1])"), "attribute-error");
    assert_eq!(error_code(&env, "(1"), "unexpected-token");
    assert_eq!(error_code(&env, "len("), "unexpected-eof");
}
