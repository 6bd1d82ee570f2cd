use ams_core::errors::{ErrorInfo, GradeError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("name", "p_est")
        .with_context("reason", "example")
}

#[test]
fn eval_error_surface() {
    let err = GradeError::Eval(sample_info("name-error", "name 'p_est' is not defined"));
    assert_eq!(err.code(), "name-error");
    assert!(err.info().context.contains_key("name"));
}

#[test]
fn table_error_surface() {
    let err = GradeError::Table(sample_info("T001", "ragged counts"));
    assert_eq!(err.info().code, "T001");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = GradeError::Registry(
        ErrorInfo::new("empty-group", "group has no assertions")
            .with_context("group", "Question ams")
            .with_hint("add at least one case"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("registry error: group has no assertions (code: empty-group)"));
    assert!(rendered.contains("group=Question ams"));
    assert!(rendered.ends_with("hint: add at least one case"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = GradeError::Syntax(ErrorInfo::new("unexpected-token", "unexpected ')'"));
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "Syntax");
    assert_eq!(json["detail"]["code"], "unexpected-token");
    let decoded: GradeError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, err);
}
