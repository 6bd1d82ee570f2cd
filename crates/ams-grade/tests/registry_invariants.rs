use ams_grade::registry::{self, CheckGroup};
use ams_grade::{Case, Suite};

#[test]
fn groups_have_points_and_cases() {
    let groups = registry::load();
    assert_eq!(groups.len(), 6);
    for group in &groups {
        assert!(group.points > 0.0, "{} has no points", group.name);
        assert!(group.assertion_count() > 0, "{} has no cases", group.name);
    }
    registry::validate(&groups).unwrap();
}

#[test]
fn declaration_order_is_fixed() {
    let names: Vec<String> = registry::load().into_iter().map(|group| group.name).collect();
    assert_eq!(
        names,
        vec![
            "Question row_lists",
            "Question people",
            "Question ams",
            "Question 04_fake_ams_counts",
            "Question 05_fake_counts",
            "Question 06_p_est",
        ]
    );
}

#[test]
fn loading_twice_is_identical() {
    assert_eq!(registry::load(), registry::load());
}

#[test]
fn every_group_starts_with_presence_checks() {
    for group in registry::load() {
        let first: Vec<&Case> = group.cases().take(2).collect();
        assert!(first[0].code.contains("in vars()"), "{}", group.name);
        assert!(first[1].code.contains("is not ..."), "{}", group.name);
    }
}

#[test]
fn records_round_trip_through_json() {
    for group in registry::load() {
        let bytes = group.to_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["suites"][0]["type"], "doctest");
        assert_eq!(json["suites"][0]["scored"], true);
        assert_eq!(CheckGroup::from_json_slice(&bytes).unwrap(), group);
    }
}

#[test]
fn validation_rejects_bad_groups() {
    let mut groups = registry::load();
    groups.push(groups[0].clone());
    assert_eq!(registry::validate(&groups).unwrap_err().code(), "duplicate-group");

    let mut zero = registry::find("Question ams").unwrap();
    zero.points = 0.0;
    assert_eq!(
        registry::validate(&[zero]).unwrap_err().code(),
        "non-positive-points"
    );

    let empty = CheckGroup {
        name: "Question empty".into(),
        points: 1.0,
        suites: vec![Suite::doctest(Vec::new())],
    };
    assert_eq!(registry::validate(&[empty]).unwrap_err().code(), "empty-group");

    let broken = CheckGroup {
        name: "Question broken".into(),
        points: 1.0,
        suites: vec![Suite::doctest(vec![Case::new(">>> len(\nTrue\n")])],
    };
    let err = registry::validate(&[broken]).unwrap_err();
    assert_eq!(err.code(), "invalid-case");
    assert_eq!(
        err.info().context.get("group").map(String::as_str),
        Some("Question broken")
    );
}
