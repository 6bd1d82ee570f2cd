use ams_core::rng::RngHandle;
use ams_frame::{Binding, Value};
use ams_perm::{
    placeholder_environment, reference_environment, reference_table, run_provenance, simulate,
    SimConfig, STUDENT_VARIABLES,
};

fn small_config(seed: u64) -> SimConfig {
    SimConfig {
        trials: 200,
        ..SimConfig::with_seed(seed)
    }
}

#[test]
fn reference_table_matches_the_exercise() {
    let table = reference_table().unwrap();
    assert_eq!(table.total(), 100);
    assert_eq!(table.get("Had AMS", "Placebo"), Some(17));
    assert_eq!(table.column_sums(), vec![50, 50]);
    assert_eq!(table.row_sums(), vec![22, 78]);
}

#[test]
fn simulation_is_deterministic_per_seed() {
    let table = reference_table().unwrap();
    let config = small_config(11);
    let a = simulate(&table, &config, &mut RngHandle::from_seed(11)).unwrap();
    let b = simulate(&table, &config, &mut RngHandle::from_seed(11)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.observed, 17);
    assert_eq!(a.fake_stats.len(), 200);
    assert!((0.0..=1.0).contains(&a.p_est));
    // The cell can hold at most the smaller of its row and column totals.
    assert!(a.fake_stats.iter().all(|stat| (0..=22).contains(stat)));
}

#[test]
fn unknown_statistic_cell_is_rejected() {
    let table = reference_table().unwrap();
    let config = SimConfig {
        row: "Maybe AMS".into(),
        ..small_config(1)
    };
    let err = simulate(&table, &config, &mut RngHandle::from_seed(1)).unwrap_err();
    assert_eq!(err.code(), "unknown-cell");
}

#[test]
fn reference_environment_binds_every_student_variable() {
    let table = reference_table().unwrap();
    let env = reference_environment(&table, &small_config(3)).unwrap();
    for name in STUDENT_VARIABLES {
        assert!(
            env.binding(name).is_some_and(Binding::is_set),
            "{name} should be set"
        );
    }
    match env.lookup("row_lists") {
        Some(Value::List(rows)) => assert_eq!(rows.len(), 100),
        other => panic!("unexpected row_lists {other:?}"),
    }
    match env.lookup("fake_stats") {
        Some(Value::Array(stats)) => assert_eq!(stats.len(), 200),
        other => panic!("unexpected fake_stats {other:?}"),
    }
    let again = reference_environment(&table, &small_config(3)).unwrap();
    assert_eq!(env, again);
}

#[test]
fn placeholder_environment_leaves_student_variables_unset() {
    let table = reference_table().unwrap();
    let env = placeholder_environment(&table);
    assert_eq!(env.len(), STUDENT_VARIABLES.len() + 1);
    assert_eq!(env.lookup("p_est"), Some(Value::Ellipsis));
    assert!(env.binding("ams_counts").is_some_and(Binding::is_set));
}

#[test]
fn provenance_records_seed_and_table_hash() {
    let table = reference_table().unwrap();
    let provenance = run_provenance(&table, &small_config(5)).unwrap();
    assert_eq!(provenance.seed, 5);
    assert_eq!(provenance.trials, 200);
    assert_eq!(provenance.table_hash.len(), 64);
    assert!(provenance.tool_versions.contains_key("ams-perm"));
}

#[test]
fn config_defaults_fill_missing_yaml_fields() {
    let config = SimConfig::from_yaml_slice(b"seed: 9\n").unwrap();
    assert_eq!(config, SimConfig::with_seed(9));
    assert_eq!(config.trials, 1000);
}
