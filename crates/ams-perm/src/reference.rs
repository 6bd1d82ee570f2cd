use ams_core::errors::GradeError;
use ams_core::provenance::{RunProvenance, SchemaVersion};
use ams_core::rng::{RngHandle, Stream};
use ams_frame::hash::stable_hash_string;
use ams_frame::{Column, ContingencyTable, Environment, Frame, Value};
use tracing::info;

use crate::config::SimConfig;
use crate::permute::{observations, shuffle_table, simulate};

/// Variables the student assigns, in notebook order.
pub const STUDENT_VARIABLES: [&str; 7] = [
    "row_lists",
    "people",
    "ams",
    "drug",
    "fake_ams_counts",
    "fake_stats",
    "p_est",
];

/// Joint counts of the exercise: 100 participants, 17 of whom had AMS on
/// placebo.
pub fn reference_table() -> Result<ContingencyTable, GradeError> {
    let table = ContingencyTable::new(
        vec!["Had AMS".to_string(), "No AMS".to_string()],
        vec!["Ginkgo".to_string(), "Placebo".to_string()],
        vec![vec![5, 17], vec![45, 33]],
    )?;
    Ok(table.with_axis_names(Some("AMS".to_string()), Some("Drug".to_string())))
}

fn axis_names(table: &ContingencyTable) -> (String, String) {
    (
        table.index_name().unwrap_or("AMS").to_string(),
        table.columns_name().unwrap_or("Drug").to_string(),
    )
}

/// Environment a correct solution produces for `table`.
pub fn reference_environment(
    table: &ContingencyTable,
    config: &SimConfig,
) -> Result<Environment, GradeError> {
    let pairs = observations(table);
    let row_lists = pairs
        .iter()
        .map(|(row, column)| {
            Value::List(vec![
                Value::from(row.as_str()),
                Value::from(column.as_str()),
            ])
        })
        .collect();
    let (row_name, column_name) = axis_names(table);
    let (rows, columns): (Vec<Value>, Vec<Value>) = pairs
        .into_iter()
        .map(|(row, column)| (Value::Str(row), Value::Str(column)))
        .unzip();
    let people = Frame::new(vec![
        Column::new(row_name.clone(), rows),
        Column::new(column_name.clone(), columns),
    ])?;
    let ams = people.column(&row_name).map_or(Value::None, Value::Series);
    let drug = people.column(&column_name).map_or(Value::None, Value::Series);

    let fake_ams_counts = shuffle_table(
        table,
        &mut RngHandle::for_stream(config.seed, Stream::FakeCounts),
    )?;
    let simulation = simulate(
        table,
        config,
        &mut RngHandle::for_stream(config.seed, Stream::Trials),
    )?;
    info!(
        seed = config.seed,
        trials = config.trials,
        p_est = simulation.p_est,
        "reference environment built"
    );

    Ok(Environment::new()
        .with("ams_counts", table.clone())
        .with("row_lists", Value::List(row_lists))
        .with("people", people)
        .with("ams", ams)
        .with("drug", drug)
        .with("fake_ams_counts", fake_ams_counts)
        .with(
            "fake_stats",
            Value::Array(simulation.fake_stats.into_iter().map(Value::Int).collect()),
        )
        .with("p_est", simulation.p_est))
}

/// Environment at the start of the exercise: `ams_counts` is given and every
/// student variable still holds its placeholder.
pub fn placeholder_environment(table: &ContingencyTable) -> Environment {
    STUDENT_VARIABLES.iter().fold(
        Environment::new().with("ams_counts", table.clone()),
        |env, name| env.with_unset(*name),
    )
}

/// Provenance recorded next to a simulated environment.
pub fn run_provenance(
    table: &ContingencyTable,
    config: &SimConfig,
) -> Result<RunProvenance, GradeError> {
    let provenance = RunProvenance {
        schema_version: SchemaVersion::default(),
        table_hash: stable_hash_string(table)?,
        seed: config.seed,
        trials: config.trials,
        ..RunProvenance::default()
    };
    Ok(provenance.with_tool("ams-perm", env!("CARGO_PKG_VERSION")))
}
