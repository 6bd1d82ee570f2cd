use ams_core::errors::{ErrorInfo, GradeError};
use ams_core::rng::RngHandle;
use ams_frame::{crosstab_with_labels, ContingencyTable};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimConfig;

fn sim_error(code: &str, message: impl Into<String>) -> GradeError {
    GradeError::Sim(ErrorInfo::new(code, message.into()))
}

/// Outcome of a permutation simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    /// Statistic of the observed table.
    pub observed: i64,
    /// Statistic of each shuffled table.
    pub fake_stats: Vec<i64>,
    /// Share of shuffled statistics at least as large as the observed one.
    pub p_est: f64,
}

/// Expands a table into one `(row, column)` pair per counted observation,
/// row-major.
pub fn observations(table: &ContingencyTable) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(usize::try_from(table.total()).unwrap_or(0));
    for (row, counts) in table.rows().iter().zip(table.counts()) {
        for (column, count) in table.columns().iter().zip(counts) {
            for _ in 0..*count {
                pairs.push((row.clone(), column.clone()));
            }
        }
    }
    pairs
}

/// Shuffles the column labels of the observations and cross-tabulates them
/// against the unshuffled row labels. Row and column totals are preserved.
pub fn shuffle_table(
    table: &ContingencyTable,
    rng: &mut RngHandle,
) -> Result<ContingencyTable, GradeError> {
    let (rows, mut columns): (Vec<String>, Vec<String>) = observations(table).into_iter().unzip();
    columns.shuffle(rng);
    let shuffled = crosstab_with_labels(&rows, &columns, table.rows(), table.columns())?;
    Ok(shuffled.with_axis_names(
        table.index_name().map(str::to_string),
        table.columns_name().map(str::to_string),
    ))
}

/// Simulates the null distribution of the configured cell count.
pub fn simulate(
    table: &ContingencyTable,
    config: &SimConfig,
    rng: &mut RngHandle,
) -> Result<Simulation, GradeError> {
    if config.trials == 0 {
        return Err(sim_error("no-trials", "at least one trial is required"));
    }
    let observed = table.get(&config.row, &config.column).ok_or_else(|| {
        GradeError::Sim(
            ErrorInfo::new("unknown-cell", "statistic cell is not in the table")
                .with_context("row", config.row.clone())
                .with_context("column", config.column.clone()),
        )
    })?;
    let mut fake_stats = Vec::with_capacity(config.trials);
    for trial in 0..config.trials {
        let shuffled = shuffle_table(table, rng)?;
        let stat = shuffled.get(&config.row, &config.column).unwrap_or(0);
        debug!(trial, stat, "shuffled table");
        fake_stats.push(stat);
    }
    let extreme = fake_stats.iter().filter(|stat| **stat >= observed).count();
    let p_est = extreme as f64 / config.trials as f64;
    info!(trials = config.trials, observed, p_est, "simulation finished");
    Ok(Simulation {
        observed,
        fake_stats,
        p_est,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ContingencyTable {
        ContingencyTable::new(
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into()],
            vec![vec![2, 1], vec![0, 3]],
        )
        .unwrap()
    }

    #[test]
    fn observations_are_row_major() {
        let pairs = observations(&small());
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], ("a".to_string(), "x".to_string()));
        assert_eq!(pairs[2], ("a".to_string(), "y".to_string()));
        assert_eq!(pairs[5], ("b".to_string(), "y".to_string()));
    }

    #[test]
    fn zero_trials_are_rejected() {
        let config = SimConfig {
            trials: 0,
            row: "a".into(),
            column: "x".into(),
            ..SimConfig::default()
        };
        let err = simulate(&small(), &config, &mut RngHandle::from_seed(1)).unwrap_err();
        assert_eq!(err.code(), "no-trials");
    }
}
