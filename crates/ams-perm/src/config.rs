use ams_core::errors::{ErrorInfo, GradeError};
use serde::{Deserialize, Serialize};

/// Parameters of a permutation simulation, configurable from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Master seed for every random stream of the run.
    #[serde(default)]
    pub seed: u64,
    /// Number of shuffled tables.
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// Row label of the cell used as test statistic.
    #[serde(default = "default_row")]
    pub row: String,
    /// Column label of the cell used as test statistic.
    #[serde(default = "default_column")]
    pub column: String,
}

fn default_trials() -> usize {
    1000
}

fn default_row() -> String {
    "Had AMS".to_string()
}

fn default_column() -> String {
    "Placebo".to_string()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            trials: default_trials(),
            row: default_row(),
            column: default_column(),
        }
    }
}

impl SimConfig {
    /// Default configuration with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses a YAML configuration; missing fields take their defaults.
    pub fn from_yaml_slice(data: &[u8]) -> Result<Self, GradeError> {
        serde_yaml::from_slice(data)
            .map_err(|err| GradeError::Serde(ErrorInfo::new("yaml_deserialize", err.to_string())))
    }
}
