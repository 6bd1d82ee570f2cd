#![allow(dead_code)]

use ams_frame::{Environment, Value};
use ams_perm::{reference_environment, reference_table, SimConfig};

/// Reference environment with the random pieces replaced by values that
/// satisfy every check.
pub fn solved_environment() -> Environment {
    let table = reference_table().unwrap();
    let config = SimConfig {
        trials: 10,
        ..SimConfig::with_seed(1)
    };
    let mut env = reference_environment(&table, &config).unwrap();
    env.set("fake_ams_counts", table);
    env.set("fake_stats", fake_stats(1000));
    env.set("p_est", 0.004);
    env
}

/// `len` statistics cycling through 5..=19.
pub fn fake_stats(len: usize) -> Value {
    Value::Array((0..len).map(|idx| Value::Int(5 + (idx % 15) as i64)).collect())
}
