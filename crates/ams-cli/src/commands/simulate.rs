use std::error::Error;
use std::fs;
use std::path::PathBuf;

use ams_frame::serde::to_canonical_json_bytes;
use ams_perm::{
    placeholder_environment, reference_environment, reference_table, run_provenance, SimConfig,
};
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Master seed for the shuffles.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Number of shuffled tables.
    #[arg(long, default_value_t = 1000)]
    pub trials: usize,
    /// Environment JSON to write.
    #[arg(long)]
    pub out: PathBuf,
    /// Write the starting-state environment instead of a solution.
    #[arg(long)]
    pub placeholder: bool,
}

/// Writes the reference or placeholder environment. Reference runs also
/// write `<out stem>.provenance.json`.
pub fn run(args: &SimulateArgs) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = args.out.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let table = reference_table()?;
    if args.placeholder {
        fs::write(&args.out, placeholder_environment(&table).to_bytes()?)?;
        info!(path = %args.out.display(), "placeholder environment written");
        return Ok(());
    }
    let config = SimConfig {
        seed: args.seed,
        trials: args.trials,
        ..SimConfig::default()
    };
    let environment = reference_environment(&table, &config)?;
    fs::write(&args.out, environment.to_bytes()?)?;
    let provenance = run_provenance(&table, &config)?
        .with_tool("ams-grader", env!("CARGO_PKG_VERSION"));
    fs::write(
        args.out.with_extension("provenance.json"),
        to_canonical_json_bytes(&provenance)?,
    )?;
    info!(path = %args.out.display(), seed = args.seed, "reference environment written");
    Ok(())
}
