use std::error::Error;
use std::fs;
use std::path::PathBuf;

use ams_grade::registry;
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Directory receiving one `<group>.json` record per check group.
    #[arg(long)]
    pub out: PathBuf,
}

/// File stem for a group: `Question 06_p_est` becomes `06_p_est`.
pub fn record_stem(name: &str) -> String {
    name.trim_start_matches("Question ")
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Writes every check group as a canonical JSON record.
pub fn run(args: &ExportArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    for group in registry::load() {
        let path = args.out.join(format!("{}.json", record_stem(&group.name)));
        fs::write(&path, group.to_bytes()?)?;
        info!(group = %group.name, path = %path.display(), "exported");
    }
    Ok(())
}
