use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    export::{self, ExportArgs},
    grade::{self, GradeArgs},
    list::{self, ListArgs},
    simulate::{self, SimulateArgs},
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "ams-grader",
    version,
    about = "Auto-grader for the AMS vs. Drug permutation exercise"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the registered check groups.
    List(ListArgs),
    /// Write every check group as a JSON record.
    Export(ExportArgs),
    /// Grade an environment file against the check groups.
    Grade(GradeArgs),
    /// Write the reference (or placeholder) environment of the exercise.
    Simulate(SimulateArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::List(args) => list::run(&args),
        Command::Export(args) => export::run(&args),
        Command::Grade(args) => grade::run(&args),
        Command::Simulate(args) => simulate::run(&args),
    }
}
