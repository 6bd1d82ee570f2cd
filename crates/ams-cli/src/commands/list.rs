use std::error::Error;

use ams_grade::registry;
use clap::Args;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Also print the source of every case.
    #[arg(long)]
    pub cases: bool,
}

/// Prints each group with its points and case count.
pub fn run(args: &ListArgs) -> Result<(), Box<dyn Error>> {
    for group in registry::load() {
        println!(
            "{}\t{} point(s)\t{} case(s)",
            group.name,
            group.points,
            group.assertion_count()
        );
        if args.cases {
            for case in group.cases() {
                for line in case.code.lines() {
                    println!("    {line}");
                }
                println!();
            }
        }
    }
    Ok(())
}
