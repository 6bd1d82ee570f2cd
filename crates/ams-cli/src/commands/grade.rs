use std::error::Error;
use std::fs;
use std::path::PathBuf;

use ams_core::errors::{ErrorInfo, GradeError};
use ams_frame::Environment;
use ams_grade::report::render_exception;
use ams_grade::{grade, registry, CheckGroup, GradeReport, Policy};
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct GradeArgs {
    /// Environment JSON produced by the student's notebook.
    #[arg(long)]
    pub env: PathBuf,
    /// Policy YAML; defaults apply when omitted.
    #[arg(long)]
    pub policy: Option<PathBuf>,
    /// Grade only the named group(s).
    #[arg(long = "group", value_name = "NAME")]
    pub groups: Vec<String>,
    /// Grade exported group records instead of the built-in registry.
    #[arg(long = "check", value_name = "FILE")]
    pub checks: Vec<PathBuf>,
    /// Directory receiving `grade_report.json`.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

fn load_policy(path: &Option<PathBuf>) -> Result<Policy, Box<dyn Error>> {
    match path {
        Some(path) => Ok(Policy::from_yaml_slice(&fs::read(path)?)?),
        None => Ok(Policy::default()),
    }
}

fn load_groups(args: &GradeArgs) -> Result<Vec<CheckGroup>, Box<dyn Error>> {
    let groups = if args.checks.is_empty() {
        registry::load()
    } else {
        let mut groups = Vec::with_capacity(args.checks.len());
        for path in &args.checks {
            groups.push(CheckGroup::from_json_slice(&fs::read(path)?)?);
        }
        registry::validate(&groups)?;
        groups
    };
    if args.groups.is_empty() {
        return Ok(groups);
    }
    let mut selected = Vec::with_capacity(args.groups.len());
    for name in &args.groups {
        let group = groups
            .iter()
            .find(|group| &group.name == name)
            .ok_or_else(|| {
                GradeError::Registry(
                    ErrorInfo::new("unknown-group", format!("no check group named '{name}'"))
                        .with_hint("run `ams-grader list` to see the registered groups"),
                )
            })?;
        selected.push(group.clone());
    }
    Ok(selected)
}

fn print_summary(report: &GradeReport) {
    for group in &report.groups {
        println!(
            "{}: {}/{} point(s), {}/{} case(s) passed",
            group.group_name,
            group.points_earned,
            group.points_possible,
            group.assertions_passed,
            group.assertions_total
        );
        for outcome in group.failures() {
            let label = format!("  case {}.{} {:?}", outcome.suite, outcome.case, outcome.status);
            match (&outcome.source, &outcome.error) {
                (Some(source), Some(err)) => {
                    println!("{label}: {source} raised {}", render_exception(err))
                }
                (Some(source), None) => println!(
                    "{label}: {source} printed {:?}, expected {:?}",
                    outcome.actual.as_deref().unwrap_or(""),
                    outcome.expected.as_deref().unwrap_or("")
                ),
                (None, _) => println!("{label}"),
            }
            if let Some(hint) = &outcome.hint {
                println!("    hint: {}", hint.replace('\n', " "));
            }
        }
        for note in &group.notes {
            println!("  note: {note}");
        }
    }
    println!(
        "Total: {}/{} point(s)",
        report.points_earned, report.points_possible
    );
}

/// Grades an environment file and prints a summary. Succeeds whenever
/// grading completes, whatever the score.
pub fn run(args: &GradeArgs) -> Result<(), Box<dyn Error>> {
    let environment = Environment::from_json_slice(&fs::read(&args.env)?)?;
    let policy = load_policy(&args.policy)?;
    let groups = load_groups(args)?;
    let report = grade(&groups, &environment, &policy)?;
    print_summary(&report);
    if let Some(out) = &args.out {
        fs::create_dir_all(out)?;
        let path = out.join("grade_report.json");
        fs::write(&path, report.to_bytes()?)?;
        info!(path = %path.display(), hash = %report.analysis_hash, "report written");
    }
    Ok(())
}
