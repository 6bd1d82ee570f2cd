#![deny(missing_docs)]
#![doc = "Check registry, assertion evaluation and scoring for the AMS vs. Drug permutation exercise."]

/// Expression and statement trees.
pub mod ast;
/// Doctest transcript parsing and output normalisation.
pub mod doctest;
/// Statement interpreter over a read-only environment.
pub mod eval;
/// Tokenizer for assertion source.
pub mod lexer;
/// Builtins, library namespaces, methods and subscripts.
pub mod library;
/// Value operators.
pub mod ops;
/// Recursive-descent parser.
pub mod parser;
/// Grading policy loaded from YAML.
pub mod policies;
/// The exercise's check groups.
pub mod registry;
/// Group results and hashed grade reports.
pub mod report;
/// Group evaluation and scoring.
pub mod runner;
/// Canonical JSON and YAML helpers.
pub mod serde;

pub use doctest::Example;
pub use eval::Interpreter;
pub use policies::{FailurePolicy, Policy, Scoring};
pub use registry::{Case, CheckGroup, Suite, SuiteKind};
pub use report::{AssertionOutcome, GradeProvenance, GradeReport, GroupResult, OutcomeStatus};
pub use runner::{grade, run, run_with_policy};
