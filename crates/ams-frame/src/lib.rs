#![deny(missing_docs)]
#![doc = "Value model, contingency tables and grading environments for the AMS grader."]

/// Cross-tabulation of label sequences.
pub mod crosstab;
/// Explicit variable bindings with a tagged placeholder state.
pub mod env;
/// Observation frames and labelled series.
pub mod frame;
/// Canonical hashing helpers.
pub mod hash;
/// Canonical JSON helpers.
pub mod serde;
/// Contingency tables of joint counts.
pub mod table;
/// Dynamically typed values seen by assertion code.
pub mod value;

pub use crosstab::{crosstab, crosstab_with_labels};
pub use env::{Binding, Environment};
pub use frame::{Column, Frame, Series};
pub use table::{Axis, ContingencyTable};
pub use value::{format_float, Module, Value};
