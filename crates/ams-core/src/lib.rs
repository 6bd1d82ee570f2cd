#![deny(missing_docs)]
#![doc = "Shared error, RNG and provenance types for the AMS permutation-test grader."]

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, GradeError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle, Stream};
