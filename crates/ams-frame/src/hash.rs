//! Content fingerprints: `Environment::stable_hash`, the reference table hash
//! in simulation provenance, and the `analysis_hash` of grade reports.

use ams_core::errors::GradeError;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::serde::to_canonical_json_bytes;

/// Hex SHA-256 of the canonical JSON form of `value`. Map key order never
/// affects the result.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, GradeError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{digest:x}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Environment;

    #[test]
    fn binding_order_does_not_change_the_fingerprint() {
        let a = Environment::new().with("p_est", 0.004).with_unset("fake_stats");
        let b = Environment::new().with_unset("fake_stats").with("p_est", 0.004);
        let hash = stable_hash_string(&a).unwrap();
        assert_eq!(hash, stable_hash_string(&b).unwrap());
        assert_eq!(hash.len(), 64);

        let placeholder = Environment::new().with_unset("p_est").with_unset("fake_stats");
        assert_ne!(hash, stable_hash_string(&placeholder).unwrap());
    }
}
