//! Seeded randomness for the permutation simulator.
//!
//! A run is driven by one master seed. Each consumer draws from its own
//! [`Stream`], whose seed is SipHash-1-3 (zero keys) over
//! `(master_seed, stream id)`, so adding trials never perturbs the shuffled
//! table handed to the student and vice versa.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Independent random streams of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// The single shuffled table bound to `fake_ams_counts`.
    FakeCounts,
    /// The shuffled tables behind `fake_stats`.
    Trials,
}

impl Stream {
    /// Numeric id hashed into the stream seed.
    pub const fn id(self) -> u64 {
        match self {
            Stream::FakeCounts => 0,
            Stream::Trials => 1,
        }
    }
}

/// Reproducible RNG; identical seeds yield identical shuffles on every
/// platform.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Handle seeded directly with `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Handle for `stream` of a run seeded with `master_seed`.
    pub fn for_stream(master_seed: u64, stream: Stream) -> Self {
        Self::substream(master_seed, stream.id())
    }

    /// Handle for an arbitrary numbered substream.
    pub fn substream(master_seed: u64, substream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, substream))
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Seed of `substream` under `master_seed`.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
