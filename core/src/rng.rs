//! Deterministic sampling for the synthetic event stream.
//!
//! RULE: the generator never touches a platform RNG. All randomness flows
//! through `SampleRng` streams derived from the single master seed, so the
//! same seed always reproduces the same event stream.
//!
//! Each concern gets its own stream, seeded deterministically from
//! (master_seed XOR stream_index). Adding a new stream never perturbs the
//! existing ones.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A deterministic sampling stream over the master seed.
pub struct SampleRng {
    inner: Pcg64Mcg,
}

impl SampleRng {
    /// Derive a stream from the master seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, stream: u64) -> Self {
        let derived = master_seed ^ stream.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick an index according to the given weights. Weights need not sum
    /// to one; non-positive weights never win. Index 0 when every weight is
    /// non-positive.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 || weights.is_empty() {
            return 0;
        }
        let mut roll = self.next_f64() * total;
        for (index, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            if roll < *weight {
                return index;
            }
            roll -= *weight;
        }
        weights.len() - 1
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries — only append. Reordering changes every
/// stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Volume = 0,
    CaseMix = 1,
    Tagging = 2,
    // Add new streams here — append only.
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::CaseMix => "case_mix",
            Self::Tagging => "tagging",
        }
    }
}
