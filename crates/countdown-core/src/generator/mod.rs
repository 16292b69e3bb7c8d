//! Weighted random draw of the initial countdown length.
//!
//! Three draws in four land in the short range (up to a week), the rest in the
//! long range (up to 25 years). Both ranges include [`SHORT_MAX_SECS`].

use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;

use crate::countdown::RemainingDuration;

/// Upper bound of the short range and lower bound of the long range, in seconds.
pub const SHORT_MAX_SECS: u64 = 604_801;

/// Upper bound of the long range, in seconds.
pub const LONG_MAX_SECS: u64 = 788_400_000;

/// Draws below this percentile pick the short range.
pub const SHORT_WEIGHT_PCT: f64 = 75.0;

/// Anything that can hand the engine a fresh total duration.
pub trait DurationSource {
    fn generate(&mut self) -> RemainingDuration;
}

/// Weighted generator over an injected random source.
#[derive(Debug, Clone)]
pub struct DurationGenerator<R = Mcg128Xsl64> {
    rng: R,
}

impl DurationGenerator<Mcg128Xsl64> {
    /// Generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(Mcg128Xsl64::from_entropy())
    }

    /// Deterministic generator for reproducible draws.
    pub fn seeded(seed: u64) -> Self {
        Self::new(Mcg128Xsl64::seed_from_u64(seed))
    }
}

impl<R: Rng> DurationGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw one total duration.
    pub fn generate(&mut self) -> RemainingDuration {
        let roll: f64 = self.rng.gen_range(0.0..100.0);
        Self::pick(roll, &mut self.rng)
    }

    /// Range selection for a given percentile roll.
    fn pick(roll: f64, rng: &mut R) -> RemainingDuration {
        let secs = if roll < SHORT_WEIGHT_PCT {
            rng.gen_range(1..=SHORT_MAX_SECS)
        } else {
            rng.gen_range(SHORT_MAX_SECS..=LONG_MAX_SECS)
        };
        RemainingDuration::from_secs(secs)
    }
}

impl<R: Rng> DurationSource for DurationGenerator<R> {
    fn generate(&mut self) -> RemainingDuration {
        DurationGenerator::generate(self)
    }
}
