//! Seeded RNG for procedural maps and randomized checks.
//!
//! The decision core never draws random numbers.  Everything around it that
//! does (scattered obstacles, generated test graphs, oracle comparisons) goes
//! through `SimRng`, so one seed reproduces a run.

use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Fractional golden ratio, spreads consecutive offsets across the seed space.
const SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Deterministic `SmallRng` wrapper.  One per thread; derive more with
/// [`SimRng::child`].
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Independent stream for case `offset`.  Costs the parent one draw.
    pub fn child(&mut self, offset: u64) -> Self {
        let base: u64 = self.0.r#gen();
        Self::new(base ^ offset.wrapping_mul(SEED_MIX))
    }

    pub fn gen_range<T: SampleUniform, R: SampleRange<T>>(&mut self, range: R) -> T {
        self.0.gen_range(range)
    }

    /// `p` is clamped to `[0, 1]`.
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
