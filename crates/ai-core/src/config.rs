//! Tunable parameters for the path search, the planner and the background
//! path materializer.
//!
//! Host applications typically load these from their own settings file (all
//! structs derive `Deserialize` with the `serde` feature, missing fields fall
//! back to `Default`) and call `validate()` once at startup.  The per-tick
//! code paths assume validated values and never re-check them.

use crate::{CoreError, CoreResult};

// ── SearchConfig ──────────────────────────────────────────────────────────────

/// Incremental path search parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Two costs closer than this are treated as equal, both for local
    /// consistency (`g == rhs`) and for priority-key ordering.
    pub tolerance: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { tolerance: 1e-4 }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(CoreError::Config(format!(
                "search tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// `a == b` within tolerance.  Two infinities compare equal.
    #[inline]
    pub fn approx_eq(&self, a: f32, b: f32) -> bool {
        a == b || (a - b).abs() <= self.tolerance
    }
}

// ── PlannerConfig ─────────────────────────────────────────────────────────────

/// Utility planner parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Maximum number of tasks in one lookahead chain.
    pub max_depth: u8,

    /// Frontier pops performed per `tick()` once seeding is done.
    pub expansions_per_tick: u32,

    /// Floor applied to every task's time cost, in game minutes.  Keeps the
    /// utility-per-time ratio defined for instantaneous tasks.
    pub min_time_cost: f32,

    /// World units an agent covers per game minute when a task requires
    /// travelling to its location.
    pub walk_speed: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth:           4,
            expansions_per_tick: 1,
            min_time_cost:       0.01,
            walk_speed:          1.0,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_depth == 0 {
            return Err(CoreError::Config("planner max_depth must be at least 1".into()));
        }
        if self.expansions_per_tick == 0 {
            return Err(CoreError::Config(
                "planner expansions_per_tick must be at least 1".into(),
            ));
        }
        if !(self.min_time_cost.is_finite() && self.min_time_cost > 0.0) {
            return Err(CoreError::Config(format!(
                "planner min_time_cost must be positive, got {}",
                self.min_time_cost
            )));
        }
        if !(self.walk_speed.is_finite() && self.walk_speed > 0.0) {
            return Err(CoreError::Config(format!(
                "planner walk_speed must be positive, got {}",
                self.walk_speed
            )));
        }
        Ok(())
    }
}

// ── MaterializerConfig ────────────────────────────────────────────────────────

/// Background path materializer parameters.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MaterializerConfig {
    /// Worker thread count.  `None` lets Rayon pick (all logical cores).
    pub num_threads: Option<usize>,
}

impl MaterializerConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("materializer needs at least one thread".into()));
        }
        Ok(())
    }
}
