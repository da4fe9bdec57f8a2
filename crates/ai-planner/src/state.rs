//! The world-state snapshot the planner simulates forward.

use ai_core::{AgentId, TaskId, WorldPos};

/// Need levels in `[0, 1]`: `0` is fully satisfied, `1` is desperate.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Needs {
    pub hunger: f32,
    pub sleep:  f32,
    pub social: f32,
}

impl Needs {
    pub const ZERO: Needs = Needs { hunger: 0.0, sleep: 0.0, social: 0.0 };

    pub fn new(hunger: f32, sleep: f32, social: f32) -> Self {
        Self { hunger, sleep, social }.clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            hunger: self.hunger.clamp(0.0, 1.0),
            sleep:  self.sleep.clamp(0.0, 1.0),
            social: self.social.clamp(0.0, 1.0),
        }
    }

    /// Apply signed deltas and clamp.
    pub fn shifted(self, delta: Needs) -> Self {
        Self {
            hunger: self.hunger + delta.hunger,
            sleep:  self.sleep + delta.sleep,
            social: self.social + delta.social,
        }
        .clamped()
    }

    /// `self * (1 - t) + other * t`, component-wise.
    pub fn lerp(self, other: Needs, t: f32) -> Self {
        Self {
            hunger: self.hunger + (other.hunger - self.hunger) * t,
            sleep:  self.sleep + (other.sleep - self.sleep) * t,
            social: self.social + (other.social - self.social) * t,
        }
    }

    /// Every component at least as high as in `min`.
    pub fn at_least(&self, min: &Needs) -> bool {
        self.hunger >= min.hunger && self.sleep >= min.sleep && self.social >= min.social
    }

    /// Sum of squared needs.  Squaring makes relieving a pressing need worth
    /// more than topping up a mild one.
    pub fn pressure(&self) -> f32 {
        self.hunger * self.hunger + self.sleep * self.sleep + self.social * self.social
    }
}

/// Body posture.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stance {
    #[default]
    Standing,
    Sitting,
    Lying,
}

/// Snapshot of one agent, as far as task selection cares.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldState {
    pub position:      WorldPos,
    pub stance:        Stance,
    pub needs:         Needs,
    pub conversation:  Option<AgentId>,
    pub previous_task: Option<TaskId>,
}

impl WorldState {
    pub fn at(position: WorldPos) -> Self {
        Self { position, ..Self::default() }
    }

    pub fn with_needs(mut self, needs: Needs) -> Self {
        self.needs = needs.clamped();
        self
    }

    pub fn with_stance(mut self, stance: Stance) -> Self {
        self.stance = stance;
        self
    }

    pub fn in_conversation(&self) -> bool {
        self.conversation.is_some()
    }
}

/// The agent a planner decides for.  The planner only ever reads from it.
pub trait Actor {
    fn id(&self) -> AgentId;

    /// The live state, sampled whenever the planner starts an episode or
    /// hands out a task.
    fn world_state(&self) -> WorldState;
}
