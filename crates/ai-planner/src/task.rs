//! Task definitions and their simulated effect on a [`WorldState`].
//!
//! # Value model
//!
//! - `utility = pressure(before) - pressure(after) + bonus`, where pressure
//!   is the sum of squared needs.
//! - `time = base_minutes + travel`, floored at `PlannerConfig::min_time_cost`.
//!   Travel is the straight-line distance to the action's location divided by
//!   `walk_speed`.
//!
//! # Kinds
//!
//! | Kind        | Conditions       | Evaluation                                |
//! |-------------|------------------|-------------------------------------------|
//! | `Simple`    | the action's     | the action                                |
//! | `Risky`     | success action's | chance-weighted blend of both outcomes    |
//! | `Setup`     | the action's     | the action; the payoff is deferred        |
//! | `Nesting`   | the action's     | the action; absorbs the next chain step   |
//! | `Composite` | outer's          | outer, then inner from outer's prediction |

use ai_core::{AgentId, PlannerConfig, TaskId, WorldPos};

use crate::{Needs, Stance, WorldState};

// ── Action ────────────────────────────────────────────────────────────────────

/// What must hold before an action can start.
#[derive(Clone, Debug, PartialEq)]
pub struct Requirements {
    pub stance:          Option<Stance>,
    /// Each need must be at least this high (nobody eats when full).
    pub min_needs:       Needs,
    /// `Some(true)`: only inside a conversation; `Some(false)`: only outside.
    pub in_conversation: Option<bool>,
    /// May directly follow itself.
    pub repeatable:      bool,
}

impl Default for Requirements {
    fn default() -> Self {
        Self { stance: None, min_needs: Needs::ZERO, in_conversation: None, repeatable: true }
    }
}

/// Effect of an action on conversations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ConversationEffect {
    #[default]
    Keep,
    Join(AgentId),
    Leave,
}

/// Predicted outcome of an action.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Effect {
    /// Signed need changes, applied then clamped to `[0, 1]`.
    pub needs:        Needs,
    pub stance:       Option<Stance>,
    pub conversation: ConversationEffect,
}

/// One concrete behavior: requirements, effect, duration and location.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Action {
    pub requirements: Requirements,
    pub effect:       Effect,
    /// Duration in game minutes, excluding travel.
    pub base_minutes: f32,
    /// Flat utility on top of the need relief.
    pub bonus:        f32,
    /// Where the action happens.  `None` means "wherever the agent is".
    pub location:     Option<WorldPos>,
}

impl Action {
    pub fn new(base_minutes: f32) -> Self {
        Self { base_minutes, ..Self::default() }
    }

    pub fn with_bonus(mut self, bonus: f32) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn with_needs(mut self, delta: Needs) -> Self {
        self.effect.needs = delta;
        self
    }

    pub fn with_stance(mut self, stance: Stance) -> Self {
        self.effect.stance = Some(stance);
        self
    }

    pub fn at(mut self, location: WorldPos) -> Self {
        self.location = Some(location);
        self
    }

    pub fn requiring(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn conversation(mut self, effect: ConversationEffect) -> Self {
        self.effect.conversation = effect;
        self
    }

    fn conditions_met(&self, id: TaskId, state: &WorldState) -> bool {
        let req = &self.requirements;
        req.stance.is_none_or(|s| s == state.stance)
            && state.needs.at_least(&req.min_needs)
            && req.in_conversation.is_none_or(|c| c == state.in_conversation())
            && (req.repeatable || state.previous_task != Some(id))
    }

    fn predicted(&self, id: TaskId, state: &WorldState) -> WorldState {
        let conversation = match self.effect.conversation {
            ConversationEffect::Keep => state.conversation,
            ConversationEffect::Join(other) => Some(other),
            ConversationEffect::Leave => None,
        };
        WorldState {
            position: self.location.unwrap_or(state.position),
            stance: self.effect.stance.unwrap_or(state.stance),
            needs: state.needs.shifted(self.effect.needs),
            conversation,
            previous_task: Some(id),
        }
    }

    fn time_cost(&self, state: &WorldState, config: &PlannerConfig) -> f32 {
        let travel = self
            .location
            .map_or(0.0, |loc| state.position.distance(loc) / config.walk_speed);
        (self.base_minutes + travel).max(config.min_time_cost)
    }

    fn utility(&self, state: &WorldState) -> f32 {
        let after = state.needs.shifted(self.effect.needs);
        state.needs.pressure() - after.pressure() + self.bonus
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// The closed set of task shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum TaskKind {
    Simple(Action),
    /// May fail.  `chance` is the probability of `success`.
    Risky { success: Action, failure: Action, chance: f32 },
    /// Enables `payoff`, whose value the planner folds into a chain later.
    Setup { action: Action, payoff: Box<Task> },
    /// Collapses with the task after it when it roots a chain.
    Nesting(Action),
    /// `outer` then `inner`, adopted as one task.
    Composite { outer: Box<Task>, inner: Box<Task> },
}

/// A named, identified task.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub id:   TaskId,
    pub name: String,
    pub kind: TaskKind,
}

impl Task {
    /// A task outside any registry, e.g. a setup payoff or a scripted
    /// override.  Its id is `TaskId::INVALID`.
    pub fn unregistered(name: impl Into<String>, kind: TaskKind) -> Self {
        Self { id: TaskId::INVALID, name: name.into(), kind }
    }

    /// `outer` followed by `inner`, adopted as a single task under the outer
    /// task's id.
    pub fn composite(outer: Task, inner: Task) -> Self {
        Self {
            id:   outer.id,
            name: format!("{} > {}", outer.name, inner.name),
            kind: TaskKind::Composite { outer: Box::new(outer), inner: Box::new(inner) },
        }
    }

    pub fn is_nesting(&self) -> bool {
        matches!(self.kind, TaskKind::Nesting(_))
    }

    /// The deferred payoff of a setup task.
    pub fn payoff(&self) -> Option<&Task> {
        match &self.kind {
            TaskKind::Setup { payoff, .. } => Some(payoff),
            _ => None,
        }
    }

    pub fn conditions_met(&self, state: &WorldState) -> bool {
        match &self.kind {
            TaskKind::Simple(a) | TaskKind::Nesting(a) | TaskKind::Setup { action: a, .. } => {
                a.conditions_met(self.id, state)
            }
            TaskKind::Risky { success, .. } => success.conditions_met(self.id, state),
            TaskKind::Composite { outer, .. } => outer.conditions_met(state),
        }
    }

    pub fn predicted(&self, state: &WorldState) -> WorldState {
        match &self.kind {
            TaskKind::Simple(a) | TaskKind::Nesting(a) | TaskKind::Setup { action: a, .. } => {
                a.predicted(self.id, state)
            }
            TaskKind::Risky { success, failure, chance } => {
                let ok = success.predicted(self.id, state);
                let failed = failure.predicted(self.id, state);
                // Continuous needs blend; discrete fields follow the likelier outcome.
                let needs = failed.needs.lerp(ok.needs, *chance).clamped();
                let mut likely = if *chance >= 0.5 { ok } else { failed };
                likely.needs = needs;
                likely
            }
            TaskKind::Composite { outer, inner } => inner.predicted(&outer.predicted(state)),
        }
    }

    /// Game minutes, never below `config.min_time_cost`.
    pub fn time_cost(&self, state: &WorldState, config: &PlannerConfig) -> f32 {
        match &self.kind {
            TaskKind::Simple(a) | TaskKind::Nesting(a) | TaskKind::Setup { action: a, .. } => {
                a.time_cost(state, config)
            }
            TaskKind::Risky { success, failure, chance } => {
                let t = chance * success.time_cost(state, config)
                    + (1.0 - chance) * failure.time_cost(state, config);
                t.max(config.min_time_cost)
            }
            TaskKind::Composite { outer, inner } => {
                outer.time_cost(state, config) + inner.time_cost(&outer.predicted(state), config)
            }
        }
    }

    pub fn utility(&self, state: &WorldState) -> f32 {
        match &self.kind {
            TaskKind::Simple(a) | TaskKind::Nesting(a) | TaskKind::Setup { action: a, .. } => {
                a.utility(state)
            }
            TaskKind::Risky { success, failure, chance } => {
                chance * success.utility(state) + (1.0 - chance) * failure.utility(state)
            }
            TaskKind::Composite { outer, inner } => {
                outer.utility(state) + inner.utility(&outer.predicted(state))
            }
        }
    }

    /// Utility per minute of this task alone.
    pub fn ratio(&self, state: &WorldState, config: &PlannerConfig) -> f32 {
        self.utility(state) / self.time_cost(state, config)
    }
}
