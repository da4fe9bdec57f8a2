//! Anytime best-first search over task chains.
//!
//! # Episodes
//!
//! ```text
//!   ┌──────────┐ tick  ┌───────────┐ frontier empty ┌───────────┐
//!   │ Seeding  ├──────►│ Expanding ├───────────────►│ Exhausted │
//!   └──────────┘       └───────────┘                └───────────┘
//!        ▲   get_task / override_task (from any phase)     │
//!        └─────────────────────────────────────────────────┘
//! ```
//!
//! - **Seeding** pushes one depth-1 chain per task applicable at the episode
//!   start.
//! - **Expanding** pops the best chain by utility per minute and, below the
//!   depth bound, pushes one child per task applicable at its predicted end.
//! - **Exhausted** keeps the best chain found until the next reset.
//!
//! The best chain seen so far is tracked across pushes, so `get_task` always
//! has an answer, however few ticks the episode got.

use std::sync::Arc;

use ai_core::{AgentId, PlannerConfig};
use ai_heap::{MaxOrder, PairingHeap};

use crate::{Actor, PlanNode, PlanRoot, PlannerResult, Task, TaskRegistry, WorldState};

/// Where the current episode stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Seeding,
    Expanding,
    Exhausted,
}

/// Per-agent planner.  Owned by the agent, driven by its tick.
pub struct UtilityPlanner {
    agent:        AgentId,
    registry:     Arc<TaskRegistry>,
    config:       PlannerConfig,
    phase:        Phase,
    /// State the current episode plans from.
    start:        WorldState,
    frontier:     PairingHeap<PlanNode, f32, MaxOrder>,
    best:         Option<(PlanRoot, f32)>,
    last_adopted: Task,
    expansions:   u32,
}

impl UtilityPlanner {
    /// Plan for `actor`, which is currently busy with `initial_task`.  The
    /// first episode plans from that task's predicted outcome.
    pub fn new(
        actor:        &impl Actor,
        initial_task: Task,
        registry:     Arc<TaskRegistry>,
        config:       PlannerConfig,
    ) -> PlannerResult<Self> {
        config.validate()?;
        let start = initial_task.predicted(&actor.world_state());
        Ok(Self {
            agent: actor.id(),
            registry,
            config,
            phase: Phase::Seeding,
            start,
            frontier: PairingHeap::new(),
            best: None,
            last_adopted: initial_task,
            expansions: 0,
        })
    }

    // ── Ticking ───────────────────────────────────────────────────────────

    /// Do one bounded unit of search work and return the resulting phase.
    pub fn tick(&mut self) -> Phase {
        match self.phase {
            Phase::Seeding => self.seed(),
            Phase::Expanding => {
                for _ in 0..self.config.expansions_per_tick {
                    if !self.expand_one() {
                        break;
                    }
                }
            }
            Phase::Exhausted => {}
        }
        self.phase
    }

    fn seed(&mut self) {
        self.frontier.clear();
        self.best = None;
        self.expansions = 0;

        let roots: Vec<PlanNode> = self
            .registry
            .iter()
            .filter(|t| t.conditions_met(&self.start))
            .map(|t| PlanNode::root(t, &self.start, &self.config))
            .collect();
        for node in roots {
            self.push(node);
        }

        self.phase = if self.frontier.is_empty() { Phase::Exhausted } else { Phase::Expanding };
        tracing::debug!(
            agent = %self.agent,
            roots = self.frontier.len(),
            best_ratio = ?self.best.map(|(_, r)| r),
            "planning episode seeded"
        );
    }

    /// Pop and expand the best chain.  `false` once the frontier is empty.
    fn expand_one(&mut self) -> bool {
        let Some(node) = self.frontier.pop() else {
            self.phase = Phase::Exhausted;
            tracing::debug!(agent = %self.agent, expansions = self.expansions, "frontier exhausted");
            return false;
        };
        self.expansions += 1;
        tracing::trace!(
            agent = %self.agent,
            depth = node.depth,
            ratio = node.ratio(),
            "expanding chain"
        );

        if node.depth < self.config.max_depth {
            let registry = Arc::clone(&self.registry);
            for task in registry.iter().filter(|t| t.conditions_met(&node.state)) {
                let child = node.extend(task, &registry, &self.config);
                self.push(child);
            }
        }
        if self.frontier.is_empty() {
            self.phase = Phase::Exhausted;
        }
        true
    }

    fn push(&mut self, mut node: PlanNode) {
        let ratio = node.average(&self.registry, &self.config);
        if !ratio.is_finite() {
            return;
        }
        if self.best.is_none_or(|(_, best)| ratio > best) {
            self.best = Some((node.root, ratio));
        }
        self.frontier.push(node, ratio);
    }

    // ── Adoption ──────────────────────────────────────────────────────────

    /// Hand out the task to do next and start a new episode from its
    /// predicted outcome.
    ///
    /// The best chain's root is checked against the actor's live state.  If
    /// it no longer applies, the applicable task with the best single-step
    /// ratio is chosen instead, and failing that the last adopted task is
    /// repeated.
    pub fn get_task(&mut self, actor: &impl Actor) -> Task {
        let live = actor.world_state();
        let planned = self
            .best
            .map(|(root, _)| root.resolve(&self.registry))
            .filter(|task| task.conditions_met(&live));

        let task = match planned {
            Some(task) => task,
            None => self
                .best_single_step(&live)
                .unwrap_or_else(|| self.last_adopted.clone()),
        };

        tracing::debug!(
            agent = %self.agent,
            task = %task.name,
            expansions = self.expansions,
            "task adopted"
        );
        self.restart(task.predicted(&live), task.clone());
        task
    }

    /// Force `task` (scripted event, recovery after a failure).  Discards the
    /// current episode and plans from the task's predicted outcome.
    pub fn override_task(&mut self, actor: &impl Actor, task: Task) {
        tracing::debug!(agent = %self.agent, task = %task.name, "task overridden");
        let start = task.predicted(&actor.world_state());
        self.restart(start, task);
    }

    fn restart(&mut self, start: WorldState, adopted: Task) {
        self.start = start;
        self.last_adopted = adopted;
        self.frontier.clear();
        self.best = None;
        self.expansions = 0;
        self.phase = Phase::Seeding;
    }

    fn best_single_step(&self, live: &WorldState) -> Option<Task> {
        let mut best: Option<(&Task, f32)> = None;
        for task in self.registry.iter().filter(|t| t.conditions_met(live)) {
            let ratio = task.ratio(live, &self.config);
            if ratio.is_finite() && best.is_none_or(|(_, b)| ratio > b) {
                best = Some((task, ratio));
            }
        }
        best.map(|(task, _)| task.clone())
    }

    // ── Introspection ─────────────────────────────────────────────────────

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Utility per minute of the best chain this episode.
    pub fn best_ratio(&self) -> Option<f32> {
        self.best.map(|(_, r)| r)
    }

    /// The task `get_task` would hand out if the live state still matched
    /// the episode start.
    pub fn best_root(&self) -> Option<Task> {
        self.best.map(|(root, _)| root.resolve(&self.registry))
    }

    /// Chains popped this episode.
    pub fn episode_expansions(&self) -> u32 {
        self.expansions
    }

    pub fn last_adopted(&self) -> &Task {
        &self.last_adopted
    }

    pub fn start_state(&self) -> &WorldState {
        &self.start
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }
}
