//! Partial task chains explored by the planner.

use ai_core::{PlannerConfig, TaskId};

use crate::{Task, TaskRegistry, WorldState};

/// The task a chain would start with.  A nesting root that absorbed the
/// chain's second step becomes `outer` + `inner`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlanRoot {
    pub outer: TaskId,
    pub inner: Option<TaskId>,
}

impl PlanRoot {
    pub fn single(id: TaskId) -> Self {
        Self { outer: id, inner: None }
    }

    /// Build the task to hand out.
    pub fn resolve(&self, registry: &TaskRegistry) -> Task {
        let outer = registry.task(self.outer).clone();
        match self.inner {
            Some(inner) => Task::composite(outer, registry.task(inner).clone()),
            None => outer,
        }
    }
}

/// One chain of task choices and its simulated outcome.
#[derive(Clone, Debug)]
pub struct PlanNode {
    pub depth:   u8,
    pub root:    PlanRoot,
    pub utility: f32,
    pub time:    f32,
    /// Predicted state at the end of the chain (and any folded payoffs).
    pub state:   WorldState,
    /// Setup tasks in the chain whose payoff has not been folded in yet.
    pub pending: Vec<TaskId>,
}

impl PlanNode {
    /// A depth-1 chain starting with `task`.
    pub fn root(task: &Task, start: &WorldState, config: &PlannerConfig) -> Self {
        let mut node = Self {
            depth:   1,
            root:    PlanRoot::single(task.id),
            utility: task.utility(start),
            time:    task.time_cost(start, config),
            state:   task.predicted(start),
            pending: Vec::new(),
        };
        if task.payoff().is_some() {
            node.pending.push(task.id);
        }
        node
    }

    /// This chain with `task` appended.
    pub fn extend(&self, task: &Task, registry: &TaskRegistry, config: &PlannerConfig) -> Self {
        let root = match self.root {
            PlanRoot { outer, inner: None }
                if self.depth == 1 && registry.task(outer).is_nesting() =>
            {
                PlanRoot { outer, inner: Some(task.id) }
            }
            root => root,
        };
        let mut pending = self.pending.clone();
        if task.payoff().is_some() {
            pending.push(task.id);
        }
        Self {
            depth: self.depth + 1,
            root,
            utility: self.utility + task.utility(&self.state),
            time: self.time + task.time_cost(&self.state, config),
            state: task.predicted(&self.state),
            pending,
        }
    }

    pub fn ratio(&self) -> f32 {
        self.utility / self.time
    }

    /// Fold in at most one pending payoff and return the chain's ratio.
    ///
    /// Payoffs are tried in the order their setups were chained.  The first
    /// one that is applicable at the chain's end and would raise the ratio is
    /// folded in: utility and time added, state advanced, entry dropped.
    pub fn average(&mut self, registry: &TaskRegistry, config: &PlannerConfig) -> f32 {
        let current = self.ratio();
        for i in 0..self.pending.len() {
            let Some(payoff) = registry.task(self.pending[i]).payoff() else {
                continue;
            };
            if !payoff.conditions_met(&self.state) {
                continue;
            }
            let utility = self.utility + payoff.utility(&self.state);
            let time = self.time + payoff.time_cost(&self.state, config);
            if utility / time > current {
                self.utility = utility;
                self.time = time;
                self.state = payoff.predicted(&self.state);
                self.pending.remove(i);
                tracing::trace!(payoff = %payoff.name, ratio = utility / time, "payoff folded");
                break;
            }
        }
        self.ratio()
    }
}
