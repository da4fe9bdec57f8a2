//! The static set of tasks agents choose from.

use rustc_hash::FxHashMap;

use ai_core::TaskId;

use crate::{Action, PlannerError, PlannerResult, Task, TaskKind};

/// Validated, append-only task catalogue.  Build it once, wrap it in an
/// `Arc` and share it between every agent's planner.
#[derive(Clone, Debug, Default)]
pub struct TaskRegistry {
    tasks:   Vec<Task>,
    by_name: FxHashMap<String, TaskId>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task and return its id.
    ///
    /// # Errors
    ///
    /// Duplicate names, chances outside `[0, 1]`, negative or non-finite
    /// durations, non-finite bonuses, and setup payoffs that are setups
    /// themselves.
    pub fn register(&mut self, name: impl Into<String>, kind: TaskKind) -> PlannerResult<TaskId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(PlannerError::DuplicateTask(name));
        }
        validate_kind(&name, &kind)?;

        let id = TaskId::try_from(self.tasks.len()).map_err(|_| PlannerError::RegistryFull)?;
        if !id.is_valid() {
            return Err(PlannerError::RegistryFull);
        }
        self.by_name.insert(name.clone(), id);
        self.tasks.push(Task { id, name, kind });
        Ok(id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.index())
    }

    /// # Panics
    /// Panics if `id` did not come from this registry.
    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.index()]
    }

    pub fn id_of(&self, name: &str) -> Option<TaskId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn validate_action(task: &str, action: &Action) -> PlannerResult<()> {
    if !(action.base_minutes.is_finite() && action.base_minutes >= 0.0) {
        return Err(PlannerError::InvalidDuration {
            task:    task.to_owned(),
            minutes: action.base_minutes,
        });
    }
    if !action.bonus.is_finite() {
        return Err(PlannerError::InvalidBonus { task: task.to_owned(), bonus: action.bonus });
    }
    Ok(())
}

fn validate_kind(task: &str, kind: &TaskKind) -> PlannerResult<()> {
    match kind {
        TaskKind::Simple(a) | TaskKind::Nesting(a) => validate_action(task, a),
        TaskKind::Risky { success, failure, chance } => {
            if !(0.0..=1.0).contains(chance) {
                return Err(PlannerError::InvalidChance { task: task.to_owned(), chance: *chance });
            }
            validate_action(task, success)?;
            validate_action(task, failure)
        }
        TaskKind::Setup { action, payoff } => {
            validate_action(task, action)?;
            if payoff.payoff().is_some() {
                return Err(PlannerError::NestedSetup(task.to_owned()));
            }
            validate_kind(&payoff.name, &payoff.kind)
        }
        TaskKind::Composite { outer, inner } => {
            validate_kind(&outer.name, &outer.kind)?;
            validate_kind(&inner.name, &inner.kind)
        }
    }
}
