use thiserror::Error;

use ai_core::CoreError;

/// Errors raised while building a task registry or a planner.
///
/// Planning itself never fails: with nothing worth doing the planner repeats
/// its last choice.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("task {0:?} is already registered")]
    DuplicateTask(String),

    #[error("task {task:?}: success chance {chance} is outside [0, 1]")]
    InvalidChance { task: String, chance: f32 },

    #[error("task {task:?}: duration {minutes} must be finite and non-negative")]
    InvalidDuration { task: String, minutes: f32 },

    #[error("task {task:?}: utility bonus {bonus} must be finite")]
    InvalidBonus { task: String, bonus: f32 },

    #[error("task {0:?}: a setup payoff cannot itself be a setup task")]
    NestedSetup(String),

    #[error("task registry is full")]
    RegistryFull,

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
