use thiserror::Error;

use ai_core::CoreError;
use ai_spatial::SpatialError;

/// Errors surfaced by `ai-pathing`.
///
/// An unreachable goal is not an error: it shows up as
/// `is_goal_reachable() == false` and an infinite `score`.
#[derive(Debug, Error)]
pub enum PathingError {
    #[error("invalid edge cost {0}")]
    InvalidCost(f32),

    #[error("destination has no endpoints")]
    NoEndpoints,

    #[error("no goal set, or the current goal cannot move")]
    GoalNotMovable,

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type PathingResult<T> = Result<T, PathingError>;
