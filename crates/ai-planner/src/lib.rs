//! `ai-planner` — anytime utility planner choosing an agent's next task.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`state`]    | `WorldState`, `Needs`, `Stance`, `Actor` trait             |
//! | [`task`]     | `Task`, `TaskKind`, `Action`, `Requirements`, `Effect`     |
//! | [`registry`] | `TaskRegistry` — validated catalogue shared via `Arc`      |
//! | [`plan`]     | `PlanNode`, `PlanRoot` — partial chains and payoff folding |
//! | [`planner`]  | `UtilityPlanner`, `Phase`                                  |
//! | [`error`]    | `PlannerError`, `PlannerResult<T>`                         |
//!
//! # Design notes
//!
//! Chains are ranked by cumulative utility over cumulative time, so a long
//! chain is never favoured just for being long.  One `tick()` does a fixed
//! amount of work (one seeding pass, or `expansions_per_tick` pops), which
//! lets hundreds of agents plan side by side within a frame budget.
//!
//! All lookahead happens on cloned [`WorldState`] snapshots; the planner
//! never touches the live world.

pub mod error;
pub mod plan;
pub mod planner;
pub mod registry;
pub mod state;
pub mod task;

#[cfg(test)]
mod tests;

pub use error::{PlannerError, PlannerResult};
pub use plan::{PlanNode, PlanRoot};
pub use planner::{Phase, UtilityPlanner};
pub use registry::TaskRegistry;
pub use state::{Actor, Needs, Stance, WorldState};
pub use task::{Action, ConversationEffect, Effect, Requirements, Task, TaskKind};
