//! `ai-core` — foundational types for the agent decision core.
//!
//! Every other `ai-*` crate depends on this one.  It has no `ai-*`
//! dependencies and minimal external ones (`rand`, `thiserror`, optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`ids`]      | `NodeId`, `CellId`, `ZoneId`, `AgentId`, `TaskId`          |
//! | [`pos`]      | `GridPos`, `WorldPos`, distance metrics                    |
//! | [`config`]   | `SearchConfig`, `PlannerConfig`, `MaterializerConfig`      |
//! | [`rng`]      | `SimRng` (seeded, deterministic)                           |
//! | [`error`]    | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, positions, configs. |

pub mod config;
pub mod error;
pub mod ids;
pub mod pos;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{MaterializerConfig, PlannerConfig, SearchConfig};
pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, CellId, NodeId, TaskId, ZoneId};
pub use pos::{GridPos, WorldPos};
pub use rng::SimRng;
