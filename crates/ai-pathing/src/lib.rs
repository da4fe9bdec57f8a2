//! `ai-pathing` — incremental shortest-path search for moving agents.
//!
//! One D*-Lite engine, [`IncrementalSearch`], is generic over the graph it
//! walks and over where it keeps per-node state.  The two node domains of
//! `ai-spatial` each get an alias:
//!
//! | Alias          | Graph       | Store                   |
//! |----------------|-------------|-------------------------|
//! | [`GridSearch`] | `LocalGrid` | `DenseStore<CellId>`    |
//! | [`ZoneSearch`] | `ZoneGraph` | `SparseStore<NodeId>`   |
//!
//! # Crate layout
//!
//! | Module          | Contents                                             |
//! |-----------------|------------------------------------------------------|
//! | [`search`]      | `IncrementalSearch`, `GridSearch`, `ZoneSearch`      |
//! | [`destination`] | `Destination`, `EndpointDiff`, stock destinations    |
//! | [`store`]       | `SearchState`, `NodeStore`, `DenseStore`, `SparseStore` |
//! | [`key`]         | `PriorityKey`, `KeyOrder`                            |
//! | [`error`]       | `PathingError`, `PathingResult`                      |
//!
//! # Driving a search
//!
//! ```ignore
//! let mut search = GridSearch::new(DenseStore::with_capacity(grid.len()), SearchConfig::default())?;
//! search.set_goal(&grid, GridDestination::new(&grid, &[bed])?);
//! search.update_start(&grid, here);
//! if search.is_goal_reachable() {
//!     let next = search.next_hop(&grid, here);
//! }
//! ```

pub mod destination;
pub mod error;
pub mod key;
pub mod search;
pub mod store;

#[cfg(test)]
mod tests;

pub use destination::{
    Destination, EndpointDiff, FixedDestination, GridDestination, MovingDestination,
    ZoneDestination,
};
pub use error::{PathingError, PathingResult};
pub use key::{KeyOrder, PriorityKey};
pub use search::{GridSearch, IncrementalSearch, ZoneSearch};
pub use store::{DenseKey, DenseStore, NodeStore, SearchState, SparseStore};
