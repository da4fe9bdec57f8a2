//! `ai-spatial` — traversal graphs and one-shot routing.
//!
//! # Node domains
//!
//! | Domain | Graph         | Node     | Storage                      |
//! |--------|---------------|----------|------------------------------|
//! | Grid   | [`LocalGrid`] | `CellId` | dense, row-major `Vec<Cell>` |
//! | Zone   | [`ZoneGraph`] | `NodeId` | hashed, ids never reused     |
//!
//! Both implement [`Graph`], which is all the incremental search in
//! `ai-pathing` needs from a map.
//!
//! # What lives here
//!
//! | Module     | Contents                                              |
//! |------------|-------------------------------------------------------|
//! | [`graph`]  | `Graph` trait                                         |
//! | [`grid`]   | `LocalGrid`, `Cell`, `Connectivity`, `GridMetric`     |
//! | [`zone`]   | `ZoneGraph`, `Connector`                              |
//! | [`router`] | `Route`, `Router`, `astar`, stock routers             |
//! | [`pool`]   | `MaterializerPool`, `PathTicket`                      |
//! | [`error`]  | `SpatialError`, `SpatialResult`                       |

pub mod error;
pub mod graph;
pub mod grid;
pub mod pool;
pub mod router;
pub mod zone;


pub use error::{SpatialError, SpatialResult};
pub use graph::Graph;
pub use grid::{Cell, Connectivity, GridMetric, LocalGrid};
pub use pool::{MaterializerPool, PathTicket};
pub use router::{astar, DijkstraRouter, GridRouter, Route, Router, ZoneRouter};
pub use zone::{Connector, ZoneGraph};
