//! Spatial-subsystem error type.

use thiserror::Error;

use ai_core::{CoreError, GridPos, NodeId};

/// Errors produced by `ai-spatial` while building or editing graphs.
///
/// Unreachability is never an error here: routers return `None`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("grid dimensions {width}x{height} are invalid")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("position {pos} lies outside the {width}x{height} grid")]
    OutOfBounds { pos: GridPos, width: u32, height: u32 },

    #[error("connector {0} not found")]
    UnknownConnector(NodeId),

    #[error("no edge from {from} to {to}")]
    NoEdge { from: NodeId, to: NodeId },

    #[error("invalid edge cost {0}")]
    InvalidCost(f32),

    #[error("materializer pool: {0}")]
    Pool(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
