use thiserror::Error;

/// Top-level error type for the cellweave topology engine.
#[derive(Debug, Error)]
pub enum TissueError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl TissueError {
    /// Returns `true` for errors that leave the graph untouched and may be
    /// handled by the caller (bad arguments, junctions not sharing a face).
    ///
    /// Broken topology and degenerate faces signal an invariant that was
    /// already violated before the call and are never recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Operation(_) | Self::Topology(TopologyError::EntityNotFound(_)))
    }
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate face: {0}")]
    DegenerateFace(String),
}

/// Errors related to the junction/membrane graph and its face labels.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("broken topology: {0}")]
    BrokenTopology(String),
}

/// Errors related to face operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("junctions do not share a face")]
    NotConnected,
}

/// Convenience type alias for results using [`TissueError`].
pub type Result<T> = std::result::Result<T, TissueError>;
