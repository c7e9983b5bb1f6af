use crate::math::{Point2, Vector2};

use super::membrane::MembraneId;

slotmap::new_key_type! {
    /// Unique identifier for a cell in the tissue graph.
    pub struct CellId;
}

/// Data associated with a cell: a closed face of the planar subdivision.
///
/// A cell is derived from the junction/membrane graph and only holds
/// membrane ids, never the membranes themselves.
#[derive(Debug, Clone)]
pub struct CellData {
    /// Timepoint the cell belongs to.
    pub time: u32,
    pub(crate) centroid: Point2,
    pub(crate) membranes: Vec<MembraneId>,
    pub(crate) boundary: Vec<Vector2>,
}

impl CellData {
    /// Topological centroid (mean of the boundary membranes' endpoints).
    #[must_use]
    pub fn centroid(&self) -> Point2 {
        self.centroid
    }

    /// Boundary membranes in trace order, each listed once.
    #[must_use]
    pub fn membrane_ids(&self) -> &[MembraneId] {
        &self.membranes
    }

    /// Boundary polygon relative to the centroid.
    #[must_use]
    pub fn boundary_polygon(&self) -> &[Vector2] {
        &self.boundary
    }

    /// Boundary polygon in absolute coordinates.
    #[must_use]
    pub fn absolute_boundary(&self) -> Vec<Point2> {
        self.boundary.iter().map(|v| self.centroid + v).collect()
    }
}
