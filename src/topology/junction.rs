use crate::math::Point2;

use super::membrane::MembraneId;

slotmap::new_key_type! {
    /// Unique identifier for a junction in the tissue graph.
    pub struct JunctionId;
}

/// Data associated with a junction: a point where membranes meet.
#[derive(Debug, Clone)]
pub struct JunctionData {
    /// The 2D position of the junction.
    pub point: Point2,
    /// Timepoint (frame index) the junction belongs to.
    pub time: u32,
    /// Incident membranes, in insertion order. Rotational order is derived
    /// from the geometry when tracing, not from this list.
    pub(crate) membranes: Vec<MembraneId>,
}

impl JunctionData {
    /// Creates a new junction without incident membranes.
    #[must_use]
    pub fn new(time: u32, point: Point2) -> Self {
        Self {
            point,
            time,
            membranes: Vec::new(),
        }
    }

    /// Returns the incident membranes.
    #[must_use]
    pub fn membranes(&self) -> &[MembraneId] {
        &self.membranes
    }

    /// Returns the number of incident membranes.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.membranes.len()
    }
}
