pub mod cell;
pub mod junction;
pub mod membrane;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cell::{CellData, CellId};
pub use junction::{JunctionData, JunctionId};
pub use membrane::{FaceLabel, MembraneData, MembraneId, Side};

use crate::error::TopologyError;
use crate::math::Point2;
use slotmap::SlotMap;

/// Central arena that owns the junction/membrane graph and the cells
/// derived from it.
///
/// Entities reference each other via typed IDs (generational indices).
/// The junction/membrane graph is the source of truth; cells are an index
/// over it maintained by the face operations.
#[derive(Debug, Default, Clone)]
pub struct TissueGraph {
    junctions: SlotMap<JunctionId, JunctionData>,
    membranes: SlotMap<MembraneId, MembraneData>,
    cells: SlotMap<CellId, CellData>,
}

impl TissueGraph {
    /// Creates a new, empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Junction operations ---

    /// Inserts a junction at `point` for the given timepoint and returns its ID.
    pub fn add_junction(&mut self, time: u32, point: Point2) -> JunctionId {
        self.junctions.insert(JunctionData::new(time, point))
    }

    /// Returns a reference to the junction data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn junction(&self, id: JunctionId) -> Result<&JunctionData, TopologyError> {
        self.junctions
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("junction".into()))
    }

    /// Iterates over all junctions.
    pub fn junctions(&self) -> impl Iterator<Item = (JunctionId, &JunctionData)> {
        self.junctions.iter()
    }

    /// Number of junctions in the graph.
    #[must_use]
    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    /// Moves a junction, dragging the matching endpoint of every incident
    /// membrane polyline along. Cell geometry is not refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if the junction is not found.
    pub fn set_junction_position(&mut self, id: JunctionId, point: Point2) -> Result<(), TopologyError> {
        let junction = self
            .junctions
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("junction".into()))?;
        junction.point = point;
        for &m in &junction.membranes {
            let Some(membrane) = self.membranes.get_mut(m) else {
                continue;
            };
            if membrane.source == id {
                if let Some(first) = membrane.polyline.first_mut() {
                    *first = point;
                }
            }
            if membrane.target == id {
                if let Some(last) = membrane.polyline.last_mut() {
                    *last = point;
                }
            }
        }
        Ok(())
    }

    /// Removes a junction together with all its incident membranes.
    ///
    /// # Errors
    ///
    /// Returns an error if the junction is not found.
    pub fn remove_junction(&mut self, id: JunctionId) -> Result<JunctionData, TopologyError> {
        let incident = self.junction(id)?.membranes.clone();
        for m in incident {
            self.remove_membrane(m)?;
        }
        self.junctions
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("junction".into()))
    }

    /// Removes every junction without incident membranes and returns how
    /// many were removed.
    pub fn prune_solitary_junctions(&mut self) -> usize {
        let before = self.junctions.len();
        self.junctions.retain(|_, j| !j.membranes.is_empty());
        before - self.junctions.len()
    }

    // --- Membrane operations ---

    /// Connects two junctions with a straight membrane.
    ///
    /// # Errors
    ///
    /// See [`TissueGraph::add_membrane_with_polyline`].
    pub fn add_membrane(&mut self, source: JunctionId, target: JunctionId) -> Result<MembraneId, TopologyError> {
        self.add_membrane_with_polyline(source, target, Vec::new())
    }

    /// Connects two junctions with a membrane following `polyline`
    /// (source to target). An empty polyline defaults to the two endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if either junction is missing, if both ends are the
    /// same junction, or if the junctions belong to different timepoints.
    pub fn add_membrane_with_polyline(
        &mut self,
        source: JunctionId,
        target: JunctionId,
        polyline: Vec<Point2>,
    ) -> Result<MembraneId, TopologyError> {
        if source == target {
            return Err(TopologyError::InvalidTopology(
                "membrane must connect two distinct junctions".into(),
            ));
        }
        let s = self.junction(source)?;
        let t = self.junction(target)?;
        if s.time != t.time {
            return Err(TopologyError::InvalidTopology(format!(
                "membrane endpoints belong to timepoints {} and {}",
                s.time, t.time
            )));
        }
        let polyline = if polyline.is_empty() {
            vec![s.point, t.point]
        } else {
            polyline
        };

        let id = self.membranes.insert(MembraneData::new(source, target, polyline));
        for j in [source, target] {
            if let Some(junction) = self.junctions.get_mut(j) {
                junction.membranes.push(id);
            }
        }
        Ok(id)
    }

    /// Returns a reference to the membrane data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn membrane(&self, id: MembraneId) -> Result<&MembraneData, TopologyError> {
        self.membranes
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("membrane".into()))
    }

    /// Returns a mutable reference to the membrane data, or an error if not found.
    ///
    /// Endpoints must not be changed through this reference; junctions keep
    /// their own membrane lists.
    pub(crate) fn membrane_mut(&mut self, id: MembraneId) -> Result<&mut MembraneData, TopologyError> {
        self.membranes
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("membrane".into()))
    }

    /// Replaces the pixel path of a membrane. The ends are pinned to the
    /// junction positions; an empty path becomes the straight segment.
    /// Cell geometry is not refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if the membrane or one of its junctions is not found.
    pub fn set_membrane_polyline(&mut self, id: MembraneId, mut polyline: Vec<Point2>) -> Result<(), TopologyError> {
        let (source, target) = {
            let m = self.membrane(id)?;
            (self.junction(m.source)?.point, self.junction(m.target)?.point)
        };
        if polyline.len() < 2 {
            polyline = vec![source, target];
        }
        if let Some(first) = polyline.first_mut() {
            *first = source;
        }
        if let Some(last) = polyline.last_mut() {
            *last = target;
        }
        self.membrane_mut(id)?.polyline = polyline;
        Ok(())
    }

    /// Iterates over all membranes.
    pub fn membranes(&self) -> impl Iterator<Item = (MembraneId, &MembraneData)> {
        self.membranes.iter()
    }

    /// Number of membranes in the graph.
    #[must_use]
    pub fn membrane_count(&self) -> usize {
        self.membranes.len()
    }

    /// Removes a membrane from the graph and from the boundary lists of the
    /// cells it borders. Face labels of other membranes are left as they are;
    /// use the merge operation to keep cells consistent.
    ///
    /// # Errors
    ///
    /// Returns an error if the membrane is not found.
    pub fn remove_membrane(&mut self, id: MembraneId) -> Result<MembraneData, TopologyError> {
        let data = self
            .membranes
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("membrane".into()))?;
        for j in [data.source, data.target] {
            if let Some(junction) = self.junctions.get_mut(j) {
                junction.membranes.retain(|&m| m != id);
            }
        }
        for cell in [data.cell_cw.cell(), data.cell_ccw.cell()].into_iter().flatten() {
            if let Some(cell) = self.cells.get_mut(cell) {
                cell.membranes.retain(|&m| m != id);
            }
        }
        Ok(data)
    }

    // --- Cell operations ---

    /// Returns a reference to the cell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn cell(&self, id: CellId) -> Result<&CellData, TopologyError> {
        self.cells
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("cell".into()))
    }

    /// Iterates over all cells.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &CellData)> {
        self.cells.iter()
    }

    /// Iterates over the cells of one timepoint.
    pub fn cells_at(&self, time: u32) -> impl Iterator<Item = (CellId, &CellData)> {
        self.cells.iter().filter(move |(_, c)| c.time == time)
    }

    /// Number of cells in the graph.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> Result<&mut CellData, TopologyError> {
        self.cells
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("cell".into()))
    }

    pub(crate) fn add_cell(&mut self, data: CellData) -> CellId {
        self.cells.insert(data)
    }

    pub(crate) fn remove_cell(&mut self, id: CellId) -> Option<CellData> {
        self.cells.remove(id)
    }

    pub(crate) fn retain_cells(&mut self, mut keep: impl FnMut(&CellData) -> bool) {
        self.cells.retain(|_, c| keep(c));
    }
}
