use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{OperationError, Result, TopologyError};
use crate::topology::{CellId, FaceLabel, JunctionId, MembraneId, Side, TissueGraph};

use super::trace::{Dart, TraceSense, TracedFace};
use super::PendingCell;

/// Removes a membrane separating two cells and fuses them into one.
///
/// The merged face is traced as if the membrane were already gone, so a
/// failure leaves the graph untouched.
#[derive(Debug, Clone, Copy)]
pub struct MergeFaces {
    membrane: MembraneId,
}

impl MergeFaces {
    /// Creates a new `MergeFaces` operation removing `membrane`.
    #[must_use]
    pub fn new(membrane: MembraneId) -> Self {
        Self { membrane }
    }

    /// Executes the merge, returning the fused cell.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the membrane does not have a
    /// cell on both sides, or has the same cell on both sides without ending
    /// in a dangling tip, and `BrokenTopology` if no surviving membrane
    /// continues either cell's boundary or the merged boundary disagrees with
    /// the two cells.
    pub fn execute(&self, graph: &mut TissueGraph) -> Result<CellId> {
        let data = graph.membrane(self.membrane)?;
        let (Some(cw), Some(ccw)) = (data.cell_cw().cell(), data.cell_ccw().cell()) else {
            return Err(OperationError::InvalidInput(
                "membrane does not separate two cells".into(),
            )
            .into());
        };
        let cells = [cw, ccw];
        let endpoints = [data.source, data.target];
        if cw == ccw && !self.is_tip(graph, endpoints)? {
            return Err(OperationError::InvalidInput(
                "only the last membrane of a dangling branch can be merged away".into(),
            )
            .into());
        }

        let retained: HashSet<MembraneId> = cells
            .iter()
            .map(|&c| graph.cell(c))
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .flat_map(|c| c.membrane_ids().iter().copied())
            .filter(|&m| m != self.membrane)
            .collect();

        let (start, sense) = [Side::Cw, Side::Ccw]
            .into_iter()
            .find_map(|side| self.find_boundary(graph, endpoints, cells, side))
            .ok_or_else(|| {
                warn!(membrane = ?self.membrane, "no boundary membrane left next to merged cells");
                TopologyError::BrokenTopology("no surviving membrane borders the merged cells".into())
            })?;

        let face = TracedFace::trace_excluding(graph, start, sense, self.membrane)?;
        let traced: HashSet<MembraneId> = face.membranes().into_iter().collect();
        if traced != retained {
            warn!(
                traced = traced.len(),
                retained = retained.len(),
                "merged boundary disagrees with the cells it replaces"
            );
            return Err(TopologyError::BrokenTopology(
                "merged boundary does not match the boundaries of the merged cells".into(),
            )
            .into());
        }
        let pending = PendingCell::prepare(graph, face)?;

        graph.remove_membrane(self.membrane)?;
        graph.remove_cell(cw);
        graph.remove_cell(ccw);
        let merged = pending.commit(graph)?;

        debug!(membranes = traced.len(), "merged cells");
        Ok(merged)
    }

    /// Returns `true` if one endpoint has no other membrane, so removing the
    /// membrane shortens a dangling branch without splitting the cell.
    fn is_tip(&self, graph: &TissueGraph, endpoints: [JunctionId; 2]) -> Result<bool> {
        for j in endpoints {
            if graph.junction(j)?.membranes().iter().all(|&m| m == self.membrane) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Finds a membrane at either endpoint, other than the one being removed,
    /// whose `side` is labelled with one of `cells`. The returned dart walks
    /// it so that a trace of the returned sense labels that side.
    fn find_boundary(
        &self,
        graph: &TissueGraph,
        endpoints: [JunctionId; 2],
        cells: [CellId; 2],
        side: Side,
    ) -> Option<(Dart, TraceSense)> {
        endpoints
            .iter()
            .filter_map(|&j| graph.junction(j).ok())
            .flat_map(|j| j.membranes().iter().copied())
            .filter(|&m| m != self.membrane)
            .find(|&m| {
                graph
                    .membrane(m)
                    .is_ok_and(|d| cells.iter().any(|&c| d.label(side) == FaceLabel::Cell(c)))
            })
            .map(|m| (Dart::forward(m), TraceSense::stamping(side)))
    }
}
