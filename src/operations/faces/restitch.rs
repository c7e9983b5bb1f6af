use tracing::debug;

use crate::error::Result;
use crate::topology::{CellId, JunctionId, TissueGraph};

use super::stitch::stitch_boundary;

/// Recomputes centroid and boundary polygon of cells after junctions or
/// polylines were edited. Topology and face labels are not touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestitchCells {
    around: Option<JunctionId>,
}

impl RestitchCells {
    /// Restitches every cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restitches only the cells bordering `junction`.
    #[must_use]
    pub fn around(junction: JunctionId) -> Self {
        Self {
            around: Some(junction),
        }
    }

    /// Executes the operation, returning the number of cells updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the junction or a boundary membrane is missing, or
    /// a cell has no membranes left.
    pub fn execute(&self, graph: &mut TissueGraph) -> Result<usize> {
        let targets: Vec<CellId> = match self.around {
            None => graph.cells().map(|(id, _)| id).collect(),
            Some(j) => {
                let mut ids = Vec::new();
                for &m in graph.junction(j)?.membranes() {
                    let data = graph.membrane(m)?;
                    for cell in [data.cell_cw().cell(), data.cell_ccw().cell()].into_iter().flatten() {
                        if !ids.contains(&cell) {
                            ids.push(cell);
                        }
                    }
                }
                ids
            }
        };

        for &id in &targets {
            let boundary = stitch_boundary(graph, graph.cell(id)?.membrane_ids(), None)?;
            let cell = graph.cell_mut(id)?;
            cell.centroid = boundary.centroid;
            cell.boundary = boundary.polygon;
        }

        debug!(cells = targets.len(), "restitched cells");
        Ok(targets.len())
    }
}
