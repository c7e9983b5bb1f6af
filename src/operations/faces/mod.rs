//! Face discovery and maintenance over the junction/membrane graph.

mod merge;
mod rebuild;
mod restitch;
mod split;
pub mod stitch;
pub mod trace;

pub use merge::MergeFaces;
pub use rebuild::{RebuildFaces, RebuildSummary};
pub use restitch::RestitchCells;
pub use split::SplitFace;
pub use stitch::{stitch_boundary, topological_centroid, StitchedBoundary};
pub use trace::{Dart, FaceTrace, TraceSense, TracedFace};

use crate::error::{GeometryError, OperationError, Result, TissueError, TopologyError};
use crate::topology::{CellData, CellId, FaceLabel, JunctionId, MembraneId, TissueGraph};

/// Parameters controlling which traced faces become cells.
#[derive(Debug, Clone, Copy)]
pub struct FaceParams {
    /// Faces bounded by more distinct membranes than this are treated as the
    /// background region and labelled [`FaceLabel::Perimeter`].
    pub max_membranes_per_cell: usize,
    /// Also treat the unbounded face of every connected component as
    /// background, judged by the orientation of its walk.
    pub prune_unbounded: bool,
}

impl Default for FaceParams {
    fn default() -> Self {
        Self {
            max_membranes_per_cell: 20,
            prune_unbounded: true,
        }
    }
}

impl FaceParams {
    /// Default parameters with a different membrane-count threshold.
    #[must_use]
    pub fn with_max_membranes(max_membranes_per_cell: usize) -> Self {
        Self {
            max_membranes_per_cell,
            ..Self::default()
        }
    }

    /// Returns `true` if `face` is the background region rather than a cell.
    ///
    /// # Errors
    ///
    /// Returns an error if a walked membrane or junction is missing.
    pub fn is_background(&self, graph: &TissueGraph, face: &TracedFace) -> Result<bool> {
        if face.membranes().len() > self.max_membranes_per_cell {
            return Ok(true);
        }
        if self.prune_unbounded {
            return face.is_unbounded(graph);
        }
        Ok(false)
    }
}

/// A traced face with its stitched boundary, ready to be written into the
/// graph. Building one only reads the graph.
#[derive(Debug, Clone)]
pub(crate) struct PendingCell {
    face: TracedFace,
    cell: CellData,
}

impl PendingCell {
    pub(crate) fn prepare(graph: &TissueGraph, face: TracedFace) -> Result<Self> {
        let membranes = face.membranes();
        let first = membranes
            .first()
            .ok_or_else(|| GeometryError::DegenerateFace("face has no membranes".into()))?;
        let time = graph.junction(graph.membrane(*first)?.source)?.time;
        let boundary = stitch_boundary(graph, &membranes, None)?;
        Ok(Self {
            face,
            cell: CellData {
                time,
                centroid: boundary.centroid,
                membranes,
                boundary: boundary.polygon,
            },
        })
    }

    /// Inserts the cell and labels the traced sides with it.
    pub(crate) fn commit(self, graph: &mut TissueGraph) -> Result<CellId> {
        let id = graph.add_cell(self.cell);
        stamp(graph, &self.face, FaceLabel::Cell(id))?;
        Ok(id)
    }
}

/// Labels every side walked by `face` with `label`.
pub(crate) fn stamp(graph: &mut TissueGraph, face: &TracedFace, label: FaceLabel) -> Result<()> {
    for (m, side) in face.sides() {
        graph.membrane_mut(m)?.set_label(side, label);
    }
    Ok(())
}

/// Replaces every label pointing at `cell` with `Perimeter` and deletes the cell.
pub(crate) fn demote_to_perimeter(graph: &mut TissueGraph, cell: CellId) -> Result<()> {
    let data = graph
        .remove_cell(cell)
        .ok_or_else(|| TopologyError::EntityNotFound("cell".into()))?;
    for m in data.membranes {
        let membrane = graph.membrane_mut(m)?;
        if membrane.cell_cw == FaceLabel::Cell(cell) {
            membrane.cell_cw = FaceLabel::Perimeter;
        }
        if membrane.cell_ccw == FaceLabel::Cell(cell) {
            membrane.cell_ccw = FaceLabel::Perimeter;
        }
    }
    Ok(())
}

impl TissueGraph {
    /// Recomputes every face of the graph, pruning faces with more than
    /// `max_membranes_per_cell` membranes and the unbounded outer faces.
    ///
    /// # Errors
    ///
    /// Returns `BrokenTopology` if a face trace does not close; the graph is
    /// left unchanged in that case.
    pub fn rebuild_all_faces(&mut self, max_membranes_per_cell: usize) -> Result<RebuildSummary> {
        RebuildFaces::new(FaceParams::with_max_membranes(max_membranes_per_cell)).execute(self)
    }

    /// Connects two junctions on a common face with a new straight membrane,
    /// splitting that face. Returns `None` if the junctions share no face.
    ///
    /// New faces are judged with [`FaceParams::default`]; use
    /// [`TissueGraph::split_face_with_params`] when the graph was rebuilt
    /// with other parameters.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid junctions or a broken topology.
    pub fn split_face(&mut self, source: JunctionId, target: JunctionId) -> Result<Option<MembraneId>> {
        self.split_face_with_params(source, target, FaceParams::default())
    }

    /// Like [`TissueGraph::split_face`], deciding background faces with `params`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid junctions or a broken topology.
    pub fn split_face_with_params(
        &mut self,
        source: JunctionId,
        target: JunctionId,
        params: FaceParams,
    ) -> Result<Option<MembraneId>> {
        match SplitFace::new(source, target).with_params(params).execute(self) {
            Ok(m) => Ok(Some(m)),
            Err(TissueError::Operation(OperationError::NotConnected)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Removes a membrane separating two cells and fuses them into one.
    ///
    /// # Errors
    ///
    /// See [`MergeFaces::execute`].
    pub fn merge_faces(&mut self, membrane: MembraneId) -> Result<CellId> {
        MergeFaces::new(membrane).execute(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn default_params() {
        let params = FaceParams::default();
        assert_eq!(params.max_membranes_per_cell, 20);
        assert!(params.prune_unbounded);
        assert_eq!(FaceParams::with_max_membranes(6).max_membranes_per_cell, 6);
    }

    #[test]
    fn background_by_count_or_orientation() {
        let (graph, _, membranes) = fixtures::hexagon();
        let start = Dart::forward(membranes[0]);
        let inside = TracedFace::trace(&graph, start, TraceSense::Ccw).unwrap();
        let outside = TracedFace::trace(&graph, start, TraceSense::Cw).unwrap();

        let params = FaceParams::default();
        assert!(!params.is_background(&graph, &inside).unwrap());
        assert!(params.is_background(&graph, &outside).unwrap());

        let count_only = FaceParams {
            max_membranes_per_cell: 20,
            prune_unbounded: false,
        };
        assert!(!count_only.is_background(&graph, &outside).unwrap());
        assert!(FaceParams {
            max_membranes_per_cell: 5,
            prune_unbounded: false,
        }
        .is_background(&graph, &inside)
        .unwrap());
    }

    #[test]
    fn convenience_split_reports_unconnected_as_none() {
        let mut graph = TissueGraph::new();
        let (a, _) = fixtures::ring(&mut graph, 0, &fixtures::HEXAGON);
        let shifted: Vec<(f64, f64)> = fixtures::HEXAGON.iter().map(|&(x, y)| (x + 100.0, y)).collect();
        let (b, _) = fixtures::ring(&mut graph, 0, &shifted);
        graph.rebuild_all_faces(20).unwrap();

        let before = graph.membrane_count();
        assert_eq!(graph.split_face(a[0], b[0]).unwrap(), None);
        assert_eq!(graph.membrane_count(), before);
        assert_eq!(graph.cell_count(), 2);

        let m = graph.split_face(a[0], a[3]).unwrap().unwrap();
        assert_eq!(graph.cell_count(), 3);
        let merged = graph.merge_faces(m).unwrap();
        assert_eq!(graph.cell(merged).unwrap().membrane_ids().len(), 6);
    }

    #[test]
    fn split_honours_given_params() {
        let fixture = fixtures::three_hexagons();
        let mut graph = fixture.graph;
        let params = FaceParams {
            max_membranes_per_cell: 2,
            prune_unbounded: false,
        };
        RebuildFaces::default().execute(&mut graph).unwrap();
        let corner = |graph: &TissueGraph, x: f64, y: f64| {
            graph
                .junctions()
                .find(|(_, j)| j.point == crate::math::Point2::new(x, y))
                .map(|(id, _)| id)
                .unwrap()
        };
        let a = corner(&graph, 10.0, 0.0);
        let g = corner(&graph, 30.0, 0.0);

        // The three-membrane notch is over the limit, so no cell is added.
        let m = graph.split_face_with_params(a, g, params).unwrap().unwrap();
        assert_eq!(graph.cell_count(), 3);
        let data = graph.membrane(m).unwrap();
        assert_eq!(data.cell_cw(), FaceLabel::Perimeter);
        assert_eq!(data.cell_ccw(), FaceLabel::Perimeter);
    }
}
