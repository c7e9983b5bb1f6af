use std::collections::HashSet;

use tracing::{debug, trace};

use crate::error::Result;
use crate::topology::{FaceLabel, MembraneId, Side, TissueGraph};

use super::trace::{Dart, TraceSense, TracedFace};
use super::{demote_to_perimeter, FaceParams, PendingCell};

/// Counts reported by [`RebuildFaces`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Faces traced.
    pub faces: usize,
    /// Cells left after pruning.
    pub cells: usize,
    /// Faces relabelled as perimeter.
    pub pruned: usize,
}

/// Discovers every face of the graph from scratch.
///
/// All existing cells (of the selected timepoint) are discarded and every
/// membrane side is retraced. Faces that look like the background region
/// are relabelled [`FaceLabel::Perimeter`] afterwards.
///
/// All faces are traced and stitched before the graph is touched, so a
/// failing trace leaves the previous cells in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct RebuildFaces {
    params: FaceParams,
    time: Option<u32>,
}

impl RebuildFaces {
    /// Creates a rebuild over all timepoints.
    #[must_use]
    pub fn new(params: FaceParams) -> Self {
        Self { params, time: None }
    }

    /// Restricts the rebuild to membranes and cells of one timepoint.
    #[must_use]
    pub fn at_time(mut self, time: u32) -> Self {
        self.time = Some(time);
        self
    }

    /// Executes the rebuild.
    ///
    /// # Errors
    ///
    /// Returns `BrokenTopology` if a face trace does not close.
    pub fn execute(&self, graph: &mut TissueGraph) -> Result<RebuildSummary> {
        let targets: Vec<MembraneId> = graph
            .membranes()
            .filter(|(_, m)| {
                self.time
                    .is_none_or(|t| graph.junction(m.source).is_ok_and(|j| j.time == t))
            })
            .map(|(id, _)| id)
            .collect();

        // Trace and stitch every face first; nothing is written yet.
        let mut covered: HashSet<(MembraneId, Side)> = HashSet::with_capacity(2 * targets.len());
        let mut faces = Vec::new();
        for &m in &targets {
            for side in [Side::Cw, Side::Ccw] {
                if covered.contains(&(m, side)) {
                    continue;
                }
                let face = TracedFace::trace(graph, Dart::forward(m), TraceSense::stamping(side))?;
                covered.extend(face.sides());
                let unbounded = self.params.prune_unbounded && face.is_unbounded(graph)?;
                trace!(darts = face.darts.len(), unbounded, "traced face");
                faces.push((PendingCell::prepare(graph, face)?, unbounded));
            }
        }

        graph.retain_cells(|c| matches!(self.time, Some(t) if c.time != t));
        for &m in &targets {
            let data = graph.membrane_mut(m)?;
            data.cell_cw = FaceLabel::Unassigned;
            data.cell_ccw = FaceLabel::Unassigned;
        }

        let mut summary = RebuildSummary {
            faces: faces.len(),
            ..RebuildSummary::default()
        };
        for (pending, unbounded) in faces {
            let id = pending.commit(graph)?;
            let count = graph.cell(id)?.membrane_ids().len();
            if unbounded || count > self.params.max_membranes_per_cell {
                trace!(membranes = count, unbounded, "pruning background face");
                demote_to_perimeter(graph, id)?;
                summary.pruned += 1;
            } else {
                summary.cells += 1;
            }
        }

        debug!(
            faces = summary.faces,
            cells = summary.cells,
            pruned = summary.pruned,
            time = ?self.time,
            "rebuilt faces"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point2, TOLERANCE};
    use crate::operations::query::ValidateFaces;
    use crate::topology::{fixtures, CellId};
    use approx::assert_relative_eq;

    fn count_only(max: usize) -> FaceParams {
        FaceParams {
            max_membranes_per_cell: max,
            prune_unbounded: false,
        }
    }

    #[test]
    fn hexagon_has_one_cell_and_a_perimeter() {
        fixtures::init_tracing();
        let (mut graph, _, membranes) = fixtures::hexagon();
        let summary = RebuildFaces::default().execute(&mut graph).unwrap();
        assert_eq!(
            summary,
            RebuildSummary {
                faces: 2,
                cells: 1,
                pruned: 1
            }
        );

        let (id, cell) = graph.cells().next().unwrap();
        assert_eq!(cell.membrane_ids().len(), 6);
        assert_relative_eq!(cell.centroid(), Point2::new(10.0, 15.0), epsilon = TOLERANCE);
        for m in membranes {
            let data = graph.membrane(m).unwrap();
            assert_eq!(data.cell_ccw(), FaceLabel::Cell(id));
            assert_eq!(data.cell_cw(), FaceLabel::Perimeter);
        }
        assert!(ValidateFaces::new().execute(&graph).is_empty());
    }

    #[test]
    fn count_threshold_alone() {
        let (mut graph, _, _) = fixtures::hexagon();
        let summary = RebuildFaces::new(count_only(20)).execute(&mut graph).unwrap();
        assert_eq!(summary.cells, 2);
        let sets: Vec<HashSet<MembraneId>> = graph
            .cells()
            .map(|(_, c)| c.membrane_ids().iter().copied().collect())
            .collect();
        assert_eq!(sets[0], sets[1]);

        let summary = RebuildFaces::new(count_only(5)).execute(&mut graph).unwrap();
        assert_eq!(summary.cells, 0);
        assert_eq!(summary.pruned, 2);
        assert_eq!(graph.cell_count(), 0);
        assert!(graph
            .membranes()
            .all(|(_, m)| m.cell_cw() == FaceLabel::Perimeter && m.cell_ccw() == FaceLabel::Perimeter));
    }

    #[test]
    fn three_hexagons_share_membranes() {
        let fixture = fixtures::three_hexagons();
        let mut graph = fixture.graph;
        let summary = graph.rebuild_all_faces(20).unwrap();
        assert_eq!(summary.cells, 3);
        assert_eq!(summary.pruned, 1);

        for m in &fixture.shared {
            let data = graph.membrane(*m).unwrap();
            let (Some(a), Some(b)) = (data.cell_cw().cell(), data.cell_ccw().cell()) else {
                panic!("shared membrane borders the perimeter");
            };
            assert_ne!(a, b);
        }
        let perimeter_sides = graph
            .membranes()
            .filter(|(_, m)| m.cell_cw() == FaceLabel::Perimeter || m.cell_ccw() == FaceLabel::Perimeter)
            .count();
        assert_eq!(perimeter_sides, 12);
        assert!(graph.cells().all(|(_, c)| c.membrane_ids().len() == 6));
        assert!(ValidateFaces::new().execute(&graph).is_empty());

        let summary = RebuildFaces::new(count_only(20)).execute(&mut graph).unwrap();
        assert_eq!(summary.cells, 4);
    }

    #[test]
    fn no_side_left_unassigned() {
        let fixture = fixtures::three_hexagons();
        let mut graph = fixture.graph;
        RebuildFaces::new(count_only(8)).execute(&mut graph).unwrap();
        assert!(graph
            .membranes()
            .all(|(_, m)| !m.cell_cw().is_unassigned() && !m.cell_ccw().is_unassigned()));
        assert_eq!(graph.cell_count(), 3);
    }

    #[test]
    fn dangling_branch_belongs_to_one_cell() {
        let (mut graph, junctions, _) = fixtures::hexagon();
        let tip = graph.add_junction(0, Point2::new(10.0, 12.0));
        let spur = graph.add_membrane(junctions[0], tip).unwrap();
        graph.rebuild_all_faces(20).unwrap();

        assert_eq!(graph.cell_count(), 1);
        let (id, cell) = graph.cells().next().unwrap();
        assert_eq!(cell.membrane_ids().len(), 7);
        let data = graph.membrane(spur).unwrap();
        assert_eq!(data.cell_cw(), FaceLabel::Cell(id));
        assert_eq!(data.cell_ccw(), FaceLabel::Cell(id));
    }

    #[test]
    fn single_timepoint_rebuild_keeps_other_frames() {
        let mut graph = TissueGraph::new();
        fixtures::ring(&mut graph, 0, &fixtures::HEXAGON);
        let (later, _) = fixtures::ring(&mut graph, 1, &fixtures::HEXAGON);
        graph.rebuild_all_faces(20).unwrap();
        assert_eq!(graph.cell_count(), 2);
        let first: Vec<CellId> = graph.cells_at(0).map(|(id, _)| id).collect();
        assert_eq!(first.len(), 1);

        graph.add_membrane(later[1], later[4]).unwrap();
        let summary = RebuildFaces::default().at_time(1).execute(&mut graph).unwrap();
        assert_eq!(summary.cells, 2);
        assert_eq!(graph.cells_at(1).count(), 2);
        assert_eq!(graph.cells_at(0).map(|(id, _)| id).collect::<Vec<_>>(), first);
        assert!(ValidateFaces::new().execute(&graph).is_empty());
    }

    #[test]
    fn broken_rotation_leaves_cells_untouched() {
        let (mut graph, junctions, membranes) = fixtures::hexagon();
        graph.rebuild_all_faces(20).unwrap();
        let before: Vec<CellId> = graph.cells().map(|(id, _)| id).collect();

        // Re-point a membrane without updating the junction rotations.
        graph.membrane_mut(membranes[2]).unwrap().target = junctions[5];
        let err = graph.rebuild_all_faces(20).unwrap_err();

        assert!(!err.is_recoverable());
        assert_eq!(graph.cells().map(|(id, _)| id).collect::<Vec<_>>(), before);
        assert!(graph
            .membranes()
            .all(|(_, m)| !m.cell_cw().is_unassigned() && !m.cell_ccw().is_unassigned()));
    }
}
