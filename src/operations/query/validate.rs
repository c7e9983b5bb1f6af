use tracing::debug;

use crate::math::Point2;
use crate::operations::faces::stitch_boundary;
use crate::topology::{CellData, CellId, FaceLabel, MembraneId, Side, TissueGraph};

/// Distance under which two boundary points count as the same.
const CLOSURE_TOLERANCE: f64 = 1e-6;

/// A broken link between membranes and the cells they bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceViolation {
    /// A membrane side carries no label.
    Unassigned { membrane: MembraneId, side: Side },
    /// A membrane side is labelled with a cell that does not exist.
    DanglingLabel {
        membrane: MembraneId,
        side: Side,
        cell: CellId,
    },
    /// A membrane side names a cell that does not list the membrane.
    NotListed { cell: CellId, membrane: MembraneId },
    /// A cell lists a membrane that no longer exists.
    MissingMembrane { cell: CellId, membrane: MembraneId },
    /// A cell lists a membrane whose sides are labelled with other faces.
    NotBordering { cell: CellId, membrane: MembraneId },
    /// The cell's membranes, stitched as they are now, do not return to
    /// their start.
    OpenBoundary { cell: CellId },
    /// The stored boundary polygon or centroid no longer matches the cell's
    /// membranes.
    StaleBoundary { cell: CellId },
}

/// Checks that face labels on membranes and membrane lists on cells agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateFaces;

impl ValidateFaces {
    /// Creates a new `ValidateFaces` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the validation, returning every violation found.
    #[must_use]
    pub fn execute(&self, graph: &TissueGraph) -> Vec<FaceViolation> {
        let mut violations = Vec::new();

        for (membrane, data) in graph.membranes() {
            for side in [Side::Cw, Side::Ccw] {
                match data.label(side) {
                    FaceLabel::Unassigned => violations.push(FaceViolation::Unassigned { membrane, side }),
                    FaceLabel::Perimeter => {}
                    FaceLabel::Cell(cell) => match graph.cell(cell) {
                        Err(_) => violations.push(FaceViolation::DanglingLabel { membrane, side, cell }),
                        Ok(c) if !c.membrane_ids().contains(&membrane) => {
                            violations.push(FaceViolation::NotListed { cell, membrane });
                        }
                        Ok(_) => {}
                    },
                }
            }
        }

        for (cell, data) in graph.cells() {
            let mut two_sided = false;
            for &membrane in data.membrane_ids() {
                match graph.membrane(membrane) {
                    Err(_) => violations.push(FaceViolation::MissingMembrane { cell, membrane }),
                    Ok(m) if !m.borders(cell) => {
                        violations.push(FaceViolation::NotBordering { cell, membrane });
                    }
                    Ok(m) => two_sided |= m.cell_cw() == m.cell_ccw(),
                }
            }

            // Missing membranes are already reported and cannot be stitched.
            let Ok(fresh) = stitch_boundary(graph, data.membrane_ids(), None) else {
                continue;
            };
            let points: Vec<Point2> = fresh.polygon.iter().map(|v| fresh.centroid + v).collect();

            // Dangling branches are walked there and back, so their boundary
            // need not close.
            if !two_sided && data.membrane_ids().len() >= 3 {
                if let (Some(first), Some(last)) = (points.first(), points.last()) {
                    if (first - last).norm() > CLOSURE_TOLERANCE {
                        violations.push(FaceViolation::OpenBoundary { cell });
                    }
                }
            }
            if !matches_stored(data, fresh.centroid, &points) {
                violations.push(FaceViolation::StaleBoundary { cell });
            }
        }

        if !violations.is_empty() {
            debug!(count = violations.len(), "face violations found");
        }
        violations
    }

    /// Returns `true` if the graph has no face violations.
    #[must_use]
    pub fn is_valid(&self, graph: &TissueGraph) -> bool {
        self.execute(graph).is_empty()
    }
}

fn matches_stored(cell: &CellData, centroid: Point2, points: &[Point2]) -> bool {
    let stored = cell.absolute_boundary();
    (cell.centroid() - centroid).norm() <= CLOSURE_TOLERANCE
        && stored.len() == points.len()
        && stored
            .iter()
            .zip(points)
            .all(|(a, b)| (a - b).norm() <= CLOSURE_TOLERANCE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::faces::RestitchCells;
    use crate::topology::fixtures;

    #[test]
    fn fresh_graph_reports_unassigned_sides() {
        let (graph, _, membranes) = fixtures::hexagon();
        let violations = ValidateFaces::new().execute(&graph);
        assert_eq!(violations.len(), 12);
        assert!(violations.contains(&FaceViolation::Unassigned {
            membrane: membranes[0],
            side: Side::Cw
        }));
    }

    #[test]
    fn rebuilt_graph_is_valid() {
        let fixture = fixtures::three_hexagons();
        let mut graph = fixture.graph;
        graph.rebuild_all_faces(20).unwrap();
        assert!(ValidateFaces::new().is_valid(&graph));
    }

    #[test]
    fn removing_a_membrane_opens_the_cell() {
        let (mut graph, _, membranes) = fixtures::hexagon();
        graph.rebuild_all_faces(20).unwrap();
        let (cell, _) = graph.cells().next().unwrap();

        graph.remove_membrane(membranes[0]).unwrap();
        assert_eq!(graph.cell(cell).unwrap().membrane_ids().len(), 5);
        let violations = ValidateFaces::new().execute(&graph);
        assert!(violations.contains(&FaceViolation::OpenBoundary { cell }));

        // Refreshing the stored polygon does not hide the gap.
        RestitchCells::new().execute(&mut graph).unwrap();
        assert_eq!(
            ValidateFaces::new().execute(&graph),
            vec![FaceViolation::OpenBoundary { cell }]
        );
    }

    #[test]
    fn moved_junction_leaves_stale_boundary_until_restitched() {
        let (mut graph, junctions, _) = fixtures::hexagon();
        graph.rebuild_all_faces(20).unwrap();
        let (cell, _) = graph.cells().next().unwrap();

        graph.set_junction_position(junctions[2], Point2::new(24.0, 20.0)).unwrap();
        assert_eq!(
            ValidateFaces::new().execute(&graph),
            vec![FaceViolation::StaleBoundary { cell }]
        );

        RestitchCells::around(junctions[2]).execute(&mut graph).unwrap();
        assert!(ValidateFaces::new().is_valid(&graph));
    }

    #[test]
    fn mismatched_labels() {
        let fixture = fixtures::three_hexagons();
        let mut graph = fixture.graph;
        graph.rebuild_all_faces(20).unwrap();
        let shared = fixture.shared[0];
        let cell = graph.membrane(shared).unwrap().cell_cw().cell().unwrap();

        graph.membrane_mut(shared).unwrap().set_label(Side::Cw, FaceLabel::Perimeter);
        let violations = ValidateFaces::new().execute(&graph);
        assert_eq!(violations, vec![FaceViolation::NotBordering { cell, membrane: shared }]);

        let spare = graph.add_junction(0, Point2::new(50.0, 50.0));
        let far = graph.add_junction(0, Point2::new(60.0, 50.0));
        let loose = graph.add_membrane(spare, far).unwrap();
        graph.membrane_mut(loose).unwrap().set_label(Side::Cw, FaceLabel::Cell(cell));
        graph.membrane_mut(loose).unwrap().set_label(Side::Ccw, FaceLabel::Perimeter);
        let violations = ValidateFaces::new().execute(&graph);
        assert!(violations.contains(&FaceViolation::NotListed { cell, membrane: loose }));
    }

    #[test]
    fn label_of_deleted_cell_dangles() {
        let (mut graph, _, membranes) = fixtures::hexagon();
        graph.rebuild_all_faces(20).unwrap();
        let (cell, _) = graph.cells().next().unwrap();
        graph.remove_cell(cell);

        let violations = ValidateFaces::new().execute(&graph);
        assert_eq!(violations.len(), 6);
        assert!(violations.contains(&FaceViolation::DanglingLabel {
            membrane: membranes[3],
            side: Side::Ccw,
            cell
        }));
    }

    #[test]
    fn truncated_stored_boundary_is_stale() {
        let (mut graph, _, _) = fixtures::hexagon();
        graph.rebuild_all_faces(20).unwrap();
        let (cell, _) = graph.cells().next().unwrap();
        graph.cell_mut(cell).unwrap().boundary.pop();

        assert_eq!(
            ValidateFaces::new().execute(&graph),
            vec![FaceViolation::StaleBoundary { cell }]
        );
    }
}
