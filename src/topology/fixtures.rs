//! Shared graphs for tests.

#![allow(clippy::unwrap_used)]

use crate::math::Point2;

use super::{JunctionId, MembraneId, TissueGraph};

/// Installs a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Adds a closed ring of membranes through `points` and returns the
/// junctions and membranes in ring order.
pub(crate) fn ring(graph: &mut TissueGraph, time: u32, points: &[(f64, f64)]) -> (Vec<JunctionId>, Vec<MembraneId>) {
    let junctions: Vec<JunctionId> = points
        .iter()
        .map(|&(x, y)| graph.add_junction(time, Point2::new(x, y)))
        .collect();
    let membranes = (0..junctions.len())
        .map(|i| {
            graph
                .add_membrane(junctions[i], junctions[(i + 1) % junctions.len()])
                .unwrap()
        })
        .collect();
    (junctions, membranes)
}

/// Corners of the reference hexagon, centroid (10, 15).
pub(crate) const HEXAGON: [(f64, f64); 6] = [
    (10.0, 0.0),
    (20.0, 10.0),
    (20.0, 20.0),
    (10.0, 30.0),
    (0.0, 20.0),
    (0.0, 10.0),
];

/// A single hexagonal ring.
pub(crate) fn hexagon() -> (TissueGraph, Vec<JunctionId>, Vec<MembraneId>) {
    let mut graph = TissueGraph::new();
    let (junctions, membranes) = ring(&mut graph, 0, &HEXAGON);
    (graph, junctions, membranes)
}

/// Three hexagons around the junction (20, 20): two side by side and one
/// below between them. Three membranes are shared.
pub(crate) struct ThreeHexagons {
    pub graph: TissueGraph,
    pub shared: Vec<MembraneId>,
}

pub(crate) fn three_hexagons() -> ThreeHexagons {
    let mut graph = TissueGraph::new();
    let mut at = |x: f64, y: f64| graph.add_junction(0, Point2::new(x, y));
    let a = at(10.0, 0.0);
    let b = at(20.0, 10.0);
    let c = at(20.0, 20.0);
    let d = at(10.0, 30.0);
    let e = at(0.0, 20.0);
    let f = at(0.0, 10.0);
    let g = at(30.0, 0.0);
    let h = at(40.0, 10.0);
    let i = at(40.0, 20.0);
    let j = at(30.0, 30.0);
    let k = at(30.0, 40.0);
    let l = at(20.0, 50.0);
    let m = at(10.0, 40.0);

    for (s, t) in [(a, b), (d, e), (e, f), (f, a)] {
        graph.add_membrane(s, t).unwrap();
    }
    for (s, t) in [(b, g), (g, h), (h, i), (i, j)] {
        graph.add_membrane(s, t).unwrap();
    }
    for (s, t) in [(j, k), (k, l), (l, m), (m, d)] {
        graph.add_membrane(s, t).unwrap();
    }
    let shared = vec![
        graph.add_membrane(b, c).unwrap(),
        graph.add_membrane(j, c).unwrap(),
        graph.add_membrane(c, d).unwrap(),
    ];

    ThreeHexagons { graph, shared }
}
