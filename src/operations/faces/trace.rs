use std::collections::HashSet;

use tracing::warn;

use crate::error::{Result, TopologyError};
use crate::math::angle_2d::turn_angle;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::{Point2, TOLERANCE};
use crate::topology::{JunctionId, MembraneData, MembraneId, Side, TissueGraph};

/// Rotational sense of a face trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceSense {
    /// Take the sharpest right turn at every junction; the face lies to the
    /// right of the walk.
    Cw,
    /// Take the sharpest left turn at every junction; the face lies to the
    /// left of the walk.
    Ccw,
}

impl TraceSense {
    /// The sense whose forward walk stamps `side`.
    #[must_use]
    pub fn stamping(side: Side) -> Self {
        match side {
            Side::Cw => Self::Cw,
            Side::Ccw => Self::Ccw,
        }
    }
}

/// A membrane walked in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dart {
    /// The membrane being walked.
    pub membrane: MembraneId,
    /// `true` if walked source→target.
    pub forward: bool,
}

impl Dart {
    /// Walks `membrane` source→target.
    #[must_use]
    pub fn forward(membrane: MembraneId) -> Self {
        Self {
            membrane,
            forward: true,
        }
    }

    /// Walks `membrane` away from `junction`.
    #[must_use]
    pub fn leaving(membrane: MembraneId, data: &MembraneData, junction: JunctionId) -> Self {
        Self {
            membrane,
            forward: data.source == junction,
        }
    }

    /// The same membrane walked the other way.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            membrane: self.membrane,
            forward: !self.forward,
        }
    }

    /// The junction the walk starts from.
    #[must_use]
    pub fn tail(self, data: &MembraneData) -> JunctionId {
        if self.forward {
            data.source
        } else {
            data.target
        }
    }

    /// The junction the walk arrives at.
    #[must_use]
    pub fn head(self, data: &MembraneData) -> JunctionId {
        if self.forward {
            data.target
        } else {
            data.source
        }
    }

    /// The membrane side labelled by a trace of `sense` walking this dart.
    #[must_use]
    pub fn side(self, sense: TraceSense) -> Side {
        match (sense, self.forward) {
            (TraceSense::Cw, true) | (TraceSense::Ccw, false) => Side::Cw,
            (TraceSense::Cw, false) | (TraceSense::Ccw, true) => Side::Ccw,
        }
    }
}

/// Iterator over the darts bounding one face.
///
/// Starting from a dart, every step turns around the junction just reached
/// ("pivot") onto the incident membrane with the tightest turn in the
/// requested sense. A pivot with a single membrane sends the walk back over
/// it, so faces detour into and out of dangling branches. The iterator ends
/// when the start dart comes round again.
///
/// A walk that does not close within twice the membrane count has visited
/// some dart twice, which only happens with a corrupted rotation; it yields
/// a `BrokenTopology` error and stops.
#[derive(Debug, Clone)]
pub struct FaceTrace<'a> {
    graph: &'a TissueGraph,
    sense: TraceSense,
    excluded: Option<MembraneId>,
    start: Dart,
    current: Dart,
    started: bool,
    finished: bool,
    steps: usize,
    limit: usize,
}

impl<'a> FaceTrace<'a> {
    /// Creates a trace of the face on the `sense` side of `start`.
    #[must_use]
    pub fn new(graph: &'a TissueGraph, start: Dart, sense: TraceSense) -> Self {
        Self {
            graph,
            sense,
            excluded: None,
            start,
            current: start,
            started: false,
            finished: false,
            steps: 0,
            limit: 2 * graph.membrane_count().max(1),
        }
    }

    /// Traces as if `membrane` were already removed from the graph.
    #[must_use]
    pub fn excluding(mut self, membrane: MembraneId) -> Self {
        self.excluded = Some(membrane);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_step_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Picks the dart following `dart` around the pivot it arrives at.
    fn advance(&self, dart: Dart) -> Result<Dart> {
        let membrane = self.graph.membrane(dart.membrane)?;
        let from = dart.tail(membrane);
        let pivot = dart.head(membrane);
        let junction = self.graph.junction(pivot)?;

        let usable = || {
            junction
                .membranes()
                .iter()
                .copied()
                .filter(|&m| Some(m) != self.excluded)
        };

        let mut candidates = usable();
        let (Some(only), None) = (candidates.next(), candidates.next()) else {
            return self.turn(dart, from, pivot, usable());
        };
        // Dead end: walk back.
        let data = self.graph.membrane(only)?;
        Ok(Dart::leaving(only, data, pivot))
    }

    fn turn(
        &self,
        dart: Dart,
        from: JunctionId,
        pivot: JunctionId,
        candidates: impl Iterator<Item = MembraneId>,
    ) -> Result<Dart> {
        let prev_pt = self.graph.junction(from)?.point;
        let pivot_pt = self.graph.junction(pivot)?.point;

        let mut best: Option<(Dart, f64)> = None;
        for m in candidates {
            if m == dart.membrane {
                continue;
            }
            let data = self.graph.membrane(m)?;
            let across = data.opposite(pivot).ok_or_else(|| {
                TopologyError::BrokenTopology("membrane listed at a junction it does not touch".into())
            })?;
            let next_pt: Point2 = self.graph.junction(across)?.point;
            let theta = turn_angle(&prev_pt, &pivot_pt, &next_pt);

            let better = match (best, self.sense) {
                (None, _) => true,
                (Some((_, b)), TraceSense::Cw) => theta < b,
                (Some((_, b)), TraceSense::Ccw) => theta > b,
            };
            if better {
                best = Some((Dart::leaving(m, data, pivot), theta));
            }
        }

        best.map(|(d, _)| d).ok_or_else(|| {
            TopologyError::BrokenTopology("face trace reached a junction with no usable membrane".into())
                .into()
        })
    }
}

impl Iterator for FaceTrace<'_> {
    type Item = Result<Dart>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || (self.started && self.current == self.start) {
            self.finished = true;
            return None;
        }
        if self.steps >= self.limit {
            self.finished = true;
            warn!(steps = self.steps, "face trace did not return to its start");
            return Some(Err(TopologyError::BrokenTopology(format!(
                "face trace did not close within {} steps",
                self.limit
            ))
            .into()));
        }

        let dart = self.current;
        match self.advance(dart) {
            Ok(next) => {
                self.current = next;
                self.started = true;
                self.steps += 1;
                Some(Ok(dart))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// The darts of one traced face, in walk order.
#[derive(Debug, Clone)]
pub struct TracedFace {
    /// Sense the face was traced in.
    pub sense: TraceSense,
    /// Walked darts; a dangling branch contributes both of its darts.
    pub darts: Vec<Dart>,
}

impl TracedFace {
    /// Traces the face on the `sense` side of `start`.
    ///
    /// # Errors
    ///
    /// Returns `BrokenTopology` if the walk does not close, or an
    /// entity error if the graph references missing entities.
    pub fn trace(graph: &TissueGraph, start: Dart, sense: TraceSense) -> Result<Self> {
        Self::collect(FaceTrace::new(graph, start, sense), sense)
    }

    /// Traces the face on the `sense` side of `start`, ignoring `excluded`.
    ///
    /// # Errors
    ///
    /// See [`TracedFace::trace`].
    pub fn trace_excluding(
        graph: &TissueGraph,
        start: Dart,
        sense: TraceSense,
        excluded: MembraneId,
    ) -> Result<Self> {
        Self::collect(FaceTrace::new(graph, start, sense).excluding(excluded), sense)
    }

    fn collect(trace: FaceTrace<'_>, sense: TraceSense) -> Result<Self> {
        let darts = trace.collect::<Result<Vec<_>>>()?;
        Ok(Self { sense, darts })
    }

    /// The membranes along the face, each once, in walk order.
    #[must_use]
    pub fn membranes(&self) -> Vec<MembraneId> {
        let mut seen = HashSet::with_capacity(self.darts.len());
        self.darts
            .iter()
            .map(|d| d.membrane)
            .filter(|&m| seen.insert(m))
            .collect()
    }

    /// `(membrane, side)` pairs this face labels.
    pub fn sides(&self) -> impl Iterator<Item = (MembraneId, Side)> + '_ {
        self.darts.iter().map(|d| (d.membrane, d.side(self.sense)))
    }

    /// Returns `true` if any walked membrane ends at `junction`.
    ///
    /// # Errors
    ///
    /// Returns an error if a walked membrane is missing from the graph.
    pub fn touches(&self, graph: &TissueGraph, junction: JunctionId) -> Result<bool> {
        for d in &self.darts {
            if graph.membrane(d.membrane)?.touches(junction) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Signed area enclosed by the walk through the junction positions.
    ///
    /// # Errors
    ///
    /// Returns an error if a walked membrane or junction is missing.
    pub fn signed_area(&self, graph: &TissueGraph) -> Result<f64> {
        let mut points = Vec::with_capacity(self.darts.len());
        for d in &self.darts {
            let data = graph.membrane(d.membrane)?;
            points.push(graph.junction(d.tail(data))?.point);
        }
        Ok(signed_area_2d(&points))
    }

    /// Returns `true` if the face is the unbounded region around its
    /// component: the walk circles against the trace sense, or encloses
    /// nothing at all (a tree).
    ///
    /// # Errors
    ///
    /// See [`TracedFace::signed_area`].
    pub fn is_unbounded(&self, graph: &TissueGraph) -> Result<bool> {
        let area = self.signed_area(graph)?;
        Ok(match self.sense {
            TraceSense::Cw => area > -TOLERANCE,
            TraceSense::Ccw => area < TOLERANCE,
        })
    }
}
