use tracing::debug;

use crate::error::{OperationError, Result};
use crate::topology::{FaceLabel, JunctionId, MembraneId, TissueGraph};

use super::trace::{Dart, TraceSense, TracedFace};
use super::{stamp, FaceParams, PendingCell};

/// Splits a face by inserting a straight membrane between two junctions on
/// its boundary.
///
/// The old cell is replaced by the cells traced on both sides of the new
/// membrane. When the split face is the background region, the side that
/// still looks like background stays [`FaceLabel::Perimeter`].
#[derive(Debug, Clone, Copy)]
pub struct SplitFace {
    source: JunctionId,
    target: JunctionId,
    params: FaceParams,
}

enum NewFace {
    Cell(PendingCell),
    Background(TracedFace),
}

impl SplitFace {
    /// Creates a new `SplitFace` operation connecting `source` to `target`.
    #[must_use]
    pub fn new(source: JunctionId, target: JunctionId) -> Self {
        Self {
            source,
            target,
            params: FaceParams::default(),
        }
    }

    /// Sets the parameters deciding whether a new face is background.
    #[must_use]
    pub fn with_params(mut self, params: FaceParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the split, returning the new membrane.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::NotConnected` if the junctions share no face,
    /// `OperationError::InvalidInput` if they are the same junction, already
    /// adjacent, in different timepoints, or the straight connection leaves
    /// the shared face, and `BrokenTopology` if tracing fails. The graph is
    /// unchanged whenever an error is returned.
    pub fn execute(&self, graph: &mut TissueGraph) -> Result<MembraneId> {
        self.check_shared_face(graph)?;

        let membrane = graph.add_membrane(self.source, self.target)?;
        let (old, faces) = match self.trace_new_faces(graph, membrane) {
            Ok(traced) => traced,
            Err(e) => {
                graph.remove_membrane(membrane)?;
                return Err(e);
            }
        };

        if let Some(old) = old.cell() {
            graph.remove_cell(old);
        }
        let mut created = Vec::with_capacity(faces.len());
        for face in faces {
            match face {
                NewFace::Cell(pending) => created.push(pending.commit(graph)?),
                NewFace::Background(face) => stamp(graph, &face, FaceLabel::Perimeter)?,
            }
        }

        debug!(replaced = ?old, cells = created.len(), "split face");
        Ok(membrane)
    }

    /// Validates the request and checks that some face contains both junctions.
    fn check_shared_face(&self, graph: &TissueGraph) -> Result<()> {
        if self.source == self.target {
            return Err(OperationError::InvalidInput("cannot split a face at a single junction".into()).into());
        }
        let source = graph.junction(self.source)?;
        let target = graph.junction(self.target)?;
        if source.time != target.time {
            return Err(OperationError::InvalidInput(format!(
                "junctions belong to timepoints {} and {}",
                source.time, target.time
            ))
            .into());
        }

        for &m in source.membranes() {
            let data = graph.membrane(m)?;
            if data.touches(self.target) {
                return Err(OperationError::InvalidInput("junctions are already connected".into()).into());
            }
        }

        for &m in source.membranes() {
            let data = graph.membrane(m)?;
            let start = Dart::leaving(m, data, self.source);
            for sense in [TraceSense::Cw, TraceSense::Ccw] {
                let face = TracedFace::trace(graph, start, sense)?;
                if face.touches(graph, self.target)? {
                    return Ok(());
                }
            }
        }
        Err(OperationError::NotConnected.into())
    }

    /// Traces both sides of the freshly inserted membrane and returns the
    /// label of the face they were carved from. Reads only.
    ///
    /// Both junctions may share more than one face; the geometry of the
    /// inserted membrane decides which one is split.
    fn trace_new_faces(&self, graph: &TissueGraph, membrane: MembraneId) -> Result<(FaceLabel, Vec<NewFace>)> {
        let start = Dart::forward(membrane);
        let cw = TracedFace::trace(graph, start, TraceSense::Cw)?;
        let mut traced = vec![cw];
        // A face touching itself through the new membrane has it on both sides.
        if !traced[0].darts.contains(&start.reversed()) {
            traced.push(TracedFace::trace(graph, start, TraceSense::Ccw)?);
        }

        let mut old: Option<FaceLabel> = None;
        for face in &traced {
            for (m, side) in face.sides().filter(|&(m, _)| m != membrane) {
                let label = graph.membrane(m)?.label(side);
                if *old.get_or_insert(label) != label {
                    return Err(OperationError::InvalidInput(
                        "new membrane does not lie inside a single face".into(),
                    )
                    .into());
                }
            }
        }

        let faces = traced
            .into_iter()
            .map(|face| {
                if self.params.is_background(graph, &face)? {
                    Ok(NewFace::Background(face))
                } else {
                    Ok(NewFace::Cell(PendingCell::prepare(graph, face)?))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((old.unwrap_or_default(), faces))
    }
}
