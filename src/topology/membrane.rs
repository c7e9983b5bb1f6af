use crate::math::Point2;

use super::cell::CellId;
use super::junction::JunctionId;

slotmap::new_key_type! {
    /// Unique identifier for a membrane in the tissue graph.
    pub struct MembraneId;
}

/// The face lying on one side of a membrane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceLabel {
    /// Not yet assigned; only seen while faces are being (re)computed.
    #[default]
    Unassigned,
    /// The unbounded region outside the tissue.
    Perimeter,
    /// A discovered cell.
    Cell(CellId),
}

impl FaceLabel {
    /// Returns the cell id if the label refers to a cell.
    #[must_use]
    pub fn cell(self) -> Option<CellId> {
        match self {
            Self::Cell(id) => Some(id),
            Self::Unassigned | Self::Perimeter => None,
        }
    }

    /// Returns `true` if the label is [`FaceLabel::Unassigned`].
    #[must_use]
    pub fn is_unassigned(self) -> bool {
        self == Self::Unassigned
    }
}

/// One of the two sides of a membrane, relative to its source→target direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The side holding `cell_cw`.
    Cw,
    /// The side holding `cell_ccw`.
    Ccw,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Cw => Self::Ccw,
            Self::Ccw => Self::Cw,
        }
    }
}

/// Data associated with a membrane: a boundary segment between two junctions.
///
/// Stored with a direction (source→target) but topologically undirected.
#[derive(Debug, Clone)]
pub struct MembraneData {
    pub(crate) source: JunctionId,
    pub(crate) target: JunctionId,
    /// Pixel path from source to target, endpoints included.
    pub polyline: Vec<Point2>,
    pub(crate) cell_cw: FaceLabel,
    pub(crate) cell_ccw: FaceLabel,
}

impl MembraneData {
    /// Creates an unlabelled membrane with the given polyline.
    #[must_use]
    pub fn new(source: JunctionId, target: JunctionId, polyline: Vec<Point2>) -> Self {
        Self {
            source,
            target,
            polyline,
            cell_cw: FaceLabel::Unassigned,
            cell_ccw: FaceLabel::Unassigned,
        }
    }

    /// Source junction.
    #[must_use]
    pub fn source(&self) -> JunctionId {
        self.source
    }

    /// Target junction.
    #[must_use]
    pub fn target(&self) -> JunctionId {
        self.target
    }

    /// Face on the clockwise side of the source→target direction.
    #[must_use]
    pub fn cell_cw(&self) -> FaceLabel {
        self.cell_cw
    }

    /// Face on the counter-clockwise side of the source→target direction.
    #[must_use]
    pub fn cell_ccw(&self) -> FaceLabel {
        self.cell_ccw
    }

    /// Returns the label on the given side.
    #[must_use]
    pub fn label(&self, side: Side) -> FaceLabel {
        match side {
            Side::Cw => self.cell_cw,
            Side::Ccw => self.cell_ccw,
        }
    }

    pub(crate) fn set_label(&mut self, side: Side, label: FaceLabel) {
        match side {
            Side::Cw => self.cell_cw = label,
            Side::Ccw => self.cell_ccw = label,
        }
    }

    /// Returns `true` if either side is labelled with `cell`.
    #[must_use]
    pub fn borders(&self, cell: CellId) -> bool {
        self.cell_cw == FaceLabel::Cell(cell) || self.cell_ccw == FaceLabel::Cell(cell)
    }

    /// Returns the junction across the membrane from `junction`, or `None`
    /// if `junction` is not one of its endpoints.
    #[must_use]
    pub fn opposite(&self, junction: JunctionId) -> Option<JunctionId> {
        if junction == self.source {
            Some(self.target)
        } else if junction == self.target {
            Some(self.source)
        } else {
            None
        }
    }

    /// Returns `true` if `junction` is one of the endpoints.
    #[must_use]
    pub fn touches(&self, junction: JunctionId) -> bool {
        self.source == junction || self.target == junction
    }
}
