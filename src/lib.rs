pub mod error;
pub mod math;
pub mod operations;
pub mod topology;

pub use error::{Result, TissueError};
pub use operations::faces::{FaceParams, MergeFaces, RebuildFaces, RestitchCells, SplitFace};
pub use topology::{CellId, FaceLabel, JunctionId, MembraneId, Side, TissueGraph};
