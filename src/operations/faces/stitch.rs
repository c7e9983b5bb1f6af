use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2};
use crate::topology::{MembraneId, TissueGraph};

/// A face boundary joined from its membranes' polylines.
#[derive(Debug, Clone)]
pub struct StitchedBoundary {
    /// Topological centroid of the face.
    pub centroid: Point2,
    /// Continuous boundary polygon, relative to `centroid`.
    pub polygon: Vec<Vector2>,
}

/// Mean of the endpoint positions of every membrane in `face`.
///
/// This is a vertex centroid, not an area centroid.
///
/// # Errors
///
/// Returns `GeometryError::DegenerateFace` if `face` is empty, or an entity
/// error if a membrane or junction is missing.
pub fn topological_centroid(graph: &TissueGraph, face: &[MembraneId]) -> Result<Point2> {
    if face.is_empty() {
        return Err(GeometryError::DegenerateFace("face has no membranes".into()).into());
    }
    let mut sum = Vector2::zeros();
    for &m in face {
        let data = graph.membrane(m)?;
        sum += graph.junction(data.source)?.point.coords;
        sum += graph.junction(data.target)?.point.coords;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = (2 * face.len()) as f64;
    Ok(Point2::from(sum / n))
}

/// Joins the polylines of the membranes bounding one face into a single
/// boundary, whatever direction each polyline was stored in.
///
/// The first two polylines are oriented by the closest of their four
/// endpoint pairings; every later polyline is reversed if its far end lies
/// closer to the current tail. A join point equal to the tail is not
/// repeated. The result is shifted by `centroid`, or by the topological
/// centroid when `None`.
///
/// # Errors
///
/// Returns `GeometryError::DegenerateFace` if `face` is empty, or an entity
/// error if a membrane or junction is missing.
pub fn stitch_boundary(
    graph: &TissueGraph,
    face: &[MembraneId],
    centroid: Option<Point2>,
) -> Result<StitchedBoundary> {
    let centroid = match centroid {
        Some(c) if !face.is_empty() => c,
        _ => topological_centroid(graph, face)?,
    };

    let mut points: Vec<Point2> = Vec::new();
    let mut joined = 0_usize;
    for &m in face {
        let line = &graph.membrane(m)?.polyline;
        if line.is_empty() {
            continue;
        }
        match joined {
            0 => points.extend_from_slice(line),
            1 => join_second(&mut points, line),
            _ => join_tail(&mut points, line),
        }
        joined += 1;
    }

    let polygon = points.iter().map(|p| p - centroid).collect();
    Ok(StitchedBoundary { centroid, polygon })
}

fn dist_sq(a: &Point2, b: &Point2) -> f64 {
    (a - b).norm_squared()
}

/// Orients the seed and the second polyline by their closest endpoints.
fn join_second(points: &mut Vec<Point2>, line: &[Point2]) {
    let (Some(&head), Some(&tail)) = (points.first(), points.last()) else {
        points.extend_from_slice(line);
        return;
    };
    let (Some(first), Some(last)) = (line.first(), line.last()) else {
        return;
    };

    // (gap, reverse seed, reverse line)
    let pairings = [
        (dist_sq(&tail, first), false, false),
        (dist_sq(&tail, last), false, true),
        (dist_sq(&head, first), true, false),
        (dist_sq(&head, last), true, true),
    ];
    let mut best = pairings[0];
    for p in &pairings[1..] {
        if p.0 < best.0 {
            best = *p;
        }
    }

    if best.1 {
        points.reverse();
    }
    if best.2 {
        append(points, line.iter().rev());
    } else {
        append(points, line.iter());
    }
}

/// Appends `line` to the tail, reversed if its last point is closer.
fn join_tail(points: &mut Vec<Point2>, line: &[Point2]) {
    let (Some(tail), Some(first), Some(last)) = (points.last(), line.first(), line.last()) else {
        return;
    };
    if dist_sq(tail, last) < dist_sq(tail, first) {
        append(points, line.iter().rev());
    } else {
        append(points, line.iter());
    }
}

fn append<'a>(points: &mut Vec<Point2>, line: impl Iterator<Item = &'a Point2>) {
    let mut line = line.peekable();
    if let (Some(tail), Some(first)) = (points.last(), line.peek()) {
        if tail == *first {
            line.next();
        }
    }
    points.extend(line.copied());
}
