use super::Point2;

/// Computes the signed area of a closed point loop (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. Out-and-back
/// detours contribute nothing.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}
