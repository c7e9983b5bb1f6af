use std::f64::consts::PI;

use super::Point2;

/// Returns the direction angle of the vector from `from` to `to`, in `(-pi, pi]`.
#[must_use]
pub fn direction_angle(from: &Point2, to: &Point2) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Normalizes an angle to `(-pi, pi]`.
#[must_use]
pub fn normalize_angle(a: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let mut r = a % two_pi;
    if r <= -PI {
        r += two_pi;
    } else if r > PI {
        r -= two_pi;
    }
    r
}

/// Signed turn angle at `pivot` when arriving from `prev` and leaving towards `next`.
///
/// Negative values are right (clockwise) turns, positive values left turns.
/// Going straight back to `prev` yields `pi`.
#[must_use]
pub fn turn_angle(prev: &Point2, pivot: &Point2, next: &Point2) -> f64 {
    let incoming = direction_angle(prev, pivot);
    let outgoing = direction_angle(pivot, next);
    normalize_angle(outgoing - incoming)
}
