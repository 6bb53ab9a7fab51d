use std::f64::consts::{FRAC_PI_2, TAU};

pub use bounding_box::*;

use crate::types::{Position, Vector};

pub mod bounding_box;

/// Normalize an angle into `[0, 2π)`.
pub fn normalize_angle(radians: f64) -> f64 {
    let normalized = radians.rem_euclid(TAU);
    // rem_euclid can return TAU itself due to rounding of tiny negative inputs
    if normalized >= TAU {
        0.0
    } else {
        normalized
    }
}

pub fn distance(a: Position, b: Position) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

pub fn angle_of(center: Position, point: Position) -> f64 {
    (point.y - center.y).atan2(point.x - center.x)
}

pub fn point_on_circle(center: Position, radius: f64, radians: f64) -> Position {
    let (sin, cos) = radians.sin_cos();
    center + Vector::new(radius * cos, radius * sin)
}

/// Angles of the axis-aligned extremes (0°, 90°, 180°, 270°) that lie within the sweep that starts at
/// `start_angle` and travels `sweep` radians (negative = clockwise).
pub fn axis_crossings(start_angle: f64, sweep: f64) -> Vec<f64> {
    let (from, to) = match sweep >= 0.0 {
        true => (start_angle, start_angle + sweep),
        false => (start_angle + sweep, start_angle),
    };

    let mut crossings = vec![];
    let mut quadrant = (from / FRAC_PI_2).ceil();
    while quadrant * FRAC_PI_2 <= to {
        crossings.push(quadrant * FRAC_PI_2);
        quadrant += 1.0;
    }
    crossings
}
