//! Resolution of circular interpolation (G02/G03) commands into analytic arcs.
//!
//! An arc is encoded as the current point, the end point and an offset from the current point to the center. In
//! multi-quadrant mode (G75) the offset is signed, in single-quadrant mode (G74) it is unsigned and the center is the
//! one candidate which produces an arc of at most 90°.

use std::f64::consts::{FRAC_PI_2, TAU};

use log::trace;
use thiserror::Error;

use crate::geometry::{angle_of, distance};
use crate::primitive::ArcGerberPrimitive;
use crate::types::{Exposure, Position, Vector, Winding};

const POINT_EQUALITY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuadrantMode {
    /// G74
    #[default]
    Single,
    /// G75
    Multi,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArcError {
    #[error("Arc radius mismatch. start_radius: {start_radius}, end_radius: {end_radius}")]
    RadiusMismatch { start_radius: f64, end_radius: f64 },
    #[error("Arc offset inconsistent with single quadrant mode. i: {}, j: {}", .offset.x, .offset.y)]
    QuadrantMismatch { offset: Vector },
    #[error("Arc has zero radius")]
    ZeroRadius,
}

#[derive(Debug, Clone)]
pub struct ArcRequest {
    pub from: Position,
    pub to: Position,
    /// The I/J values, relative to `from`.
    pub offset: Vector,
    pub winding: Winding,
    pub quadrant_mode: QuadrantMode,
    pub width: f64,
    pub exposure: Exposure,
    /// Maximum allowed difference between the start and end radius, in file units.
    pub tolerance: f64,
}

pub fn resolve_arc(request: &ArcRequest) -> Result<ArcGerberPrimitive, ArcError> {
    let result = match request.quadrant_mode {
        QuadrantMode::Multi => resolve_multi_quadrant(request),
        QuadrantMode::Single => resolve_single_quadrant(request),
    };
    trace!("arc resolved. request: {:?}, result: {:?}", request, result);
    result
}

fn resolve_multi_quadrant(request: &ArcRequest) -> Result<ArcGerberPrimitive, ArcError> {
    let center = request.from + request.offset;
    let start_radius = distance(request.from, center);
    if start_radius <= POINT_EQUALITY_EPSILON {
        return Err(ArcError::ZeroRadius);
    }

    let end_radius = distance(request.to, center);
    if (start_radius - end_radius).abs() > request.tolerance {
        return Err(ArcError::RadiusMismatch {
            start_radius,
            end_radius,
        });
    }

    // coincident start and end points describe a full circle
    let full_circle = distance(request.from, request.to) <= POINT_EQUALITY_EPSILON;

    Ok(build_arc(request, center, start_radius, full_circle))
}

fn resolve_single_quadrant(request: &ArcRequest) -> Result<ArcGerberPrimitive, ArcError> {
    let magnitude = Vector::new(request.offset.x.abs(), request.offset.y.abs());
    if magnitude.x <= POINT_EQUALITY_EPSILON && magnitude.y <= POINT_EQUALITY_EPSILON {
        return Err(ArcError::ZeroRadius);
    }

    // unsigned offsets may point into any quadrant, an explicit negative sign restricts the choice.
    let signs = |value: f64| -> &'static [f64] {
        if value < 0.0 {
            &[-1.0]
        } else if value == 0.0 {
            &[1.0]
        } else {
            &[1.0, -1.0]
        }
    };

    let mut best_mismatch: Option<(f64, f64)> = None;
    let mut best: Option<(f64, ArcGerberPrimitive)> = None;

    for sign_x in signs(request.offset.x) {
        for sign_y in signs(request.offset.y) {
            let center = request.from + Vector::new(sign_x * magnitude.x, sign_y * magnitude.y);
            let start_radius = distance(request.from, center);
            let end_radius = distance(request.to, center);
            let difference = (start_radius - end_radius).abs();

            if difference > request.tolerance {
                let is_closer = best_mismatch
                    .map(|(start, end)| difference < (start - end).abs())
                    .unwrap_or(true);
                if is_closer {
                    best_mismatch = Some((start_radius, end_radius));
                }
                continue;
            }

            // single quadrant arcs never describe a full circle
            let arc = build_arc(request, center, start_radius, false);
            let max_sweep = FRAC_PI_2 + request.tolerance / start_radius;
            if arc.sweep().abs() > max_sweep {
                trace!("single quadrant candidate rejected. center: {}, sweep: {}", center, arc.sweep());
                continue;
            }

            let is_better = best
                .as_ref()
                .map(|(best_difference, _)| difference < *best_difference)
                .unwrap_or(true);
            if is_better {
                best = Some((difference, arc));
            }
        }
    }

    match (best, best_mismatch) {
        (Some((_, arc)), _) => Ok(arc),
        (None, Some((start_radius, end_radius))) if !radius_matched(request, &magnitude) => {
            Err(ArcError::RadiusMismatch {
                start_radius,
                end_radius,
            })
        }
        _ => Err(ArcError::QuadrantMismatch {
            offset: request.offset,
        }),
    }
}

/// True when at least one candidate center has matching radii.
fn radius_matched(request: &ArcRequest, magnitude: &Vector) -> bool {
    [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)]
        .iter()
        .any(|(sign_x, sign_y)| {
            let center = request.from + Vector::new(sign_x * magnitude.x, sign_y * magnitude.y);
            (distance(request.from, center) - distance(request.to, center)).abs() <= request.tolerance
        })
}

fn build_arc(request: &ArcRequest, center: Position, radius: f64, full_circle: bool) -> ArcGerberPrimitive {
    let start_angle = angle_of(center, request.from);
    let sweep = match full_circle {
        true => request.winding.signum() * TAU,
        false => compute_sweep(start_angle, angle_of(center, request.to), request.winding),
    };

    ArcGerberPrimitive {
        center,
        radius,
        start_angle,
        end_angle: start_angle + sweep,
        winding: request.winding,
        width: request.width,
        exposure: request.exposure,
    }
}

/// Signed sweep from `start_angle` to `end_angle`: counter-clockwise sweeps are in `(0, 2π]`, clockwise sweeps in
/// `[-2π, 0)`.
pub fn compute_sweep(start_angle: f64, end_angle: f64, winding: Winding) -> f64 {
    let delta = end_angle - start_angle;
    match winding {
        Winding::Clockwise => {
            if delta >= 0.0 {
                delta - TAU
            } else {
                delta
            }
        }
        Winding::CounterClockwise => {
            if delta <= 0.0 {
                delta + TAU
            } else {
                delta
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use nalgebra::Point2;
    use rstest::rstest;

    use super::*;

    fn request(from: (f64, f64), to: (f64, f64), offset: (f64, f64), winding: Winding, quadrant_mode: QuadrantMode) -> ArcRequest {
        ArcRequest {
            from: Point2::new(from.0, from.1),
            to: Point2::new(to.0, to.1),
            offset: Vector::new(offset.0, offset.1),
            winding,
            quadrant_mode,
            width: 0.1,
            exposure: Exposure::Add,
            tolerance: 1e-3,
        }
    }

    fn assert_angle(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected: {}, actual: {}", expected, actual);
    }

    #[test]
    fn test_counter_clockwise_quarter() {
        // given
        let request = request((1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), Winding::CounterClockwise, QuadrantMode::Multi);

        // when
        let arc = resolve_arc(&request).unwrap();

        // then
        assert_eq!(arc.center, Point2::new(0.0, 0.0));
        assert_eq!(arc.radius, 1.0);
        assert_angle(arc.start_angle, 0.0);
        assert_angle(arc.end_angle, FRAC_PI_2);
        assert_eq!(arc.width, 0.1);
    }

    #[test]
    fn test_clockwise_long_way_round() {
        let request = request((1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), Winding::Clockwise, QuadrantMode::Multi);

        let arc = resolve_arc(&request).unwrap();

        assert_angle(arc.start_angle, 0.0);
        assert_angle(arc.end_angle, -3.0 * FRAC_PI_2);
        assert!(arc.sweep() < 0.0);
    }

    #[test]
    fn test_clockwise_quarter_decreases_angle() {
        let request = request((0.0, 1.0), (1.0, 0.0), (0.0, -1.0), Winding::Clockwise, QuadrantMode::Multi);

        let arc = resolve_arc(&request).unwrap();

        assert_angle(arc.start_angle, FRAC_PI_2);
        assert_angle(arc.end_angle, 0.0);
    }

    #[rstest]
    #[case(Winding::CounterClockwise, 2.0 * PI)]
    #[case(Winding::Clockwise, -2.0 * PI)]
    fn test_full_circle(#[case] winding: Winding, #[case] expected_sweep: f64) {
        let request = request((1.0, 0.0), (1.0, 0.0), (-1.0, 0.0), winding, QuadrantMode::Multi);

        let arc = resolve_arc(&request).unwrap();

        assert!(arc.is_full_circle());
        assert_angle(arc.sweep(), expected_sweep);
    }

    #[test]
    fn test_radius_mismatch() {
        let request = request((0.0, 0.0), (3.0, 0.0), (1.0, 0.0), Winding::Clockwise, QuadrantMode::Multi);

        let result = resolve_arc(&request);

        assert_eq!(result, Err(ArcError::RadiusMismatch {
            start_radius: 1.0,
            end_radius: 2.0
        }));
    }

    #[test]
    fn test_radius_within_tolerance() {
        // end point rounded to the file resolution
        let request = request(
            (1.0, 0.0),
            (0.0, 1.0004),
            (-1.0, 0.0),
            Winding::CounterClockwise,
            QuadrantMode::Multi,
        );

        let arc = resolve_arc(&request).unwrap();

        assert_eq!(arc.radius, 1.0);
        assert!((distance(arc.center, request.to) - arc.radius).abs() <= request.tolerance);
    }

    #[test]
    fn test_zero_radius() {
        let request = request((1.0, 1.0), (1.0, 1.0), (0.0, 0.0), Winding::Clockwise, QuadrantMode::Multi);

        assert_eq!(resolve_arc(&request), Err(ArcError::ZeroRadius));
    }

    #[rstest]
    #[case((1.0, 0.0), (0.0, 1.0), (1.0, 0.0), Winding::CounterClockwise, (0.0, 0.0))]
    #[case((0.0, 1.0), (1.0, 0.0), (0.0, 1.0), Winding::Clockwise, (0.0, 0.0))]
    #[case((3.0, 2.0), (2.0, 3.0), (1.0, 0.0), Winding::CounterClockwise, (2.0, 2.0))]
    #[case((-1.0, 0.0), (0.0, -1.0), (1.0, 0.0), Winding::CounterClockwise, (0.0, 0.0))]
    fn test_single_quadrant_picks_center(
        #[case] from: (f64, f64),
        #[case] to: (f64, f64),
        #[case] offset: (f64, f64),
        #[case] winding: Winding,
        #[case] expected_center: (f64, f64),
    ) {
        let request = request(from, to, offset, winding, QuadrantMode::Single);

        let arc = resolve_arc(&request).unwrap();

        assert_eq!(arc.center, Point2::new(expected_center.0, expected_center.1));
        assert!(arc.sweep().abs() <= FRAC_PI_2 + 1e-9);
        assert_eq!(arc.sweep().signum(), winding.signum());
    }

    #[test]
    fn test_single_quadrant_rejects_sweep_over_90_degrees() {
        let request = request((1.0, 0.0), (-1.0, 0.0), (1.0, 0.0), Winding::CounterClockwise, QuadrantMode::Single);

        assert!(matches!(resolve_arc(&request), Err(ArcError::QuadrantMismatch { .. })));
    }

    #[test]
    fn test_single_quadrant_explicit_sign_restricts_center() {
        // the only matching center, (0, 0), needs a positive I but the file says -1
        let request = request((-1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), Winding::Clockwise, QuadrantMode::Single);

        assert!(resolve_arc(&request).is_err());
    }

    #[rstest]
    #[case(0.0, FRAC_PI_2, Winding::CounterClockwise, FRAC_PI_2)]
    #[case(0.0, FRAC_PI_2, Winding::Clockwise, -3.0 * FRAC_PI_2)]
    #[case(FRAC_PI_2, 0.0, Winding::Clockwise, -FRAC_PI_2)]
    #[case(PI, -FRAC_PI_2, Winding::CounterClockwise, FRAC_PI_2)]
    fn test_compute_sweep(#[case] start: f64, #[case] end: f64, #[case] winding: Winding, #[case] expected: f64) {
        assert_angle(compute_sweep(start, end, winding), expected);
    }
}
