//! The drawable shapes produced by the interpreter.
//!
//! All coordinates are in file units. Arcs are kept analytic (center, radius, angles) so that renderers can sample
//! them at whatever resolution they need.

use std::f64::consts::TAU;
use std::ops::Index;
use std::slice::Iter;

use crate::aperture::ApertureShape;
use crate::geometry::{axis_crossings, point_on_circle, BoundingBox};
use crate::types::{Exposure, Position, Winding};

const FULL_CIRCLE_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GerberPrimitive {
    Segment(SegmentGerberPrimitive),
    Arc(ArcGerberPrimitive),
    Flash(FlashGerberPrimitive),
    Region(RegionGerberPrimitive),
}

/// A straight stroke of an aperture.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentGerberPrimitive {
    pub from: Position,
    pub to: Position,
    pub width: f64,
    pub exposure: Exposure,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcGerberPrimitive {
    pub center: Position,
    pub radius: f64,
    /// Radians.
    pub start_angle: f64,
    /// Radians, `end_angle - start_angle` is the signed sweep, negative for clockwise arcs.
    pub end_angle: f64,
    pub winding: Winding,
    pub width: f64,
    pub exposure: Exposure,
}

impl ArcGerberPrimitive {
    /// Signed sweep in radians, positive = counter-clockwise.
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn is_full_circle(&self) -> bool {
        (self.sweep().abs() - TAU).abs() < FULL_CIRCLE_EPSILON
    }

    pub fn start_point(&self) -> Position {
        point_on_circle(self.center, self.radius, self.start_angle)
    }

    pub fn end_point(&self) -> Position {
        point_on_circle(self.center, self.radius, self.end_angle)
    }
}

/// An aperture exposed at a single point (D03).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlashGerberPrimitive {
    pub shape: ApertureShape,
    pub center: Position,
    pub exposure: Exposure,
}

/// A filled area bounded by one or more contours (G36/G37).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionGerberPrimitive {
    pub contours: Vec<Contour>,
    pub exposure: Exposure,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contour {
    pub start: Position,
    pub edges: Vec<ContourEdge>,
}

impl Contour {
    pub fn new(start: Position) -> Self {
        Self {
            start,
            edges: vec![],
        }
    }

    pub fn end(&self) -> Position {
        match self.edges.last() {
            None => self.start,
            Some(ContourEdge::Line {
                to,
            }) => *to,
            Some(ContourEdge::Arc(arc)) => arc.end_point(),
        }
    }

    /// Gerber requires contours to be closed, exporters occasionally leave a rounding sized gap.
    pub fn is_closed(&self, tolerance: f64) -> bool {
        crate::geometry::distance(self.start, self.end()) <= tolerance
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContourEdge {
    Line { to: Position },
    /// Arcs in contours have zero width.
    Arc(ArcGerberPrimitive),
}

pub trait WithBoundingBox {
    fn bounding_box(&self) -> BoundingBox;
}

impl WithBoundingBox for SegmentGerberPrimitive {
    fn bounding_box(&self) -> BoundingBox {
        let Self {
            from,
            to,
            width,
            ..
        } = self;

        BoundingBox::from_points(&[*from, *to]).inflate(width / 2.0)
    }
}

impl WithBoundingBox for ArcGerberPrimitive {
    /// Only the swept part of the circle counts, the full circle is only used when the sweep passes every
    /// axis-aligned extreme.
    fn bounding_box(&self) -> BoundingBox {
        let mut points = vec![self.start_point(), self.end_point()];
        points.extend(
            axis_crossings(self.start_angle, self.sweep())
                .into_iter()
                .map(|angle| point_on_circle(self.center, self.radius, angle)),
        );

        BoundingBox::from_points(&points).inflate(self.width / 2.0)
    }
}

impl WithBoundingBox for FlashGerberPrimitive {
    fn bounding_box(&self) -> BoundingBox {
        self.shape.footprint(self.center)
    }
}

impl WithBoundingBox for RegionGerberPrimitive {
    fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::default();
        for contour in &self.contours {
            bbox.expand_point(contour.start);
            for edge in &contour.edges {
                match edge {
                    ContourEdge::Line {
                        to,
                    } => bbox.expand_point(*to),
                    ContourEdge::Arc(arc) => bbox.expand(&arc.bounding_box()),
                }
            }
        }
        bbox
    }
}

impl WithBoundingBox for GerberPrimitive {
    fn bounding_box(&self) -> BoundingBox {
        match self {
            GerberPrimitive::Segment(primitive) => primitive.bounding_box(),
            GerberPrimitive::Arc(primitive) => primitive.bounding_box(),
            GerberPrimitive::Flash(primitive) => primitive.bounding_box(),
            GerberPrimitive::Region(primitive) => primitive.bounding_box(),
        }
    }
}

impl GerberPrimitive {
    pub fn exposure(&self) -> Exposure {
        match self {
            GerberPrimitive::Segment(primitive) => primitive.exposure,
            GerberPrimitive::Arc(primitive) => primitive.exposure,
            GerberPrimitive::Flash(primitive) => primitive.exposure,
            GerberPrimitive::Region(primitive) => primitive.exposure,
        }
    }
}

/// Ordered, append-only sequence of primitives; immutable once the layer has been built.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrimitiveStream {
    primitives: Vec<GerberPrimitive>,
}

impl PrimitiveStream {
    pub(crate) fn push(&mut self, primitive: GerberPrimitive) {
        self.primitives.push(primitive);
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, GerberPrimitive> {
        self.primitives.iter()
    }

    pub fn as_slice(&self) -> &[GerberPrimitive] {
        &self.primitives
    }
}

impl Index<usize> for PrimitiveStream {
    type Output = GerberPrimitive;

    fn index(&self, index: usize) -> &Self::Output {
        &self.primitives[index]
    }
}

impl<'a> IntoIterator for &'a PrimitiveStream {
    type Item = &'a GerberPrimitive;
    type IntoIter = Iter<'a, GerberPrimitive>;

    fn into_iter(self) -> Self::IntoIter {
        self.primitives.iter()
    }
}

#[cfg(test)]
mod bounding_box_arc_tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use nalgebra::Point2;
    use rstest::rstest;

    use super::*;

    fn create_arc_primitive(
        center_x: f64,
        center_y: f64,
        radius: f64,
        width: f64,
        start_angle: f64,
        sweep_angle: f64,
    ) -> ArcGerberPrimitive {
        ArcGerberPrimitive {
            center: Point2::new(center_x, center_y),
            radius,
            start_angle,
            end_angle: start_angle + sweep_angle,
            winding: match sweep_angle >= 0.0 {
                true => Winding::CounterClockwise,
                false => Winding::Clockwise,
            },
            width,
            exposure: Exposure::Add,
        }
    }

    fn assert_close(actual: Point2<f64>, expected: Point2<f64>) {
        let delta = actual - expected;
        assert!(
            delta.x.abs() < 1e-9 && delta.y.abs() < 1e-9,
            "expected: {:?}, actual: {:?}",
            expected,
            actual
        );
    }

    #[test]
    pub fn test_full_circle() {
        // given
        let arc_primitive = create_arc_primitive(0.0, 0.0, 100.0, 1.0, 0.0, 2.0 * PI);

        // when
        let bbox = arc_primitive.bounding_box();

        // then
        assert!(arc_primitive.is_full_circle());
        // the diameter of the circle + half of the stroke width.
        assert_close(bbox.min, Point2::new(-100.5, -100.5));
        assert_close(bbox.max, Point2::new(100.5, 100.5));
    }

    #[rstest]
    #[case(0.0, FRAC_PI_2, (5.0, 5.0), (15.0, 15.0))] // 0° to 90°
    #[case(FRAC_PI_2, FRAC_PI_2, (-5.0, 5.0), (5.0, 15.0))] // 90° to 180°
    #[case(PI, FRAC_PI_2, (-5.0, -5.0), (5.0, 5.0))] // 180° to 270°
    #[case(PI + FRAC_PI_2, FRAC_PI_2, (5.0, -5.0), (15.0, 5.0))] // 270° to 360°
    fn test_quarter_arc_bounds(
        #[case] start_angle: f64,
        #[case] sweep_angle: f64,
        #[case] min: (f64, f64),
        #[case] max: (f64, f64),
    ) {
        // given
        let arc = create_arc_primitive(5.0, 5.0, 10.0, 0.0, start_angle, sweep_angle);

        // when
        let bbox = arc.bounding_box();

        // then
        assert_close(bbox.min, Point2::new(min.0, min.1));
        assert_close(bbox.max, Point2::new(max.0, max.1));
    }

    #[test]
    fn test_swept_portion_only() {
        // 45° to 135° passes over the top of the circle, but not the sides.
        let arc = create_arc_primitive(0.0, 0.0, 1.0, 0.0, FRAC_PI_4, FRAC_PI_2);

        let bbox = arc.bounding_box();

        let half = FRAC_PI_4.cos();
        assert_close(bbox.min, Point2::new(-half, half));
        assert_close(bbox.max, Point2::new(half, 1.0));
    }

    #[rstest]
    #[case(FRAC_PI_4, -FRAC_PI_4)] // Small negative sweep
    #[case(FRAC_PI_2, -FRAC_PI_2)] // Quarter negative sweep
    #[case(PI, -PI)] // Half negative sweep
    fn test_negative_sweep_arc_bounds(#[case] start_angle: f64, #[case] sweep_angle: f64) {
        // given
        let (center_x, center_y, radius, width) = (5.0, 5.0, 10.0, 0.5);
        let arc = create_arc_primitive(center_x, center_y, radius, width, start_angle, sweep_angle);

        // when
        let bbox = arc.bounding_box();

        // then
        let total_radius = radius + width / 2.0;
        assert!(bbox.min.x >= center_x - total_radius - 1e-9);
        assert!(bbox.min.y >= center_y - total_radius - 1e-9);
        assert!(bbox.max.x <= center_x + total_radius + 1e-9);
        assert!(bbox.max.y <= center_y + total_radius + 1e-9);

        // both end points are contained
        for point in [arc.start_point(), arc.end_point()] {
            assert!(bbox.min.x <= point.x && point.x <= bbox.max.x);
            assert!(bbox.min.y <= point.y && point.y <= bbox.max.y);
        }
    }

    #[test]
    fn test_clockwise_half_circle_through_bottom() {
        // 180° clockwise from 0° passes 270°, the bottom of the circle.
        let arc = create_arc_primitive(0.0, 0.0, 2.0, 0.0, 0.0, -PI);

        let bbox = arc.bounding_box();

        assert_close(bbox.min, Point2::new(-2.0, -2.0));
        assert_close(bbox.max, Point2::new(2.0, 0.0));
    }

    #[test]
    fn test_zero_radius() {
        let arc = create_arc_primitive(10.0, 10.0, 0.0, 1.0, 0.0, 2.0 * PI);

        let bbox = arc.bounding_box();

        assert_close(bbox.min, Point2::new(9.5, 9.5));
        assert_close(bbox.max, Point2::new(10.5, 10.5));
    }
}
