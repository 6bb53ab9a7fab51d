//! Aperture definitions (`%ADD...*%`) and the table they are registered in.

use std::collections::HashMap;

use log::{debug, trace};
use thiserror::Error;

use crate::geometry::BoundingBox;
use crate::types::{Position, Vector};

/// D-codes below 10 are reserved for operations.
pub const MIN_APERTURE_CODE: i32 = 10;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApertureError {
    #[error("Unsupported aperture template. code: {code}, template: {template:?}")]
    UnsupportedTemplate { code: i32, template: String },
    #[error("Invalid aperture parameters. code: {code}, reason: {reason}")]
    InvalidParameters { code: i32, reason: String },
}

/// An aperture definition as found in the file, before the template is validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ApertureDefinition {
    pub code: i32,
    pub template: String,
    pub parameters: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ApertureShape {
    Circle {
        diameter: f64,
    },
    Rectangle {
        x: f64,
        y: f64,
    },
    Obround {
        x: f64,
        y: f64,
    },
    /// Regular polygon, `diameter` is the diameter of the circumscribing circle.
    Polygon {
        diameter: f64,
        vertices: u8,
        /// Degrees, counter-clockwise.
        rotation: f64,
    },
}

impl ApertureShape {
    /// Width of the line drawn when this shape is used for a D01 stroke.
    ///
    /// Only circles are valid for strokes in current Gerber revisions; other shapes use their largest extent so that
    /// the stroke never exceeds the reported width.
    pub fn stroke_width(&self) -> f64 {
        match *self {
            ApertureShape::Circle {
                diameter,
            } => diameter,
            ApertureShape::Rectangle {
                x,
                y,
            }
            | ApertureShape::Obround {
                x,
                y,
            } => x.max(y),
            ApertureShape::Polygon {
                diameter, ..
            } => diameter,
        }
    }

    /// Half extents of the axis-aligned box covering the shape.
    ///
    /// Polygons are treated as their circumscribing circle.
    pub fn half_extents(&self) -> Vector {
        match *self {
            ApertureShape::Circle {
                diameter,
            }
            | ApertureShape::Polygon {
                diameter, ..
            } => Vector::new(diameter / 2.0, diameter / 2.0),
            ApertureShape::Rectangle {
                x,
                y,
            }
            | ApertureShape::Obround {
                x,
                y,
            } => Vector::new(x / 2.0, y / 2.0),
        }
    }

    /// Footprint of the shape when flashed at `center`.
    pub fn footprint(&self, center: Position) -> BoundingBox {
        BoundingBox::around(center, self.half_extents())
    }

    /// True when the footprint is an approximation of the real shape.
    pub fn is_approximated(&self) -> bool {
        matches!(self, ApertureShape::Polygon { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aperture {
    pub code: i32,
    pub shape: ApertureShape,
    pub hole_diameter: Option<f64>,
}

impl Aperture {
    pub fn from_definition(definition: &ApertureDefinition) -> Result<Self, ApertureError> {
        let ApertureDefinition {
            code,
            template,
            parameters,
        } = definition;
        let code = *code;

        let invalid = |reason: String| ApertureError::InvalidParameters {
            code,
            reason,
        };

        if code < MIN_APERTURE_CODE {
            return Err(invalid(format!("code must be >= {}", MIN_APERTURE_CODE)));
        }
        if let Some(value) = parameters
            .iter()
            .find(|value| !value.is_finite() || **value < 0.0)
        {
            return Err(invalid(format!("parameters must be finite and positive, found: {}", value)));
        }

        let expect_count = |range: std::ops::RangeInclusive<usize>| {
            match range.contains(&parameters.len()) {
                true => Ok(()),
                false => Err(invalid(format!(
                    "expected {} to {} parameters, found: {}",
                    range.start(),
                    range.end(),
                    parameters.len()
                ))),
            }
        };

        let (shape, hole_diameter) = match template.as_str() {
            "C" => {
                expect_count(1..=2)?;
                (
                    ApertureShape::Circle {
                        diameter: parameters[0],
                    },
                    parameters.get(1).copied(),
                )
            }
            "R" | "O" => {
                expect_count(2..=3)?;
                let (x, y) = (parameters[0], parameters[1]);
                let shape = match template.as_str() {
                    "R" => ApertureShape::Rectangle {
                        x,
                        y,
                    },
                    _ => ApertureShape::Obround {
                        x,
                        y,
                    },
                };
                (shape, parameters.get(2).copied())
            }
            "P" => {
                expect_count(2..=4)?;
                let vertices = parameters[1];
                if vertices.fract() != 0.0 || !(3.0..=12.0).contains(&vertices) {
                    return Err(invalid(format!("polygon vertices must be 3 to 12, found: {}", vertices)));
                }
                (
                    ApertureShape::Polygon {
                        diameter: parameters[0],
                        vertices: vertices as u8,
                        rotation: parameters.get(2).copied().unwrap_or(0.0),
                    },
                    parameters.get(3).copied(),
                )
            }
            _ => {
                return Err(ApertureError::UnsupportedTemplate {
                    code,
                    template: template.clone(),
                })
            }
        };

        Ok(Self {
            code,
            shape,
            hole_diameter,
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct ApertureTable {
    apertures: HashMap<i32, Aperture>,
}

impl ApertureTable {
    /// Register an aperture, replacing any previous definition using the same code.
    pub fn define(&mut self, definition: &ApertureDefinition) -> Result<&Aperture, ApertureError> {
        let aperture = Aperture::from_definition(definition)?;
        let code = aperture.code;
        trace!("defined aperture: {:?}", aperture);

        if let Some(previous) = self.apertures.insert(code, aperture) {
            debug!("aperture redefined. code: {}, previous: {:?}", code, previous.shape);
        }

        Ok(&self.apertures[&code])
    }

    pub fn get(&self, code: i32) -> Option<&Aperture> {
        self.apertures.get(&code)
    }

    pub fn len(&self) -> usize {
        self.apertures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apertures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point2;
    use rstest::rstest;

    use super::*;

    fn definition(code: i32, template: &str, parameters: &[f64]) -> ApertureDefinition {
        ApertureDefinition {
            code,
            template: template.to_string(),
            parameters: parameters.to_vec(),
        }
    }

    #[test]
    fn test_define_and_get() {
        // given
        let mut table = ApertureTable::default();

        // when
        table
            .define(&definition(10, "C", &[0.5]))
            .unwrap();
        table
            .define(&definition(11, "R", &[1.0, 0.4, 0.2]))
            .unwrap();

        // then
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(10).unwrap().shape, ApertureShape::Circle {
            diameter: 0.5
        });
        assert_eq!(table.get(11).unwrap().hole_diameter, Some(0.2));
        assert!(table.get(12).is_none());
    }

    #[test]
    fn test_redefinition_overwrites() {
        let mut table = ApertureTable::default();
        table
            .define(&definition(10, "C", &[0.5]))
            .unwrap();
        table
            .define(&definition(10, "O", &[1.0, 2.0]))
            .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(10).unwrap().shape, ApertureShape::Obround {
            x: 1.0,
            y: 2.0
        });
    }

    #[rstest]
    #[case(definition(10, "OC8", &[0.5]))]
    #[case(definition(10, "RoundRect", &[0.5, 0.1]))]
    fn test_unsupported_templates(#[case] definition: ApertureDefinition) {
        let mut table = ApertureTable::default();
        assert!(matches!(
            table.define(&definition),
            Err(ApertureError::UnsupportedTemplate { .. })
        ));
        assert!(table.is_empty());
    }

    #[rstest]
    #[case(definition(10, "C", &[]))]
    #[case(definition(10, "R", &[1.0]))]
    #[case(definition(10, "C", &[-1.0]))]
    #[case(definition(10, "P", &[1.0, 2.0]))]
    #[case(definition(10, "P", &[1.0, 4.5]))]
    #[case(definition(9, "C", &[1.0]))]
    fn test_invalid_parameters(#[case] definition: ApertureDefinition) {
        let mut table = ApertureTable::default();
        assert!(matches!(
            table.define(&definition),
            Err(ApertureError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_polygon_is_circumscribing_circle() {
        let aperture = Aperture::from_definition(&definition(12, "P", &[2.0, 6.0, 30.0])).unwrap();

        assert!(aperture.shape.is_approximated());
        let footprint = aperture
            .shape
            .footprint(Point2::new(1.0, 1.0));
        assert_eq!(footprint.min, Point2::new(0.0, 0.0));
        assert_eq!(footprint.max, Point2::new(2.0, 2.0));
    }

    #[rstest]
    #[case(ApertureShape::Circle { diameter: 0.25 }, 0.25)]
    #[case(ApertureShape::Rectangle { x: 0.5, y: 1.5 }, 1.5)]
    #[case(ApertureShape::Obround { x: 2.0, y: 1.0 }, 2.0)]
    fn test_stroke_width(#[case] shape: ApertureShape, #[case] expected: f64) {
        assert_eq!(shape.stroke_width(), expected);
    }
}
