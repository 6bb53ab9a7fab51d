use nalgebra::Point2;

use crate::types::{Position, Vector};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min: Position,
    pub max: Position,
}

impl BoundingBox {
    pub fn new(min: Position, max: Position) -> Self {
        Self {
            min,
            max,
        }
    }

    /// A box of `half_size` around `center`.
    pub fn around(center: Position, half_size: Vector) -> Self {
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    pub fn expand(&mut self, other: &BoundingBox) {
        self.min.x = self.min.x.min(other.min.x);
        self.min.y = self.min.y.min(other.min.y);
        self.max.x = self.max.x.max(other.max.x);
        self.max.y = self.max.y.max(other.max.y);
    }

    pub fn expand_point(&mut self, position: Position) {
        self.min.x = self.min.x.min(position.x);
        self.min.y = self.min.y.min(position.y);
        self.max.x = self.max.x.max(position.x);
        self.max.y = self.max.y.max(position.y);
    }

    /// Grow the box outwards on every side, used for stroke widths.
    pub fn inflate(&self, amount: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            min: Point2::new(self.min.x - amount, self.min.y - amount),
            max: Point2::new(self.max.x + amount, self.max.y + amount),
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            min: Point2::new(self.min.x * factor, self.min.y * factor),
            max: Point2::new(self.max.x * factor, self.max.y * factor),
        }
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.min.x && self.min.y <= other.min.y && self.max.x >= other.max.x && self.max.y >= other.max.y
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
        }
    }
}

impl BoundingBox {
    /// Note that a bounding box of 0,0 -> 0,0 is NOT empty
    /// e.g., a flash of a zero sized aperture at the origin still has a location.
    ///
    /// Only a bounding box which is the same as the one returned by `default` counts as empty.
    pub fn is_empty(&self) -> bool {
        self.eq(&BoundingBox::default())
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Constructs a bounding box from a list of points
    pub fn from_points(points: &[Position]) -> Self {
        let mut bbox = Self::default();
        for position in points {
            bbox.expand_point(*position);
        }
        bbox
    }
}
