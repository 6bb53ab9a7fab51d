//! Running bounding box of the emitted primitives.

use crate::format::Units;
use crate::geometry::BoundingBox;
use crate::primitive::{GerberPrimitive, WithBoundingBox};

#[derive(Debug, Clone, Default)]
pub struct ExtentAccumulator {
    bounding_box: BoundingBox,
}

impl ExtentAccumulator {
    /// Widen the running box to the full footprint of the primitive, never shrinks.
    #[cfg_attr(feature = "profile-primitives", profiling::function)]
    pub fn observe(&mut self, primitive: &GerberPrimitive) {
        self.bounding_box
            .expand(&primitive.bounding_box());
    }

    /// Running box, in file units.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Convert the accumulated box from `units` to millimeters.
    pub fn finalize(&self, units: Units) -> Extents {
        match self.bounding_box.is_empty() {
            true => Extents::Empty,
            false => Extents::Bounded(self.bounding_box.scale(units.to_mm())),
        }
    }
}

/// Finalized extents, in millimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Extents {
    /// Nothing was drawn, as opposed to something drawn at the origin.
    #[default]
    Empty,
    Bounded(BoundingBox),
}

impl Extents {
    pub fn is_empty(&self) -> bool {
        matches!(self, Extents::Empty)
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        match self {
            Extents::Empty => None,
            Extents::Bounded(bounding_box) => Some(bounding_box),
        }
    }

    pub fn union(&self, other: &Extents) -> Extents {
        match (self, other) {
            (Extents::Empty, other) => *other,
            (this, Extents::Empty) => *this,
            (Extents::Bounded(a), Extents::Bounded(b)) => {
                let mut combined = *a;
                combined.expand(b);
                Extents::Bounded(combined)
            }
        }
    }

    pub fn width(&self) -> f64 {
        self.bounding_box()
            .map_or(0.0, BoundingBox::width)
    }

    pub fn height(&self) -> f64 {
        self.bounding_box()
            .map_or(0.0, BoundingBox::height)
    }
}
