use nalgebra::{Point2, Vector2};

/// A location in file units (mm or inch, as declared by the file).
pub type Position = Point2<f64>;

/// An offset in file units.
pub type Vector = Vector2<f64>;

/// Direction of travel along an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Winding {
    /// G02, angles decrease.
    Clockwise,
    /// G03, angles increase.
    CounterClockwise,
}

impl Winding {
    /// +1.0 for counter-clockwise, -1.0 for clockwise.
    pub fn signum(&self) -> f64 {
        match self {
            Winding::Clockwise => -1.0,
            Winding::CounterClockwise => 1.0,
        }
    }
}

/// Polarity of the image being plotted, set with `%LPD*%` / `%LPC*%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Exposure {
    /// Clear polarity, removes previously exposed material.
    CutOut,
    /// Dark polarity.
    #[default]
    Add,
}

impl From<bool> for Exposure {
    fn from(value: bool) -> Self {
        match value {
            true => Exposure::Add,
            false => Exposure::CutOut,
        }
    }
}
