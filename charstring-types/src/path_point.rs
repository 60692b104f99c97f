//! Points of a decoded outline.

/// A single point of a glyph outline.
///
/// Off-curve points are cubic Bézier control points and always appear in
/// runs of two between on-curve anchors. The last point of each contour has
/// `end_of_contour` set.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathPoint {
    pub x: i32,
    pub y: i32,
    pub on_curve: bool,
    pub end_of_contour: bool,
}

impl PathPoint {
    /// Creates a new on-curve point.
    pub const fn on_curve(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            on_curve: true,
            end_of_contour: false,
        }
    }

    /// Creates a new off-curve control point.
    pub const fn off_curve(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            on_curve: false,
            end_of_contour: false,
        }
    }

    /// Returns a copy of this point flagged as the last point of its contour.
    pub const fn ending_contour(self) -> Self {
        Self {
            end_of_contour: true,
            ..self
        }
    }
}
