//! Collecting charstring output as a sequence of points.

use types::{Fixed, PathPoint, Pen};

use super::CommandSink;

/// The decoded outline of a glyph.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outline {
    /// Points of every contour, in order.
    pub points: Vec<PathPoint>,
    /// Advance width, if the charstring encoded one. The width already
    /// includes the nominal width from [`Options`](crate::Options).
    pub width: Option<Fixed>,
}

/// Command sink that accumulates [`PathPoint`]s.
///
/// Coordinates are rounded to the nearest integer. The last point of each
/// contour is flagged when the next contour begins or when the contour is
/// explicitly closed, and a contour is never flagged twice.
#[derive(Clone, Default, Debug)]
pub struct PathBuilder {
    points: Vec<PathPoint>,
    contour_open: bool,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new contour, closing the current one.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.end_contour();
        self.points.push(PathPoint::on_curve(x, y));
        self.contour_open = true;
    }

    pub fn line_to(&mut self, x: i32, y: i32) {
        self.points.push(PathPoint::on_curve(x, y));
        self.contour_open = true;
    }

    pub fn curve_to(&mut self, c1x: i32, c1y: i32, c2x: i32, c2y: i32, x: i32, y: i32) {
        self.points.extend([
            PathPoint::off_curve(c1x, c1y),
            PathPoint::off_curve(c2x, c2y),
            PathPoint::on_curve(x, y),
        ]);
        self.contour_open = true;
    }

    /// Flags the last point of the open contour, if any.
    pub fn end_contour(&mut self) {
        if !self.contour_open {
            return;
        }
        self.contour_open = false;
        if let Some(last) = self.points.last_mut() {
            last.end_of_contour = true;
        }
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    /// Closes any open contour and returns the points.
    pub fn finish(mut self) -> Vec<PathPoint> {
        self.end_contour();
        self.points
    }
}

impl CommandSink for PathBuilder {
    fn move_to(&mut self, x: Fixed, y: Fixed) {
        PathBuilder::move_to(self, x.to_i32(), y.to_i32());
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        PathBuilder::line_to(self, x.to_i32(), y.to_i32());
    }

    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
        PathBuilder::curve_to(
            self,
            cx0.to_i32(),
            cy0.to_i32(),
            cx1.to_i32(),
            cy1.to_i32(),
            x.to_i32(),
            y.to_i32(),
        );
    }

    fn close(&mut self) {
        self.end_contour();
    }
}

/// Replays a point sequence as pen commands.
///
/// Each contour begins with a move to its first point. Pairs of off-curve
/// points become cubic curves ending at the following on-curve point and
/// every flagged point closes its contour.
pub fn draw_points(points: &[PathPoint], pen: &mut impl Pen) {
    let mut contour_start = true;
    let mut controls: [Option<PathPoint>; 2] = [None; 2];
    for point in points {
        let (x, y) = (point.x as f32, point.y as f32);
        if contour_start {
            pen.move_to(x, y);
            contour_start = false;
        } else if !point.on_curve {
            // first free control slot
            match controls {
                [None, _] => controls[0] = Some(*point),
                _ => controls[1] = Some(*point),
            }
        } else if let [Some(c0), Some(c1)] = controls {
            pen.curve_to(
                c0.x as f32,
                c0.y as f32,
                c1.x as f32,
                c1.y as f32,
                x,
                y,
            );
            controls = [None; 2];
        } else {
            pen.line_to(x, y);
        }
        if point.end_of_contour {
            pen.close();
            contour_start = true;
            controls = [None; 2];
        }
    }
}

/// Converts a point sequence to a [`kurbo::BezPath`].
#[cfg(feature = "kurbo")]
pub fn to_bez_path(points: &[PathPoint]) -> kurbo::BezPath {
    struct BezPathPen(kurbo::BezPath);

    impl Pen for BezPathPen {
        fn move_to(&mut self, x: f32, y: f32) {
            self.0.move_to((x as f64, y as f64));
        }

        fn line_to(&mut self, x: f32, y: f32) {
            self.0.line_to((x as f64, y as f64));
        }

        fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
            self.0.curve_to(
                (cx0 as f64, cy0 as f64),
                (cx1 as f64, cy1 as f64),
                (x as f64, y as f64),
            );
        }

        fn close(&mut self) {
            self.0.close_path();
        }
    }

    let mut pen = BezPathPen(kurbo::BezPath::new());
    draw_points(points, &mut pen);
    pen.0
}
