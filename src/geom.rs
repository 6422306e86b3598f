//! Grid and ellipse geometry shared by the decoder and the renderers.

use std::f64::consts::TAU;

use kurbo::Point;

/// Height of one text line, in grid cells. Wrapping, the line-top snap and
/// the italic shear are all defined against this band.
pub const TEXT_LINE_CELLS: i32 = 8;

/// Horizontal skew per canvas pixel of depth into a text line.
pub const SKEW_FACTOR: f64 = -0.15;

/// A cursor position in grid units (one unit = one cell edge).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridPoint {
    pub xi: i32,
    pub yi: i32,
}

impl GridPoint {
    pub fn new(xi: i32, yi: i32) -> Self {
        Self { xi, yi }
    }

    /// Canvas-pixel position of this grid point for cell size `cell`.
    pub fn to_canvas(self, cell: f64) -> Point {
        Point::new(f64::from(self.xi) * cell, f64::from(self.yi) * cell)
    }
}

/// Normalize an angle into `[0, 2π)`.
pub fn normalize_angle(a: f64) -> f64 {
    let mut a = a % TAU;
    if a < 0.0 {
        a += TAU;
    }
    a
}

/// Parametric angle of canvas point `p` on the ellipse centered at `center`
/// with semi-axes `rx, ry`. Not normalized.
pub fn angle_on_ellipse(center: Point, rx: f64, ry: f64, p: Point) -> f64 {
    ((p.y - center.y) / ry).atan2((p.x - center.x) / rx)
}

/// Whether the shorter sweep from `a0` to `a1` (both in `[0, 2π)`) runs
/// counterclockwise. A tie resolves counterclockwise.
pub fn counterclockwise_for_shortest(a0: f64, a1: f64) -> bool {
    let cw = normalize_angle(a1 - a0);
    let ccw = normalize_angle(a0 - a1);
    ccw <= cw
}

/// Per-text-line italic shear of a canvas point.
///
/// The point's x shifts by a constant `cell` plus a skew proportional to its
/// depth into its own 8-cell text line; y is untouched. Applied to line
/// endpoints and arc centers only, never to arc radii.
pub fn shear_point(p: Point, cell: f64, enabled: bool) -> Point {
    if !enabled {
        return p;
    }
    let line_height = f64::from(TEXT_LINE_CELLS) * cell;
    let line_index = (p.y / line_height).floor();
    let y_within_line = p.y - line_index * line_height;
    Point::new(p.x + cell + y_within_line * SKEW_FACTOR, p.y)
}
