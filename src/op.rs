//! Drawing operations: the intermediate representation between the byte
//! decoder and the renderers.
//!
//! Operations are immutable once produced and ordered: z-order and the
//! stroke-by-stroke animation both follow list order. Each op carries the
//! base ink color resolved at decode time, so recoloring a card means
//! re-decoding it.

use std::f64::consts::TAU;

use kurbo::Point;

use crate::{color::Rgb, geom::GridPoint};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Op {
    Line(LineOp),
    Arc(ArcOp),
    Point(PointOp),
}

/// A straight stroke between two grid points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineOp {
    pub from: GridPoint,
    pub to: GridPoint,
    pub color: Rgb,
}

/// A partial (or full) ellipse arc in canvas coordinates.
///
/// `start`/`end` are normalized to `[0, 2π)` except for the full circle,
/// which is stored as exactly `0 → 2π`. `counterclockwise` records the sweep
/// direction chosen by the shortest-arc rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcOp {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    pub start: f64,
    pub end: f64,
    pub counterclockwise: bool,
    pub color: Rgb,
}

/// A dot at a grid point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointOp {
    pub at: GridPoint,
    pub color: Rgb,
}

impl ArcOp {
    pub fn full_circle(center: Point, radius: f64, color: Rgb) -> Self {
        Self {
            center,
            rx: radius,
            ry: radius,
            start: 0.0,
            end: TAU,
            counterclockwise: false,
            color,
        }
    }

    pub fn is_full_circle(&self) -> bool {
        self.start == 0.0 && self.end == TAU
    }

    /// Angular span from `start` to `end` in the chosen sweep direction,
    /// always in `(0, 2π]`.
    pub fn span(&self) -> f64 {
        let mut diff = if self.counterclockwise {
            self.start - self.end
        } else {
            self.end - self.start
        };
        if diff <= 0.0 {
            diff += TAU;
        }
        diff
    }

    /// Signed sweep for path construction: positive sweeps clockwise on a
    /// y-down canvas.
    pub fn signed_sweep(&self) -> f64 {
        if self.counterclockwise {
            -self.span()
        } else {
            self.span()
        }
    }

    /// End angle after drawing a `progress` fraction of the arc.
    pub fn end_angle_at(&self, progress: f64) -> f64 {
        if self.is_full_circle() {
            return progress * TAU;
        }
        let swept = self.span() * progress;
        if self.counterclockwise {
            self.start - swept
        } else {
            self.start + swept
        }
    }

    /// Canvas point where the (untransformed) arc stroke ends.
    pub fn endpoint(&self) -> Point {
        Point::new(
            self.center.x + self.rx * self.end.cos(),
            self.center.y + self.ry * self.end.sin(),
        )
    }
}

impl Op {
    pub fn color(&self) -> Rgb {
        match self {
            Op::Line(l) => l.color,
            Op::Arc(a) => a.color,
            Op::Point(p) => p.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WHITE;
    use std::f64::consts::PI;

    fn arc(start: f64, end: f64, ccw: bool) -> ArcOp {
        ArcOp {
            center: Point::ORIGIN,
            rx: 8.0,
            ry: 8.0,
            start,
            end,
            counterclockwise: ccw,
            color: WHITE,
        }
    }

    #[test]
    fn span_follows_sweep_direction() {
        assert!((arc(0.0, PI / 2.0, false).span() - PI / 2.0).abs() < 1e-12);
        assert!((arc(0.0, PI / 2.0, true).span() - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn full_circle_progress_sweeps_from_zero() {
        let c = ArcOp::full_circle(Point::ORIGIN, 4.0, WHITE);
        assert!(c.is_full_circle());
        assert_eq!(c.end_angle_at(0.0), 0.0);
        assert!((c.end_angle_at(0.5) - PI).abs() < 1e-12);
        assert!((c.end_angle_at(1.0) - TAU).abs() < 1e-12);
    }

    #[test]
    fn partial_end_angle_moves_toward_end() {
        let a = arc(PI / 2.0, PI, false);
        assert!((a.end_angle_at(1.0) - PI).abs() < 1e-12);
        let half = a.end_angle_at(0.5);
        assert!(half > PI / 2.0 && half < PI);

        let b = arc(PI / 2.0, 0.0, true);
        assert!((b.end_angle_at(1.0) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn endpoint_matches_end_angle() {
        let a = arc(0.0, PI / 2.0, false);
        let p = a.endpoint();
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 8.0).abs() < 1e-12);
    }
}
