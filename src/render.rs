//! Static stroke rendering.
//!
//! Card mode is a two-pass plotter look: every op is first stroked thick in
//! the background color (a halo that knocks out whatever sits behind), then
//! lines and arcs are stroked thin in an ink color blended toward the
//! background. Editor mode is a single plain white pass for live authoring.
//!
//! Geometry is built with `kurbo` and handed to `vello_cpu` at the boundary;
//! the italic shear is applied to line endpoints and arc centers only, which
//! is why sheared arcs may need a short correction segment to meet their
//! neighbors (see [`arc_correction`]).

use kurbo::{Circle, Point, Shape};

use crate::error::InkcardResult;
use crate::{
    color::{self, Rgb},
    decode::Layout,
    geom::{self, TEXT_LINE_CELLS},
    op::{ArcOp, LineOp, Op, PointOp},
    surface::Surface,
};

/// Stroke-width multipliers over the base thickness (`cell / 10`). These
/// ratios are part of the visual contract.
pub const OUTLINE_SCALE: f64 = 12.0;
pub const MAIN_SCALE: f64 = 4.0;
pub const POINT_OUTLINE_SCALE: f64 = 7.5;
pub const POINT_RADIUS_SCALE: f64 = 4.0;
pub const GRID_DOT_SCALE: f64 = 3.0;

/// Maximum sheared-arc endpoint gap left unconnected, in pixels.
const ARC_GAP_EPSILON: f64 = 0.1;

/// Flattening tolerance when lowering arcs to bezier paths.
const ARC_TOLERANCE: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Two-pass halo-and-ink card look.
    #[default]
    Card,
    /// Single-pass white strokes for the authoring preview.
    Editor,
}

#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    pub layout: Layout,
    /// Base stroke thickness; the role multipliers scale from this.
    pub thickness: f64,
    pub italics: bool,
    pub background: Rgb,
    pub mode: RenderMode,
}

impl RenderOptions {
    pub fn new(layout: Layout, background: Rgb) -> Self {
        Self {
            layout,
            thickness: layout.cell / 10.0,
            italics: true,
            background,
            mode: RenderMode::Card,
        }
    }
}

/// Stroke every op onto `surface`. The surface is not cleared here; callers
/// decide the backdrop, so repeated calls over the same cleared surface are
/// pixel-identical.
#[tracing::instrument(skip_all, fields(ops = ops.len()))]
pub fn render_static(surface: &mut Surface, ops: &[Op], opts: &RenderOptions) -> InkcardResult<()> {
    opts.layout.validate()?;
    surface.paint_scene(|ctx| {
        match opts.mode {
            RenderMode::Editor => {
                for op in ops {
                    draw_op_editor(ctx, op, opts);
                }
            }
            RenderMode::Card => {
                for op in ops {
                    draw_op_halo(ctx, op, opts);
                }
                let ink = opts.background.blended_ink();
                for op in ops {
                    if !matches!(op, Op::Point(_)) {
                        draw_op_inside(ctx, op, opts, ink);
                    }
                }
            }
        }
        Ok(())
    })
}

/// Editor background: one dot per grid intersection, rows shaded by
/// text-line parity, dots sheared like the strokes above them.
pub fn draw_grid_dots(
    surface: &mut Surface,
    cell: f64,
    thickness: f64,
    italics: bool,
) -> InkcardResult<()> {
    let even_row = Rgb::new(0x6e, 0x6e, 0x6e);
    let odd_row = Rgb::new(0x56, 0x56, 0x56);
    let radius = thickness * GRID_DOT_SCALE;
    let (width, height) = (f64::from(surface.width()), f64::from(surface.height()));

    surface.paint_scene(|ctx| {
        let mut y = 0.0;
        while y <= height {
            let row_index = (y / (f64::from(TEXT_LINE_CELLS) * cell)).floor() as i64;
            let color = if row_index % 2 == 0 { even_row } else { odd_row };
            let mut x = 0.0;
            while x <= width {
                let dot = geom::shear_point(Point::new(x, y), cell, italics);
                fill_circle(ctx, dot, radius, color);
                x += cell;
            }
            y += cell;
        }
        Ok(())
    })
}

/// Card-mode first pass: thick background-colored halo. Points draw both of
/// their discs here; they have no inside pass.
fn draw_op_halo(ctx: &mut vello_cpu::RenderContext, op: &Op, opts: &RenderOptions) {
    let outline = opts.background;
    match op {
        Op::Line(line) => {
            let (p1, p2) = sheared_endpoints(line, opts);
            stroke_segment(ctx, p1, p2, opts.thickness * OUTLINE_SCALE, outline);
        }
        Op::Arc(arc) => {
            let width = opts.thickness * OUTLINE_SCALE;
            let center = sheared_center(arc, opts);
            stroke_arc(ctx, center, arc, arc.signed_sweep(), width, outline);
            arc_correction(ctx, arc, center, opts, width, outline);
        }
        Op::Point(point) => {
            let c = sheared_point_center(point, opts);
            fill_circle(ctx, c, opts.thickness * POINT_OUTLINE_SCALE, outline);
            fill_circle(
                ctx,
                c,
                opts.thickness * POINT_RADIUS_SCALE,
                opts.background.blended_ink(),
            );
        }
    }
}

/// Card-mode second pass: thin blended-ink stroke for lines and arcs.
fn draw_op_inside(ctx: &mut vello_cpu::RenderContext, op: &Op, opts: &RenderOptions, ink: Rgb) {
    let width = opts.thickness * MAIN_SCALE;
    match op {
        Op::Line(line) => {
            let (p1, p2) = sheared_endpoints(line, opts);
            stroke_segment(ctx, p1, p2, width, ink);
        }
        Op::Arc(arc) => {
            let center = sheared_center(arc, opts);
            stroke_arc(ctx, center, arc, arc.signed_sweep(), width, ink);
            arc_correction(ctx, arc, center, opts, width, ink);
        }
        Op::Point(_) => {}
    }
}

fn draw_op_editor(ctx: &mut vello_cpu::RenderContext, op: &Op, opts: &RenderOptions) {
    let width = opts.thickness * MAIN_SCALE;
    match op {
        Op::Line(line) => {
            let (p1, p2) = sheared_endpoints(line, opts);
            stroke_segment(ctx, p1, p2, width, color::WHITE);
        }
        Op::Arc(arc) => {
            let center = sheared_center(arc, opts);
            stroke_arc(ctx, center, arc, arc.signed_sweep(), width, color::WHITE);
            arc_correction(ctx, arc, center, opts, width, color::WHITE);
        }
        Op::Point(point) => {
            let c = sheared_point_center(point, opts);
            fill_circle(ctx, c, opts.thickness * POINT_RADIUS_SCALE, color::WHITE);
        }
    }
}

pub(crate) fn sheared_endpoints(line: &LineOp, opts: &RenderOptions) -> (Point, Point) {
    let cell = opts.layout.cell;
    (
        geom::shear_point(line.from.to_canvas(cell), cell, opts.italics),
        geom::shear_point(line.to.to_canvas(cell), cell, opts.italics),
    )
}

pub(crate) fn sheared_center(arc: &ArcOp, opts: &RenderOptions) -> Point {
    geom::shear_point(arc.center, opts.layout.cell, opts.italics)
}

pub(crate) fn sheared_point_center(point: &PointOp, opts: &RenderOptions) -> Point {
    let cell = opts.layout.cell;
    geom::shear_point(point.at.to_canvas(cell), cell, opts.italics)
}

/// Stroke a straight segment with round caps.
pub(crate) fn stroke_segment(
    ctx: &mut vello_cpu::RenderContext,
    p1: Point,
    p2: Point,
    width: f64,
    color: Rgb,
) {
    let mut path = kurbo::BezPath::new();
    path.move_to(p1);
    path.line_to(p2);
    stroke_path(ctx, &path, width, color);
}

/// Stroke an elliptical arc from `arc.start` with the given signed sweep
/// (positive sweeps clockwise on the y-down canvas). The center is passed
/// separately because the shear relocates it without touching the radii.
pub(crate) fn stroke_arc(
    ctx: &mut vello_cpu::RenderContext,
    center: Point,
    arc: &ArcOp,
    sweep: f64,
    width: f64,
    color: Rgb,
) {
    let shape = kurbo::Arc::new(
        center,
        kurbo::Vec2::new(arc.rx, arc.ry),
        arc.start,
        sweep,
        0.0,
    );
    stroke_path(ctx, &shape.to_path(ARC_TOLERANCE), width, color);
}

pub(crate) fn fill_circle(
    ctx: &mut vello_cpu::RenderContext,
    center: Point,
    radius: f64,
    color: Rgb,
) {
    if radius <= 0.0 {
        return;
    }
    let path = Circle::new(center, radius).to_path(ARC_TOLERANCE);
    ctx.set_paint(to_paint(color));
    ctx.fill_path(&bezpath_to_cpu(&path));
}

/// The shear translates an arc's center but not its geometry, so the stroked
/// endpoint can drift from where the sheared endpoint ought to be. Bridge
/// the gap with a short segment in the same style when it exceeds the
/// threshold. Full circles have no endpoints to correct.
pub(crate) fn arc_correction(
    ctx: &mut vello_cpu::RenderContext,
    arc: &ArcOp,
    sheared_center: Point,
    opts: &RenderOptions,
    width: f64,
    color: Rgb,
) {
    if !opts.italics || arc.is_full_circle() {
        return;
    }

    let dx = arc.rx * arc.end.cos();
    let dy = arc.ry * arc.end.sin();
    let actual = Point::new(sheared_center.x + dx, sheared_center.y + dy);
    let intended = geom::shear_point(
        Point::new(arc.center.x + dx, arc.center.y + dy),
        opts.layout.cell,
        true,
    );

    if actual.distance(intended) > ARC_GAP_EPSILON {
        stroke_segment(ctx, actual, intended, width, color);
    }
}

fn stroke_path(ctx: &mut vello_cpu::RenderContext, path: &kurbo::BezPath, width: f64, color: Rgb) {
    let stroke = vello_cpu::kurbo::Stroke::new(width)
        .with_caps(vello_cpu::kurbo::Cap::Round)
        .with_join(vello_cpu::kurbo::Join::Round);
    ctx.set_stroke(stroke);
    ctx.set_paint(to_paint(color));
    ctx.stroke_path(&bezpath_to_cpu(path));
}

fn to_paint(color: Rgb) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, 255)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
