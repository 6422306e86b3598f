//! Stroke-by-stroke progressive reveal of an operation list.
//!
//! Each op gets a reveal window starting [`STEP_DELAY_MS`] after the one
//! before it and lasting [`DRAW_MS`]. Every tick clears the surface and
//! redraws everything at its current progress; partial strokes must repaint
//! at growing lengths, so there is no incremental compositing. The tick loop
//! is cooperative: a [`FrameClock`] yields between frames, and an
//! [`AnimationGate`] lets a newer animation on the same target supersede an
//! in-flight one instead of racing it.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::error::InkcardResult;
use crate::{
    op::Op,
    render::{
        self, MAIN_SCALE, OUTLINE_SCALE, POINT_OUTLINE_SCALE, POINT_RADIUS_SCALE, RenderOptions,
    },
    surface::Surface,
};

/// Gap between consecutive ops' reveal starts, in milliseconds.
pub const STEP_DELAY_MS: f64 = 20.0;
/// Time one op takes to draw in full, in milliseconds.
pub const DRAW_MS: f64 = STEP_DELAY_MS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationStatus {
    Running,
    Done,
}

/// A scheduled reveal of an op list, anchored at a start time.
///
/// Pure with respect to time: `progress_of` and `paint` are functions of the
/// supplied `now`, which makes every frame testable without a real clock.
pub struct Animation {
    ops: Vec<Op>,
    opts: RenderOptions,
    start_ms: f64,
}

impl Animation {
    pub fn new(ops: Vec<Op>, opts: RenderOptions, start_ms: f64) -> Self {
        Self {
            ops,
            opts,
            start_ms,
        }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Reveal fraction of op `index` at `now_ms`, clamped to `0..=1`.
    pub fn progress_of(&self, index: usize, now_ms: f64) -> f64 {
        let t0 = self.start_ms + index as f64 * STEP_DELAY_MS;
        ((now_ms - t0) / DRAW_MS).clamp(0.0, 1.0)
    }

    /// Whether the last op has fully drawn by `now_ms`. An empty list is
    /// immediately done.
    pub fn is_done(&self, now_ms: f64) -> bool {
        match self.ops.len() {
            0 => true,
            n => now_ms >= self.start_ms + (n - 1) as f64 * STEP_DELAY_MS + DRAW_MS,
        }
    }

    /// Clear the surface and redraw every op at its progress for `now_ms`.
    ///
    /// Two passes, same structure as the static renderer: all halos first,
    /// then all insides, so an op revealed later never paints its halo over
    /// an earlier op's ink. Ops still at progress zero are skipped entirely.
    pub fn paint(&self, surface: &mut Surface, now_ms: f64) -> InkcardResult<AnimationStatus> {
        self.opts.layout.validate()?;
        surface.clear(self.opts.background);

        let ink = self.opts.background.blended_ink();
        surface.paint_scene(|ctx| {
            for (i, op) in self.ops.iter().enumerate() {
                let progress = self.progress_of(i, now_ms);
                if progress > 0.0 {
                    draw_partial_halo(ctx, op, &self.opts, progress);
                }
            }
            for (i, op) in self.ops.iter().enumerate() {
                let progress = self.progress_of(i, now_ms);
                if progress > 0.0 {
                    draw_partial_inside(ctx, op, &self.opts, ink, progress);
                }
            }
            Ok(())
        })?;

        Ok(if self.is_done(now_ms) {
            AnimationStatus::Done
        } else {
            AnimationStatus::Running
        })
    }
}

fn draw_partial_halo(
    ctx: &mut vello_cpu::RenderContext,
    op: &Op,
    opts: &RenderOptions,
    progress: f64,
) {
    let outline = opts.background;
    let width = opts.thickness * OUTLINE_SCALE;
    match op {
        Op::Line(line) => {
            let (p1, p2) = render::sheared_endpoints(line, opts);
            render::stroke_segment(ctx, p1, p1.lerp(p2, progress), width, outline);
        }
        Op::Arc(arc) => {
            let center = render::sheared_center(arc, opts);
            render::stroke_arc(ctx, center, arc, partial_sweep(arc, progress), width, outline);
            if progress >= 1.0 {
                render::arc_correction(ctx, arc, center, opts, width, outline);
            }
        }
        Op::Point(point) => {
            let c = render::sheared_point_center(point, opts);
            render::fill_circle(ctx, c, opts.thickness * POINT_OUTLINE_SCALE * progress, outline);
        }
    }
}

fn draw_partial_inside(
    ctx: &mut vello_cpu::RenderContext,
    op: &Op,
    opts: &RenderOptions,
    ink: crate::color::Rgb,
    progress: f64,
) {
    let width = opts.thickness * MAIN_SCALE;
    match op {
        Op::Line(line) => {
            let (p1, p2) = render::sheared_endpoints(line, opts);
            render::stroke_segment(ctx, p1, p1.lerp(p2, progress), width, ink);
        }
        Op::Arc(arc) => {
            let center = render::sheared_center(arc, opts);
            render::stroke_arc(ctx, center, arc, partial_sweep(arc, progress), width, ink);
            if progress >= 1.0 {
                render::arc_correction(ctx, arc, center, opts, width, ink);
            }
        }
        Op::Point(point) => {
            let c = render::sheared_point_center(point, opts);
            render::fill_circle(ctx, c, opts.thickness * POINT_RADIUS_SCALE * progress, ink);
        }
    }
}

/// Signed sweep for an arc at partial progress: from the start angle to the
/// progress end angle, in the arc's chosen direction. Full circles grow from
/// angle zero.
fn partial_sweep(arc: &crate::op::ArcOp, progress: f64) -> f64 {
    arc.end_angle_at(progress) - arc.start
}

/// Cancellation state for one render target. Only one animation loop may
/// own a target at a time; a superseded loop must notice and stop painting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    Running(u64),
    Cancelled,
}

/// Per-target generation counter. `begin` supersedes whatever loop is
/// currently ticking; each loop checks its ticket before painting another
/// frame.
#[derive(Debug)]
pub struct AnimationGate {
    state: Cell<GateState>,
    next_generation: Cell<u64>,
}

impl Default for AnimationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationGate {
    pub fn new() -> Self {
        Self {
            state: Cell::new(GateState::Cancelled),
            next_generation: Cell::new(0),
        }
    }

    /// Start a new animation generation, invalidating any previous ticket.
    pub fn begin(&self) -> u64 {
        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);
        self.state.set(GateState::Running(generation));
        generation
    }

    pub fn cancel(&self) {
        self.state.set(GateState::Cancelled);
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        matches!(self.state.get(), GateState::Running(g) if g == ticket)
    }
}

/// Time source for the tick loop. `next_frame` blocks until the next frame
/// boundary and returns the new time; tests script it with fixed steps.
pub trait FrameClock {
    fn now_ms(&mut self) -> f64;
    fn next_frame(&mut self) -> f64;
}

/// Wall-clock frames at roughly display rate.
pub struct SystemClock {
    epoch: Instant,
    frame: Duration,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            frame: Duration::from_millis(16),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now_ms(&mut self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn next_frame(&mut self) -> f64 {
        std::thread::sleep(self.frame);
        self.now_ms()
    }
}

/// Drive an animation to completion (or supersession) against `clock`,
/// handing each finished frame to `present`.
#[tracing::instrument(skip_all, fields(ops = ops.len()))]
pub fn run_animation(
    surface: &mut Surface,
    ops: Vec<Op>,
    opts: RenderOptions,
    gate: &AnimationGate,
    clock: &mut dyn FrameClock,
    mut present: impl FnMut(&Surface),
) -> InkcardResult<()> {
    let ticket = gate.begin();
    let animation = Animation::new(ops, opts, clock.now_ms());

    loop {
        let now = clock.next_frame();
        if !gate.is_current(ticket) {
            return Ok(());
        }
        let status = animation.paint(surface, now)?;
        present(surface);
        if status == AnimationStatus::Done {
            return Ok(());
        }
    }
}
