//! Byte instruction decoding and the grid cursor walk.
//!
//! Each byte is a bit-packed instruction: bit 7 and bit 3 form a 2-bit mode,
//! bits 6..4 and 2..0 are folded signed deltas. The walk threads a grid
//! cursor through the token list, wrapping at the right margin, and emits
//! [`Op`]s in token order. Decoding is total: all 256 byte values are valid
//! instructions and no input can fail.

use crate::{
    color::Rgb,
    error::{InkcardError, InkcardResult},
    geom::{self, GridPoint, TEXT_LINE_CELLS},
    op::{ArcOp, LineOp, Op, PointOp},
    token::Token,
};

/// Grid padding in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Padding {
    pub left: i32,
    pub top: i32,
    pub right: i32,
}

impl Padding {
    pub fn uniform(v: i32) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::uniform(1)
    }
}

/// The character grid a card is decoded onto.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layout {
    /// Edge length of one grid cell, in canvas pixels.
    pub cell: f64,
    pub padding: Padding,
    /// Total grid width in cells; wrapping keeps the cursor left of
    /// `grid_width - padding.right`.
    pub grid_width: i32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            cell: 8.0,
            padding: Padding::default(),
            grid_width: 75,
        }
    }
}

impl Layout {
    /// Layout for a canvas `width_px` pixels wide.
    pub fn for_canvas_width(width_px: u32, cell: f64, padding: Padding) -> Self {
        let grid_width = if cell > 0.0 {
            (f64::from(width_px) / cell).floor() as i32
        } else {
            0
        };
        Self {
            cell,
            padding,
            grid_width,
        }
    }

    pub fn validate(&self) -> InkcardResult<()> {
        if !self.cell.is_finite() || self.cell <= 0.0 {
            return Err(InkcardError::validation("cell size must be > 0"));
        }
        if self.grid_width <= 0 {
            return Err(InkcardError::validation("grid width must be > 0 cells"));
        }
        Ok(())
    }

    /// Where the cursor starts.
    pub fn origin(&self) -> GridPoint {
        GridPoint::new(self.padding.left, self.padding.top)
    }

    /// Rightmost column the cursor may land on before wrapping.
    fn max_x(&self) -> i32 {
        self.grid_width - self.padding.right
    }

    /// Top row of the text line containing `yi`.
    fn line_top(&self, yi: i32) -> i32 {
        self.padding.top + TEXT_LINE_CELLS * (yi - self.padding.top).div_euclid(TEXT_LINE_CELLS)
    }

    /// Top row of the text line after the one containing `yi`.
    fn next_line_top(&self, yi: i32) -> i32 {
        self.line_top(yi) + TEXT_LINE_CELLS
    }
}

/// Instruction mode, from bits 7 and 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// `00`: straight stroke (zero move: snap to the line top).
    Line,
    /// `01`: arc with its ellipse center offset vertically from the start
    /// point (zero move: dot).
    ArcY,
    /// `10`: arc with its ellipse center offset horizontally (zero move:
    /// full circle).
    ArcX,
    /// `11`: relocate the cursor without drawing (zero move: no-op).
    Move,
}

/// One decoded byte: a mode plus grid deltas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub mode: Mode,
    pub dx: i32,
    pub dy: i32,
}

/// Fold a raw 3-bit field into a signed delta.
///
/// Not two's complement: `0..=4` map to themselves and `5..=7` map to
/// `4 - v`, giving the asymmetric range `-3..=4`.
fn fold_signed(v: u8) -> i32 {
    if v <= 4 { i32::from(v) } else { 4 - i32::from(v) }
}

impl Instruction {
    pub fn decode(byte: u8) -> Self {
        let a = (byte >> 7) & 1;
        let xxx = (byte >> 4) & 0b111;
        let b = (byte >> 3) & 1;
        let yyy = byte & 0b111;

        let mode = match (a << 1) | b {
            0b00 => Mode::Line,
            0b01 => Mode::ArcY,
            0b10 => Mode::ArcX,
            _ => Mode::Move,
        };

        Self {
            mode,
            dx: fold_signed(xxx),
            dy: fold_signed(yyy),
        }
    }

    /// Zero moves repurpose the mode bits as a special action.
    pub fn is_zero_move(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Result of one decode pass: the operation list and every grid point the
/// cursor passed through (the latter is diagnostic only).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decoded {
    pub ops: Vec<Op>,
    pub visited: Vec<GridPoint>,
}

/// Walk `tokens` over `layout` and emit drawing operations.
///
/// The base ink color is resolved once from `background` by luminosity
/// contrast and stamped onto every op. Each call uses a fresh cursor; the
/// walk is a pure fold over the token list, so decoding a prefix of the
/// stream yields the prefix of the walk.
#[tracing::instrument(skip_all, fields(tokens = tokens.len()))]
pub fn decode(tokens: &[Token], layout: &Layout, background: Rgb) -> Decoded {
    let ink = background.contrast_ink();
    let mut walk = Walk::start(layout);
    for &token in tokens {
        walk.step(token, layout, ink);
    }
    Decoded {
        ops: walk.ops,
        visited: walk.visited,
    }
}

struct Walk {
    cursor: GridPoint,
    ops: Vec<Op>,
    visited: Vec<GridPoint>,
}

impl Walk {
    fn start(layout: &Layout) -> Self {
        let origin = layout.origin();
        Self {
            cursor: origin,
            ops: Vec::new(),
            visited: vec![origin],
        }
    }

    fn step(&mut self, token: Token, layout: &Layout, ink: Rgb) {
        let byte = match token {
            Token::Byte(b) => b,
            Token::Pipe => return,
            Token::Newline => {
                self.cursor = GridPoint::new(layout.padding.left, layout.next_line_top(self.cursor.yi));
                self.visited.push(self.cursor);
                return;
            }
        };

        let instr = Instruction::decode(byte);

        if instr.is_zero_move() {
            match instr.mode {
                Mode::Line => self.cursor.yi = layout.line_top(self.cursor.yi),
                Mode::ArcY => self.ops.push(Op::Point(PointOp {
                    at: self.cursor,
                    color: ink,
                })),
                Mode::ArcX => self.ops.push(Op::Arc(ArcOp::full_circle(
                    self.cursor.to_canvas(layout.cell),
                    layout.cell * 0.5,
                    ink,
                ))),
                Mode::Move => {}
            }
            self.visited.push(self.cursor);
            return;
        }

        // Wrap before moving, and only for rightward motion.
        if instr.dx > 0 && self.cursor.xi + instr.dx > layout.max_x() {
            self.cursor.xi = layout.padding.left;
            self.cursor.yi += TEXT_LINE_CELLS;
        }

        let from = self.cursor;
        let to = GridPoint::new(from.xi + instr.dx, from.yi + instr.dy);

        match instr.mode {
            Mode::Move => {}
            Mode::Line => self.ops.push(Op::Line(LineOp {
                from,
                to,
                color: ink,
            })),
            Mode::ArcY | Mode::ArcX => {
                // Axis-aligned motion degenerates the ellipse; nothing is
                // drawn but the cursor still advances.
                if instr.dx != 0 && instr.dy != 0 {
                    self.ops
                        .push(Op::Arc(diagonal_arc(instr, from, to, layout.cell, ink)));
                }
            }
        }

        self.cursor = to;
        self.visited.push(self.cursor);
    }
}

/// Build the ellipse arc for a diagonal move. The center sits at one of the
/// two corners of the move's bounding box, selected by mode, which decides
/// which partial ellipse connects the endpoints.
fn diagonal_arc(instr: Instruction, from: GridPoint, to: GridPoint, cell: f64, ink: Rgb) -> ArcOp {
    let p0 = from.to_canvas(cell);
    let p1 = to.to_canvas(cell);
    let rx = f64::from(instr.dx.abs()) * cell;
    let ry = f64::from(instr.dy.abs()) * cell;

    let center = match instr.mode {
        Mode::ArcY => kurbo::Point::new(p0.x, p0.y + f64::from(instr.dy) * cell),
        _ => kurbo::Point::new(p0.x + f64::from(instr.dx) * cell, p0.y),
    };

    let a0 = geom::normalize_angle(geom::angle_on_ellipse(center, rx, ry, p0));
    let a1 = geom::normalize_angle(geom::angle_on_ellipse(center, rx, ry, p1));

    ArcOp {
        center,
        rx,
        ry,
        start: a0,
        end: a1,
        counterclockwise: geom::counterclockwise_for_shortest(a0, a1),
        color: ink,
    }
}
