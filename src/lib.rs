//! Inkcard renders small graphical "cards" from a compact byte-oriented
//! markup into pen-plotter style line art.
//!
//! # Pipeline overview
//!
//! 1. **Pre-pass**: strip comments, apply the card's find/replace rules
//!    (`rules`)
//! 2. **Tokenize**: hex pairs, `|` separators, `||` line breaks (`token`)
//! 3. **Decode**: walk a grid cursor over bit-packed byte instructions and
//!    emit lines, arcs and points (`decode`, `op`)
//! 4. **Render**: stroke the op list onto a CPU pixmap, either statically
//!    (`render`) or revealed stroke-by-stroke over time (`animate`)
//!
//! The decoder's output (`Decoded`) is the stable intermediate
//! representation; everything upstream of it is total (any input string
//! decodes), and the only fallible boundary is the renderer, which degrades
//! to a readable message rather than failing a live UI.
#![forbid(unsafe_code)]

pub mod animate;
pub mod card;
pub mod color;
pub mod decode;
pub mod error;
pub mod geom;
pub mod highlight;
pub mod op;
pub mod render;
pub mod rules;
pub mod surface;
pub mod token;

pub use animate::{
    Animation, AnimationGate, AnimationStatus, DRAW_MS, FrameClock, STEP_DELAY_MS, SystemClock,
    run_animation,
};
pub use card::{Card, CardOptions, CardRender, ViewContext, prepare_card, render_card};
pub use color::Rgb;
pub use decode::{Decoded, Instruction, Layout, Mode, Padding, decode};
pub use error::{InkcardError, InkcardResult};
pub use geom::GridPoint;
pub use highlight::{HighlightSpan, SpanKind, highlight_spans};
pub use op::{ArcOp, LineOp, Op, PointOp};
pub use render::{RenderMode, RenderOptions, draw_grid_dots, render_static};
pub use rules::{RuleSet, preprocess};
pub use surface::Surface;
pub use token::{Token, parse};
