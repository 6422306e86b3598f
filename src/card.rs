//! Card model and the top-level render entry.
//!
//! A card is the stored unit the editor works with: the byte-markup input,
//! an optional rule text, and display options (camelCase JSON, matching the
//! stored card format). Rendering a card never fails: any error inside the
//! pipeline degrades to a centered message on the surface.

use crate::{
    color::{self, Rgb},
    decode::{self, Decoded, Layout, Padding},
    error::InkcardResult,
    op::Op,
    render::{self, RenderOptions},
    rules,
    surface::Surface,
    token,
};

/// Cell size used for card previews, in pixels.
pub const CARD_CELL: f64 = 8.0;
/// Grid padding used for card previews, in cells.
pub const CARD_PADDING: i32 = 3;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italics: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animate: Option<bool>,
}

impl CardOptions {
    /// Primary background color; unset or unparseable values fall back to
    /// neutral gray.
    pub fn background(&self) -> Rgb {
        self.background_color
            .as_deref()
            .map(Rgb::parse_hex)
            .unwrap_or(color::NEUTRAL_GRAY)
    }

    /// Italics are on unless explicitly disabled.
    pub fn italics_enabled(&self) -> bool {
        self.italics != Some(false)
    }

    /// Animation is off unless explicitly enabled.
    pub fn animate_enabled(&self) -> bool {
        self.animate == Some(true)
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Card {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub options: CardOptions,
}

/// Where a card is being shown. Animation is only honored in the detail
/// view; thumbnails always render statically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewContext {
    Grid,
    Detail,
}

/// Outcome of [`render_card`]: either the surface already holds the final
/// pixels, or the caller should drive the returned reveal with its own
/// clock and gate.
pub enum CardRender {
    Static,
    Animated { ops: Vec<Op>, opts: RenderOptions },
}

/// Decode a card's source for a surface of the given width: the comment and
/// rule pre-pass, tokenizing, and the cursor walk. The decoded result is the
/// stable intermediate other tooling consumes.
pub fn prepare_card(card: &Card, surface_width: u32) -> (Decoded, RenderOptions) {
    let background = card.options.background();
    let layout =
        Layout::for_canvas_width(surface_width, CARD_CELL, Padding::uniform(CARD_PADDING));

    let source = rules::preprocess(&card.input, &card.rule);
    let tokens = token::parse(&source);
    let decoded = decode::decode(&tokens, &layout, background);

    let mut opts = RenderOptions::new(layout, background);
    opts.italics = card.options.italics_enabled();
    (decoded, opts)
}

/// Render a card preview onto `surface`.
///
/// The surface is cleared to the card's background color first. Failures
/// never propagate: the surface degrades to a readable error message, since
/// this entry point sits under a live UI.
#[tracing::instrument(skip_all)]
pub fn render_card(surface: &mut Surface, card: &Card, view: ViewContext) -> CardRender {
    match try_render_card(surface, card, view) {
        Ok(outcome) => outcome,
        Err(err) => {
            surface.draw_message(&format!("Error: {err}"), color::WHITE);
            CardRender::Static
        }
    }
}

fn try_render_card(
    surface: &mut Surface,
    card: &Card,
    view: ViewContext,
) -> InkcardResult<CardRender> {
    let (decoded, opts) = prepare_card(card, surface.width());
    surface.clear(opts.background);

    if card.options.animate_enabled() && view == ViewContext::Detail {
        return Ok(CardRender::Animated {
            ops: decoded.ops,
            opts,
        });
    }

    render::render_static(surface, &decoded.ops, &opts)?;
    Ok(CardRender::Static)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(input: &str) -> Card {
        Card {
            input: input.to_string(),
            ..Card::default()
        }
    }

    #[test]
    fn options_deserialize_from_camel_case() {
        let json = r##"{
            "input": "4122||08",
            "rule": "A,41",
            "options": {"backgroundColor": "#112233", "italics": false, "animate": true}
        }"##;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.options.background(), Rgb::new(0x11, 0x22, 0x33));
        assert!(!card.options.italics_enabled());
        assert!(card.options.animate_enabled());
    }

    #[test]
    fn option_defaults_match_stored_cards() {
        let card: Card = serde_json::from_str(r#"{"input": "41"}"#).unwrap();
        assert_eq!(card.options.background(), color::NEUTRAL_GRAY);
        assert!(card.options.italics_enabled());
        assert!(!card.options.animate_enabled());
    }

    #[test]
    fn prepare_exposes_ops_and_visited_path() {
        let (decoded, opts) = prepare_card(&card("4112"), 600);
        assert_eq!(decoded.ops.len(), 2);
        assert_eq!(decoded.visited.len(), 3);
        assert_eq!(opts.layout.grid_width, 75);
        assert_eq!(opts.layout.padding, Padding::uniform(CARD_PADDING));
    }

    #[test]
    fn animation_is_only_honored_in_detail_view() {
        let mut c = card("4112");
        c.options.animate = Some(true);

        let mut surface = Surface::new(128, 128).unwrap();
        assert!(matches!(
            render_card(&mut surface, &c, ViewContext::Grid),
            CardRender::Static
        ));
        assert!(matches!(
            render_card(&mut surface, &c, ViewContext::Detail),
            CardRender::Animated { .. }
        ));
    }

    #[test]
    fn render_failure_degrades_to_message() {
        // A 4px-wide surface yields a zero-cell grid, which the renderer
        // rejects; the entry point must swallow that and stay usable.
        let mut surface = Surface::new(4, 4).unwrap();
        let outcome = render_card(&mut surface, &card("4112"), ViewContext::Grid);
        assert!(matches!(outcome, CardRender::Static));
    }

    #[test]
    fn comments_and_rules_feed_the_decoder() {
        let mut c = card("// title\nAB");
        c.rule = "A,41 B,12".to_string();
        let (decoded, _) = prepare_card(&c, 600);
        assert_eq!(decoded.ops.len(), 2);
    }
}
