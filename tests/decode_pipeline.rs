use inkcard::{
    Decoded, GridPoint, Layout, Op, Padding, Rgb, Token, decode, parse, preprocess,
};

fn decode_markup(markup: &str, layout: &Layout, background: Rgb) -> Decoded {
    decode(&parse(markup), layout, background)
}

#[test]
fn grid_walk_sums_visible_and_invisible_deltas() {
    let layout = Layout::default();
    // Lines 0x41 (4,1) and 0x23 (2,3), invisible move 0xC9 (4,1), no-op
    // 0x88, point 0x08: final cursor is origin plus the three moves.
    let d = decode_markup("41 23 c9 88 08", &layout, Rgb::new(0, 0, 0));
    let origin = layout.origin();
    assert_eq!(
        d.visited.last(),
        Some(&GridPoint::new(origin.xi + 4 + 2 + 4, origin.yi + 1 + 3 + 1))
    );
    // Two lines and one point; the move and no-op emit nothing.
    assert_eq!(d.ops.len(), 3);
}

#[test]
fn wrap_reoriginates_geometry_on_the_next_line() {
    let layout = Layout {
        cell: 8.0,
        padding: Padding {
            left: 1,
            top: 1,
            right: 1,
        },
        grid_width: 10,
    };
    // Invisible moves put the cursor at xi=8; the following dx=4 byte must
    // wrap to (1, 9) before drawing.
    let d = decode_markup("c8b841", &layout, Rgb::new(0, 0, 0));
    let Op::Line(line) = d.ops[0] else {
        panic!("expected a line, got {:?}", d.ops[0]);
    };
    assert_eq!(line.from, GridPoint::new(1, 9));
    assert_eq!(line.to, GridPoint::new(5, 10));
}

#[test]
fn operation_count_never_exceeds_token_count() {
    let layout = Layout::default();
    for markup in ["418808c94119", "||||41", "ff00aa55", ""] {
        let tokens = parse(markup);
        let d = decode(&tokens, &layout, Rgb::new(0, 0, 0));
        assert!(d.ops.len() <= tokens.len());
    }
}

#[test]
fn every_byte_value_decodes() {
    let layout = Layout::default();
    for b in 0..=255u8 {
        let d = decode(&[Token::Byte(b)], &layout, Rgb::new(128, 128, 128));
        assert!(d.ops.len() <= 1);
        assert_eq!(d.visited.len(), 2);
    }
}

#[test]
fn rules_and_comments_run_before_tokenizing() {
    let source = preprocess("// heading\nAB\n// trailing\n", "A,41 B,23");
    let tokens = parse(&source);
    assert_eq!(tokens, vec![Token::Byte(0x41), Token::Byte(0x23)]);
}

#[test]
fn recoloring_requires_redecoding() {
    let layout = Layout::default();
    let over_dark = decode_markup("41", &layout, Rgb::new(0, 0, 0));
    let over_light = decode_markup("41", &layout, Rgb::new(255, 255, 255));
    assert_ne!(over_dark.ops[0].color(), over_light.ops[0].color());
}
