//! Stroke color resolution for card rendering.
//!
//! Every card carries a background color; the ink color is derived from it by
//! relative luminosity, then softened toward the background for the inside
//! stroke pass. Color parsing is deliberately fail-soft: stored cards may
//! carry legacy or malformed values, and those must render (as neutral gray)
//! rather than error.

/// Straight (non-premultiplied) 8-bit RGB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
pub const WHITE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

/// Fallback for unparseable color strings.
pub const NEUTRAL_GRAY: Rgb = Rgb {
    r: 128,
    g: 128,
    b: 128,
};

/// Fraction of the base ink kept when blending toward the background for the
/// inside stroke pass.
pub const INK_BLEND_RATIO: f64 = 0.62;

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` string (case-insensitive, `#` optional).
    ///
    /// Never fails: anything that does not match the pattern yields
    /// [`NEUTRAL_GRAY`].
    pub fn parse_hex(s: &str) -> Self {
        fn hex_pair(s: &[u8]) -> Option<u8> {
            let hi = (s[0] as char).to_digit(16)?;
            let lo = (s[1] as char).to_digit(16)?;
            Some(((hi << 4) | lo) as u8)
        }

        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        let bytes = s.as_bytes();
        if bytes.len() != 6 || !bytes.iter().all(u8::is_ascii_hexdigit) {
            return NEUTRAL_GRAY;
        }

        match (
            hex_pair(&bytes[0..2]),
            hex_pair(&bytes[2..4]),
            hex_pair(&bytes[4..6]),
        ) {
            (Some(r), Some(g), Some(b)) => Self { r, g, b },
            _ => NEUTRAL_GRAY,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminosity in `0..=1` (ITU-R BT.601 weights).
    pub fn luminosity(self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)) / 255.0
    }

    /// Base ink color against this background: black over light backgrounds,
    /// white over dark ones. The switch is exactly `luminosity > 0.5`.
    pub fn contrast_ink(self) -> Rgb {
        if self.luminosity() > 0.5 { BLACK } else { WHITE }
    }

    /// Blend `ratio` of `self` with `1 - ratio` of `other`, per channel,
    /// rounded to nearest.
    pub fn blend(self, other: Rgb, ratio: f64) -> Rgb {
        fn mix(a: u8, b: u8, ratio: f64) -> u8 {
            (f64::from(a) * ratio + f64::from(b) * (1.0 - ratio)).round() as u8
        }

        Rgb {
            r: mix(self.r, other.r, ratio),
            g: mix(self.g, other.g, ratio),
            b: mix(self.b, other.b, ratio),
        }
    }

    /// The softened stroke color used for card-mode inside passes: the
    /// contrast ink pulled [`INK_BLEND_RATIO`] of the way toward `self`.
    pub fn blended_ink(self) -> Rgb {
        self.contrast_ink().blend(self, INK_BLEND_RATIO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(Rgb::parse_hex("#ff8000"), Rgb::new(255, 128, 0));
        assert_eq!(Rgb::parse_hex("FF8000"), Rgb::new(255, 128, 0));
    }

    #[test]
    fn malformed_strings_fall_back_to_gray() {
        for s in ["notacolor", "", "#12345", "#1234567", "#gghhii", "rgb(1,2,3)"] {
            assert_eq!(Rgb::parse_hex(s), NEUTRAL_GRAY);
        }
    }

    #[test]
    fn luminosity_threshold_picks_ink() {
        assert_eq!(Rgb::parse_hex("#ffffff").contrast_ink(), BLACK);
        assert_eq!(Rgb::parse_hex("#000000").contrast_ink(), WHITE);
        // The switch is strictly `> 0.5`: 127-gray (0.498) keeps white ink,
        // 128-gray (0.502) flips to black.
        let below = Rgb::new(127, 127, 127);
        assert!(below.luminosity() <= 0.5);
        assert_eq!(below.contrast_ink(), WHITE);
        assert_eq!(Rgb::new(128, 128, 128).contrast_ink(), BLACK);
    }

    #[test]
    fn blend_is_channelwise_and_rounded() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(255, 255, 255);
        assert_eq!(a.blend(b, 0.62), Rgb::new(97, 97, 97));
        assert_eq!(a.blend(b, 1.0), a);
        assert_eq!(a.blend(b, 0.0), b);
    }

    #[test]
    fn hex_roundtrip() {
        let c = Rgb::new(18, 52, 86);
        assert_eq!(Rgb::parse_hex(&c.to_hex()), c);
    }
}
