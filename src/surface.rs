//! The raster render target.
//!
//! A [`Surface`] owns a premultiplied RGBA8 pixmap. Scene painting goes
//! through a `vello_cpu::RenderContext` that composites over the existing
//! pixel contents, so callers clear first and then paint.

use std::path::Path;

use crate::{
    color::Rgb,
    error::{InkcardError, InkcardResult},
};

pub struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> InkcardResult<Self> {
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| InkcardError::validation("surface width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| InkcardError::validation("surface height exceeds u16"))?;
        if width_u16 == 0 || height_u16 == 0 {
            return Err(InkcardError::validation("surface must be at least 1x1"));
        }
        Ok(Self {
            width: width_u16,
            height: height_u16,
            pixmap: vello_cpu::Pixmap::new(width_u16, height_u16),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Premultiplied RGBA8 pixel bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Reset every pixel to transparent black.
    pub fn clear_transparent(&mut self) {
        self.fill_bytes([0, 0, 0, 0]);
    }

    /// Reset every pixel to an opaque color.
    pub fn clear(&mut self, color: Rgb) {
        self.fill_bytes([color.r, color.g, color.b, 255]);
    }

    fn fill_bytes(&mut self, rgba: [u8; 4]) {
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Run `paint` against a fresh render context and composite the result
    /// over the current pixels.
    pub fn paint_scene(
        &mut self,
        paint: impl FnOnce(&mut vello_cpu::RenderContext) -> InkcardResult<()>,
    ) -> InkcardResult<()> {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        paint(&mut ctx)?;
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        Ok(())
    }

    /// Best-effort centered message, for the renderer's degrade-don't-crash
    /// boundary. Goes through the SVG text rasterizer with system fonts; if
    /// that fails for any reason the surface is simply left as-is.
    pub fn draw_message(&mut self, message: &str, color: Rgb) {
        if let Err(err) = self.try_draw_message(message, color) {
            tracing::warn!("fallback message could not be drawn: {err}");
        }
    }

    fn try_draw_message(&mut self, message: &str, color: Rgb) -> InkcardResult<()> {
        let svg = message_svg(self.width(), self.height(), message, color);

        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        let opts = usvg::Options {
            fontdb: std::sync::Arc::new(db),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
            .map_err(|e| InkcardError::render(format!("parse message svg: {e}")))?;

        let mut layer = resvg::tiny_skia::Pixmap::new(self.width(), self.height())
            .ok_or_else(|| InkcardError::render("failed to allocate message pixmap"))?;
        resvg::render(&tree, resvg::tiny_skia::Transform::identity(), &mut layer.as_mut());

        over_in_place(self.pixmap.data_as_u8_slice_mut(), layer.data());
        Ok(())
    }

    /// Encode the surface as a straight-alpha PNG.
    pub fn write_png(&self, path: &Path) -> InkcardResult<()> {
        let mut data = self.data().to_vec();
        unpremultiply_in_place(&mut data);
        let img = image::RgbaImage::from_raw(self.width(), self.height(), data)
            .ok_or_else(|| InkcardError::render("pixel buffer size mismatch"))?;
        img.save(path)
            .map_err(|e| InkcardError::render(format!("write png: {e}")))?;
        Ok(())
    }
}

fn message_svg(width: u32, height: u32, message: &str, color: Rgb) -> String {
    let escaped: String = message
        .chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            c => c.to_string(),
        })
        .collect();
    format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" ",
            "viewBox=\"0 0 {w} {h}\">",
            "<text x=\"50%\" y=\"50%\" text-anchor=\"middle\" ",
            "font-family=\"monospace\" font-size=\"20\" fill=\"{fill}\">{msg}</text>",
            "</svg>"
        ),
        w = width,
        h = height,
        fill = color.to_hex(),
        msg = escaped,
    )
}

/// Premultiplied source-over of equal-sized RGBA8 buffers.
fn over_in_place(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        let inv = 255 - sa;
        for i in 0..4 {
            let sc = u16::from(s[i]);
            let dc = u16::from(mul_div255(u16::from(d[i]), inv));
            d[i] = (sc + dc).min(255) as u8;
        }
    }
}

fn unpremultiply_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 || a == 255 {
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = ((u16::from(*c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_sizes() {
        assert!(Surface::new(0, 10).is_err());
        assert!(Surface::new(10, 0).is_err());
        assert!(Surface::new(100_000, 10).is_err());
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut s = Surface::new(4, 3).unwrap();
        s.clear(Rgb::new(10, 20, 30));
        assert!(
            s.data()
                .chunks_exact(4)
                .all(|px| px == [10, 20, 30, 255])
        );
    }

    #[test]
    fn message_svg_escapes_markup() {
        let svg = message_svg(100, 50, "a < b & c", Rgb::new(255, 255, 255));
        assert!(svg.contains("a &lt; b &amp; c"));
        assert!(svg.contains("fill=\"#ffffff\""));
    }

    #[test]
    fn over_keeps_dst_under_transparent_src() {
        let mut dst = vec![5, 6, 7, 255];
        over_in_place(&mut dst, &[0, 0, 0, 0]);
        assert_eq!(dst, vec![5, 6, 7, 255]);

        let mut dst = vec![5, 6, 7, 255];
        over_in_place(&mut dst, &[200, 100, 50, 255]);
        assert_eq!(dst, vec![200, 100, 50, 255]);
    }

    #[test]
    fn unpremultiply_restores_straight_alpha() {
        // 50% alpha premul (64, 32, 16) -> straight (128, 64, 32).
        let mut data = vec![64, 32, 16, 128];
        unpremultiply_in_place(&mut data);
        assert_eq!(data[3], 128);
        assert!((i32::from(data[0]) - 128).abs() <= 1);
        assert!((i32::from(data[1]) - 64).abs() <= 1);
        assert!((i32::from(data[2]) - 32).abs() <= 1);
    }
}
