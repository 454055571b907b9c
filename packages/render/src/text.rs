//! Bitmap text drawing.
//!
//! Uses the embedded `font8x8` glyphs so overlay text needs no font file
//! and renders identically everywhere. Each glyph is an 8x8 cell scaled by
//! an integer factor; characters without a glyph advance without drawing.

use font8x8::{BASIC_FONTS, UnicodeFonts as _};
use tiny_skia::{Paint, Pixmap, Rect, Transform};

use crate::palette::Rgb;

/// Glyph cell size in font pixels.
pub const GLYPH_SIZE: u32 = 8;

/// Width in pixels of `text` drawn at `scale`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Draws `text` with its top-left corner at `(x, y)`.
#[allow(clippy::cast_precision_loss)]
pub fn draw_text(pixmap: &mut Pixmap, text: &str, x: f32, y: f32, scale: u32, color: Rgb) {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.0, color.1, color.2, 255);
    paint.anti_alias = false;

    let cell = scale as f32;
    let advance = (GLYPH_SIZE * scale) as f32;

    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let origin_x = (i as f32).mul_add(advance, x);

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let rect = Rect::from_xywh(
                    (col as f32).mul_add(cell, origin_x),
                    (row as f32).mul_add(cell, y),
                    cell,
                    cell,
                );
                if let Some(rect) = rect {
                    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
        }
    }
}
