//! Bitmap text for card rendering.
//!
//! Uses the Spleen bitmap font family. Glyphs are fixed-width, so measuring
//! a string is a character count times the scaled advance, which keeps
//! word-wrap and centering exactly reproducible.

use spleen_font::{FONT_8X16, FONT_12X24, PSF2Font};

use super::surface::Surface;
use crate::theme::Color;

/// Spleen face used for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    /// 8x16, cell text
    Small,
    /// 12x24, header and free-space label
    Large,
}

impl FontFace {
    fn char_width(self) -> u32 {
        match self {
            FontFace::Small => 8,
            FontFace::Large => 12,
        }
    }

    fn char_height(self) -> u32 {
        match self {
            FontFace::Small => 16,
            FontFace::Large => 24,
        }
    }

    fn font_data(self) -> &'static [u8] {
        match self {
            FontFace::Small => FONT_8X16,
            FontFace::Large => FONT_12X24,
        }
    }
}

/// A face plus an integer pixel-doubling factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub face: FontFace,
    pub scale: u32,
}

impl TextStyle {
    pub const TITLE: TextStyle = TextStyle {
        face: FontFace::Large,
        scale: 2,
    };
    pub const SUBTITLE: TextStyle = TextStyle {
        face: FontFace::Large,
        scale: 1,
    };
    pub const CELL: TextStyle = TextStyle {
        face: FontFace::Small,
        scale: 1,
    };
    pub const LABEL: TextStyle = TextStyle {
        face: FontFace::Large,
        scale: 1,
    };

    pub fn char_width(&self) -> u32 {
        self.face.char_width() * self.scale
    }

    pub fn char_height(&self) -> u32 {
        self.face.char_height() * self.scale
    }

    /// Rendered width of `text` in pixels.
    pub fn measure(&self, text: &str) -> u32 {
        text.chars().count() as u32 * self.char_width()
    }
}

/// Draw text with its top-left corner at `(x, y)`.
///
/// Characters missing from the font advance the caret without drawing.
pub fn draw_text(surface: &mut Surface, text: &str, x: i64, y: i64, style: TextStyle, color: Color) {
    let mut font = PSF2Font::new(style.face.font_data()).expect("bundled Spleen font is valid");
    let scale = style.scale as i64;
    let mut cursor_x = x;

    for ch in text.chars() {
        let utf8 = ch.to_string();
        if let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) {
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if !on {
                        continue;
                    }
                    let px = cursor_x + col_x as i64 * scale;
                    let py = y + row_y as i64 * scale;
                    for dy in 0..scale {
                        for dx in 0..scale {
                            surface.put(px + dx, py + dy, color);
                        }
                    }
                }
            }
        }
        cursor_x += style.char_width() as i64;
    }
}

/// Draw text centered horizontally and vertically on `(center_x, center_y)`.
pub fn draw_text_centered(
    surface: &mut Surface,
    text: &str,
    center_x: i64,
    center_y: i64,
    style: TextStyle,
    color: Color,
) {
    let x = center_x - style.measure(text) as i64 / 2;
    let y = center_y - style.char_height() as i64 / 2;
    draw_text(surface, text, x, y, style, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_is_char_count() {
        assert_eq!(TextStyle::CELL.measure("Hello"), 40);
        assert_eq!(TextStyle::TITLE.measure("My Card"), 7 * 24);
        assert_eq!(TextStyle::LABEL.measure(""), 0);
        assert_eq!(TextStyle::CELL.measure("ééé"), 24);
    }

    #[test]
    fn test_draw_text_marks_pixels_inside_box() {
        let mut surface = Surface::new(100, 40);
        draw_text(&mut surface, "Hi", 10, 10, TextStyle::CELL, Color::WHITE);

        let mut lit = 0;
        for y in 0..40 {
            for x in 0..100 {
                if surface.pixel(x, y) == Some(Color::WHITE) {
                    assert!((10..26).contains(&x), "x={} outside glyph box", x);
                    assert!((10..26).contains(&y), "y={} outside glyph box", y);
                    lit += 1;
                }
            }
        }
        assert!(lit > 0);
    }

    #[test]
    fn test_centered_text_is_symmetric_box() {
        let mut surface = Surface::new(200, 100);
        draw_text_centered(&mut surface, "WW", 100, 50, TextStyle::LABEL, Color::WHITE);
        for y in 0..100 {
            for x in 0..200 {
                if surface.pixel(x, y) == Some(Color::WHITE) {
                    assert!((88..112).contains(&x));
                    assert!((38..62).contains(&y));
                }
            }
        }
    }
}
