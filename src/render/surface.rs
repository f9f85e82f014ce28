//! Raster surface the compositor draws into.
//!
//! An RGBA pixel buffer with the handful of primitives a card needs:
//! opaque and translucent rectangle fills, rectangle strokes, soft dots and
//! image blits. Coordinates outside the surface are clipped.

use image::{Rgba, RgbaImage, imageops};

use crate::theme::Color;

/// Drawable pixel buffer.
#[derive(Debug, Clone)]
pub struct Surface {
    image: RgbaImage,
    /// Set once cross-origin pixels have been drawn; such a surface cannot be encoded.
    tainted: bool,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            tainted: false,
        }
    }

    /// Resize and clear the surface, dropping any taint.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
        self.tainted = false;
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    pub fn mark_tainted(&mut self) {
        self.tainted = true;
    }

    /// Color at a pixel, ignoring alpha. `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image
            .get_pixel_checked(x, y)
            .map(|p| Color([p[0], p[1], p[2]]))
    }

    #[inline]
    fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64
    }

    /// Overwrite a pixel with an opaque color.
    #[inline]
    pub fn put(&mut self, x: i64, y: i64, color: Color) {
        if self.in_bounds(x, y) {
            let [r, g, b] = color.0;
            self.image.put_pixel(x as u32, y as u32, Rgba([r, g, b, 255]));
        }
    }

    /// Mix a color over the existing pixel with the given opacity.
    #[inline]
    pub fn blend(&mut self, x: i64, y: i64, color: Color, alpha: f32) {
        if !self.in_bounds(x, y) {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        for (channel, &src) in pixel.0.iter_mut().take(3).zip(color.0.iter()) {
            let mixed = *channel as f32 * (1.0 - alpha) + src as f32 * alpha;
            *channel = mixed.round() as u8;
        }
        pixel.0[3] = 255;
    }

    /// Fill the whole surface.
    pub fn fill(&mut self, color: Color) {
        let [r, g, b] = color.0;
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([r, g, b, 255]);
        }
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Color) {
        for py in y..y + height as i64 {
            for px in x..x + width as i64 {
                self.put(px, py, color);
            }
        }
    }

    pub fn blend_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Color, alpha: f32) {
        for py in y..y + height as i64 {
            for px in x..x + width as i64 {
                self.blend(px, py, color, alpha);
            }
        }
    }

    /// Stroke a rectangle outline with the line centered on its edges.
    pub fn stroke_rect(&mut self, x: i64, y: i64, width: u32, height: u32, line: u32, color: Color) {
        if line == 0 {
            return;
        }
        let outer_pad = (line / 2) as i64;
        let inner_pad = line as i64 - outer_pad;

        let (ox1, oy1) = (x - outer_pad, y - outer_pad);
        let (ox2, oy2) = (x + width as i64 + outer_pad, y + height as i64 + outer_pad);
        let (ix1, iy1) = (x + inner_pad, y + inner_pad);
        let (ix2, iy2) = (x + width as i64 - inner_pad, y + height as i64 - inner_pad);

        for py in oy1..oy2 {
            for px in ox1..ox2 {
                let inside = px >= ix1 && px < ix2 && py >= iy1 && py < iy2;
                if !inside {
                    self.put(px, py, color);
                }
            }
        }
    }

    /// Blend an anti-aliased filled circle.
    pub fn blend_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color, alpha: f32) {
        let r_ceil = radius.ceil() as i64 + 1;
        let cxi = cx as i64;
        let cyi = cy as i64;

        for dy in -r_ceil..=r_ceil {
            for dx in -r_ceil..=r_ceil {
                let px = cxi + dx;
                let py = cyi + dy;
                let dist = ((px as f32 + 0.5 - cx).powi(2) + (py as f32 + 0.5 - cy).powi(2)).sqrt();
                if dist <= radius {
                    self.blend(px, py, color, alpha);
                } else if dist <= radius + 1.0 {
                    let aa = 1.0 - (dist - radius);
                    self.blend(px, py, color, alpha * aa);
                }
            }
        }
    }

    /// Composite an image with its top-left corner at `(x, y)`.
    pub fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(&mut self.image, image, x, y);
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut surface = Surface::new(10, 10);
        surface.fill_rect(-5, -5, 8, 8, RED);
        assert_eq!(surface.pixel(0, 0), Some(RED));
        assert_eq!(surface.pixel(2, 2), Some(RED));
        assert_eq!(surface.pixel(3, 3), Some(Color::BLACK));
        assert_eq!(surface.pixel(10, 10), None);
    }

    #[test]
    fn test_blend_half() {
        let mut surface = Surface::new(1, 1);
        surface.fill(Color::WHITE);
        surface.blend(0, 0, Color::BLACK, 0.5);
        let Color([r, g, b]) = surface.pixel(0, 0).unwrap();
        assert_eq!((r, g, b), (128, 128, 128));
    }

    #[test]
    fn test_stroke_rect_leaves_interior() {
        let mut surface = Surface::new(20, 20);
        surface.stroke_rect(5, 5, 10, 10, 3, RED);
        // Line straddles the edge: one pixel outside, two inside.
        assert_eq!(surface.pixel(4, 10), Some(RED));
        assert_eq!(surface.pixel(5, 10), Some(RED));
        assert_eq!(surface.pixel(6, 10), Some(RED));
        assert_eq!(surface.pixel(7, 10), Some(Color::BLACK));
        assert_eq!(surface.pixel(3, 10), Some(Color::BLACK));
        assert_eq!(surface.pixel(10, 10), Some(Color::BLACK));
    }

    #[test]
    fn test_reset_clears_taint() {
        let mut surface = Surface::new(4, 4);
        surface.mark_tainted();
        assert!(surface.is_tainted());
        surface.reset(8, 2);
        assert!(!surface.is_tainted());
        assert_eq!((surface.width(), surface.height()), (8, 2));
    }

    #[test]
    fn test_draw_image() {
        let mut surface = Surface::new(4, 4);
        let patch = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        surface.draw_image(&patch, 1, 1);
        assert_eq!(surface.pixel(1, 1), Some(Color::rgb(0, 0, 255)));
        assert_eq!(surface.pixel(2, 2), Some(Color::rgb(0, 0, 255)));
        assert_eq!(surface.pixel(3, 3), Some(Color::BLACK));
    }
}
