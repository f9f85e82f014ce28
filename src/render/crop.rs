//! Cover-fit cropping into square destinations.
//!
//! The source is trimmed symmetrically along its longer axis until it is
//! square, then scaled to the destination. Aspect ratio is never distorted
//! and the destination is always filled edge to edge.

use image::{RgbaImage, imageops::{self, FilterType}};

/// Square region of the source image to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Largest centered square inside a `width`×`height` source.
pub fn cover_fit(width: u32, height: u32) -> CropRect {
    if width > height {
        CropRect {
            x: (width - height) / 2,
            y: 0,
            size: height,
        }
    } else {
        CropRect {
            x: 0,
            y: (height - width) / 2,
            size: width,
        }
    }
}

/// Crop `source` to its cover-fit square and scale it to `size`×`size`.
///
/// Returns `None` for empty sources or destinations.
pub fn cover_square(source: &RgbaImage, size: u32) -> Option<RgbaImage> {
    if size == 0 || source.width() == 0 || source.height() == 0 {
        return None;
    }
    let crop = cover_fit(source.width(), source.height());
    let square = imageops::crop_imm(source, crop.x, crop.y, crop.size, crop.size).to_image();
    Some(imageops::resize(&square, size, size, FilterType::Triangle))
}
