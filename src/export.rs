//! # Export
//!
//! Encodes a finished surface as JPEG and hands it to a download
//! collaborator under a name derived from the card title and date.

use chrono::NaiveDate;
use image::{DynamicImage, codecs::jpeg::JpegEncoder};
use std::path::PathBuf;
use tracing::info;

use crate::error::BingoError;
use crate::render::surface::Surface;

/// Receives the encoded card.
pub trait DownloadSink {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<(), BingoError>;
}

/// Saves downloads as files in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<(), BingoError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "card saved");
        Ok(())
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<(), BingoError> {
        self.files.push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Replace every non-alphanumeric character with `_` and lowercase.
pub fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// `sanitize(title)_YYYY-MM-DD.jpg`, using `default_title` when the title is empty.
pub fn download_filename(title: &str, default_title: &str, date: NaiveDate) -> String {
    let label = if title.trim().is_empty() { default_title } else { title };
    format!("{}_{}.jpg", sanitize(label), date.format("%Y-%m-%d"))
}

/// Encode the surface as JPEG.
///
/// A surface holding cross-origin pixels cannot be read back and fails
/// with [`BingoError::TaintedSurface`]; any other failure, including an
/// empty result, is a [`BingoError::Encode`].
pub fn encode_jpeg(surface: &Surface, quality: u8) -> Result<Vec<u8>, BingoError> {
    if surface.is_tainted() {
        return Err(BingoError::TaintedSurface);
    }
    if surface.width() == 0 || surface.height() == 0 {
        return Err(BingoError::Encode("surface is empty".to_string()));
    }

    let rgb = DynamicImage::ImageRgba8(surface.image().clone()).into_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| BingoError::Encode(format!("JPEG encoding failed: {}", e)))?;

    if bytes.is_empty() {
        return Err(BingoError::Encode("encoder produced no data".to_string()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Color;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("My Card!"), "my_card_");
        assert_eq!(sanitize("Été 2024"), "_t__2024");
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(download_filename("My Card", "Ultimate Bingo", date()), "my_card_2024-12-25.jpg");
        assert_eq!(download_filename("", "Ultimate Bingo", date()), "ultimate_bingo_2024-12-25.jpg");
        assert_eq!(download_filename("   ", "Ultimate Bingo", date()), "ultimate_bingo_2024-12-25.jpg");
    }

    #[test]
    fn test_encode_jpeg() {
        let mut surface = Surface::new(16, 8);
        surface.fill(Color::rgb(40, 80, 120));
        let bytes = encode_jpeg(&surface, 90).unwrap();
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn test_encode_tainted_surface() {
        let mut surface = Surface::new(4, 4);
        surface.mark_tainted();
        assert!(matches!(encode_jpeg(&surface, 90), Err(BingoError::TaintedSurface)));
    }

    #[test]
    fn test_encode_empty_surface() {
        assert!(matches!(encode_jpeg(&Surface::default(), 90), Err(BingoError::Encode(_))));
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("out"));
        sink.deliver("card.jpg", b"jpeg").unwrap();
        assert_eq!(std::fs::read(dir.path().join("out/card.jpg")).unwrap(), b"jpeg");
    }
}
