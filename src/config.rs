//! # Card Configuration
//!
//! Fixed constants for layout, drawing, export and image resolution.
//! Every field has a default, so a config file only needs the values it
//! changes.
//!
//! ## Example
//!
//! ```
//! use bingocard::config::CardConfig;
//!
//! let config: CardConfig = serde_json::from_str(r#"{ "layout": { "cell_size": 160 } }"#).unwrap();
//! assert_eq!(config.layout.cell_size, 160);
//! assert_eq!(config.layout.border_width, 5);
//! assert_eq!(config.export.jpeg_quality, 90);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::BingoError;

/// Geometry constants fed to the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub cell_size: u32,
    pub border_width: u32,
    /// Outer margin around the whole card.
    pub padding: u32,
    pub title_height: u32,
    pub subtitle_height: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_size: 140,
            border_width: 5,
            padding: 20,
            title_height: 60,
            subtitle_height: 40,
        }
    }
}

/// Drawing constants used by the compositor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Stroke width of the border around plain cells.
    pub cell_border_line: u32,
    /// Horizontal space reserved inside a cell; text wraps at `cell_size - text_margin`.
    pub text_margin: u32,
    pub line_height: u32,
    /// Inset of the center image, as a fraction of the cell size per side.
    pub center_inset: f32,
    /// Opacity of the dark overlay drawn between a cell image and its text.
    pub overlay_alpha: f32,
    pub dot_spacing: u32,
    pub dot_radius: f32,
    pub dot_alpha: f32,
    pub free_label: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_border_line: 3,
            text_margin: 20,
            line_height: 20,
            center_inset: 0.125,
            overlay_alpha: 0.5,
            dot_spacing: 20,
            dot_radius: 1.5,
            dot_alpha: 0.08,
            free_label: "Free space".to_string(),
        }
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// JPEG quality 1-100.
    pub jpeg_quality: u8,
    /// Title used for the download name when the card has none.
    pub default_title: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            default_title: "Ultimate Bingo".to_string(),
        }
    }
}

/// Image resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub timeout_ms: u64,
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

/// Complete configuration for rendering and exporting a card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub export: ExportConfig,
    pub resolver: ResolverConfig,
}

impl CardConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, BingoError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BingoError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| BingoError::Config(format!("Invalid config {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config: CardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CardConfig::default());
    }

    #[test]
    fn test_partial_section() {
        let config: CardConfig =
            serde_json::from_str(r#"{ "render": { "free_label": "LIBRE" }, "resolver": { "timeout_ms": 5000 } }"#)
                .unwrap();
        assert_eq!(config.render.free_label, "LIBRE");
        assert_eq!(config.render.line_height, 20);
        assert_eq!(config.resolver.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CardConfig::load(Path::new("/nonexistent/bingocard.json")).unwrap_err();
        assert!(matches!(err, BingoError::Config(_)));
    }
}
