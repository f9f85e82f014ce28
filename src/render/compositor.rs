//! Card compositor.
//!
//! Resolves every image the card needs, then draws the card in one
//! synchronous pass:
//!
//! 1. Background fill and decorative dot grid
//! 2. Title and `pseudo - date` line, centered in their bands
//! 3. Cells in row-major order (free cell, image cell, or plain cell)
//!
//! Image failures never abort an export; the affected cell is drawn as a
//! plain cell instead.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

use super::font::{TextStyle, draw_text_centered};
use super::surface::Surface;
use super::wrap::wrap_text;
use crate::config::CardConfig;
use crate::error::BingoError;
use crate::export::{DownloadSink, download_filename, encode_jpeg};
use crate::grid::{Cell, GRID_SIZE};
use crate::layout::{self, CardLayout, CellRect, LayoutParams};
use crate::resolve::{ImageDecoder, ImageResolver, RasterHandle, ResolvedImages};
use crate::state::{CardSnapshot, EditorState};
use crate::theme::{Color, Theme};

/// What was drawn in one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Free cell showing the center image.
    CenterImage,
    /// Free cell showing the fixed label.
    FreeLabel(String),
    /// Cell image, with wrapped text lines drawn over an overlay.
    Image { lines: Vec<String> },
    /// Plain fill and border, with wrapped text lines.
    Text { lines: Vec<String> },
    /// Plain fill and border, no text.
    Blank,
}

/// Description of a rendered card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub layout: CardLayout,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// One entry per cell, row-major.
    pub cells: Vec<CellContent>,
    /// Number of distinct image references that resolved.
    pub images_resolved: usize,
}

/// Result of a completed export.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub filename: String,
    pub bytes: usize,
    pub report: RenderReport,
}

/// Draws cards and exports them.
pub struct Compositor {
    config: CardConfig,
    resolver: ImageResolver,
}

impl Compositor {
    pub fn new(config: CardConfig, resolver: ImageResolver) -> Self {
        Self { config, resolver }
    }

    /// Build a compositor whose resolver uses the configured timeout.
    pub fn with_decoder(config: CardConfig, decoder: Arc<dyn ImageDecoder>) -> Self {
        let resolver = ImageResolver::new(decoder, config.resolver.timeout());
        Self::new(config, resolver)
    }

    /// Maximum width of one line of cell text.
    pub fn cell_text_width(&self) -> u32 {
        self.config
            .layout
            .cell_size
            .saturating_sub(self.config.render.text_margin)
    }

    /// Render a snapshot onto `surface`, resizing it to the card.
    pub async fn render(
        &self,
        snapshot: &CardSnapshot,
        surface: Option<&mut Surface>,
    ) -> Result<RenderReport, BingoError> {
        let surface = surface.ok_or(BingoError::MissingSurface)?;
        Ok(self.draw(snapshot, surface).await)
    }

    /// Render the current state, encode it and deliver it to `sink`.
    ///
    /// The state is snapshotted once up front.
    pub async fn export(
        &self,
        state: &EditorState,
        surface: Option<&mut Surface>,
        sink: &mut dyn DownloadSink,
        today: NaiveDate,
    ) -> Result<ExportSummary, BingoError> {
        let surface = surface.ok_or(BingoError::MissingSurface)?;
        let snapshot = state.snapshot();

        let report = self.draw(&snapshot, surface).await;
        let bytes = encode_jpeg(surface, self.config.export.jpeg_quality)?;
        let filename = download_filename(
            &snapshot.header.title,
            &self.config.export.default_title,
            today,
        );
        sink.deliver(&filename, &bytes)?;

        info!(
            filename = %filename,
            width = report.layout.width,
            height = report.layout.height,
            bytes = bytes.len(),
            "card exported"
        );
        Ok(ExportSummary {
            filename,
            bytes: bytes.len(),
            report,
        })
    }

    async fn draw(&self, snapshot: &CardSnapshot, surface: &mut Surface) -> RenderReport {
        let title = snapshot.header.title_line().map(str::to_string);
        let subtitle = snapshot.header.subtitle_line();

        let params = LayoutParams::from_config(
            &self.config.layout,
            GRID_SIZE,
            title.is_some(),
            subtitle.is_some(),
        );
        let layout = layout::compute(&params);

        let images = self.resolver.resolve_all(snapshot.image_refs()).await;
        debug!(
            requested = snapshot.image_refs().count(),
            resolved = images.len(),
            "images resolved for export"
        );

        let theme = &snapshot.theme;
        surface.reset(layout.width, layout.height);
        surface.fill(theme.background);
        self.draw_dots(surface, theme.text);

        if let (Some(text), Some(anchor)) = (&title, layout.title) {
            draw_text_centered(surface, text, anchor.x as i64, anchor.y as i64, TextStyle::TITLE, theme.text);
        }
        if let (Some(text), Some(anchor)) = (&subtitle, layout.subtitle) {
            draw_text_centered(surface, text, anchor.x as i64, anchor.y as i64, TextStyle::SUBTITLE, theme.text);
        }

        let center_image = snapshot.center_image.as_deref().and_then(|r| images.get(r));
        let cells = snapshot
            .grid
            .cells()
            .iter()
            .zip(&layout.cells)
            .map(|(cell, rect)| {
                if cell.is_free() {
                    self.draw_free_cell(surface, rect, theme, center_image)
                } else {
                    self.draw_cell(surface, cell, rect, theme, &images)
                }
            })
            .collect();

        RenderReport {
            layout,
            title,
            subtitle,
            cells,
            images_resolved: images.len(),
        }
    }

    fn draw_dots(&self, surface: &mut Surface, color: Color) {
        let render = &self.config.render;
        if render.dot_spacing == 0 {
            return;
        }
        let spacing = render.dot_spacing as usize;
        for y in (spacing / 2..surface.height() as usize).step_by(spacing) {
            for x in (spacing / 2..surface.width() as usize).step_by(spacing) {
                surface.blend_circle(x as f32, y as f32, render.dot_radius, color, render.dot_alpha);
            }
        }
    }

    fn draw_free_cell(
        &self,
        surface: &mut Surface,
        rect: &CellRect,
        theme: &Theme,
        center_image: Option<&RasterHandle>,
    ) -> CellContent {
        self.draw_plain(surface, rect, theme.free_space, theme.grid);

        if let Some(handle) = center_image {
            let inset = (rect.size as f32 * self.config.render.center_inset).round() as u32;
            let size = rect.size.saturating_sub(2 * inset);
            if handle.draw_cover(surface, (rect.x + inset) as i64, (rect.y + inset) as i64, size) {
                return CellContent::CenterImage;
            }
        }

        let label = &self.config.render.free_label;
        let center = rect.center();
        draw_text_centered(surface, label, center.x as i64, center.y as i64, TextStyle::LABEL, theme.text);
        CellContent::FreeLabel(label.clone())
    }

    fn draw_cell(
        &self,
        surface: &mut Surface,
        cell: &Cell,
        rect: &CellRect,
        theme: &Theme,
        images: &ResolvedImages,
    ) -> CellContent {
        let image = cell.image.as_deref().and_then(|r| images.get(r));

        if let Some(handle) = image {
            handle.draw_cover(surface, rect.x as i64, rect.y as i64, rect.size);
            if cell.text.is_empty() {
                return CellContent::Image { lines: Vec::new() };
            }
            let render = &self.config.render;
            surface.blend_rect(rect.x as i64, rect.y as i64, rect.size, rect.size, Color::BLACK, render.overlay_alpha);
            let lines = self.draw_wrapped(surface, &cell.text, rect, Color::WHITE);
            return CellContent::Image { lines };
        }

        self.draw_plain(surface, rect, theme.cell, theme.grid);
        if cell.text.is_empty() {
            return CellContent::Blank;
        }
        let lines = self.draw_wrapped(surface, &cell.text, rect, theme.text);
        CellContent::Text { lines }
    }

    fn draw_plain(&self, surface: &mut Surface, rect: &CellRect, fill: Color, border: Color) {
        let (x, y) = (rect.x as i64, rect.y as i64);
        surface.fill_rect(x, y, rect.size, rect.size, fill);
        surface.stroke_rect(x, y, rect.size, rect.size, self.config.render.cell_border_line, border);
    }

    /// Wrap `text` to the cell and draw the lines as a block centered on the cell.
    fn draw_wrapped(&self, surface: &mut Surface, text: &str, rect: &CellRect, color: Color) -> Vec<String> {
        let style = TextStyle::CELL;
        let lines = wrap_text(text, self.cell_text_width(), |s| style.measure(s));

        let line_height = self.config.render.line_height as i64;
        let center = rect.center();
        let start_y = center.y as i64 - (lines.len() as i64 - 1) * line_height / 2;
        for (i, line) in lines.iter().enumerate() {
            draw_text_centered(surface, line, center.x as i64, start_y + i as i64 * line_height, style, color);
        }
        lines
    }
}
