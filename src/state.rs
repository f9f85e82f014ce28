//! Editor state: everything the form inputs hold, in one struct.
//!
//! Exports read a [`CardSnapshot`] taken once at the start, so edits made
//! while images are still resolving only show up in the next export.

use crate::grid::{CardHeader, Grid, UploadedImage};
use crate::theme::Theme;

/// Full in-memory state of the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub grid: Grid,
    pub header: CardHeader,
    pub theme: Theme,
    /// Uploaded images in upload order.
    pub gallery: Vec<UploadedImage>,
    /// Image drawn in the free cell.
    pub center_image: Option<String>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty every cell and the pseudo/date fields.
    ///
    /// Title, theme, gallery and center image are kept.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.header.pseudo.clear();
        self.header.date.clear();
    }

    /// Add an image to the gallery and return its position.
    pub fn upload(&mut self, image: UploadedImage) -> usize {
        self.gallery.push(image);
        self.gallery.len() - 1
    }

    /// Copy of the inputs an export reads.
    pub fn snapshot(&self) -> CardSnapshot {
        CardSnapshot {
            grid: self.grid.clone(),
            header: self.header.clone(),
            theme: self.theme,
            center_image: self.center_image.clone(),
        }
    }
}

/// Read-only inputs for one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSnapshot {
    pub grid: Grid,
    pub header: CardHeader,
    pub theme: Theme,
    pub center_image: Option<String>,
}

impl CardSnapshot {
    /// Every image reference the card draws: cell images in row-major
    /// order, then the center image.
    pub fn image_refs(&self) -> impl Iterator<Item = &str> {
        self.grid
            .cells()
            .iter()
            .filter_map(|cell| cell.image.as_deref())
            .chain(self.center_image.as_deref())
    }
}
