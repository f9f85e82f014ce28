//! # Grid Model
//!
//! A fixed 5×5 grid of cells addressed by a stable integer index in
//! row-major order. The cell at `center_index(GRID_SIZE)` is the free
//! space: it is read-only and never carries its own text or image (the
//! card-level center image is drawn there instead).
//!
//! ## Example
//!
//! ```
//! use bingocard::grid::{Grid, CENTER_INDEX};
//!
//! let mut grid = Grid::new();
//! grid.set_text(0, "Someone is late")?;
//! grid.set_text(CENTER_INDEX, "ignored")?;
//!
//! assert_eq!(grid.cell(0).unwrap().text, "Someone is late");
//! assert!(grid.cell(CENTER_INDEX).unwrap().is_free());
//! assert_eq!(grid.cell(CENTER_INDEX).unwrap().text, "");
//! # Ok::<(), bingocard::BingoError>(())
//! ```

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::BingoError;

/// Number of rows and columns.
pub const GRID_SIZE: usize = 5;

/// Number of cells in the grid.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Index of the free center cell.
pub const CENTER_INDEX: usize = center_index(GRID_SIZE);

/// Maximum number of characters kept per cell.
pub const MAX_CELL_TEXT: usize = 100;

/// Index of the free cell for an `n`×`n` grid: `floor(n² / 2)`.
pub const fn center_index(n: usize) -> usize {
    n * n / 2
}

/// One square of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub index: usize,
    pub text: String,
    /// Image reference assigned to this cell (a data URI or URL).
    pub image: Option<String>,
}

impl Cell {
    fn new(index: usize) -> Self {
        Self {
            index,
            text: String::new(),
            image: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.index == CENTER_INDEX
    }

    /// Row and column of this cell.
    pub fn position(&self) -> (usize, usize) {
        (self.index / GRID_SIZE, self.index % GRID_SIZE)
    }

    pub(crate) fn assign_text(&mut self, text: &str) {
        if !self.is_free() {
            self.text = text.chars().take(MAX_CELL_TEXT).collect();
        }
    }

    pub(crate) fn assign_image(&mut self, image: Option<String>) {
        if !self.is_free() {
            self.image = image;
        }
    }
}

/// The ordered set of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: (0..CELL_COUNT).map(Cell::new).collect(),
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    fn cell_mut(&mut self, index: usize) -> Result<&mut Cell, BingoError> {
        self.cells
            .get_mut(index)
            .ok_or(BingoError::InvalidCell(index))
    }

    /// Set a cell's text, truncated to [`MAX_CELL_TEXT`] characters.
    /// Writes to the free cell are ignored.
    pub fn set_text(&mut self, index: usize, text: &str) -> Result<(), BingoError> {
        self.cell_mut(index)?.assign_text(text);
        Ok(())
    }

    /// Assign or remove a cell image. The free cell takes the card's
    /// center image instead, so assignments to it are ignored.
    pub fn set_image(&mut self, index: usize, image: Option<String>) -> Result<(), BingoError> {
        self.cell_mut(index)?.assign_image(image);
        Ok(())
    }

    /// Empty every cell.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.text.clear();
            cell.image = None;
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

/// Title and subtitle fields shown above the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardHeader {
    pub title: String,
    pub pseudo: String,
    pub date: String,
}

impl CardHeader {
    /// Title text, if the title band should be drawn.
    pub fn title_line(&self) -> Option<&str> {
        (!self.title.is_empty()).then_some(self.title.as_str())
    }

    /// The `pseudo - date` line, or whichever half is present.
    pub fn subtitle_line(&self) -> Option<String> {
        match (self.pseudo.is_empty(), self.date.is_empty()) {
            (false, false) => Some(format!("{} - {}", self.pseudo, self.date)),
            (false, true) => Some(self.pseudo.clone()),
            (true, false) => Some(self.date.clone()),
            (true, true) => None,
        }
    }

    /// Store a date typed by the user, normalized with [`format_date_input`].
    pub fn set_date_input(&mut self, raw: &str) {
        self.date = format_date_input(raw);
    }
}

/// Format free-form date input as `DD/MM/YYYY` while it is being typed.
///
/// Non-digits are dropped, at most 8 digits are kept, and slashes are
/// inserted once the day and month are complete.
///
/// ```
/// use bingocard::grid::format_date_input;
///
/// assert_eq!(format_date_input("25122024"), "25/12/2024");
/// assert_eq!(format_date_input("25-12"), "25/12/");
/// assert_eq!(format_date_input("2"), "2");
/// ```
pub fn format_date_input(raw: &str) -> String {
    let mut value: String = raw.chars().filter(|c| c.is_ascii_digit()).take(8).collect();
    if value.len() >= 2 {
        value.insert(2, '/');
    }
    if value.len() >= 5 {
        value.insert(5, '/');
    }
    value
}

/// An image uploaded into the editor's gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Display label, usually the original file name.
    pub name: String,
    /// Encoded image reference (data URI).
    pub data: String,
}

impl UploadedImage {
    /// Wrap raw file bytes as a base64 data URI.
    pub fn from_bytes(name: &str, mime: &str, bytes: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            name: name.to_string(),
            data: format!("data:{};base64,{}", mime, encoded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_index_is_unique_middle() {
        for n in 1..=9 {
            let center = center_index(n);
            assert_eq!(center, (n * n) / 2);
            assert!(center < n * n);
        }
        assert_eq!(CENTER_INDEX, 12);

        let grid = Grid::new();
        let free: Vec<_> = grid.cells().iter().filter(|c| c.is_free()).collect();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].position(), (2, 2));
    }

    #[test]
    fn test_indices_are_stable() {
        let grid = Grid::new();
        assert_eq!(grid.cells().len(), CELL_COUNT);
        for (i, cell) in grid.cells().iter().enumerate() {
            assert_eq!(cell.index, i);
        }
    }

    #[test]
    fn test_text_is_truncated() {
        let mut grid = Grid::new();
        grid.set_text(1, &"é".repeat(150)).unwrap();
        assert_eq!(grid.cell(1).unwrap().text.chars().count(), MAX_CELL_TEXT);
    }

    #[test]
    fn test_free_cell_is_read_only() {
        let mut grid = Grid::new();
        grid.set_text(CENTER_INDEX, "hello").unwrap();
        grid.set_image(CENTER_INDEX, Some("data:x".into())).unwrap();
        let free = grid.cell(CENTER_INDEX).unwrap();
        assert!(free.text.is_empty());
        assert!(free.image.is_none());
    }

    #[test]
    fn test_out_of_range_index() {
        let mut grid = Grid::new();
        assert!(matches!(
            grid.set_text(CELL_COUNT, "x"),
            Err(BingoError::InvalidCell(25))
        ));
    }

    #[test]
    fn test_clear() {
        let mut grid = Grid::new();
        grid.set_text(3, "text").unwrap();
        grid.set_image(4, Some("data:image/png;base64,AA==".into())).unwrap();
        grid.clear();
        assert_eq!(grid, Grid::new());
    }

    #[test]
    fn test_subtitle_line() {
        let mut header = CardHeader::default();
        assert_eq!(header.subtitle_line(), None);
        header.pseudo = "Alice".into();
        assert_eq!(header.subtitle_line().as_deref(), Some("Alice"));
        header.date = "25/12/2024".into();
        assert_eq!(header.subtitle_line().as_deref(), Some("Alice - 25/12/2024"));
        header.pseudo.clear();
        assert_eq!(header.subtitle_line().as_deref(), Some("25/12/2024"));
    }

    #[test]
    fn test_format_date_input() {
        assert_eq!(format_date_input(""), "");
        assert_eq!(format_date_input("25"), "25/");
        assert_eq!(format_date_input("251"), "25/1");
        assert_eq!(format_date_input("2512"), "25/12/");
        assert_eq!(format_date_input("25/12/2024"), "25/12/2024");
        assert_eq!(format_date_input("2512202499"), "25/12/2024");
        assert_eq!(format_date_input("ab"), "");
    }

    #[test]
    fn test_uploaded_image_data_uri() {
        let img = UploadedImage::from_bytes("dot.png", "image/png", &[1, 2, 3]);
        assert_eq!(img.name, "dot.png");
        assert_eq!(img.data, "data:image/png;base64,AQID");
    }
}
