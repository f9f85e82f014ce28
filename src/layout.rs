//! # Layout Engine
//!
//! Pure pixel geometry for a card: canvas size, header text anchors and the
//! square of every cell. No drawing happens here; identical inputs always
//! produce identical geometry.
//!
//! ```text
//! ┌──────────────── width ────────────────┐
//! │ padding                               │
//! │          title band (optional)        │
//! │        subtitle band (optional)       │
//! │ ┌─border─┬──cell──┬─border─┬── ...    │
//! │ │        │        │        │          │
//! │ padding                               │
//! └───────────────────────────────────────┘
//! ```

use crate::config::LayoutConfig;

/// Inputs to [`compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    /// Rows and columns in the grid.
    pub grid_size: usize,
    pub cell_size: u32,
    pub border_width: u32,
    pub padding: u32,
    pub has_title: bool,
    pub has_subtitle: bool,
    pub title_height: u32,
    pub subtitle_height: u32,
}

impl LayoutParams {
    /// Build params from configured constants and header presence.
    pub fn from_config(
        config: &LayoutConfig,
        grid_size: usize,
        has_title: bool,
        has_subtitle: bool,
    ) -> Self {
        Self {
            grid_size,
            cell_size: config.cell_size,
            border_width: config.border_width,
            padding: config.padding,
            has_title,
            has_subtitle,
            title_height: config.title_height,
            subtitle_height: config.subtitle_height,
        }
    }

    /// Total height of the header bands that are present.
    pub fn header_height(&self) -> u32 {
        let title = if self.has_title { self.title_height } else { 0 };
        let subtitle = if self.has_subtitle {
            self.subtitle_height
        } else {
            0
        };
        title + subtitle
    }
}

/// Point where centered text is anchored (horizontal and vertical middle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: u32,
    pub y: u32,
}

/// Square region of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

impl CellRect {
    pub fn center(&self) -> Anchor {
        Anchor {
            x: self.x + self.size / 2,
            y: self.y + self.size / 2,
        }
    }
}

/// Geometry of a whole card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLayout {
    pub width: u32,
    pub height: u32,
    pub title: Option<Anchor>,
    pub subtitle: Option<Anchor>,
    /// Cells in row-major order.
    pub cells: Vec<CellRect>,
}

impl CardLayout {
    pub fn cell(&self, index: usize) -> Option<&CellRect> {
        self.cells.get(index)
    }
}

/// Compute the geometry of a card.
pub fn compute(params: &LayoutParams) -> CardLayout {
    let n = params.grid_size as u32;
    let step = params.cell_size + params.border_width;
    let grid_extent = n * params.cell_size + (n + 1) * params.border_width;
    let header = params.header_height();

    let width = 2 * params.padding + grid_extent;
    let height = 2 * params.padding + header + grid_extent;
    let center_x = width / 2;

    let title = params.has_title.then(|| Anchor {
        x: center_x,
        y: params.padding + params.title_height / 2,
    });
    let subtitle = params.has_subtitle.then(|| {
        let band_top = params.padding + if params.has_title { params.title_height } else { 0 };
        Anchor {
            x: center_x,
            y: band_top + params.subtitle_height / 2,
        }
    });

    let grid_top = params.padding + header;
    let cells = (0..params.grid_size * params.grid_size)
        .map(|index| {
            let row = index / params.grid_size;
            let col = index % params.grid_size;
            CellRect {
                index,
                row,
                col,
                x: params.padding + col as u32 * step + params.border_width,
                y: grid_top + row as u32 * step + params.border_width,
                size: params.cell_size,
            }
        })
        .collect();

    CardLayout {
        width,
        height,
        title,
        subtitle,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(has_title: bool, has_subtitle: bool) -> LayoutParams {
        LayoutParams::from_config(&LayoutConfig::default(), 5, has_title, has_subtitle)
    }

    #[test]
    fn test_deterministic() {
        let p = params(true, true);
        assert_eq!(compute(&p), compute(&p));
    }

    #[test]
    fn test_canvas_size_without_header() {
        let layout = compute(&params(false, false));
        // 5 * 140 + 6 * 5 + 2 * 20
        assert_eq!(layout.width, 770);
        assert_eq!(layout.height, 770);
        assert!(layout.title.is_none());
        assert!(layout.subtitle.is_none());
    }

    #[test]
    fn test_canvas_size_with_header() {
        let layout = compute(&params(true, true));
        assert_eq!(layout.width, 770);
        assert_eq!(layout.height, 870);
        assert_eq!(layout.title, Some(Anchor { x: 385, y: 50 }));
        assert_eq!(layout.subtitle, Some(Anchor { x: 385, y: 100 }));
    }

    #[test]
    fn test_subtitle_only_takes_title_slot() {
        let layout = compute(&params(false, true));
        assert_eq!(layout.height, 810);
        assert_eq!(layout.subtitle, Some(Anchor { x: 385, y: 40 }));
    }

    #[test]
    fn test_cell_origin_formula() {
        let p = params(true, false);
        let layout = compute(&p);
        let cell = layout.cell(7).unwrap();
        assert_eq!((cell.row, cell.col), (1, 2));
        assert_eq!(cell.x, 20 + 2 * 145 + 5);
        assert_eq!(cell.y, 20 + 60 + 145 + 5);
        assert_eq!(cell.center(), Anchor { x: cell.x + 70, y: cell.y + 70 });
    }

    #[test]
    fn test_cells_do_not_overlap() {
        let p = params(true, true);
        let layout = compute(&p);
        for cell in &layout.cells {
            if cell.col + 1 < p.grid_size {
                let right = layout.cell(cell.index + 1).unwrap();
                assert!(right.x >= cell.x + p.cell_size + p.border_width);
                assert_eq!(right.y, cell.y);
            }
            if cell.row + 1 < p.grid_size {
                let below = layout.cell(cell.index + p.grid_size).unwrap();
                assert!(below.y >= cell.y + p.cell_size + p.border_width);
                assert_eq!(below.x, cell.x);
            }
            assert!(cell.x + cell.size <= layout.width);
            assert!(cell.y + cell.size <= layout.height);
        }
    }
}
