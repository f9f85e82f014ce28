//! # Card Rendering
//!
//! Drawing primitives and the compositor that turns a card snapshot into
//! pixels.
//!
//! ## Submodules
//!
//! - [`surface`] - RGBA pixel buffer with fill, stroke, blend and blit
//! - [`font`] - Spleen bitmap text measurement and drawing
//! - [`wrap`] - Greedy word wrap for cell text
//! - [`crop`] - Cover-fit cropping into squares
//! - [`compositor`] - Resolves images and draws a whole card

pub mod compositor;
pub mod crop;
pub mod font;
pub mod surface;
pub mod wrap;

pub use compositor::{CellContent, Compositor, ExportSummary, RenderReport};
pub use surface::Surface;
