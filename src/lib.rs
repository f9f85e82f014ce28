//! # Bingocard - Bingo Card Editor Core
//!
//! Bingocard models a 5×5 bingo card editor and flattens cards into
//! downloadable JPEG images. It provides:
//!
//! - **Grid model**: 25 cells with text and optional images, one free center cell
//! - **Layout**: deterministic pixel geometry for the header and every cell
//! - **Image resolution**: concurrent, timeout-bounded decoding of image references
//! - **Compositing**: themed background, header text, word-wrapped cells, cover-fit images
//! - **Sessions**: named snapshots of the whole editor in a persistent store
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use bingocard::{
//!     config::CardConfig,
//!     export::DirectorySink,
//!     render::{Compositor, Surface},
//!     resolve::SourceDecoder,
//!     state::EditorState,
//! };
//!
//! # async fn example() -> Result<(), bingocard::BingoError> {
//! let mut state = EditorState::new();
//! state.header.title = "Office Bingo".to_string();
//! state.grid.set_text(0, "Someone says 'synergy'")?;
//!
//! let compositor = Compositor::with_decoder(CardConfig::default(), Arc::new(SourceDecoder::new()?));
//! let mut surface = Surface::default();
//! let mut sink = DirectorySink::new("out");
//! let today = chrono::Local::now().date_naive();
//!
//! let summary = compositor.export(&state, Some(&mut surface), &mut sink, today).await?;
//! println!("saved {}", summary.filename);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`grid`] | Cells, header fields, gallery images |
//! | [`theme`] | Five-color palette |
//! | [`state`] | Editor state and export snapshots |
//! | [`layout`] | Pixel geometry |
//! | [`resolve`] | Image decoding with timeouts |
//! | [`render`] | Drawing and compositing |
//! | [`export`] | JPEG encoding and downloads |
//! | [`session`] | Session persistence |
//! | [`config`] | Tunable constants |
//! | [`error`] | Error types |

pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod layout;
pub mod render;
pub mod resolve;
pub mod session;
pub mod state;
pub mod theme;

// Re-exports for convenience
pub use config::CardConfig;
pub use error::BingoError;
pub use state::EditorState;
