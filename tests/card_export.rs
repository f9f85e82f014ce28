//! # Card Export Tests
//!
//! End-to-end runs through the public API: images are uploaded as real PNG
//! bytes, decoded by `SourceDecoder`, composited and written to disk.

use bingocard::export::DirectorySink;
use bingocard::grid::{CENTER_INDEX, UploadedImage};
use bingocard::render::{CellContent, Compositor, Surface};
use bingocard::resolve::SourceDecoder;
use bingocard::session::SessionSerializer;
use bingocard::{BingoError, CardConfig, EditorState};
use chrono::NaiveDate;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn compositor() -> Compositor {
    Compositor::with_decoder(CardConfig::default(), Arc::new(SourceDecoder::new().unwrap()))
}

fn export_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()
}

/// A card with a header, a logo in the free cell and a photo behind text.
fn office_card() -> EditorState {
    let mut state = EditorState::new();
    state.header.title = "Office Bingo".into();
    state.header.pseudo = "Alice".into();
    state.header.set_date_input("25/12/2024");

    let logo = state.upload(UploadedImage::from_bytes("logo.png", "image/png", &png_bytes(64, 32, [200, 30, 30])));
    let photo = state.upload(UploadedImage::from_bytes("photo.png", "image/png", &png_bytes(20, 40, [30, 200, 30])));

    state.center_image = Some(state.gallery[logo].data.clone());
    state.grid.set_image(6, Some(state.gallery[photo].data.clone())).unwrap();
    state.grid.set_text(6, "Printer jams").unwrap();
    state.grid.set_text(0, "Someone says synergy in a meeting").unwrap();
    state
}

// ============================================================================
// TESTS
// ============================================================================

#[tokio::test]
async fn test_export_writes_jpeg_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let state = office_card();
    let mut surface = Surface::default();
    let mut sink = DirectorySink::new(dir.path());

    let summary = compositor()
        .export(&state, Some(&mut surface), &mut sink, export_date())
        .await
        .unwrap();

    assert_eq!(summary.filename, "office_bingo_2024-12-25.jpg");
    assert_eq!(summary.report.images_resolved, 2);
    assert_eq!(summary.report.cells[CENTER_INDEX], CellContent::CenterImage);
    assert_eq!(
        summary.report.cells[6],
        CellContent::Image {
            lines: vec!["Printer jams".into()]
        }
    );
    assert!(matches!(&summary.report.cells[0], CellContent::Text { lines } if lines.len() > 1));

    let written = std::fs::read(dir.path().join(&summary.filename)).unwrap();
    assert_eq!(written.len(), summary.bytes);
    let decoded = image::load_from_memory(&written).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (770, 870));
}

#[tokio::test]
async fn test_untitled_card_uses_default_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = EditorState::new();
    state.grid.set_text(24, "last").unwrap();
    let mut surface = Surface::default();
    let mut sink = DirectorySink::new(dir.path());

    let summary = compositor()
        .export(&state, Some(&mut surface), &mut sink, export_date())
        .await
        .unwrap();

    assert_eq!(summary.filename, "ultimate_bingo_2024-12-25.jpg");
    assert!(dir.path().join("ultimate_bingo_2024-12-25.jpg").exists());
}

#[tokio::test]
async fn test_undecodable_upload_renders_plain_cell() {
    let mut state = EditorState::new();
    state.upload(UploadedImage::from_bytes("notes.txt", "text/plain", b"not an image"));
    let data = state.gallery[0].data.clone();
    state.grid.set_image(2, Some(data)).unwrap();
    state.grid.set_text(2, "still here").unwrap();
    let mut surface = Surface::default();

    let report = compositor().render(&state.snapshot(), Some(&mut surface)).await.unwrap();

    assert_eq!(
        report.cells[2],
        CellContent::Text {
            lines: vec!["still here".into()]
        }
    );
    assert_eq!(report.images_resolved, 0);
}

#[tokio::test]
async fn test_restored_session_exports_like_original() {
    let dir = tempfile::tempdir().unwrap();
    let sessions = SessionSerializer::in_dir(dir.path().join("store"));
    let original = office_card();
    sessions.save("office", &original).unwrap();

    let mut restored = EditorState::new();
    sessions.load("office").unwrap().apply_to(&mut restored);

    let compositor = compositor();
    let mut a = Surface::default();
    let mut b = Surface::default();
    let first = compositor.render(&original.snapshot(), Some(&mut a)).await.unwrap();
    let second = compositor.render(&restored.snapshot(), Some(&mut b)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(a.image().as_raw(), b.image().as_raw());
}

#[tokio::test]
async fn test_missing_surface_is_reported() {
    let mut sink = bingocard::export::MemorySink::default();
    let err = compositor()
        .export(&office_card(), None, &mut sink, export_date())
        .await
        .unwrap_err();
    assert!(matches!(err, BingoError::MissingSurface));
}
