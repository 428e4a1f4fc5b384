use std::path::Path;

use eframe_snapmark::annotation::factory;
use eframe_snapmark::export::{self, ExportError};
use eframe_snapmark::{Command, EditorError, EditorState, ExportFormat, SourceImage, Surface};
use egui::{Color32, Rect, pos2, vec2};
use image::{Rgba, RgbaImage};

const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn create_test_state(width: u32, height: u32) -> EditorState {
    let mut state = EditorState::default();
    let source = SourceImage::from_rgba(RgbaImage::from_pixel(width, height, BLUE)).unwrap();
    state.load_image(source, vec2(1200.0, 800.0));
    state
}

fn add_rect(state: &mut EditorState, rect: Rect, stroke_width: f32) {
    let annotation = factory::create_rectangle(rect, Color32::RED, stroke_width);
    state.execute(Command::AddAnnotation(annotation)).unwrap();
}

#[test]
fn test_output_tracks_source_resolution() {
    let state = create_test_state(2000, 1200);
    let multiplier = state.export_multiplier().unwrap();
    assert!((multiplier - 0.8333).abs() < 1e-3);

    let image = state.flatten_for_export().unwrap();
    assert_eq!(image.image().dimensions(), (1000, 600));
}

#[test]
fn test_expanded_margins_are_exported() {
    let mut state = create_test_state(2000, 1200);
    add_rect(&mut state, Rect::from_min_max(pos2(1100.0, 100.0), pos2(1300.0, 150.0)), 2.0);
    assert_eq!(state.surface().width(), 1321);

    // Output width stays at half the source width, margins included
    let multiplier = state.export_multiplier().unwrap();
    let image = state.flatten_for_export().unwrap();
    assert_eq!(image.image().width(), 1000);
    assert_eq!(image.image().height(), (720.0 * multiplier).round() as u32);
    assert_eq!(image.image().height(), 545);
}

#[test]
fn test_image_and_annotations_are_composited() {
    let mut state = create_test_state(400, 300);
    add_rect(&mut state, Rect::from_min_max(pos2(100.0, 100.0), pos2(300.0, 200.0)), 10.0);

    let flattened = state.flatten_for_export().unwrap();
    let image = flattened.image();
    assert_eq!(image.dimensions(), (200, 150));
    // Middle of the left stroke
    assert_eq!(*image.get_pixel(50, 75), Rgba([255, 0, 0, 255]));
    // Rectangles are not filled
    assert_eq!(*image.get_pixel(100, 75), BLUE);
    assert_eq!(*image.get_pixel(10, 10), BLUE);
}

#[test]
fn test_margin_uses_surface_background() {
    let mut state = create_test_state(400, 300);
    add_rect(&mut state, Rect::from_min_max(pos2(-50.0, 100.0), pos2(0.0, 150.0)), 2.0);
    assert!(state.surface().background().unwrap().offset().x > 0.0);

    let flattened = state.flatten_for_export().unwrap();
    assert_eq!(*flattened.image().get_pixel(1, 1), Rgba([255, 255, 255, 255]));
}

#[test]
fn test_mosaic_is_part_of_export() {
    let mut state = create_test_state(400, 300);
    let patch = RgbaImage::from_pixel(40, 40, Rgba([0, 200, 0, 255]));
    let annotation = factory::create_mosaic(pos2(100.0, 100.0), patch);
    state.execute(Command::AddAnnotation(annotation)).unwrap();

    let flattened = state.flatten_for_export().unwrap();
    assert_eq!(*flattened.image().get_pixel(60, 60), Rgba([0, 200, 0, 255]));
}

#[test]
fn test_png_and_jpeg_decode_back() {
    let state = create_test_state(2000, 1200);

    let png = state.export(ExportFormat::Png).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1000, 600));

    let jpeg = state.export(ExportFormat::Jpeg).unwrap();
    assert_eq!(&jpeg[..2], &[0xff, 0xd8]);
    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1000, 600));
}

#[test]
fn test_encoding_follows_file_extension() {
    let state = create_test_state(400, 300);
    let flattened = state.flatten_for_export().unwrap();

    let jpeg = flattened.encode_for_path(Path::new("/tmp/shot.JPEG")).unwrap();
    assert_eq!(&jpeg[..2], &[0xff, 0xd8]);
    let png = flattened.encode_for_path(Path::new("/tmp/shot.png")).unwrap();
    assert_eq!(&png[1..4], b"PNG");
    assert_eq!(ExportFormat::from_path(Path::new("shot")), ExportFormat::Png);
}

#[test]
fn test_nothing_to_export_without_image() {
    let state = EditorState::default();
    assert!(state.export_multiplier().is_none());
    assert!(matches!(state.export(ExportFormat::Png), Err(EditorError::NoImage)));
    assert!(matches!(
        export::flatten(&Surface::default(), 1.0),
        Err(ExportError::NothingToExport)
    ));
}
