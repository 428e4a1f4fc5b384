use eframe_snapmark::annotation::Annotation;
use eframe_snapmark::mosaic::{DEFAULT_BLOCK_SIZE, pixelate};
use eframe_snapmark::{EditorConfig, EditorState, SourceImage, ToolKind};
use egui::{Pos2, pos2, vec2};
use image::{Rgba, RgbaImage};

/// Red follows x, green follows y, so neighbouring blocks average differently
fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 40, 255]))
}

fn create_test_state(config: EditorConfig) -> EditorState {
    let mut state = EditorState::new(config);
    let source = SourceImage::from_rgba(gradient(2000, 1200)).unwrap();
    state.load_image(source, vec2(1200.0, 800.0));
    state
}

fn apply_mosaic(state: &mut EditorState, from: Pos2, to: Pos2) {
    state.select_tool(ToolKind::Mosaic);
    state.pointer_down(from);
    state.pointer_move(to);
    state.pointer_up(to);
}

fn only_patch(state: &EditorState) -> &eframe_snapmark::annotation::MosaicPatch {
    match state.surface().annotations() {
        [Annotation::Mosaic(patch)] => patch,
        other => panic!("expected one mosaic, got {other:?}"),
    }
}

#[test]
fn test_uniform_region_is_unchanged() {
    let mut buffer = RgbaImage::from_pixel(45, 30, Rgba([120, 60, 200, 255]));
    let before = buffer.clone();
    pixelate(&mut buffer, DEFAULT_BLOCK_SIZE, || true).unwrap();
    assert_eq!(buffer, before);
}

#[test]
fn test_patch_has_display_size_and_position() {
    let mut state = create_test_state(EditorConfig::default());
    apply_mosaic(&mut state, pos2(30.0, 30.0), pos2(90.0, 90.0));

    let patch = only_patch(&state);
    assert_eq!(patch.position(), pos2(30.0, 30.0));
    assert_eq!(patch.pixels().dimensions(), (60, 60));
}

#[test]
fn test_blocks_follow_source_resolution() {
    let mut state = create_test_state(EditorConfig::default());
    // Surface 0..60 covers source 0..100 at scale 0.6
    apply_mosaic(&mut state, pos2(0.0, 0.0), pos2(60.0, 60.0));

    let pixels = only_patch(&state).pixels();
    // A 15px source block spans 9 display pixels
    let first = *pixels.get_pixel(0, 0);
    assert_eq!(*pixels.get_pixel(7, 7), first);
    assert_ne!(*pixels.get_pixel(10, 0), first);
    assert_ne!(*pixels.get_pixel(0, 10), first);
    assert_eq!(first[3], 255);
    // Block 0 averages source x 0..15
    assert_eq!(first[0], 7);
}

#[test]
fn test_region_hanging_off_image_is_clipped() {
    let mut state = create_test_state(EditorConfig::default());
    apply_mosaic(&mut state, pos2(-20.0, -20.0), pos2(40.0, 40.0));

    let patch = only_patch(&state);
    assert_eq!(patch.position(), Pos2::ZERO);
    assert_eq!(patch.pixels().dimensions(), (40, 40));
}

#[test]
fn test_sliver_over_image_edge_adds_nothing() {
    let mut state = create_test_state(EditorConfig::default());
    // Surface is 1200 wide, only 5px of the drag cover the image
    apply_mosaic(&mut state, pos2(1195.0, 10.0), pos2(1245.0, 60.0));
    assert!(state.surface().annotations().is_empty());
}

#[test]
fn test_region_outside_image_adds_nothing() {
    let mut state = create_test_state(EditorConfig::default());
    apply_mosaic(&mut state, pos2(-100.0, -100.0), pos2(-50.0, -50.0));
    assert!(state.surface().annotations().is_empty());
}

#[test]
fn test_exhausted_time_budget_adds_nothing() {
    let config = EditorConfig {
        mosaic_time_budget_ms: 0,
        ..EditorConfig::default()
    };
    let mut state = create_test_state(config);
    apply_mosaic(&mut state, pos2(0.0, 0.0), pos2(300.0, 300.0));
    assert!(state.surface().annotations().is_empty());
}

#[test]
fn test_patch_moves_with_surface_expansion() {
    let mut state = create_test_state(EditorConfig::default());
    apply_mosaic(&mut state, pos2(100.0, 100.0), pos2(160.0, 160.0));
    let before = only_patch(&state).pixels().clone();
    let id = state.selection().unwrap();

    state.pointer_down(pos2(130.0, 130.0));
    state.pointer_move(pos2(10.0, 130.0));
    state.pointer_up(pos2(10.0, 130.0));

    let moved = state.surface().annotation(id).unwrap();
    let Annotation::Mosaic(patch) = moved else {
        panic!("mosaic expected");
    };
    // Left edge was at -20, padded and shifted back to 20
    assert_eq!(patch.position(), pos2(20.0, 100.0));
    assert_eq!(patch.pixels(), &before);
}
