use std::sync::OnceLock;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use egui::{FontDefinitions, FontFamily, Vec2, vec2};
use log::warn;

/// Line advance as a multiple of the font size
pub const LINE_HEIGHT: f32 = 1.16;

// Average glyph advance used when no font could be loaded
const FALLBACK_ADVANCE: f32 = 0.6;

static DEFAULT_FONT: OnceLock<Option<FontArc>> = OnceLock::new();

pub fn default_font() -> Option<&'static FontArc> {
    DEFAULT_FONT.get_or_init(load_default_font).as_ref()
}

fn load_default_font() -> Option<FontArc> {
    let definitions = FontDefinitions::default();
    let name = definitions.families.get(&FontFamily::Proportional)?.first()?;
    let data = definitions.font_data.get(name)?;
    match FontArc::try_from_vec(data.font.to_vec()) {
        Ok(font) => Some(font),
        Err(err) => {
            warn!("Failed to parse font {name}: {err}");
            None
        }
    }
}

/// Width of a single line of text in pixels
pub fn line_width(line: &str, font_size: f32) -> f32 {
    let Some(font) = default_font() else {
        return line.chars().count() as f32 * font_size * FALLBACK_ADVANCE;
    };

    let scaled = font.as_scaled(PxScale::from(font_size));
    let mut width = 0.0;
    let mut previous = None;
    for c in line.chars() {
        let glyph = scaled.glyph_id(c);
        if let Some(previous) = previous {
            width += scaled.kern(previous, glyph);
        }
        width += scaled.h_advance(glyph);
        previous = Some(glyph);
    }
    width
}

/// Bounding size of possibly multi-line text
pub fn measure_text(content: &str, font_size: f32) -> Vec2 {
    let mut lines = 0usize;
    let mut widest = 0.0_f32;
    for line in content.split('\n') {
        lines += 1;
        widest = widest.max(line_width(line, font_size));
    }
    vec2(widest.max(1.0), lines as f32 * font_size * LINE_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longer_text_is_wider() {
        assert!(line_width("Hello world", 24.0) > line_width("Hello", 24.0));
    }

    #[test]
    fn each_line_adds_height() {
        let one = measure_text("a", 20.0);
        let three = measure_text("a\nb\nc", 20.0);
        assert!((three.y - one.y * 3.0).abs() < 1e-3);
    }

    #[test]
    fn empty_text_keeps_a_line_box() {
        let size = measure_text("", 24.0);
        assert!(size.x >= 1.0);
        assert!((size.y - 24.0 * LINE_HEIGHT).abs() < 1e-3);
    }
}
