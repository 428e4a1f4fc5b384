use egui::Color32;
use serde::{Deserialize, Serialize};

/// Tunables for the editor core.
///
/// Persisted through eframe storage, so every field needs a default for
/// state written by older versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Margin added on each side where an annotation leaves the image
    pub expansion_padding: f32,
    /// Size differences at or below this are treated as equal
    pub expansion_tolerance: f32,
    /// Shortest arrow / smallest rectangle or mosaic side that commits
    pub min_gesture_size: f32,
    /// Mosaic block edge in source pixels
    pub mosaic_block_size: u32,
    /// Time the mosaic resampler may spend before giving up
    pub mosaic_time_budget_ms: u64,
    /// Output resolution relative to the source image
    pub export_fraction: f32,
    pub jpeg_quality: u8,
    pub default_color: [u8; 4],
    pub default_stroke_width: f32,
    pub text_font_size: f32,
    pub text_placeholder: String,
    /// Fill for surface area not covered by the image
    pub surface_background: [u8; 4],
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            expansion_padding: 20.0,
            expansion_tolerance: 1.0,
            min_gesture_size: 10.0,
            mosaic_block_size: 15,
            mosaic_time_budget_ms: 2_000,
            export_fraction: 0.5,
            jpeg_quality: 90,
            default_color: [0xff, 0x00, 0x00, 0xff],
            default_stroke_width: 3.0,
            text_font_size: 24.0,
            text_placeholder: "Text".to_owned(),
            surface_background: [0xff, 0xff, 0xff, 0xff],
        }
    }
}

impl EditorConfig {
    pub fn default_color32(&self) -> Color32 {
        color_from_array(self.default_color)
    }

    pub fn surface_background32(&self) -> Color32 {
        color_from_array(self.surface_background)
    }
}

pub fn color_from_array([r, g, b, a]: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

pub fn color_to_array(color: Color32) -> [u8; 4] {
    color.to_srgba_unmultiplied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor_constants() {
        let config = EditorConfig::default();
        assert_eq!(config.expansion_padding, 20.0);
        assert_eq!(config.min_gesture_size, 10.0);
        assert_eq!(config.mosaic_block_size, 15);
        assert_eq!(config.export_fraction, 0.5);
        assert_eq!(config.default_color32(), Color32::RED);
    }

    #[test]
    fn opaque_color_survives_array_conversion() {
        let color = Color32::from_rgb(12, 200, 99);
        assert_eq!(color_from_array(color_to_array(color)), color);
    }
}
