use egui::{Color32, Pos2, Rect, Vec2};

use super::Element;
use super::common::{self, HIT_SLOP};
use crate::error::EditorError;
use crate::fonts;
use crate::id_generator::AnnotationId;

const MIN_FONT_SIZE: f32 = 6.0;

/// Editable text anchored at its top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    id: AnnotationId,
    position: Pos2,
    content: String,
    font_size: f32,
    color: Color32,
    // Cached layout size, refreshed whenever content or font size change
    size: Vec2,
}

impl Text {
    pub(crate) fn new(id: AnnotationId, position: Pos2, content: String, font_size: f32, color: Color32) -> Self {
        let size = fonts::measure_text(&content, font_size);
        Self {
            id,
            position,
            content,
            font_size,
            color,
            size,
        }
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub(crate) fn set_content(&mut self, content: String) {
        self.content = content;
        self.size = fonts::measure_text(&self.content, self.font_size);
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub(crate) fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// True when only whitespace is left
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

impl Element for Text {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn element_type(&self) -> &'static str {
        "text"
    }

    fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        self.rect().expand(HIT_SLOP).contains(pos)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn resize(&mut self, new_rect: Rect) -> Result<(), EditorError> {
        common::validate_rect(&new_rect)?;

        // Text scales uniformly, driven by the height of the new box
        let factor = new_rect.height() / self.size.y.max(1.0);
        self.font_size = (self.font_size * factor).max(MIN_FONT_SIZE);
        self.position = new_rect.min;
        self.size = fonts::measure_text(&self.content, self.font_size);
        Ok(())
    }

    fn is_editable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_generator::generate_id;
    use egui::pos2;

    #[test]
    fn whitespace_only_is_blank() {
        let mut text = Text::new(generate_id(), pos2(0.0, 0.0), "Text".into(), 24.0, Color32::RED);
        assert!(!text.is_blank());
        text.set_content("  \n\t ".into());
        assert!(text.is_blank());
    }

    #[test]
    fn resize_scales_font() {
        let mut text = Text::new(generate_id(), pos2(0.0, 0.0), "Text".into(), 24.0, Color32::RED);
        let rect = text.rect();
        let doubled = Rect::from_min_size(pos2(10.0, 10.0), rect.size() * 2.0);
        text.resize(doubled).unwrap();
        assert!((text.font_size() - 48.0).abs() < 0.01);
        assert_eq!(text.position(), pos2(10.0, 10.0));
    }
}
