use egui::{Color32, Pos2, Rect, Vec2};

use super::Element;
use super::common::{self, HIT_SLOP};
use crate::error::EditorError;
use crate::id_generator::AnnotationId;

/// Unfilled stroked rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    id: AnnotationId,
    bounds: Rect,
    color: Color32,
    stroke_width: f32,
}

impl Rectangle {
    pub(crate) fn new(id: AnnotationId, bounds: Rect, color: Color32, stroke_width: f32) -> Self {
        Self {
            id,
            bounds,
            color,
            stroke_width,
        }
    }

    /// Geometric bounds, the stroke is centred on this outline
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub(crate) fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub(crate) fn set_stroke_width(&mut self, width: f32) {
        self.stroke_width = width;
    }
}

impl Element for Rectangle {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn element_type(&self) -> &'static str {
        "rectangle"
    }

    fn rect(&self) -> Rect {
        self.bounds.expand(self.stroke_width / 2.0)
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        self.rect().expand(HIT_SLOP).contains(pos)
    }

    fn translate(&mut self, delta: Vec2) {
        self.bounds = self.bounds.translate(delta);
    }

    fn resize(&mut self, new_rect: Rect) -> Result<(), EditorError> {
        common::validate_rect(&new_rect)?;
        // `new_rect` is the outer box, same as `rect()`
        let bounds = new_rect.shrink(self.stroke_width / 2.0);
        self.bounds = if bounds.is_positive() { bounds } else { new_rect };
        Ok(())
    }

    fn outline_width(&self) -> Option<f32> {
        Some(self.stroke_width)
    }
}
