use egui::{Color32, Pos2, Rect, Vec2};

mod common;
pub(crate) mod arrow;
pub(crate) mod mosaic;
pub(crate) mod rectangle;
pub(crate) mod text;

pub use arrow::Arrow;
pub use common::{HIT_SLOP, MIN_ELEMENT_SIZE};
pub use mosaic::MosaicPatch;
pub use rectangle::Rectangle;
pub use text::Text;

use crate::error::EditorError;
use crate::id_generator::AnnotationId;

/// Common trait that all annotations must implement
pub trait Element {
    /// Get the unique identifier for this element
    fn id(&self) -> AnnotationId;

    /// Get the element type as a string
    fn element_type(&self) -> &'static str;

    /// Bounding rectangle in surface coordinates, including stroke
    fn rect(&self) -> Rect;

    /// Test if the element contains the given position
    fn hit_test(&self, pos: Pos2) -> bool;

    /// Translate the element by the given delta
    fn translate(&mut self, delta: Vec2);

    /// Fit the element into the new rectangle
    fn resize(&mut self, new_rect: Rect) -> Result<(), EditorError>;

    /// Whether the element content can be edited in place
    fn is_editable(&self) -> bool {
        false
    }

    /// Stroke width for outlined elements
    fn outline_width(&self) -> Option<f32> {
        None
    }
}

/// Variant tag without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Arrow,
    Text,
    Rectangle,
    Mosaic,
}

/// Every markup element the user can place on the surface
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Arrow(Arrow),
    Text(Text),
    Rectangle(Rectangle),
    Mosaic(MosaicPatch),
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Arrow(_) => AnnotationKind::Arrow,
            Annotation::Text(_) => AnnotationKind::Text,
            Annotation::Rectangle(_) => AnnotationKind::Rectangle,
            Annotation::Mosaic(_) => AnnotationKind::Mosaic,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Annotation::Text(text) => Some(text),
            _ => None,
        }
    }

    pub(crate) fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Annotation::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn color(&self) -> Option<Color32> {
        match self {
            Annotation::Arrow(a) => Some(a.color()),
            Annotation::Text(t) => Some(t.color()),
            Annotation::Rectangle(r) => Some(r.color()),
            Annotation::Mosaic(_) => None,
        }
    }

    /// Recolors the element. Mosaic patches carry pixels, not a color.
    pub(crate) fn set_color(&mut self, color: Color32) -> bool {
        match self {
            Annotation::Arrow(a) => a.set_color(color),
            Annotation::Text(t) => t.set_color(color),
            Annotation::Rectangle(r) => r.set_color(color),
            Annotation::Mosaic(_) => return false,
        }
        true
    }

    /// Only rectangles take live stroke width changes
    pub(crate) fn set_stroke_width(&mut self, width: f32) -> bool {
        match self {
            Annotation::Rectangle(r) => {
                r.set_stroke_width(width);
                true
            }
            _ => false,
        }
    }
}

impl Element for Annotation {
    fn id(&self) -> AnnotationId {
        match self {
            Annotation::Arrow(a) => a.id(),
            Annotation::Text(t) => t.id(),
            Annotation::Rectangle(r) => r.id(),
            Annotation::Mosaic(m) => m.id(),
        }
    }

    fn element_type(&self) -> &'static str {
        match self {
            Annotation::Arrow(a) => a.element_type(),
            Annotation::Text(t) => t.element_type(),
            Annotation::Rectangle(r) => r.element_type(),
            Annotation::Mosaic(m) => m.element_type(),
        }
    }

    fn rect(&self) -> Rect {
        match self {
            Annotation::Arrow(a) => a.rect(),
            Annotation::Text(t) => t.rect(),
            Annotation::Rectangle(r) => r.rect(),
            Annotation::Mosaic(m) => m.rect(),
        }
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        match self {
            Annotation::Arrow(a) => a.hit_test(pos),
            Annotation::Text(t) => t.hit_test(pos),
            Annotation::Rectangle(r) => r.hit_test(pos),
            Annotation::Mosaic(m) => m.hit_test(pos),
        }
    }

    fn translate(&mut self, delta: Vec2) {
        match self {
            Annotation::Arrow(a) => a.translate(delta),
            Annotation::Text(t) => t.translate(delta),
            Annotation::Rectangle(r) => r.translate(delta),
            Annotation::Mosaic(m) => m.translate(delta),
        }
    }

    fn resize(&mut self, new_rect: Rect) -> Result<(), EditorError> {
        match self {
            Annotation::Arrow(a) => a.resize(new_rect),
            Annotation::Text(t) => t.resize(new_rect),
            Annotation::Rectangle(r) => r.resize(new_rect),
            Annotation::Mosaic(m) => m.resize(new_rect),
        }
    }

    fn is_editable(&self) -> bool {
        match self {
            Annotation::Arrow(a) => a.is_editable(),
            Annotation::Text(t) => t.is_editable(),
            Annotation::Rectangle(r) => r.is_editable(),
            Annotation::Mosaic(m) => m.is_editable(),
        }
    }

    fn outline_width(&self) -> Option<f32> {
        match self {
            Annotation::Arrow(a) => a.outline_width(),
            Annotation::Text(t) => t.outline_width(),
            Annotation::Rectangle(r) => r.outline_width(),
            Annotation::Mosaic(m) => m.outline_width(),
        }
    }
}

/// Factory functions for creating annotations with fresh ids
pub mod factory {
    use super::*;
    use crate::id_generator::generate_id;
    use image::RgbaImage;

    pub fn create_arrow(start: Pos2, end: Pos2, color: Color32, stroke_width: f32) -> Annotation {
        Annotation::Arrow(Arrow::new(generate_id(), start, end, color, stroke_width))
    }

    pub fn create_text(position: Pos2, content: impl Into<String>, font_size: f32, color: Color32) -> Annotation {
        Annotation::Text(Text::new(generate_id(), position, content.into(), font_size, color))
    }

    pub fn create_rectangle(bounds: Rect, color: Color32, stroke_width: f32) -> Annotation {
        Annotation::Rectangle(Rectangle::new(generate_id(), bounds, color, stroke_width))
    }

    pub fn create_mosaic(position: Pos2, pixels: RgbaImage) -> Annotation {
        Annotation::Mosaic(MosaicPatch::new(generate_id(), position, pixels))
    }
}
