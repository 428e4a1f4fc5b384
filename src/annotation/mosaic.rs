use std::sync::Arc;

use egui::{Pos2, Rect, Vec2};
use image::RgbaImage;

use super::Element;
use super::common;
use crate::error::EditorError;
use crate::id_generator::{AnnotationId, next_pixel_version};

/// Baked pixelated patch covering a redacted region
#[derive(Clone)]
pub struct MosaicPatch {
    id: AnnotationId,
    position: Pos2,
    size: Vec2,
    pixels: Arc<RgbaImage>,
    pixel_version: u64,
}

// Pixel buffers are large, print their dimensions only
impl std::fmt::Debug for MosaicPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MosaicPatch")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("pixels", &(self.pixels.width(), self.pixels.height()))
            .finish()
    }
}

impl PartialEq for MosaicPatch {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.position == other.position
            && self.size == other.size
            && self.pixel_version == other.pixel_version
    }
}

impl MosaicPatch {
    pub(crate) fn new(id: AnnotationId, position: Pos2, pixels: RgbaImage) -> Self {
        let size = Vec2::new(pixels.width() as f32, pixels.height() as f32);
        Self {
            id,
            position,
            size,
            pixels: Arc::new(pixels),
            pixel_version: next_pixel_version(),
        }
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Changes only when the baked pixels change, not on move or resize
    pub fn pixel_version(&self) -> u64 {
        self.pixel_version
    }
}

impl Element for MosaicPatch {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn element_type(&self) -> &'static str {
        "mosaic"
    }

    fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        self.rect().contains(pos)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn resize(&mut self, new_rect: Rect) -> Result<(), EditorError> {
        common::validate_rect(&new_rect)?;
        // The baked pixels are stretched, not recomputed
        self.position = new_rect.min;
        self.size = new_rect.size();
        Ok(())
    }
}
