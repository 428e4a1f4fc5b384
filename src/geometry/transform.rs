//! Mapping between the three coordinate spaces of the editor.
//!
//! * source space: pixels of the decoded image at native resolution
//! * display space: the image scaled to fit the viewport (`scale <= 1`)
//! * surface space: the drawing area, where the display image sits at
//!   `offset` and may be surrounded by expansion margins
//!
//! `source = (surface - offset) / scale`. Every function here is pure.

use egui::{Pos2, Rect, Vec2};

/// Scale that fits an image inside the viewport without ever upscaling.
pub fn fit_display_scale(image_size: [u32; 2], viewport: Vec2) -> f32 {
    let [width, height] = image_size;
    if width == 0 || height == 0 {
        return 1.0;
    }

    let mut scale = 1.0_f32;
    if viewport.x > 0.0 {
        scale = scale.min(viewport.x / width as f32);
    }
    if viewport.y > 0.0 {
        scale = scale.min(viewport.y / height as f32);
    }
    scale
}

/// Whole-pixel size of the image once scaled for display.
pub fn display_size_for(image_size: [u32; 2], scale: f32) -> [u32; 2] {
    let [width, height] = image_size;
    [
        ((width as f32 * scale).round() as u32).max(1),
        ((height as f32 * scale).round() as u32).max(1),
    ]
}

/// Background placement inside the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub scale: f32,
    pub offset: Pos2,
}

impl DisplayTransform {
    pub fn new(scale: f32, offset: Pos2) -> Self {
        Self { scale, offset }
    }

    pub fn to_source_space(&self, surface_point: Pos2) -> Pos2 {
        Pos2::new(
            (surface_point.x - self.offset.x) / self.scale,
            (surface_point.y - self.offset.y) / self.scale,
        )
    }

    pub fn to_surface_space(&self, source_point: Pos2) -> Pos2 {
        Pos2::new(
            source_point.x * self.scale + self.offset.x,
            source_point.y * self.scale + self.offset.y,
        )
    }

    pub fn rect_to_source_space(&self, rect: Rect) -> Rect {
        Rect::from_two_pos(self.to_source_space(rect.min), self.to_source_space(rect.max))
    }

    pub fn rect_to_surface_space(&self, rect: Rect) -> Rect {
        Rect::from_two_pos(self.to_surface_space(rect.min), self.to_surface_space(rect.max))
    }

    /// Same transform with the background moved by `shift`
    pub fn translated(&self, shift: Vec2) -> Self {
        Self::new(self.scale, self.offset + shift)
    }
}
