use egui::{Color32, Pos2, Rect, Vec2};
use log::info;

use crate::annotation::{Annotation, Element};
use crate::geometry::{DisplayTransform, display_size_for, fit_display_scale};
use crate::id_generator::{AnnotationId, next_pixel_version};
use crate::image_source::SourceImage;

/// The loaded screenshot and where it sits on the surface
#[derive(Debug, Clone)]
pub struct BackgroundImage {
    source: SourceImage,
    scale: f32,
    display_size: [u32; 2],
    offset: Pos2,
    pixel_version: u64,
}

impl BackgroundImage {
    /// Fits the image into the viewport, placed at the surface origin
    pub fn fit(source: SourceImage, viewport: Vec2) -> Self {
        let scale = fit_display_scale(source.size(), viewport);
        let display_size = display_size_for(source.size(), scale);
        Self {
            source,
            scale,
            display_size,
            offset: Pos2::ZERO,
            pixel_version: next_pixel_version(),
        }
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn display_scale(&self) -> f32 {
        self.scale
    }

    pub fn display_size(&self) -> Vec2 {
        Vec2::new(self.display_size[0] as f32, self.display_size[1] as f32)
    }

    pub fn display_size_px(&self) -> [u32; 2] {
        self.display_size
    }

    pub fn offset(&self) -> Pos2 {
        self.offset
    }

    /// Display bounds in surface coordinates
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.offset, self.display_size())
    }

    pub fn transform(&self) -> DisplayTransform {
        DisplayTransform::new(self.scale, self.offset)
    }

    pub fn pixel_version(&self) -> u64 {
        self.pixel_version
    }

    fn translate(&mut self, delta: Vec2) {
        self.offset += delta;
    }
}

/// The drawing area: background image plus annotations in z-order
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    background_color: Color32,
    annotations: Vec<Annotation>,
    background: Option<BackgroundImage>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(Color32::WHITE)
    }
}

impl Surface {
    pub fn new(background_color: Color32) -> Self {
        Self {
            width: 0,
            height: 0,
            background_color,
            annotations: Vec::new(),
            background: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.size())
    }

    pub fn background_color(&self) -> Color32 {
        self.background_color
    }

    pub fn background(&self) -> Option<&BackgroundImage> {
        self.background.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.background.is_none()
    }

    /// Replaces the image wholesale. Existing annotations belong to the old
    /// image and are dropped.
    pub fn set_background(&mut self, background: BackgroundImage) {
        let [width, height] = background.display_size_px();
        info!(
            "Background set: {}x{} source, scale {:.3}, surface {}x{}",
            background.source().width(),
            background.source().height(),
            background.display_scale(),
            width,
            height
        );
        self.annotations.clear();
        self.width = width;
        self.height = height;
        self.background = Some(background);
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
        self.background = None;
        self.width = 0;
        self.height = 0;
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    pub(crate) fn annotation_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id() == id)
    }

    pub(crate) fn add(&mut self, annotation: Annotation) -> AnnotationId {
        let id = annotation.id();
        self.annotations.push(annotation);
        id
    }

    pub(crate) fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.annotations.iter().position(|a| a.id() == id)?;
        Some(self.annotations.remove(index))
    }

    /// Topmost annotation under `pos`
    pub fn topmost_at(&self, pos: Pos2) -> Option<AnnotationId> {
        self.annotations
            .iter()
            .rev()
            .find(|a| a.hit_test(pos))
            .map(Element::id)
    }

    /// Moves the image and every annotation by the same amount
    pub(crate) fn translate_content(&mut self, shift: Vec2) {
        if let Some(background) = &mut self.background {
            background.translate(shift);
        }
        for annotation in &mut self.annotations {
            annotation.translate(shift);
        }
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}
