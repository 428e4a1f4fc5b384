use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use ab_glyph::{Font, PxScale, ScaleFont, point};
use egui::{Color32, Pos2};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiny_skia::{
    FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8,
    Stroke, Transform,
};

use crate::annotation::{Annotation, Arrow, Element, MosaicPatch, Rectangle, Text};
use crate::fonts::{self, LINE_HEIGHT};
use crate::surface::{BackgroundImage, Surface};

/// Default output resolution relative to the source image
pub const DEFAULT_EXPORT_FRACTION: f32 = 0.5;
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there is no image to export")]
    NothingToExport,
    #[error("invalid export size {0}x{1}")]
    InvalidSize(u32, u32),
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    /// JPEG for `.jpg`/`.jpeg`, PNG for anything else
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => ExportFormat::Jpeg,
            _ => ExportFormat::Png,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Surface to output scale, `(source_width * fraction) / surface_width`
pub fn export_multiplier(source_width: u32, surface_width: u32, fraction: f32) -> f32 {
    if surface_width == 0 {
        return fraction;
    }
    source_width as f32 * fraction / surface_width as f32
}

/// Output pixel size for the whole surface, never below 1x1
pub fn output_size(surface: &Surface, multiplier: f32) -> (u32, u32) {
    (
        ((surface.width() as f32 * multiplier).round() as u32).max(1),
        ((surface.height() as f32 * multiplier).round() as u32).max(1),
    )
}

/// Renders the background, the image and every annotation in z-order.
///
/// Nothing is cropped: margins added by canvas expansion are part of the
/// output.
pub fn flatten(surface: &Surface, multiplier: f32) -> Result<RgbaImage, ExportError> {
    let background = surface.background().ok_or(ExportError::NothingToExport)?;
    let (width, height) = output_size(surface, multiplier);
    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::InvalidSize(width, height))?;
    debug!(
        "Flattening {}x{} surface into {}x{} (x{:.3})",
        surface.width(),
        surface.height(),
        width,
        height,
        multiplier
    );

    pixmap.fill(skia_color(surface.background_color()));
    draw_background(&mut pixmap, background, multiplier);

    for annotation in surface.annotations() {
        match annotation {
            Annotation::Arrow(arrow) => draw_arrow(&mut pixmap, arrow, multiplier),
            Annotation::Rectangle(rect) => draw_rectangle(&mut pixmap, rect, multiplier),
            Annotation::Text(text) => draw_text(&mut pixmap, text, multiplier),
            Annotation::Mosaic(patch) => draw_mosaic(&mut pixmap, patch, multiplier),
        }
    }

    Ok(pixmap_to_image(&pixmap))
}

pub fn encode(image: &RgbaImage, format: ExportFormat, jpeg_quality: u8) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Png => {
            image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        }
        ExportFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, jpeg_quality).encode_image(&rgb)?;
        }
    }
    Ok(bytes)
}

/// A flattened surface waiting for its destination to pick the encoding
#[derive(Clone)]
pub struct FlattenedExport {
    image: Arc<RgbaImage>,
    jpeg_quality: u8,
}

impl std::fmt::Debug for FlattenedExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlattenedExport")
            .field("size", &self.image.dimensions())
            .field("jpeg_quality", &self.jpeg_quality)
            .finish()
    }
}

impl FlattenedExport {
    pub fn new(image: RgbaImage, jpeg_quality: u8) -> Self {
        Self {
            image: Arc::new(image),
            jpeg_quality,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn encode(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        encode(&self.image, format, self.jpeg_quality)
    }

    pub fn encode_for_path(&self, path: &Path) -> Result<Vec<u8>, ExportError> {
        self.encode(ExportFormat::from_path(path))
    }
}

fn skia_color(color: Color32) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn solid_paint(color: Color32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    paint
}

fn scaled(pos: Pos2, multiplier: f32) -> (f32, f32) {
    (pos.x * multiplier, pos.y * multiplier)
}

/// Copies straight-alpha pixels into a premultiplied pixmap
fn image_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        let premultiply = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        if let Some(color) = PremultipliedColorU8::from_rgba(premultiply(r), premultiply(g), premultiply(b), a) {
            *dst = color;
        }
    }
    Some(pixmap)
}

fn pixmap_to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}

fn draw_background(pixmap: &mut Pixmap, background: &BackgroundImage, multiplier: f32) {
    let rect = background.rect();
    let width = ((rect.width() * multiplier).round() as u32).max(1);
    let height = ((rect.height() * multiplier).round() as u32).max(1);

    // Resample from native pixels, never from the display copy
    let source = background.source().pixels();
    let resampled = if source.dimensions() == (width, height) {
        source.clone()
    } else {
        imageops::resize(source, width, height, FilterType::Triangle)
    };

    let Some(layer) = image_to_pixmap(&resampled) else {
        warn!("Background layer {}x{} could not be allocated", width, height);
        return;
    };
    let (x, y) = scaled(rect.min, multiplier);
    pixmap.draw_pixmap(
        x.round() as i32,
        y.round() as i32,
        layer.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

fn draw_arrow(pixmap: &mut Pixmap, arrow: &Arrow, multiplier: f32) {
    let paint = solid_paint(arrow.color());

    let mut line = PathBuilder::new();
    let (sx, sy) = scaled(arrow.start(), multiplier);
    let (ex, ey) = scaled(arrow.end(), multiplier);
    line.move_to(sx, sy);
    line.line_to(ex, ey);
    if let Some(path) = line.finish() {
        let stroke = Stroke {
            width: arrow.stroke_width() * multiplier,
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    let [apex, left, right] = arrow.head_points();
    let mut head = PathBuilder::new();
    let (x, y) = scaled(apex, multiplier);
    head.move_to(x, y);
    let (x, y) = scaled(left, multiplier);
    head.line_to(x, y);
    let (x, y) = scaled(right, multiplier);
    head.line_to(x, y);
    head.close();
    if let Some(path) = head.finish() {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

fn draw_rectangle(pixmap: &mut Pixmap, rectangle: &Rectangle, multiplier: f32) {
    let bounds = rectangle.bounds();
    let Some(rect) = tiny_skia::Rect::from_ltrb(
        bounds.min.x * multiplier,
        bounds.min.y * multiplier,
        bounds.max.x * multiplier,
        bounds.max.y * multiplier,
    ) else {
        return;
    };

    let path = PathBuilder::from_rect(rect);
    let stroke = Stroke {
        width: rectangle.stroke_width() * multiplier,
        line_join: LineJoin::Miter,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &solid_paint(rectangle.color()), &stroke, Transform::identity(), None);
}

fn draw_text(pixmap: &mut Pixmap, text: &Text, multiplier: f32) {
    let Some(font) = fonts::default_font() else {
        warn!("No font available, text {} skipped in export", text.id());
        return;
    };
    let font_size = text.font_size() * multiplier;
    let size = text.size() * multiplier;
    // Glyph overhang past the advance box
    let margin = (font_size * 0.25).ceil();
    let Some(mut layer) = Pixmap::new(
        (size.x + margin * 2.0).ceil().max(1.0) as u32,
        (size.y + margin * 2.0).ceil().max(1.0) as u32,
    ) else {
        return;
    };

    let [r, g, b, a] = text.color().to_srgba_unmultiplied();
    let scale = PxScale::from(font_size);
    let scaled_font = font.as_scaled(scale);
    let (layer_width, layer_height) = (layer.width() as i32, layer.height() as i32);
    let pixels = layer.pixels_mut();

    for (index, line) in text.content().split('\n').enumerate() {
        let baseline = margin + index as f32 * font_size * LINE_HEIGHT + scaled_font.ascent();
        let mut caret = margin;
        let mut previous = None;

        for c in line.chars() {
            let id = scaled_font.glyph_id(c);
            if let Some(previous) = previous {
                caret += scaled_font.kern(previous, id);
            }
            previous = Some(id);
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled_font.h_advance(id);

            let Some(outline) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outline.px_bounds();
            outline.draw(|x, y, coverage| {
                let px = bounds.min.x as i32 + x as i32;
                let py = bounds.min.y as i32 + y as i32;
                if px < 0 || py < 0 || px >= layer_width || py >= layer_height {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * a as f32).round() as u8;
                let offset = (py * layer_width + px) as usize;
                let fade = |c: u8| ((c as u16 * alpha as u16 + 127) / 255) as u8;
                // Overlapping glyph edges keep the stronger coverage
                if alpha > pixels[offset].alpha() {
                    if let Some(color) = PremultipliedColorU8::from_rgba(fade(r), fade(g), fade(b), alpha) {
                        pixels[offset] = color;
                    }
                }
            });
        }
    }

    let (x, y) = scaled(text.position(), multiplier);
    pixmap.draw_pixmap(
        (x - margin).round() as i32,
        (y - margin).round() as i32,
        layer.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

fn draw_mosaic(pixmap: &mut Pixmap, patch: &MosaicPatch, multiplier: f32) {
    let Some(layer) = image_to_pixmap(patch.pixels()) else {
        return;
    };
    let pixels = patch.pixels();
    let sx = patch.size().x * multiplier / pixels.width() as f32;
    let sy = patch.size().y * multiplier / pixels.height() as f32;
    let (tx, ty) = scaled(patch.position(), multiplier);

    let paint = PixmapPaint {
        quality: FilterQuality::Nearest,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, layer.as_ref(), &paint, Transform::from_row(sx, 0.0, 0.0, sy, tx, ty), None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_follows_extension() {
        assert_eq!(ExportFormat::from_path(&PathBuf::from("a.JPG")), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_path(&PathBuf::from("a.jpeg")), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_path(&PathBuf::from("a.png")), ExportFormat::Png);
        assert_eq!(ExportFormat::from_path(&PathBuf::from("a")), ExportFormat::Png);
    }

    #[test]
    fn multiplier_targets_half_source_width() {
        let m = export_multiplier(2000, 1200, DEFAULT_EXPORT_FRACTION);
        assert!((m - 0.8333).abs() < 1e-3);
    }

    #[test]
    fn empty_surface_cannot_export() {
        let surface = Surface::default();
        assert!(matches!(flatten(&surface, 1.0), Err(ExportError::NothingToExport)));
    }

    #[test]
    fn premultiply_round_trip_keeps_opaque_pixels() {
        let image = RgbaImage::from_pixel(3, 2, Rgba([10, 120, 250, 255]));
        let pixmap = image_to_pixmap(&image).unwrap();
        assert_eq!(pixmap_to_image(&pixmap), image);
    }
}
