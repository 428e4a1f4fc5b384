use egui::{Pos2, Rect};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::debug;
use thiserror::Error;

use crate::geometry::DisplayTransform;
use crate::image_source::SourceImage;

pub const DEFAULT_BLOCK_SIZE: u32 = 15;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MosaicError {
    #[error("mosaic region does not overlap the image")]
    EmptyRegion,
    #[error("mosaic block size must be positive")]
    InvalidBlockSize,
    #[error("mosaic resampling was interrupted")]
    Interrupted,
}

/// Integer pixel rectangle inside the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Maps a surface rectangle onto source pixels, clipped to the image.
pub fn source_region(transform: &DisplayTransform, surface_rect: Rect, source_size: [u32; 2]) -> Option<SourceRegion> {
    let [source_width, source_height] = source_size;
    let rect = transform.rect_to_source_space(surface_rect);

    let x0 = rect.min.x.floor().clamp(0.0, source_width as f32) as u32;
    let y0 = rect.min.y.floor().clamp(0.0, source_height as f32) as u32;
    let x1 = rect.max.x.ceil().clamp(0.0, source_width as f32) as u32;
    let y1 = rect.max.y.ceil().clamp(0.0, source_height as f32) as u32;

    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(SourceRegion {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

/// Copies the region out of the source at full resolution
pub fn extract_region(source: &RgbaImage, region: SourceRegion) -> RgbaImage {
    imageops::crop_imm(source, region.x, region.y, region.width, region.height).to_image()
}

/// Average RGB of a block, alpha forced opaque
pub fn block_average(buffer: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> Rgba<u8> {
    let mut totals = [0u64; 3];
    let mut count = 0u64;
    for py in y..y + height {
        for px in x..x + width {
            let pixel = buffer.get_pixel(px, py);
            totals[0] += pixel[0] as u64;
            totals[1] += pixel[1] as u64;
            totals[2] += pixel[2] as u64;
            count += 1;
        }
    }
    if count == 0 {
        return Rgba([0, 0, 0, 255]);
    }

    let average = |total: u64| ((total + count / 2) / count) as u8;
    Rgba([average(totals[0]), average(totals[1]), average(totals[2]), 255])
}

/// Replaces every block of `block_size`² pixels with its average color.
///
/// Blocks on the right and bottom edges are clipped to the buffer.
/// `keep_going` is asked once per row of blocks; returning false stops
/// the pass with [`MosaicError::Interrupted`].
pub fn pixelate(
    buffer: &mut RgbaImage,
    block_size: u32,
    mut keep_going: impl FnMut() -> bool,
) -> Result<(), MosaicError> {
    if block_size == 0 {
        return Err(MosaicError::InvalidBlockSize);
    }

    let (width, height) = buffer.dimensions();
    for block_y in (0..height).step_by(block_size as usize) {
        if !keep_going() {
            return Err(MosaicError::Interrupted);
        }
        let block_height = block_size.min(height - block_y);

        for block_x in (0..width).step_by(block_size as usize) {
            let block_width = block_size.min(width - block_x);
            let color = block_average(buffer, block_x, block_y, block_width, block_height);

            for py in block_y..block_y + block_height {
                for px in block_x..block_x + block_width {
                    buffer.put_pixel(px, py, color);
                }
            }
        }
    }
    Ok(())
}

/// Nearest-neighbour resize, keeps block edges hard
pub fn downsample_nearest(buffer: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(buffer, width.max(1), height.max(1), FilterType::Nearest)
}

/// Pixelated patch ready to be placed on the surface
#[derive(Debug, Clone)]
pub struct RenderedMosaic {
    /// Top-left corner in surface coordinates
    pub position: Pos2,
    /// Pixels at display size
    pub pixels: RgbaImage,
}

/// Runs the full pipeline for a drag rectangle in surface space.
///
/// The rectangle is clipped to the image first, so a drag hanging over the
/// image edge only redacts the part that covers pixels.
pub fn render_mosaic(
    source: &SourceImage,
    transform: &DisplayTransform,
    surface_rect: Rect,
    block_size: u32,
    keep_going: impl FnMut() -> bool,
) -> Result<RenderedMosaic, MosaicError> {
    let region = source_region(transform, surface_rect, source.size()).ok_or(MosaicError::EmptyRegion)?;

    let mut buffer = extract_region(source.pixels(), region);
    pixelate(&mut buffer, block_size, keep_going)?;

    let clipped = source_region_to_surface(transform, region);
    let clipped = clipped.intersect(surface_rect);
    let width = clipped.width().round() as u32;
    let height = clipped.height().round() as u32;
    debug!(
        "Mosaic: source {}x{} at ({}, {}), display {}x{}",
        region.width, region.height, region.x, region.y, width, height
    );

    Ok(RenderedMosaic {
        position: clipped.min,
        pixels: downsample_nearest(&buffer, width, height),
    })
}

fn source_region_to_surface(transform: &DisplayTransform, region: SourceRegion) -> Rect {
    transform.rect_to_surface_space(Rect::from_min_max(
        Pos2::new(region.x as f32, region.y as f32),
        Pos2::new((region.x + region.width) as f32, (region.y + region.height) as f32),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 99, 200]))
    }

    #[test]
    fn uniform_block_is_unchanged_except_alpha() {
        let mut buffer = RgbaImage::from_pixel(30, 30, Rgba([10, 20, 30, 255]));
        let before = buffer.clone();
        pixelate(&mut buffer, 15, || true).unwrap();
        assert_eq!(buffer, before);
    }

    #[test]
    fn blocks_are_flat_and_opaque() {
        let mut buffer = gradient(40, 20);
        pixelate(&mut buffer, 15, || true).unwrap();
        let first = *buffer.get_pixel(0, 0);
        assert_eq!(first[3], 255);
        for y in 0..15 {
            for x in 0..15 {
                assert_eq!(*buffer.get_pixel(x, y), first);
            }
        }
        // Clipped edge block spans x 30..40, y 15..20
        let edge = *buffer.get_pixel(39, 19);
        assert_eq!(*buffer.get_pixel(30, 15), edge);
    }

    #[test]
    fn interruption_is_reported() {
        let mut buffer = gradient(40, 40);
        let mut rows = 0;
        let result = pixelate(&mut buffer, 10, || {
            rows += 1;
            rows < 2
        });
        assert_eq!(result, Err(MosaicError::Interrupted));
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let mut buffer = gradient(4, 4);
        assert_eq!(pixelate(&mut buffer, 0, || true), Err(MosaicError::InvalidBlockSize));
    }

    #[test]
    fn region_maps_through_display_scale() {
        let transform = DisplayTransform::new(0.5, pos2(20.0, 10.0));
        let rect = Rect::from_min_size(pos2(30.0, 20.0), vec2(50.0, 40.0));
        let region = source_region(&transform, rect, [1000, 1000]).unwrap();
        assert_eq!(region, SourceRegion { x: 20, y: 20, width: 100, height: 80 });
    }

    #[test]
    fn region_outside_image_is_empty() {
        let transform = DisplayTransform::new(1.0, Pos2::ZERO);
        let rect = Rect::from_min_size(pos2(-100.0, -100.0), vec2(50.0, 50.0));
        assert!(source_region(&transform, rect, [100, 100]).is_none());
    }

    #[test]
    fn rendered_patch_has_display_size() {
        let source = SourceImage::from_rgba(gradient(200, 200)).unwrap();
        let transform = DisplayTransform::new(0.5, Pos2::ZERO);
        let rect = Rect::from_min_size(pos2(10.0, 10.0), vec2(40.0, 30.0));
        let patch = render_mosaic(&source, &transform, rect, DEFAULT_BLOCK_SIZE, || true).unwrap();
        assert_eq!(patch.position, pos2(10.0, 10.0));
        assert_eq!(patch.pixels.dimensions(), (40, 30));
    }
}
