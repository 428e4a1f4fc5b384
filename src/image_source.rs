use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
}

/// MIME type the shell reports for an image path.
///
/// Only PNG is recognised explicitly, everything else is reported as JPEG.
pub fn mime_for_path(path: &Path) -> &'static str {
    let is_png = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if is_png { "image/png" } else { "image/jpeg" }
}

/// Decoded bitmap at native resolution.
///
/// Cloning is cheap, the pixels are shared.
#[derive(Clone)]
pub struct SourceImage {
    pixels: Arc<RgbaImage>,
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl SourceImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageLoadError> {
        let decoded = image::load_from_memory(bytes)?;
        debug!("Decoded image: {}x{}", decoded.width(), decoded.height());
        Self::from_rgba(decoded.to_rgba8())
    }

    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, ImageLoadError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(ImageLoadError::Empty);
        }
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width(), self.height()]
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for_path(Path::new("/tmp/a.png")), "image/png");
        assert_eq!(mime_for_path(Path::new("/tmp/a.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("/tmp/a.jpg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("/tmp/a.gif")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("/tmp/noext")), "image/jpeg");
    }

    #[test]
    fn decodes_png_bytes() {
        let image = RgbaImage::from_pixel(4, 3, image::Rgba([1, 2, 3, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let source = SourceImage::decode(&bytes).unwrap();
        assert_eq!(source.size(), [4, 3]);
        assert_eq!(source.pixels().get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            SourceImage::decode(b"not an image"),
            Err(ImageLoadError::Decode(_))
        ));
    }
}
