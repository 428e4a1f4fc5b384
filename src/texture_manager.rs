use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use image::RgbaImage;
use thiserror::Error;

use crate::id_generator::AnnotationId;

/// Errors that can occur during texture generation
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Invalid texture dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),
}

/// What a cached texture shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Background,
    Mosaic(AnnotationId),
}

/// Converts a straight-alpha buffer into an egui image
pub fn color_image(pixels: &RgbaImage) -> Result<ColorImage, TextureGenerationError> {
    let (width, height) = pixels.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureGenerationError::InvalidDimensions(width, height));
    }
    Ok(ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        pixels.as_raw(),
    ))
}

/// Uploads pixel buffers once and reuses them until their version changes
pub struct TextureManager {
    /// Cache of textures by (key, pixel version)
    texture_cache: HashMap<(TextureKey, u64), TextureHandle>,
    /// Tracks when each texture was last used
    last_used: HashMap<(TextureKey, u64), u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of textures to cache
    max_cache_size: usize,
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new(64)
    }
}

impl TextureManager {
    /// Creates a new texture manager with the specified cache size
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size: max_cache_size.max(1),
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Gets or creates the texture for `key` at `version`
    pub fn get_or_create_texture<F>(
        &mut self,
        key: TextureKey,
        version: u64,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> Result<ColorImage, TextureGenerationError>,
    {
        let cache_key = (key, version);

        if let Some(handle) = self.texture_cache.get(&cache_key) {
            self.last_used.insert(cache_key, self.current_frame);
            return Ok(handle.id());
        }

        let image = generator()?;

        // Mosaic blocks must stay crisp when the patch is stretched
        let options = match key {
            TextureKey::Background => TextureOptions::LINEAR,
            TextureKey::Mosaic(_) => TextureOptions::NEAREST,
        };
        let name = match key {
            TextureKey::Background => format!("background_v{version}"),
            TextureKey::Mosaic(id) => format!("mosaic_{}_v{version}", id.value()),
        };
        let handle = ctx.load_texture(name, image, options);

        // A new version replaces the old one
        self.invalidate(key);
        self.texture_cache.insert(cache_key, handle.clone());
        self.last_used.insert(cache_key, self.current_frame);
        self.prune_cache_if_needed();

        Ok(handle.id())
    }

    /// Drops every version cached for `key`
    pub fn invalidate(&mut self, key: TextureKey) {
        self.texture_cache.retain(|(cached, _), _| *cached != key);
        self.last_used.retain(|(cached, _), _| *cached != key);
    }

    /// Evicts textures not used this frame (e.g. deleted mosaics)
    pub fn retain_used_this_frame(&mut self) {
        let frame = self.current_frame;
        let stale: Vec<_> = self
            .last_used
            .iter()
            .filter(|(_, used)| **used < frame)
            .map(|(key, _)| *key)
            .collect();
        for key in stale {
            self.texture_cache.remove(&key);
            self.last_used.remove(&key);
        }
    }

    /// Prunes the cache if it exceeds the maximum size
    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<((TextureKey, u64), u64)> = self.last_used.iter().map(|(k, v)| (*k, *v)).collect();

        // Oldest first
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() - self.max_cache_size;
        for (key, _) in entries.iter().take(to_remove) {
            self.texture_cache.remove(key);
            self.last_used.remove(key);
        }
    }

    /// Clears all textures from the cache
    pub fn clear_cache(&mut self) {
        self.texture_cache.clear();
        self.last_used.clear();
    }

    /// Returns the number of textures currently in the cache
    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    fn get_texture(&self, key: TextureKey, version: u64) -> Option<&TextureHandle> {
        self.texture_cache.get(&(key, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_generator::generate_id;

    fn mock_texture_generator() -> Result<ColorImage, TextureGenerationError> {
        Ok(ColorImage::new([10, 10], egui::Color32::WHITE))
    }

    #[test]
    fn test_cache_hit() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);

        let first = manager
            .get_or_create_texture(TextureKey::Background, 1, mock_texture_generator, &ctx)
            .unwrap();
        let second = manager
            .get_or_create_texture(TextureKey::Background, 1, mock_texture_generator, &ctx)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(manager.cache_size(), 1);
    }

    #[test]
    fn test_new_version_replaces_old() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);

        manager
            .get_or_create_texture(TextureKey::Background, 1, mock_texture_generator, &ctx)
            .unwrap();
        manager
            .get_or_create_texture(TextureKey::Background, 2, mock_texture_generator, &ctx)
            .unwrap();

        assert_eq!(manager.cache_size(), 1);
        assert!(manager.get_texture(TextureKey::Background, 1).is_none());
        assert!(manager.get_texture(TextureKey::Background, 2).is_some());
    }

    #[test]
    fn test_lru_eviction() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);
        let (a, b, c) = (generate_id(), generate_id(), generate_id());

        manager
            .get_or_create_texture(TextureKey::Mosaic(a), 1, mock_texture_generator, &ctx)
            .unwrap();
        manager.begin_frame();
        manager
            .get_or_create_texture(TextureKey::Mosaic(b), 1, mock_texture_generator, &ctx)
            .unwrap();
        manager.begin_frame();
        manager
            .get_or_create_texture(TextureKey::Mosaic(c), 1, mock_texture_generator, &ctx)
            .unwrap();

        assert_eq!(manager.cache_size(), 2);
        assert!(manager.get_texture(TextureKey::Mosaic(a), 1).is_none());
        assert!(manager.get_texture(TextureKey::Mosaic(b), 1).is_some());
        assert!(manager.get_texture(TextureKey::Mosaic(c), 1).is_some());
    }

    #[test]
    fn test_unused_textures_are_dropped() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);
        manager
            .get_or_create_texture(TextureKey::Mosaic(generate_id()), 1, mock_texture_generator, &ctx)
            .unwrap();
        manager.begin_frame();
        manager.retain_used_this_frame();
        assert_eq!(manager.cache_size(), 0);
    }

    #[test]
    fn test_empty_buffer_is_rejected() {
        assert!(color_image(&RgbaImage::new(0, 4)).is_err());
    }
}
