use std::path::Path;

use crate::shell::CaptureTrigger;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Turns images dropped on the window into load triggers
#[derive(Debug, Default)]
pub struct FileHandler;

impl FileHandler {
    pub fn new() -> Self {
        Self
    }

    /// The editor shows one image, so only the last image dropped this frame is loaded
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> Option<CaptureTrigger> {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        Self::last_image(&dropped)
    }

    fn last_image(files: &[egui::DroppedFile]) -> Option<CaptureTrigger> {
        let mut triggers: Vec<_> = files.iter().filter_map(Self::trigger_for).collect();
        if triggers.len() > 1 {
            log::info!("{} images dropped, loading the last one", triggers.len());
        }
        triggers.pop()
    }

    fn trigger_for(file: &egui::DroppedFile) -> Option<CaptureTrigger> {
        if !Self::is_image_file(file) {
            log::warn!("Dropped file is not a supported image: {}", file.name);
            return None;
        }
        if let Some(bytes) = &file.bytes {
            log::info!("Image dropped from memory: {} ({} bytes)", file.name, bytes.len());
            return Some(CaptureTrigger::Bytes(bytes.to_vec()));
        }
        match &file.path {
            Some(path) => {
                log::info!("Image dropped: {}", path.display());
                Some(CaptureTrigger::Path(path.clone()))
            }
            None => {
                log::warn!("Dropped file has no accessible data: {}", file.name);
                None
            }
        }
    }

    /// Check if a file is an image based on MIME type or extension
    fn is_image_file(file: &egui::DroppedFile) -> bool {
        if !file.mime.is_empty() {
            return file.mime == "image/png" || file.mime == "image/jpeg";
        }
        file.path.as_deref().is_some_and(has_image_extension) || has_image_extension(Path::new(&file.name))
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}
