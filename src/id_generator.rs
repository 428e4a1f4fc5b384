use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

// Single static counter for all annotations
static NEXT_ANNOTATION_ID: AtomicUsize = AtomicUsize::new(1);

// Shared by anything that owns pixels the renderer caches as a texture
static NEXT_PIXEL_VERSION: AtomicU64 = AtomicU64::new(1);

/// Stable identifier of an annotation on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(usize);

impl AnnotationId {
    pub fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub fn generate_id() -> AnnotationId {
    AnnotationId(NEXT_ANNOTATION_ID.fetch_add(1, Ordering::SeqCst))
}

/// Version stamp used to invalidate cached textures
pub fn next_pixel_version() -> u64 {
    NEXT_PIXEL_VERSION.fetch_add(1, Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
