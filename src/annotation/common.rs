use egui::{Pos2, Rect};

use crate::error::EditorError;

// Common constants for all annotation types
pub const MIN_ELEMENT_SIZE: f32 = 2.0;
/// Extra pick distance around thin shapes
pub const HIT_SLOP: f32 = 4.0;

/// Validates that a rectangle has minimum dimensions
pub(crate) fn validate_rect(rect: &Rect) -> Result<(), EditorError> {
    if !rect.is_finite() || rect.width() < MIN_ELEMENT_SIZE || rect.height() < MIN_ELEMENT_SIZE {
        Err(EditorError::InvalidGeometry(format!(
            "Element dimensions too small (min: {}). Width: {}, Height: {}",
            MIN_ELEMENT_SIZE,
            rect.width(),
            rect.height()
        )))
    } else {
        Ok(())
    }
}

/// Calculate the bounding box for a set of points
pub(crate) fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

/// Maps a point from one rectangle into the same relative spot of another.
///
/// Degenerate source axes map to the centre of the target axis.
pub(crate) fn remap_point(point: Pos2, from: Rect, to: Rect) -> Pos2 {
    let rel_x = if from.width() > f32::EPSILON {
        (point.x - from.min.x) / from.width()
    } else {
        0.5
    };
    let rel_y = if from.height() > f32::EPSILON {
        (point.y - from.min.y) / from.height()
    } else {
        0.5
    };
    Pos2::new(to.min.x + rel_x * to.width(), to.min.y + rel_y * to.height())
}
