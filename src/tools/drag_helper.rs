use egui::{Pos2, Rect, Vec2};

use crate::geometry::normalized_rect;

/// In-progress press-drag-release gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragHelper {
    start: Pos2,
    current: Pos2,
}

impl DragHelper {
    pub fn new(start: Pos2) -> Self {
        Self { start, current: start }
    }

    pub fn update(&mut self, pos: Pos2) {
        self.current = pos;
    }

    pub fn start(&self) -> Pos2 {
        self.start
    }

    pub fn current(&self) -> Pos2 {
        self.current
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.current)
    }

    /// Bounds with non-negative size whatever the drag direction
    pub fn rect(&self) -> Rect {
        normalized_rect(self.start, self.current)
    }

    pub fn size(&self) -> Vec2 {
        self.rect().size()
    }

    /// Both sides reach `min`
    pub fn covers(&self, min: f32) -> bool {
        let size = self.size();
        size.x >= min && size.y >= min
    }
}
