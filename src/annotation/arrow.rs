use egui::{Color32, Pos2, Rect, Vec2};

use super::Element;
use super::common::{self, HIT_SLOP};
use crate::error::EditorError;
use crate::geometry::distance_to_line_segment;
use crate::id_generator::AnnotationId;

// Head size grows with the stroke so thick arrows keep their shape
const HEAD_BASE_SIZE: f32 = 10.0;
const HEAD_SIZE_PER_STROKE: f32 = 3.0;

/// Straight line with a triangular head at `end`
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    id: AnnotationId,
    start: Pos2,
    end: Pos2,
    color: Color32,
    stroke_width: f32,
}

impl Arrow {
    pub(crate) fn new(id: AnnotationId, start: Pos2, end: Pos2, color: Color32, stroke_width: f32) -> Self {
        Self {
            id,
            start,
            end,
            color,
            stroke_width,
        }
    }

    pub fn start(&self) -> Pos2 {
        self.start
    }

    pub fn end(&self) -> Pos2 {
        self.end
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub(crate) fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn head_size(&self) -> f32 {
        head_size_for(self.stroke_width)
    }

    /// Rotation of the head triangle: the line angle turned by +90°.
    ///
    /// An upright triangle rotated by this much points along the line.
    pub fn head_angle_degrees(&self) -> f32 {
        head_angle_degrees(self.start, self.end)
    }

    /// Apex followed by the two base corners, centred on `end`
    pub fn head_points(&self) -> [Pos2; 3] {
        head_points(self.start, self.end, self.stroke_width)
    }
}

pub fn head_size_for(stroke_width: f32) -> f32 {
    HEAD_BASE_SIZE + stroke_width * HEAD_SIZE_PER_STROKE
}

pub fn head_angle_degrees(start: Pos2, end: Pos2) -> f32 {
    let delta = end - start;
    delta.y.atan2(delta.x).to_degrees() + 90.0
}

/// Head triangle for a line from `start` to `end`, shared with previews
pub fn head_points(start: Pos2, end: Pos2, stroke_width: f32) -> [Pos2; 3] {
    let rotation = head_angle_degrees(start, end).to_radians();
    // Upright triangle apex (0, -1) rotated by `rotation`
    let dir = Vec2::new(rotation.sin(), -rotation.cos());
    let perp = Vec2::new(-dir.y, dir.x);
    let half = head_size_for(stroke_width) / 2.0;
    [end + dir * half, end - dir * half + perp * half, end - dir * half - perp * half]
}

impl Element for Arrow {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn element_type(&self) -> &'static str {
        "arrow"
    }

    fn rect(&self) -> Rect {
        let [apex, left, right] = self.head_points();
        common::calculate_bounds(
            &[self.start, self.end, apex, left, right],
            self.stroke_width / 2.0,
        )
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        let reach = self.stroke_width / 2.0 + HIT_SLOP;
        distance_to_line_segment(pos, self.start, self.end) <= reach
            || self.end.distance(pos) <= self.head_size() / 2.0 + HIT_SLOP
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    fn resize(&mut self, new_rect: Rect) -> Result<(), EditorError> {
        common::validate_rect(&new_rect)?;

        // `new_rect` is the outer box, same as `rect()`
        let current = self.rect();
        self.start = common::remap_point(self.start, current, new_rect);
        self.end = common::remap_point(self.end, current, new_rect);
        Ok(())
    }

    fn outline_width(&self) -> Option<f32> {
        Some(self.stroke_width)
    }
}
