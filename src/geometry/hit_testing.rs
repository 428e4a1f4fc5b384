use egui::{Pos2, Rect, Vec2};

/// Grab radius around a selection corner
pub const RESIZE_HANDLE_RADIUS: f32 = 8.0;

/// Represents a corner of a selection box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn position(self, rect: Rect) -> Pos2 {
        match self {
            Corner::TopLeft => rect.left_top(),
            Corner::TopRight => rect.right_top(),
            Corner::BottomLeft => rect.left_bottom(),
            Corner::BottomRight => rect.right_bottom(),
        }
    }

    /// The corner that stays fixed while this one is dragged
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// New bounds when this corner of `rect` is dragged to `pos`
    pub fn drag_to(self, rect: Rect, pos: Pos2) -> Rect {
        normalized_rect(self.opposite().position(rect), pos)
    }

    /// Finds the corner handle of `rect` under `pos`, if any
    pub fn hit(rect: Rect, pos: Pos2, radius: f32) -> Option<Corner> {
        Self::ALL
            .into_iter()
            .find(|corner| pos.distance(corner.position(rect)) <= radius)
    }
}

/// Rectangle spanned by a drag, regardless of drag direction
pub fn normalized_rect(a: Pos2, b: Pos2) -> Rect {
    Rect::from_two_pos(a, b)
}

/// Tight bounds of all rectangles, `None` for an empty input
pub fn union_rect(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects
        .into_iter()
        .filter(|rect| rect.is_finite())
        .reduce(|acc, rect| acc.union(rect))
}

/// Distance from a point to a line segment
pub fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec: Vec2 = line_end - line_start;
    let len_sq = line_vec.length_sq();
    if len_sq == 0.0 {
        return point.distance(line_start);
    }

    let t = ((point - line_start).dot(line_vec) / len_sq).clamp(0.0, 1.0);
    point.distance(line_start + line_vec * t)
}
