pub mod hit_testing;
pub mod transform;

pub use hit_testing::{Corner, RESIZE_HANDLE_RADIUS, distance_to_line_segment, normalized_rect, union_rect};
pub use transform::{DisplayTransform, display_size_for, fit_display_scale};
