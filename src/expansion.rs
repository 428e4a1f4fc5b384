use egui::{Vec2, vec2};
use log::debug;

use crate::annotation::Element;
use crate::config::EditorConfig;
use crate::geometry::union_rect;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpansionRules {
    pub padding: f32,
    pub tolerance: f32,
}

impl Default for ExpansionRules {
    fn default() -> Self {
        Self {
            padding: 20.0,
            tolerance: 1.0,
        }
    }
}

impl From<&EditorConfig> for ExpansionRules {
    fn from(config: &EditorConfig) -> Self {
        Self {
            padding: config.expansion_padding,
            tolerance: config.expansion_tolerance,
        }
    }
}

/// Target surface geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    /// Translation applied to the image and every annotation
    pub shift: Vec2,
}

/// Computes where the surface edges should be, `None` without an image.
pub fn compute_layout(surface: &Surface, rules: &ExpansionRules) -> Option<Layout> {
    let image = surface.background()?.rect();

    let mut left = image.min.x;
    let mut top = image.min.y;
    let mut right = image.max.x;
    let mut bottom = image.max.y;

    if let Some(objects) = union_rect(surface.annotations().iter().map(Element::rect)) {
        if objects.min.x < image.min.x {
            left = objects.min.x - rules.padding;
        }
        if objects.min.y < image.min.y {
            top = objects.min.y - rules.padding;
        }
        if objects.max.x > image.max.x {
            right = objects.max.x + rules.padding;
        }
        if objects.max.y > image.max.y {
            bottom = objects.max.y + rules.padding;
        }
    }

    // Whole pixels keep the surface size and image offset integral
    let left = left.floor();
    let top = top.floor();
    let right = right.ceil();
    let bottom = bottom.ceil();

    Some(Layout {
        width: (right - left).max(1.0) as u32,
        height: (bottom - top).max(1.0) as u32,
        shift: vec2(-left, -top),
    })
}

/// Whether `layout` differs from the current surface beyond the tolerance
pub fn needs_resize(surface: &Surface, layout: &Layout, rules: &ExpansionRules) -> bool {
    let dw = (layout.width as f32 - surface.width() as f32).abs();
    let dh = (layout.height as f32 - surface.height() as f32).abs();
    dw > rules.tolerance
        || dh > rules.tolerance
        || layout.shift.x.abs() > rules.tolerance
        || layout.shift.y.abs() > rules.tolerance
}

/// Grows or shrinks the surface around its content.
///
/// Returns true when the surface changed. Calling it again without touching
/// the annotations is a no-op.
pub fn apply(surface: &mut Surface, rules: &ExpansionRules) -> bool {
    let Some(layout) = compute_layout(surface, rules) else {
        return false;
    };
    if !needs_resize(surface, &layout, rules) {
        return false;
    }

    debug!(
        "Resizing surface {}x{} -> {}x{}, shift {:?}",
        surface.width(),
        surface.height(),
        layout.width,
        layout.height,
        layout.shift
    );
    surface.translate_content(layout.shift);
    surface.resize(layout.width, layout.height);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::factory;
    use crate::image_source::SourceImage;
    use crate::surface::BackgroundImage;
    use egui::{Color32, Pos2, Rect, pos2};
    use image::RgbaImage;

    fn surface() -> Surface {
        let source = SourceImage::from_rgba(RgbaImage::new(2000, 1200)).unwrap();
        let mut surface = Surface::default();
        surface.set_background(BackgroundImage::fit(source, vec2(1200.0, 800.0)));
        surface
    }

    fn rect_at(min: Pos2, size: Vec2) -> crate::annotation::Annotation {
        factory::create_rectangle(Rect::from_min_size(min, size), Color32::RED, 2.0)
    }

    #[test]
    fn inside_objects_do_not_resize() {
        let mut surface = surface();
        surface.add(rect_at(pos2(100.0, 100.0), vec2(50.0, 50.0)));
        assert!(!apply(&mut surface, &ExpansionRules::default()));
        assert_eq!((surface.width(), surface.height()), (1200, 720));
    }

    #[test]
    fn padding_only_on_protruding_side() {
        let mut surface = surface();
        // Stroke 2 puts the right edge at 1301
        surface.add(rect_at(pos2(1100.0, 100.0), vec2(200.0, 50.0)));
        assert!(apply(&mut surface, &ExpansionRules::default()));
        assert_eq!(surface.width(), 1321);
        assert_eq!(surface.height(), 720);
        assert_eq!(surface.background().unwrap().offset(), Pos2::ZERO);
    }

    #[test]
    fn growing_left_shifts_everything() {
        let mut surface = surface();
        let id = surface.add(rect_at(pos2(-50.0, 10.0), vec2(100.0, 100.0)));
        assert!(apply(&mut surface, &ExpansionRules::default()));

        // Left edge at -51 with stroke, padded to -71
        let background = surface.background().unwrap();
        assert_eq!(background.offset(), pos2(71.0, 0.0));
        assert_eq!(surface.width(), 1200 + 71);
        let moved = surface.annotation(id).unwrap().rect();
        assert!((moved.min.x - 20.0).abs() < 1e-3);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut surface = surface();
        surface.add(rect_at(pos2(-50.0, -40.0), vec2(1400.0, 900.0)));
        let rules = ExpansionRules::default();
        assert!(apply(&mut surface, &rules));
        let snapshot = (surface.width(), surface.height(), surface.background().unwrap().offset());
        assert!(!apply(&mut surface, &rules));
        assert_eq!(snapshot, (surface.width(), surface.height(), surface.background().unwrap().offset()));
    }

    #[test]
    fn removing_objects_shrinks_back() {
        let mut surface = surface();
        let id = surface.add(rect_at(pos2(-50.0, -40.0), vec2(100.0, 100.0)));
        let rules = ExpansionRules::default();
        apply(&mut surface, &rules);
        surface.remove(id);
        assert!(apply(&mut surface, &rules));
        assert_eq!((surface.width(), surface.height()), (1200, 720));
        assert_eq!(surface.background().unwrap().offset(), Pos2::ZERO);
    }

    #[test]
    fn no_background_is_a_no_op() {
        let mut surface = Surface::default();
        assert!(compute_layout(&surface, &ExpansionRules::default()).is_none());
        assert!(!apply(&mut surface, &ExpansionRules::default()));
    }
}
