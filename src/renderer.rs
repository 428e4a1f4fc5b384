use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2, pos2};
use log::warn;

use crate::annotation::{Annotation, Arrow, Element, MosaicPatch, Rectangle, Text, arrow};
use crate::geometry::{Corner, RESIZE_HANDLE_RADIUS};
use crate::state::EditorState;
use crate::surface::BackgroundImage;
use crate::texture_manager::{TextureKey, TextureManager, color_image};
use crate::tools::Preview;

const SELECTION_COLOR: Color32 = Color32::from_rgb(0x1e, 0x88, 0xe5);
const DASH_LENGTH: f32 = 6.0;
const GAP_LENGTH: f32 = 4.0;

/// Draws the surface and its annotations with the egui painter
pub struct Renderer {
    textures: TextureManager,
    ctx: egui::Context,
}

impl Renderer {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            textures: TextureManager::default(),
            ctx,
        }
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    /// Paints everything with the surface origin at `origin` in screen space
    pub fn render(&mut self, painter: &Painter, origin: Pos2, state: &EditorState) {
        self.textures.begin_frame();
        let surface = state.surface();
        let offset = origin.to_vec2();

        painter.rect_filled(surface.rect().translate(offset), 0.0, surface.background_color());
        if let Some(background) = surface.background() {
            self.draw_background(painter, background, offset);
        }

        for annotation in surface.annotations() {
            match annotation {
                Annotation::Arrow(arrow) => draw_arrow(painter, arrow, offset),
                Annotation::Rectangle(rect) => draw_rectangle(painter, rect, offset),
                // The edit overlay shows the text while it is being typed
                Annotation::Text(text) if state.editing() == Some(text.id()) => {}
                Annotation::Text(text) => draw_text(painter, text, offset),
                Annotation::Mosaic(patch) => self.draw_mosaic(painter, patch, offset),
            }
        }

        if let Some(selected) = state.selected_annotation() {
            draw_selection(painter, selected.rect().translate(offset), state.editing().is_none());
        }
        if let Some(preview) = state.preview() {
            draw_preview(painter, &preview, offset);
        }

        self.textures.retain_used_this_frame();
    }

    fn draw_background(&mut self, painter: &Painter, background: &BackgroundImage, offset: Vec2) {
        let source = background.source();
        let texture = self.textures.get_or_create_texture(
            TextureKey::Background,
            background.pixel_version(),
            || color_image(source.pixels()),
            &self.ctx,
        );
        match texture {
            Ok(texture) => {
                painter.image(texture, background.rect().translate(offset), full_uv(), Color32::WHITE);
            }
            Err(err) => warn!("Background texture unavailable: {}", err),
        }
    }

    fn draw_mosaic(&mut self, painter: &Painter, patch: &MosaicPatch, offset: Vec2) {
        let texture = self.textures.get_or_create_texture(
            TextureKey::Mosaic(patch.id()),
            patch.pixel_version(),
            || color_image(patch.pixels()),
            &self.ctx,
        );
        match texture {
            Ok(texture) => {
                painter.image(texture, patch.rect().translate(offset), full_uv(), Color32::WHITE);
            }
            Err(err) => warn!("Mosaic texture unavailable: {}", err),
        }
    }
}

fn full_uv() -> Rect {
    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0))
}

fn arrow_shapes(start: Pos2, end: Pos2, head: [Pos2; 3], color: Color32, stroke_width: f32) -> [Shape; 2] {
    [
        Shape::line_segment([start, end], Stroke::new(stroke_width, color)),
        Shape::convex_polygon(head.to_vec(), color, Stroke::NONE),
    ]
}

fn draw_arrow(painter: &Painter, arrow: &Arrow, offset: Vec2) {
    let head = arrow.head_points().map(|p| p + offset);
    painter.extend(arrow_shapes(
        arrow.start() + offset,
        arrow.end() + offset,
        head,
        arrow.color(),
        arrow.stroke_width(),
    ));
}

fn draw_rectangle(painter: &Painter, rect: &Rectangle, offset: Vec2) {
    painter.rect_stroke(
        rect.bounds().translate(offset),
        0.0,
        Stroke::new(rect.stroke_width(), rect.color()),
    );
}

fn draw_text(painter: &Painter, text: &Text, offset: Vec2) {
    painter.text(
        text.position() + offset,
        Align2::LEFT_TOP,
        text.content(),
        FontId::proportional(text.font_size()),
        text.color(),
    );
}

fn dashed_outline(rect: Rect, stroke: Stroke) -> Vec<Shape> {
    let corners = [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom(), rect.left_top()];
    Shape::dashed_line(&corners, stroke, DASH_LENGTH, GAP_LENGTH)
}

fn draw_selection(painter: &Painter, rect: Rect, with_handles: bool) {
    painter.extend(dashed_outline(rect, Stroke::new(1.0, SELECTION_COLOR)));
    if !with_handles {
        return;
    }
    for corner in Corner::ALL {
        let center = corner.position(rect);
        painter.circle(center, RESIZE_HANDLE_RADIUS / 2.0, Color32::WHITE, Stroke::new(1.5, SELECTION_COLOR));
    }
}

fn draw_preview(painter: &Painter, preview: &Preview, offset: Vec2) {
    match *preview {
        Preview::Arrow {
            start,
            end,
            color,
            stroke_width,
        } => {
            let head = arrow::head_points(start, end, stroke_width).map(|p| p + offset);
            painter.extend(arrow_shapes(start + offset, end + offset, head, color, stroke_width));
        }
        Preview::Rectangle {
            rect,
            color,
            stroke_width,
        } => {
            painter.rect_stroke(rect.translate(offset), 0.0, Stroke::new(stroke_width, color));
        }
        Preview::Mosaic(rect) => {
            let rect = rect.translate(offset);
            painter.rect_filled(rect, 0.0, Color32::from_black_alpha(40));
            painter.extend(dashed_outline(rect, Stroke::new(1.5, Color32::WHITE)));
        }
    }
}
