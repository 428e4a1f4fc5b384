use egui::text::{CCursor, CCursorRange};
use egui::{FontId, Pos2, Response, Sense, TextEdit, UiBuilder};

use crate::SnapmarkApp;
use crate::annotation::{Annotation, Element};

pub fn central_panel(app: &mut SnapmarkApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        app.controller_mut().set_viewport(ui.available_size());

        if !app.state().has_image() {
            ui.centered_and_justified(|ui| {
                ui.label("Capture a region or open an image to start");
            });
            return;
        }

        egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
            let size = app.state().surface().size();
            let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
            let origin = response.rect.min;

            handle_pointer(app, ui, &response, origin);
            app.render_surface(&painter, origin);
            text_overlay(app, ui, origin);
        });
    });
}

fn handle_pointer(app: &mut SnapmarkApp, ui: &egui::Ui, response: &Response, origin: Pos2) {
    let (pressed, released, pointer) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.interact_pos(),
        )
    });
    let Some(pointer) = pointer else {
        return;
    };
    let pos = (pointer - origin).to_pos2();

    if pressed && response.hovered() {
        app.set_pointer_captured(true);
        app.state_mut().pointer_down(pos);
    } else if app.pointer_captured() {
        if released {
            app.set_pointer_captured(false);
            app.state_mut().pointer_up(pos);
        } else {
            app.state_mut().pointer_move(pos);
        }
    }

    if response.double_clicked() {
        app.state_mut().double_click(pos);
    }
}

/// Inline editor placed over the text being edited
fn text_overlay(app: &mut SnapmarkApp, ui: &mut egui::Ui, origin: Pos2) {
    let Some(id) = app.state().editing() else {
        return;
    };
    let Some(text) = app.state().surface().annotation(id).and_then(Annotation::as_text).cloned() else {
        return;
    };

    let mut content = text.content().to_owned();
    let rect = text.rect().translate(origin.to_vec2());
    let rect = egui::Rect::from_min_size(rect.min, rect.size().max(egui::vec2(text.font_size() * 4.0, 0.0)));
    let edit_id = egui::Id::new(("text_edit", id.value()));

    let output = ui
        .allocate_new_ui(UiBuilder::new().max_rect(rect), |ui| {
            TextEdit::multiline(&mut content)
                .id(edit_id)
                .font(FontId::proportional(text.font_size()))
                .text_color(text.color())
                .frame(false)
                .desired_rows(1)
                .desired_width(rect.width())
                .show(ui)
        })
        .inner;

    if output.response.changed() {
        app.state_mut().update_text(content.clone());
    }

    if app.state_mut().take_select_all_request() {
        let mut state = output.state.clone();
        let end = CCursor::new(content.chars().count());
        state.cursor.set_char_range(Some(CCursorRange::two(CCursor::new(0), end)));
        state.store(ui.ctx(), output.response.id);
        output.response.request_focus();
    } else if output.response.lost_focus() {
        app.state_mut().end_text_edit();
    }
}
