use egui::color_picker::{self, Alpha};
use egui::{Button, SelectableLabel, Slider};

use crate::SnapmarkApp;
use crate::shell::RequestKind;
use crate::state::{MAX_STROKE_WIDTH, MIN_STROKE_WIDTH};
use crate::tools::ToolKind;

pub fn tools_panel(app: &mut SnapmarkApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("tools_panel").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            let capturing = app.controller().in_flight(RequestKind::Capture);
            if ui.add_enabled(!capturing, Button::new("📷 Capture")).clicked() {
                app.request(|controller| controller.request_capture());
            }
            let opening = app.controller().in_flight(RequestKind::Open);
            if ui.add_enabled(!opening, Button::new("📂 Open")).clicked() {
                app.request(|controller| controller.request_open());
            }

            ui.separator();

            let has_image = app.state().has_image();
            let active = app.state().tool_kind();
            for kind in ToolKind::DRAWING {
                let selected = active == kind;
                if ui.add_enabled(has_image, SelectableLabel::new(selected, kind.label())).clicked() {
                    // Clicking the active tool again puts it down
                    if selected {
                        app.state_mut().deselect_tool();
                    } else {
                        log::info!("Tool selected from UI: {}", kind.label());
                        app.state_mut().select_tool(kind);
                    }
                }
            }

            ui.separator();

            let mut color = app.state().color();
            if color_picker::color_edit_button_srgba(ui, &mut color, Alpha::Opaque).changed() {
                app.state_mut().set_color(color);
            }
            let mut width = app.state().stroke_width();
            if ui
                .add(Slider::new(&mut width, MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).text("Stroke"))
                .changed()
            {
                app.state_mut().set_stroke_width(width);
            }

            ui.separator();

            let has_selection = app.state().selection().is_some();
            if ui.add_enabled(has_selection, Button::new("🗑 Delete")).clicked() {
                app.state_mut().delete_selected();
            }
            if ui.add_enabled(has_image, Button::new("Clear")).clicked() {
                app.state_mut().clear();
            }

            ui.separator();

            let copying = app.controller().in_flight(RequestKind::Copy);
            if ui.add_enabled(has_image && !copying, Button::new("📋 Copy")).clicked() {
                app.request(|controller| controller.request_copy());
            }
            let saving = app.controller().in_flight(RequestKind::Save);
            if ui.add_enabled(has_image && !saving, Button::new("💾 Save")).clicked() {
                app.request(|controller| controller.request_save());
            }
        });
    });
}
