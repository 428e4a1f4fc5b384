use egui::{Key, Painter, Pos2};
use serde::{Deserialize, Serialize};

use crate::config::{EditorConfig, color_from_array, color_to_array};
use crate::controller::{EditorController, Notice};
use crate::error::{EditorError, EditorResult};
use crate::file_handler::FileHandler;
use crate::panels::{self, NoticeBoard};
use crate::renderer::Renderer;
use crate::shell::NativeShell;
use crate::state::EditorState;

/// What survives a restart.
/// We derive Deserialize/Serialize so we can persist settings on shutdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct PersistedSettings {
    pub config: EditorConfig,
    pub color: [u8; 4],
    pub stroke_width: f32,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        let config = EditorConfig::default();
        Self {
            color: config.default_color,
            stroke_width: config.default_stroke_width,
            config,
        }
    }
}

impl PersistedSettings {
    fn into_state(self) -> EditorState {
        let mut state = EditorState::new(self.config);
        state.set_color(color_from_array(self.color));
        state.set_stroke_width(self.stroke_width);
        state
    }

    fn from_state(state: &EditorState) -> Self {
        Self {
            config: state.config().clone(),
            color: color_to_array(state.color()),
            stroke_width: state.stroke_width(),
        }
    }
}

pub struct SnapmarkApp {
    controller: EditorController<NativeShell>,
    renderer: Renderer,
    file_handler: FileHandler,
    notices: NoticeBoard,
    pointer_captured: bool,
}

impl SnapmarkApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, shell: NativeShell) -> Self {
        let settings: PersistedSettings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let mut controller = EditorController::new(shell, settings.into_state());
        if let Err(err) = controller.request_permission_check() {
            log::warn!("Permission check not started: {}", err);
        }

        Self {
            controller,
            renderer: Renderer::new(cc.egui_ctx.clone()),
            file_handler: FileHandler::new(),
            notices: NoticeBoard::default(),
            pointer_captured: false,
        }
    }

    pub fn controller(&self) -> &EditorController<NativeShell> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut EditorController<NativeShell> {
        &mut self.controller
    }

    pub fn state(&self) -> &EditorState {
        self.controller.state()
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        self.controller.state_mut()
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn dismiss_notice(&mut self, index: usize) {
        self.notices.dismiss(index);
    }

    pub fn pointer_captured(&self) -> bool {
        self.pointer_captured
    }

    pub fn set_pointer_captured(&mut self, captured: bool) {
        self.pointer_captured = captured;
    }

    /// Starts a shell request, surfacing failures in the notice bar
    pub fn request(&mut self, start: impl FnOnce(&mut EditorController<NativeShell>) -> EditorResult) {
        match start(&mut self.controller) {
            Ok(()) => {}
            Err(EditorError::RequestInFlight(kind)) => log::debug!("{} already running", kind),
            Err(err) => {
                log::error!("Request failed: {}", err);
                self.notices.push(Notice::Failed(err.to_string()));
            }
        }
    }

    pub fn render_surface(&mut self, painter: &Painter, origin: Pos2) {
        self.renderer.render(painter, origin, self.controller.state());
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Keys belong to the text overlay while it has focus
        if ctx.wants_keyboard_input() {
            return;
        }
        let (delete, escape) = ctx.input(|i| {
            (
                i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace),
                i.key_pressed(Key::Escape),
            )
        });
        if delete {
            self.state_mut().delete_selected();
        }
        if escape {
            self.state_mut().escape();
        }
    }
}

impl eframe::App for SnapmarkApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &PersistedSettings::from_state(self.state()));
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(trigger) = self.file_handler.check_for_dropped_files(ctx) {
            self.controller.handle_trigger(trigger);
        }
        let notices = self.controller.poll();
        self.notices.extend(notices);

        self.handle_shortcuts(ctx);

        panels::tools_panel(self, ctx);
        panels::notice_bar(self, ctx);
        panels::central_panel(self, ctx);

        // Keep polling while the shell is working off-thread
        if self.controller.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }
}
