use egui::Pos2;

use super::{Tool, ToolContext, ToolPhase};
use crate::annotation::factory;
use crate::command::Command;

/// Click to place placeholder text. Editing happens in the text overlay.
#[derive(Debug, Clone, Default)]
pub struct TextTool {
    active: bool,
    pressed_at: Option<Pos2>,
}

impl TextTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for TextTool {
    fn name(&self) -> &'static str {
        "Text"
    }

    fn phase(&self) -> ToolPhase {
        match (self.active, self.pressed_at) {
            (_, Some(_)) => ToolPhase::Dragging,
            (true, None) => ToolPhase::Armed,
            (false, None) => ToolPhase::Idle,
        }
    }

    fn activate(&mut self) {
        self.active = true;
        self.pressed_at = None;
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.pressed_at = None;
    }

    fn on_pointer_down(&mut self, pos: Pos2, _ctx: &ToolContext<'_>) -> Option<Command> {
        self.pressed_at = Some(pos);
        None
    }

    fn on_pointer_move(&mut self, _pos: Pos2, _ctx: &ToolContext<'_>) -> Option<Command> {
        None
    }

    // The text lands where the press happened, wherever the release is
    fn on_pointer_up(&mut self, _pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        let position = self.pressed_at.take()?;
        Some(Command::AddAnnotation(factory::create_text(
            position,
            ctx.config.text_placeholder.clone(),
            ctx.config.text_font_size,
            ctx.color,
        )))
    }
}
