use egui::Pos2;
use log::debug;

use super::{DragHelper, Preview, Tool, ToolContext, ToolPhase};
use crate::annotation::factory;
use crate::command::Command;

/// Drag out an unfilled rectangle from any corner
#[derive(Debug, Clone, Default)]
pub struct RectangleTool {
    active: bool,
    drag: Option<DragHelper>,
}

impl RectangleTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for RectangleTool {
    fn name(&self) -> &'static str {
        "Rectangle"
    }

    fn phase(&self) -> ToolPhase {
        match (self.active, self.drag) {
            (_, Some(_)) => ToolPhase::Dragging,
            (true, None) => ToolPhase::Armed,
            (false, None) => ToolPhase::Idle,
        }
    }

    fn activate(&mut self) {
        self.active = true;
        self.drag = None;
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.drag = None;
    }

    fn on_pointer_down(&mut self, pos: Pos2, _ctx: &ToolContext<'_>) -> Option<Command> {
        self.drag = Some(DragHelper::new(pos));
        None
    }

    fn on_pointer_move(&mut self, pos: Pos2, _ctx: &ToolContext<'_>) -> Option<Command> {
        if let Some(drag) = &mut self.drag {
            drag.update(pos);
        }
        None
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        let mut drag = self.drag.take()?;
        drag.update(pos);

        if !drag.covers(ctx.config.min_gesture_size) {
            debug!("Rectangle too small ({:?}), discarded", drag.size());
            return None;
        }
        Some(Command::AddAnnotation(factory::create_rectangle(
            drag.rect(),
            ctx.color,
            ctx.stroke_width,
        )))
    }

    fn preview(&self, ctx: &ToolContext<'_>) -> Option<Preview> {
        self.drag.map(|drag| Preview::Rectangle {
            rect: drag.rect(),
            color: ctx.color,
            stroke_width: ctx.stroke_width,
        })
    }
}
