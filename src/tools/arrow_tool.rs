use egui::Pos2;
use log::debug;

use super::{DragHelper, Preview, Tool, ToolContext, ToolPhase};
use crate::annotation::factory;
use crate::command::Command;

/// Press at the tail, release at the head
#[derive(Debug, Clone, Default)]
pub struct ArrowTool {
    active: bool,
    drag: Option<DragHelper>,
}

impl ArrowTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for ArrowTool {
    fn name(&self) -> &'static str {
        "Arrow"
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

        if drag.length() < ctx.config.min_gesture_size {
            debug!("Arrow too short ({:.1}), discarded", drag.length());
            return None;
        }
        Some(Command::AddAnnotation(factory::create_arrow(
            drag.start(),
            drag.current(),
            ctx.color,
            ctx.stroke_width,
        )))
    }

    fn preview(&self, ctx: &ToolContext<'_>) -> Option<Preview> {
        self.drag.map(|drag| Preview::Arrow {
            start: drag.start(),
            end: drag.current(),
            color: ctx.color,
            stroke_width: ctx.stroke_width,
        })
    }
}
