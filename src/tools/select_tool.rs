use egui::{Pos2, Rect};
use log::debug;

use super::{Tool, ToolContext, ToolPhase};
use crate::annotation::Element;
use crate::command::Command;
use crate::geometry::{Corner, RESIZE_HANDLE_RADIUS};
use crate::id_generator::AnnotationId;

#[derive(Debug, Clone, PartialEq)]
pub enum SelectState {
    Idle,
    Moving {
        id: AnnotationId,
        last_pos: Pos2,
        moved: bool,
    },
    Resizing {
        id: AnnotationId,
        corner: Corner,
        original_rect: Rect,
        moved: bool,
    },
}

/// Active whenever no drawing tool is: picks, moves and resizes annotations
#[derive(Debug, Clone)]
pub struct SelectTool {
    state: SelectState,
    pub handle_size: f32,
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            state: SelectState::Idle,
            handle_size: RESIZE_HANDLE_RADIUS,
        }
    }

    pub fn state(&self) -> &SelectState {
        &self.state
    }

    fn handle_under(&self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<(AnnotationId, Corner, Rect)> {
        let id = ctx.selection?;
        let rect = ctx.surface.annotation(id)?.rect();
        Corner::hit(rect, pos, self.handle_size).map(|corner| (id, corner, rect))
    }
}

impl Tool for SelectTool {
    fn name(&self) -> &'static str {
        "Select"
    }

    fn phase(&self) -> ToolPhase {
        match self.state {
            SelectState::Idle => ToolPhase::Armed,
            _ => ToolPhase::Dragging,
        }
    }

    fn activate(&mut self) {
        self.state = SelectState::Idle;
    }

    fn deactivate(&mut self) {
        self.state = SelectState::Idle;
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        // Handles of the current selection win over whatever lies beneath
        if let Some((id, corner, original_rect)) = self.handle_under(pos, ctx) {
            debug!("Resizing {} from {:?}", id, corner);
            self.state = SelectState::Resizing {
                id,
                corner,
                original_rect,
                moved: false,
            };
            return None;
        }

        match ctx.surface.topmost_at(pos) {
            Some(id) => {
                self.state = SelectState::Moving {
                    id,
                    last_pos: pos,
                    moved: false,
                };
                (ctx.selection != Some(id)).then_some(Command::SetSelection(Some(id)))
            }
            None => {
                self.state = SelectState::Idle;
                ctx.selection.map(|_| Command::SetSelection(None))
            }
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, _ctx: &ToolContext<'_>) -> Option<Command> {
        match &mut self.state {
            SelectState::Idle => None,
            SelectState::Moving { id, last_pos, moved } => {
                let delta = pos - *last_pos;
                if delta == egui::Vec2::ZERO {
                    return None;
                }
                *last_pos = pos;
                *moved = true;
                Some(Command::MoveAnnotation { id: *id, delta })
            }
            SelectState::Resizing {
                id,
                corner,
                original_rect,
                moved,
            } => {
                *moved = true;
                Some(Command::ResizeAnnotation {
                    id: *id,
                    new_rect: corner.drag_to(*original_rect, pos),
                })
            }
        }
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _ctx: &ToolContext<'_>) -> Option<Command> {
        match std::mem::replace(&mut self.state, SelectState::Idle) {
            SelectState::Moving { id, moved: true, .. } | SelectState::Resizing { id, moved: true, .. } => {
                Some(Command::FinishManipulation(id))
            }
            _ => None,
        }
    }
}
