use egui::{Color32, Pos2, Rect};
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::config::EditorConfig;
use crate::id_generator::AnnotationId;
use crate::surface::Surface;

mod arrow_tool;
mod drag_helper;
mod mosaic_tool;
mod rectangle_tool;
mod select_tool;
mod text_tool;

pub use arrow_tool::ArrowTool;
pub use drag_helper::DragHelper;
pub use mosaic_tool::MosaicTool;
pub use rectangle_tool::RectangleTool;
pub use select_tool::{SelectState, SelectTool};
pub use text_tool::TextTool;

/// Gesture state shared by the drawing tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolPhase {
    /// Not the active tool
    Idle,
    /// Active, waiting for a press
    Armed,
    /// Pointer is down and a gesture is in progress
    Dragging,
}

/// Everything a tool may read while handling pointer input
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub surface: &'a Surface,
    pub config: &'a EditorConfig,
    pub color: Color32,
    pub stroke_width: f32,
    pub selection: Option<AnnotationId>,
}

/// Transient shape drawn while a gesture is in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preview {
    Arrow {
        start: Pos2,
        end: Pos2,
        color: Color32,
        stroke_width: f32,
    },
    Rectangle {
        rect: Rect,
        color: Color32,
        stroke_width: f32,
    },
    /// Dashed outline of the region to pixelate
    Mosaic(Rect),
}

/// Tool trait defines the interface for all annotation tools
pub trait Tool {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    fn phase(&self) -> ToolPhase;

    /// Called when the tool is selected
    fn activate(&mut self);

    /// Called when the tool is deselected, drops any gesture in progress
    fn deactivate(&mut self);

    /// Handle pointer press on the surface.
    /// Return a Command if the press alone changes something.
    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command>;

    /// Handle pointer drag while the pointer is held down
    fn on_pointer_move(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command>;

    /// Handle pointer release.
    /// Return a Command to commit the gesture if it qualifies.
    fn on_pointer_up(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command>;

    /// Shape to draw for the gesture in progress
    fn preview(&self, _ctx: &ToolContext<'_>) -> Option<Preview> {
        None
    }
}

/// Tool selector as shown in the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    /// No drawing tool, pointer selects and manipulates annotations
    #[default]
    None,
    Arrow,
    Text,
    Rectangle,
    Mosaic,
}

impl ToolKind {
    pub const DRAWING: [ToolKind; 4] = [ToolKind::Arrow, ToolKind::Text, ToolKind::Rectangle, ToolKind::Mosaic];

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::None => "Select",
            ToolKind::Arrow => "Arrow",
            ToolKind::Text => "Text",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Mosaic => "Mosaic",
        }
    }
}

/// Enum representing all available tool types
/// This allows us to avoid using Box<dyn Tool> and simplifies memory management
#[derive(Debug, Clone)]
pub enum ToolType {
    Select(SelectTool),
    Arrow(ArrowTool),
    Text(TextTool),
    Rectangle(RectangleTool),
    Mosaic(MosaicTool),
}

impl Default for ToolType {
    fn default() -> Self {
        new_tool(ToolKind::None)
    }
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Select(tool) => tool.name(),
            Self::Arrow(tool) => tool.name(),
            Self::Text(tool) => tool.name(),
            Self::Rectangle(tool) => tool.name(),
            Self::Mosaic(tool) => tool.name(),
        }
    }

    fn phase(&self) -> ToolPhase {
        match self {
            Self::Select(tool) => tool.phase(),
            Self::Arrow(tool) => tool.phase(),
            Self::Text(tool) => tool.phase(),
            Self::Rectangle(tool) => tool.phase(),
            Self::Mosaic(tool) => tool.phase(),
        }
    }

    fn activate(&mut self) {
        match self {
            Self::Select(tool) => tool.activate(),
            Self::Arrow(tool) => tool.activate(),
            Self::Text(tool) => tool.activate(),
            Self::Rectangle(tool) => tool.activate(),
            Self::Mosaic(tool) => tool.activate(),
        }
    }

    fn deactivate(&mut self) {
        match self {
            Self::Select(tool) => tool.deactivate(),
            Self::Arrow(tool) => tool.deactivate(),
            Self::Text(tool) => tool.deactivate(),
            Self::Rectangle(tool) => tool.deactivate(),
            Self::Mosaic(tool) => tool.deactivate(),
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        match self {
            Self::Select(tool) => tool.on_pointer_down(pos, ctx),
            Self::Arrow(tool) => tool.on_pointer_down(pos, ctx),
            Self::Text(tool) => tool.on_pointer_down(pos, ctx),
            Self::Rectangle(tool) => tool.on_pointer_down(pos, ctx),
            Self::Mosaic(tool) => tool.on_pointer_down(pos, ctx),
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        match self {
            Self::Select(tool) => tool.on_pointer_move(pos, ctx),
            Self::Arrow(tool) => tool.on_pointer_move(pos, ctx),
            Self::Text(tool) => tool.on_pointer_move(pos, ctx),
            Self::Rectangle(tool) => tool.on_pointer_move(pos, ctx),
            Self::Mosaic(tool) => tool.on_pointer_move(pos, ctx),
        }
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        match self {
            Self::Select(tool) => tool.on_pointer_up(pos, ctx),
            Self::Arrow(tool) => tool.on_pointer_up(pos, ctx),
            Self::Text(tool) => tool.on_pointer_up(pos, ctx),
            Self::Rectangle(tool) => tool.on_pointer_up(pos, ctx),
            Self::Mosaic(tool) => tool.on_pointer_up(pos, ctx),
        }
    }

    fn preview(&self, ctx: &ToolContext<'_>) -> Option<Preview> {
        match self {
            Self::Select(tool) => tool.preview(ctx),
            Self::Arrow(tool) => tool.preview(ctx),
            Self::Text(tool) => tool.preview(ctx),
            Self::Rectangle(tool) => tool.preview(ctx),
            Self::Mosaic(tool) => tool.preview(ctx),
        }
    }
}

// Factory function to create a new tool of the specified kind
pub fn new_tool(kind: ToolKind) -> ToolType {
    match kind {
        ToolKind::None => ToolType::Select(SelectTool::new()),
        ToolKind::Arrow => ToolType::Arrow(ArrowTool::new()),
        ToolKind::Text => ToolType::Text(TextTool::new()),
        ToolKind::Rectangle => ToolType::Rectangle(RectangleTool::new()),
        ToolKind::Mosaic => ToolType::Mosaic(MosaicTool::new()),
    }
}

impl ToolType {
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Select(_) => ToolKind::None,
            Self::Arrow(_) => ToolKind::Arrow,
            Self::Text(_) => ToolKind::Text,
            Self::Rectangle(_) => ToolKind::Rectangle,
            Self::Mosaic(_) => ToolKind::Mosaic,
        }
    }

    pub fn as_select_tool(&self) -> Option<&SelectTool> {
        match self {
            Self::Select(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.phase() == ToolPhase::Dragging
    }
}
