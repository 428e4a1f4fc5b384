use egui::{Color32, Pos2, Vec2};
use log::{debug, info, warn};

use crate::annotation::{Annotation, AnnotationKind, Element};
use crate::command::{Command, CommandContext};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::expansion::{self, ExpansionRules};
use crate::export::{self, ExportFormat, FlattenedExport};
use crate::geometry::DisplayTransform;
use crate::id_generator::AnnotationId;
use crate::image_source::SourceImage;
use crate::surface::{BackgroundImage, Surface};
use crate::tools::{Preview, Tool, ToolContext, ToolKind, ToolType, new_tool};

pub const MIN_STROKE_WIDTH: f32 = 1.0;
pub const MAX_STROKE_WIDTH: f32 = 50.0;

/// Text annotation currently open in the edit overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEditSession {
    pub id: AnnotationId,
    select_all: bool,
}

/// Every mutation goes through [`EditorState::execute`], which re-fits the surface after committing commands
#[derive(Debug, Clone)]
pub struct EditorState {
    config: EditorConfig,
    surface: Surface,
    tool: ToolType,
    color: Color32,
    stroke_width: f32,
    selection: Option<AnnotationId>,
    editing: Option<TextEditSession>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorState {
    pub fn new(config: EditorConfig) -> Self {
        let mut tool = new_tool(ToolKind::None);
        tool.activate();
        Self {
            surface: Surface::new(config.surface_background32()),
            color: config.default_color32(),
            stroke_width: config.default_stroke_width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH),
            config,
            tool,
            selection: None,
            editing: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn has_image(&self) -> bool {
        !self.surface.is_empty()
    }

    pub fn tool(&self) -> &ToolType {
        &self.tool
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.tool.kind()
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn selection(&self) -> Option<AnnotationId> {
        self.selection
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.surface.annotation(self.selection?)
    }

    /// Id of the text being edited, if any
    pub fn editing(&self) -> Option<AnnotationId> {
        self.editing.map(|session| session.id)
    }

    /// Replaces the image and drops everything drawn on the previous one
    pub fn load_image(&mut self, source: SourceImage, viewport: Vec2) {
        self.reset_interaction();
        self.surface.set_background(BackgroundImage::fit(source, viewport));
    }

    pub fn load_image_bytes(&mut self, bytes: &[u8], viewport: Vec2) -> EditorResult {
        let source = SourceImage::decode(bytes)?;
        self.load_image(source, viewport);
        Ok(())
    }

    /// Drops the image, every annotation and the tool state
    pub fn clear(&mut self) {
        self.reset_interaction();
        self.surface.clear();
        info!("Editor cleared");
    }

    fn reset_interaction(&mut self) {
        self.editing = None;
        self.selection = None;
        self.switch_tool(ToolKind::None);
    }

    fn switch_tool(&mut self, kind: ToolKind) {
        self.tool.deactivate();
        self.tool = new_tool(kind);
        self.tool.activate();
    }

    pub fn select_tool(&mut self, kind: ToolKind) {
        if self.editing.is_some() {
            self.end_text_edit();
        }
        if kind != ToolKind::None {
            self.selection = None;
        }
        debug!("Tool: {} -> {}", self.tool.name(), kind.label());
        self.switch_tool(kind);
    }

    pub fn deselect_tool(&mut self) {
        self.select_tool(ToolKind::None);
    }

    /// Colour for new annotations, also applied to the selected one
    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
        if let Some(id) = self.selection {
            self.apply(Command::SetColor { id, color });
        }
    }

    /// Stroke for new annotations, applied live to a selected rectangle
    pub fn set_stroke_width(&mut self, width: f32) {
        let width = width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
        self.stroke_width = width;
        let id = self
            .selected_annotation()
            .filter(|annotation| annotation.kind() == AnnotationKind::Rectangle)
            .map(Element::id);
        if let Some(id) = id {
            self.apply(Command::SetStrokeWidth { id, width });
        }
    }

    fn dispatch(
        &mut self,
        handler: impl FnOnce(&mut ToolType, &ToolContext<'_>) -> Option<Command>,
    ) -> Option<Command> {
        let ctx = ToolContext {
            surface: &self.surface,
            config: &self.config,
            color: self.color,
            stroke_width: self.stroke_width,
            selection: self.selection,
        };
        handler(&mut self.tool, &ctx)
    }

    /// Pointer input is ignored until an image is loaded
    pub fn pointer_down(&mut self, pos: Pos2) {
        if !self.has_image() {
            return;
        }
        if self.editing.is_some() {
            self.end_text_edit();
        }
        if let Some(command) = self.dispatch(|tool, ctx| tool.on_pointer_down(pos, ctx)) {
            self.commit(command);
        }
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        if !self.has_image() {
            return;
        }
        if let Some(command) = self.dispatch(|tool, ctx| tool.on_pointer_move(pos, ctx)) {
            self.commit(command);
        }
    }

    pub fn pointer_up(&mut self, pos: Pos2) {
        if !self.has_image() {
            return;
        }
        if let Some(command) = self.dispatch(|tool, ctx| tool.on_pointer_up(pos, ctx)) {
            self.commit(command);
        }
    }

    /// Double click on a text annotation re-opens it for editing
    pub fn double_click(&mut self, pos: Pos2) {
        if self.tool_kind() != ToolKind::None {
            return;
        }
        let target = self.surface.topmost_at(pos).filter(|id| {
            self.surface
                .annotation(*id)
                .is_some_and(Element::is_editable)
        });
        if let Some(id) = target {
            self.begin_text_edit(id);
        }
    }

    /// Runs a tool command, then handles placement of new annotations
    fn commit(&mut self, command: Command) {
        let placed = matches!(command, Command::AddAnnotation(_));
        if !self.apply(command) || !placed {
            return;
        }

        // Every tool hands back to selection once it has placed something
        self.switch_tool(ToolKind::None);
        let new_text = self
            .selected_annotation()
            .filter(|annotation| annotation.kind() == AnnotationKind::Text)
            .map(Element::id);
        if let Some(id) = new_text {
            self.begin_text_edit(id);
        }
    }

    /// Executes and logs failures. Rejected geometry leaves things as they were.
    fn apply(&mut self, command: Command) -> bool {
        match self.execute(command) {
            Ok(()) => true,
            Err(EditorError::InvalidGeometry(reason)) => {
                debug!("Ignored: {}", reason);
                false
            }
            Err(err) => {
                warn!("Command failed: {}", err);
                false
            }
        }
    }

    /// Executes a command and re-fits the surface if it committed a change
    pub fn execute(&mut self, command: Command) -> EditorResult {
        let expand = command.triggers_expansion();
        command.execute(&mut CommandContext::new(&mut self.surface, &mut self.selection))?;

        if let Some(session) = self.editing {
            if self.surface.annotation(session.id).is_none() {
                self.editing = None;
            }
        }
        if expand {
            expansion::apply(&mut self.surface, &ExpansionRules::from(&self.config));
        }
        Ok(())
    }

    pub fn begin_text_edit(&mut self, id: AnnotationId) {
        if self.surface.annotation(id).and_then(Annotation::as_text).is_none() {
            return;
        }
        self.selection = Some(id);
        self.editing = Some(TextEditSession { id, select_all: true });
    }

    /// Live update from the edit overlay
    pub fn update_text(&mut self, content: impl Into<String>) {
        if let Some(session) = self.editing {
            self.apply(Command::SetText {
                id: session.id,
                content: content.into(),
            });
        }
    }

    /// Closes the overlay. Text left blank is removed.
    pub fn end_text_edit(&mut self) {
        if let Some(session) = self.editing.take() {
            self.apply(Command::FinishTextEdit { id: session.id });
        }
    }

    /// True once after an edit session starts, the overlay then selects all
    pub fn take_select_all_request(&mut self) -> bool {
        match &mut self.editing {
            Some(session) => std::mem::take(&mut session.select_all),
            None => false,
        }
    }

    /// Removes the selected annotation. Does nothing while a text is edited.
    pub fn delete_selected(&mut self) -> bool {
        if self.editing.is_some() {
            return false;
        }
        match self.selection {
            Some(id) => self.apply(Command::RemoveAnnotation(id)),
            None => false,
        }
    }

    /// Leaves edit mode, else clears the selection, else drops the tool
    pub fn escape(&mut self) {
        if self.editing.is_some() {
            self.end_text_edit();
        } else if self.selection.is_some() {
            self.selection = None;
        } else if self.tool_kind() != ToolKind::None {
            self.deselect_tool();
        }
    }

    pub fn display_transform(&self) -> Option<DisplayTransform> {
        self.surface.background().map(BackgroundImage::transform)
    }

    pub fn to_source_space(&self, surface_point: Pos2) -> Option<Pos2> {
        Some(self.display_transform()?.to_source_space(surface_point))
    }

    pub fn to_surface_space(&self, source_point: Pos2) -> Option<Pos2> {
        Some(self.display_transform()?.to_surface_space(source_point))
    }

    pub fn preview(&self) -> Option<Preview> {
        let ctx = ToolContext {
            surface: &self.surface,
            config: &self.config,
            color: self.color,
            stroke_width: self.stroke_width,
            selection: self.selection,
        };
        self.tool.preview(&ctx)
    }

    /// Surface to output scale, `None` without an image
    pub fn export_multiplier(&self) -> Option<f32> {
        let background = self.surface.background()?;
        Some(export::export_multiplier(
            background.source().width(),
            self.surface.width(),
            self.config.export_fraction,
        ))
    }

    pub fn flatten_for_export(&self) -> EditorResult<FlattenedExport> {
        let multiplier = self.export_multiplier().ok_or(EditorError::NoImage)?;
        let image = export::flatten(&self.surface, multiplier)?;
        Ok(FlattenedExport::new(image, self.config.jpeg_quality))
    }

    pub fn export(&self, format: ExportFormat) -> EditorResult<Vec<u8>> {
        Ok(self.flatten_for_export()?.encode(format)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};
    use image::RgbaImage;

    fn editor() -> EditorState {
        let mut editor = EditorState::default();
        let source = SourceImage::from_rgba(RgbaImage::new(400, 300)).unwrap();
        editor.load_image(source, vec2(1200.0, 800.0));
        editor
    }

    #[test]
    fn stroke_width_is_clamped() {
        let mut editor = editor();
        editor.set_stroke_width(0.0);
        assert_eq!(editor.stroke_width(), MIN_STROKE_WIDTH);
        editor.set_stroke_width(500.0);
        assert_eq!(editor.stroke_width(), MAX_STROKE_WIDTH);
    }

    #[test]
    fn select_all_is_requested_once() {
        let mut editor = editor();
        editor.select_tool(ToolKind::Text);
        editor.pointer_down(pos2(20.0, 20.0));
        editor.pointer_up(pos2(20.0, 20.0));
        assert!(editor.editing().is_some());
        assert!(editor.take_select_all_request());
        assert!(!editor.take_select_all_request());
    }

    #[test]
    fn escape_unwinds_one_level_at_a_time() {
        let mut editor = editor();
        editor.select_tool(ToolKind::Arrow);
        editor.escape();
        assert_eq!(editor.tool_kind(), ToolKind::None);

        editor.select_tool(ToolKind::Text);
        editor.pointer_down(pos2(20.0, 20.0));
        editor.pointer_up(pos2(20.0, 20.0));
        editor.escape();
        assert!(editor.editing().is_none());
        assert!(editor.selection().is_some());
        editor.escape();
        assert!(editor.selection().is_none());
    }
}
