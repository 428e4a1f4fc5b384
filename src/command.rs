use egui::{Color32, Rect, Vec2};
use log::debug;

use crate::annotation::{Annotation, Element};
use crate::error::{EditorError, EditorResult};
use crate::id_generator::AnnotationId;
use crate::surface::Surface;

/// What a command may touch while it runs
pub struct CommandContext<'a> {
    pub surface: &'a mut Surface,
    pub selection: &'a mut Option<AnnotationId>,
}

impl<'a> CommandContext<'a> {
    pub fn new(surface: &'a mut Surface, selection: &'a mut Option<AnnotationId>) -> Self {
        Self { surface, selection }
    }

    fn annotation_mut(&mut self, id: AnnotationId) -> EditorResult<&mut Annotation> {
        self.surface
            .annotation_mut(id)
            .ok_or(EditorError::AnnotationNotFound(id))
    }
}

/// Every mutation of the surface goes through one of these
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Place a finished annotation on top and select it
    AddAnnotation(Annotation),
    RemoveAnnotation(AnnotationId),
    /// Live move while dragging
    MoveAnnotation { id: AnnotationId, delta: Vec2 },
    /// Live resize while dragging a corner handle
    ResizeAnnotation { id: AnnotationId, new_rect: Rect },
    SetStrokeWidth { id: AnnotationId, width: f32 },
    SetColor { id: AnnotationId, color: Color32 },
    /// Live text edit, blank content is kept until the edit ends
    SetText { id: AnnotationId, content: String },
    /// Ends a text edit, dropping the annotation if nothing is left
    FinishTextEdit { id: AnnotationId },
    /// Pointer release after a move or resize
    FinishManipulation(AnnotationId),
    SetSelection(Option<AnnotationId>),
}

impl Command {
    pub fn execute(&self, ctx: &mut CommandContext<'_>) -> EditorResult {
        match self {
            Command::AddAnnotation(annotation) => {
                if ctx.surface.is_empty() {
                    return Err(EditorError::NoImage);
                }
                let id = ctx.surface.add(annotation.clone());
                debug!("Added {} {}", annotation.element_type(), id);
                *ctx.selection = Some(id);
                Ok(())
            }

            Command::RemoveAnnotation(id) => {
                ctx.surface
                    .remove(*id)
                    .ok_or(EditorError::AnnotationNotFound(*id))?;
                if *ctx.selection == Some(*id) {
                    *ctx.selection = None;
                }
                debug!("Removed annotation {}", id);
                Ok(())
            }

            Command::MoveAnnotation { id, delta } => {
                ctx.annotation_mut(*id)?.translate(*delta);
                Ok(())
            }

            Command::ResizeAnnotation { id, new_rect } => ctx.annotation_mut(*id)?.resize(*new_rect),

            Command::SetStrokeWidth { id, width } => {
                if !ctx.annotation_mut(*id)?.set_stroke_width(*width) {
                    debug!("Annotation {} has no adjustable stroke", id);
                }
                Ok(())
            }

            Command::SetColor { id, color } => {
                ctx.annotation_mut(*id)?.set_color(*color);
                Ok(())
            }

            Command::SetText { id, content } => {
                let annotation = ctx.annotation_mut(*id)?;
                let text = annotation
                    .as_text_mut()
                    .ok_or_else(|| EditorError::InvalidGeometry(format!("{} is not text", id)))?;
                text.set_content(content.clone());
                Ok(())
            }

            Command::FinishTextEdit { id } => {
                let blank = ctx
                    .surface
                    .annotation(*id)
                    .and_then(Annotation::as_text)
                    .map(|text| text.is_blank())
                    .ok_or(EditorError::AnnotationNotFound(*id))?;
                if blank {
                    debug!("Dropping empty text {}", id);
                    ctx.surface.remove(*id);
                    if *ctx.selection == Some(*id) {
                        *ctx.selection = None;
                    }
                }
                Ok(())
            }

            Command::FinishManipulation(id) => {
                if ctx.surface.annotation(*id).is_none() {
                    return Err(EditorError::AnnotationNotFound(*id));
                }
                Ok(())
            }

            Command::SetSelection(selection) => {
                *ctx.selection = *selection;
                Ok(())
            }
        }
    }

    /// Whether the surface bounds must be recomputed afterwards.
    ///
    /// Live drag and typing updates wait for their finishing command.
    pub fn triggers_expansion(&self) -> bool {
        !matches!(
            self,
            Command::MoveAnnotation { .. }
                | Command::ResizeAnnotation { .. }
                | Command::SetText { .. }
                | Command::SetSelection(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::factory;
    use crate::image_source::SourceImage;
    use crate::surface::BackgroundImage;
    use egui::{pos2, vec2};
    use image::RgbaImage;

    fn surface() -> Surface {
        let source = SourceImage::from_rgba(RgbaImage::new(400, 300)).unwrap();
        let mut surface = Surface::default();
        surface.set_background(BackgroundImage::fit(source, vec2(1200.0, 800.0)));
        surface
    }

    #[test]
    fn add_selects_the_new_annotation() {
        let mut surface = surface();
        let mut selection = None;
        let text = factory::create_text(pos2(10.0, 10.0), "Text", 24.0, Color32::RED);
        let id = text.id();
        Command::AddAnnotation(text)
            .execute(&mut CommandContext::new(&mut surface, &mut selection))
            .unwrap();
        assert_eq!(selection, Some(id));
        assert_eq!(surface.annotations().len(), 1);
    }

    #[test]
    fn add_without_image_fails() {
        let mut surface = Surface::default();
        let mut selection = None;
        let arrow = factory::create_arrow(pos2(0.0, 0.0), pos2(50.0, 0.0), Color32::RED, 3.0);
        let result = Command::AddAnnotation(arrow).execute(&mut CommandContext::new(&mut surface, &mut selection));
        assert!(matches!(result, Err(EditorError::NoImage)));
    }

    #[test]
    fn blank_text_is_dropped_on_finish() {
        let mut surface = surface();
        let mut selection = None;
        let text = factory::create_text(pos2(10.0, 10.0), "Text", 24.0, Color32::RED);
        let id = text.id();
        let mut ctx = CommandContext::new(&mut surface, &mut selection);
        Command::AddAnnotation(text).execute(&mut ctx).unwrap();
        Command::SetText { id, content: "   ".into() }.execute(&mut ctx).unwrap();
        Command::FinishTextEdit { id }.execute(&mut ctx).unwrap();
        assert!(surface.annotation(id).is_none());
        assert_eq!(selection, None);
    }

    #[test]
    fn live_updates_do_not_expand() {
        let id = crate::id_generator::generate_id();
        assert!(!Command::MoveAnnotation { id, delta: vec2(1.0, 0.0) }.triggers_expansion());
        assert!(Command::FinishManipulation(id).triggers_expansion());
        assert!(Command::RemoveAnnotation(id).triggers_expansion());
    }
}
