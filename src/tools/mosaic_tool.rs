use std::time::{Duration, Instant};

use egui::Pos2;
use log::{debug, warn};

use super::{DragHelper, Preview, Tool, ToolContext, ToolPhase};
use crate::annotation::factory;
use crate::command::Command;
use crate::mosaic::{self, MosaicError};

/// Drag a region to pixelate. The patch is baked from source pixels on release.
#[derive(Debug, Clone, Default)]
pub struct MosaicTool {
    active: bool,
    drag: Option<DragHelper>,
}

impl MosaicTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for MosaicTool {
    fn name(&self) -> &'static str {
        "Mosaic"
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
            debug!("Mosaic region too small ({:?}), discarded", drag.size());
            return None;
        }
        let background = ctx.surface.background()?;

        // Only the part over the image counts towards the minimum size
        let covered = drag.rect().intersect(background.rect());
        let min = ctx.config.min_gesture_size;
        if covered.width() < min || covered.height() < min {
            debug!("Mosaic covers too little of the image ({:?}), discarded", covered);
            return None;
        }

        let deadline = Instant::now() + Duration::from_millis(ctx.config.mosaic_time_budget_ms);
        let result = mosaic::render_mosaic(
            background.source(),
            &background.transform(),
            drag.rect(),
            ctx.config.mosaic_block_size,
            || Instant::now() < deadline,
        );

        match result {
            Ok(patch) => Some(Command::AddAnnotation(factory::create_mosaic(patch.position, patch.pixels))),
            Err(MosaicError::EmptyRegion) => {
                debug!("Mosaic region {:?} is outside the image", drag.rect());
                None
            }
            Err(err) => {
                warn!("Mosaic not applied: {}", err);
                None
            }
        }
    }

    fn preview(&self, _ctx: &ToolContext<'_>) -> Option<Preview> {
        self.drag.map(|drag| Preview::Mosaic(drag.rect()))
    }
}
