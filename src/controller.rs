use std::path::PathBuf;

use egui::Vec2;
use futures::channel::{mpsc, oneshot};
use log::{debug, error, info, warn};

use crate::error::{EditorError, EditorResult};
use crate::export::ExportFormat;
use crate::shell::{
    CaptureTrigger, ClipboardResult, ImageData, PermissionStatus, Reply, RequestKind, SaveResult, Shell, ShellError,
    ShellResult,
};
use crate::state::EditorState;

/// Outcome worth telling the user about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Loaded,
    Copied,
    Saved(PathBuf),
    /// Capture permission is missing; opening files still works
    PermissionRequired,
    Failed(String),
}

/// One in-flight request per kind, completions applied by `poll` on the UI thread
pub struct EditorController<S: Shell> {
    shell: S,
    state: EditorState,
    viewport: Vec2,
    triggers: Option<mpsc::UnboundedReceiver<CaptureTrigger>>,
    capture: Option<Reply<Option<PathBuf>>>,
    open: Option<Reply<Option<PathBuf>>>,
    read: Option<Reply<ImageData>>,
    copy: Option<Reply<ClipboardResult>>,
    save: Option<Reply<SaveResult>>,
    permission: Option<Reply<PermissionStatus>>,
    notices: Vec<Notice>,
}

/// Takes a finished reply out of its slot
fn poll_slot<T>(slot: &mut Option<Reply<T>>) -> Option<ShellResult<T>> {
    let receiver = slot.as_mut()?;
    let result = match receiver.try_recv() {
        Ok(Some(result)) => result,
        Ok(None) => return None,
        Err(oneshot::Canceled) => Err(ShellError::Dropped),
    };
    *slot = None;
    Some(result)
}

fn start<T>(slot: &mut Option<Reply<T>>, kind: RequestKind, request: impl FnOnce() -> Reply<T>) -> EditorResult {
    if slot.is_some() {
        debug!("Rejected {} request, one is already running", kind);
        return Err(EditorError::RequestInFlight(kind));
    }
    *slot = Some(request());
    Ok(())
}

impl<S: Shell> EditorController<S> {
    pub fn new(mut shell: S, state: EditorState) -> Self {
        let triggers = shell.take_capture_triggers();
        Self {
            shell,
            state,
            viewport: Vec2::new(1200.0, 800.0),
            triggers,
            capture: None,
            open: None,
            read: None,
            copy: None,
            save: None,
            permission: None,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Area new images are fitted into
    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn in_flight(&self, kind: RequestKind) -> bool {
        match kind {
            RequestKind::Capture => self.capture.is_some(),
            RequestKind::Open => self.open.is_some(),
            RequestKind::ReadImage => self.read.is_some(),
            RequestKind::Copy => self.copy.is_some(),
            RequestKind::Save => self.save.is_some(),
            RequestKind::Permission => self.permission.is_some(),
        }
    }

    /// True while anything is waiting on the shell
    pub fn is_busy(&self) -> bool {
        self.capture.is_some()
            || self.open.is_some()
            || self.read.is_some()
            || self.copy.is_some()
            || self.save.is_some()
            || self.permission.is_some()
    }

    pub fn request_capture(&mut self) -> EditorResult {
        let shell = &self.shell;
        start(&mut self.capture, RequestKind::Capture, || shell.capture_screen_region())
    }

    pub fn request_open(&mut self) -> EditorResult {
        let shell = &self.shell;
        start(&mut self.open, RequestKind::Open, || shell.open_image_file())
    }

    pub fn request_read(&mut self, path: PathBuf) -> EditorResult {
        let shell = &self.shell;
        start(&mut self.read, RequestKind::ReadImage, || shell.read_image_as_data(path))
    }

    /// Flattens now and hands PNG bytes to the clipboard
    pub fn request_copy(&mut self) -> EditorResult {
        if self.copy.is_some() {
            return Err(EditorError::RequestInFlight(RequestKind::Copy));
        }
        let png = self.state.export(ExportFormat::Png)?;
        let shell = &self.shell;
        start(&mut self.copy, RequestKind::Copy, || shell.write_image_to_clipboard(png))
    }

    pub fn request_save(&mut self) -> EditorResult {
        if self.save.is_some() {
            return Err(EditorError::RequestInFlight(RequestKind::Save));
        }
        let export = self.state.flatten_for_export()?;
        let shell = &self.shell;
        start(&mut self.save, RequestKind::Save, || {
            shell.write_image_to_file(export, ExportFormat::default())
        })
    }

    pub fn request_permission_check(&mut self) -> EditorResult {
        let shell = &self.shell;
        start(&mut self.permission, RequestKind::Permission, || {
            shell.query_screen_capture_permission()
        })
    }

    pub fn open_permission_settings(&self) {
        self.shell.open_capture_permission_settings();
    }

    /// Applies finished requests and pending triggers, returns what happened
    pub fn poll(&mut self) -> Vec<Notice> {
        self.poll_triggers();

        if let Some(result) = poll_slot(&mut self.capture) {
            match result {
                Ok(Some(path)) => self.read_after(path),
                Ok(None) => debug!("Capture produced no file"),
                Err(err) => self.fail("Screen capture", &err),
            }
        }

        if let Some(result) = poll_slot(&mut self.open) {
            match result {
                Ok(Some(path)) => self.read_after(path),
                Ok(None) => debug!("Open dialog cancelled"),
                Err(err) => self.fail("Open image", &err),
            }
        }

        if let Some(result) = poll_slot(&mut self.read) {
            match result {
                Ok(data) => self.load(&data.bytes),
                Err(err) => self.fail("Read image", &err),
            }
        }

        if let Some(result) = poll_slot(&mut self.copy) {
            match result {
                Ok(ClipboardResult { success: true, .. }) => {
                    info!("Copied to clipboard");
                    self.notices.push(Notice::Copied);
                }
                Ok(ClipboardResult { error, .. }) => {
                    let message = error.unwrap_or_else(|| "unknown clipboard error".to_owned());
                    self.fail("Copy", &message);
                }
                Err(err) => self.fail("Copy", &err),
            }
        }

        if let Some(result) = poll_slot(&mut self.save) {
            match result {
                Ok(SaveResult {
                    success: true,
                    file_path,
                    ..
                }) => self.notices.push(Notice::Saved(file_path.unwrap_or_default())),
                Ok(SaveResult { cancelled: true, .. }) => debug!("Save cancelled"),
                Ok(SaveResult { error, .. }) => {
                    let message = error.unwrap_or_else(|| "unknown save error".to_owned());
                    self.fail("Save", &message);
                }
                Err(err) => self.fail("Save", &err),
            }
        }

        if let Some(result) = poll_slot(&mut self.permission) {
            match result {
                Ok(PermissionStatus::Granted) => debug!("Screen capture permission granted"),
                Ok(status) => {
                    warn!("Screen capture permission: {:?}", status);
                    self.notices.push(Notice::PermissionRequired);
                }
                Err(err) => self.fail("Permission check", &err),
            }
        }

        std::mem::take(&mut self.notices)
    }

    fn poll_triggers(&mut self) {
        let Some(triggers) = &mut self.triggers else {
            return;
        };

        let mut pending = Vec::new();
        let mut closed = false;
        loop {
            match triggers.try_recv() {
                Ok(trigger) => pending.push(trigger),
                Err(mpsc::TryRecvError::Closed) => {
                    closed = true;
                    break;
                }
                // Nothing queued right now
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }
        if closed {
            debug!("Capture trigger source closed");
            self.triggers = None;
        }

        for trigger in pending {
            self.handle_trigger(trigger);
        }
    }

    /// Loads an image pushed from outside the request cycle
    pub fn handle_trigger(&mut self, trigger: CaptureTrigger) {
        match trigger {
            CaptureTrigger::Path(path) => self.read_after(path),
            CaptureTrigger::Bytes(bytes) => self.load(&bytes),
        }
    }

    fn read_after(&mut self, path: PathBuf) {
        if let Err(err) = self.request_read(path) {
            self.fail("Read image", &err);
        }
    }

    fn load(&mut self, bytes: &[u8]) {
        let viewport = self.viewport;
        match self.state.load_image_bytes(bytes, viewport) {
            Ok(()) => self.notices.push(Notice::Loaded),
            Err(err) => self.fail("Load image", &err),
        }
    }

    fn fail(&mut self, what: &str, err: &dyn std::fmt::Display) {
        error!("{} failed: {}", what, err);
        self.notices.push(Notice::Failed(format!("{what} failed: {err}")));
    }
}
