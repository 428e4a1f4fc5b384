//! Boundary between the editor and the operating system.
//!
//! Every call returns immediately with a [`Reply`] that resolves once the
//! work is done off the UI thread. The editor polls replies once per frame.
//! Cancellation is reported as `Ok(None)`, never as an error.

use std::fmt;
use std::path::{Path, PathBuf};

use futures::channel::{mpsc, oneshot};
use thiserror::Error;

use crate::export::{ExportError, ExportFormat, FlattenedExport};
use crate::image_source::mime_for_path;

mod native;

pub use native::NativeShell;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("screen capture failed: {0}")]
    Capture(String),
    #[error("clipboard error: {0}")]
    Clipboard(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Export(#[from] ExportError),
    /// The worker went away without answering
    #[error("shell request was dropped")]
    Dropped,
}

pub type ShellResult<T> = Result<T, ShellError>;

/// Pending answer to a shell request
pub type Reply<T> = oneshot::Receiver<ShellResult<T>>;

/// Encoded image read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl ImageData {
    pub fn new(bytes: Vec<u8>, path: &Path) -> Self {
        Self {
            bytes,
            mime: mime_for_path(path).to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClipboardResult {
    pub success: bool,
    pub error: Option<String>,
}

impl ClipboardResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveResult {
    pub success: bool,
    pub file_path: Option<PathBuf>,
    pub cancelled: bool,
    pub error: Option<String>,
}

impl SaveResult {
    pub fn saved(path: PathBuf) -> Self {
        Self {
            success: true,
            file_path: Some(path),
            ..Self::default()
        }
    }

    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Restricted,
    NotDetermined,
}

/// Pushed by a hotkey or drag-and-drop source outside the request cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTrigger {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Kinds of request that are limited to one in flight at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Capture,
    Open,
    ReadImage,
    Copy,
    Save,
    Permission,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Capture => "capture",
            RequestKind::Open => "open",
            RequestKind::ReadImage => "read image",
            RequestKind::Copy => "copy",
            RequestKind::Save => "save",
            RequestKind::Permission => "permission",
        };
        f.write_str(name)
    }
}

pub trait Shell {
    /// Interactive region capture. `None` when the user cancelled.
    fn capture_screen_region(&self) -> Reply<Option<PathBuf>>;

    /// Native open dialog. `None` when the user cancelled.
    fn open_image_file(&self) -> Reply<Option<PathBuf>>;

    fn read_image_as_data(&self, path: PathBuf) -> Reply<ImageData>;

    /// Puts PNG bytes on the system clipboard
    fn write_image_to_clipboard(&self, png: Vec<u8>) -> Reply<ClipboardResult>;

    /// Asks for a destination and writes the export there, encoded after
    /// the chosen extension.
    fn write_image_to_file(&self, image: FlattenedExport, default_format: ExportFormat) -> Reply<SaveResult>;

    fn query_screen_capture_permission(&self) -> Reply<PermissionStatus>;

    /// Fire-and-forget, opens the OS privacy settings
    fn open_capture_permission_settings(&self);

    /// Receiver for out-of-band capture triggers, handed out once
    fn take_capture_triggers(&mut self) -> Option<mpsc::UnboundedReceiver<CaptureTrigger>> {
        None
    }
}

/// Reply that is already resolved
pub fn reply<T>(result: ShellResult<T>) -> Reply<T> {
    let (sender, receiver) = oneshot::channel();
    // The receiver is still alive, sending cannot fail
    let _ = sender.send(result);
    receiver
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_reply_is_immediately_ready() {
        let mut receiver = reply(Ok(PermissionStatus::Granted));
        assert!(matches!(receiver.try_recv(), Ok(Some(Ok(PermissionStatus::Granted)))));
    }

    #[test]
    fn image_data_mime_follows_path() {
        let data = ImageData::new(vec![1, 2, 3], Path::new("/tmp/capture.PNG"));
        assert_eq!(data.mime, "image/png");
    }
}
