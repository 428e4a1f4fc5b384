use std::borrow::Cow;
use std::path::PathBuf;
use std::process::Command;
use std::thread;

use futures::channel::{mpsc, oneshot};
use futures::executor::block_on;
use log::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    CaptureTrigger, ClipboardResult, ImageData, PermissionStatus, Reply, SaveResult, Shell, ShellError,
    ShellResult,
};
use crate::export::{ExportFormat, FlattenedExport};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

#[cfg(target_os = "macos")]
const PERMISSION_SETTINGS_URL: &str = "x-apple.systempreferences:com.apple.preference.security?Privacy_ScreenCapture";

/// Desktop implementation backed by native dialogs, the system clipboard
/// and the platform's interactive capture command.
pub struct NativeShell {
    triggers: Option<mpsc::UnboundedReceiver<CaptureTrigger>>,
    trigger_sender: mpsc::UnboundedSender<CaptureTrigger>,
}

impl Default for NativeShell {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeShell {
    pub fn new() -> Self {
        let (trigger_sender, triggers) = mpsc::unbounded();
        Self {
            triggers: Some(triggers),
            trigger_sender,
        }
    }

    /// Sender for hotkey or command-line capture sources
    pub fn trigger_sender(&self) -> mpsc::UnboundedSender<CaptureTrigger> {
        self.trigger_sender.clone()
    }
}

/// Runs `job` on a worker thread and hands back its result
fn spawn_reply<T, F>(name: &str, job: F) -> Reply<T>
where
    T: Send + 'static,
    F: FnOnce() -> ShellResult<T> + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    let spawned = thread::Builder::new().name(format!("shell-{name}")).spawn(move || {
        let _ = sender.send(job());
    });
    if let Err(err) = spawned {
        error!("Failed to spawn shell worker {}: {}", name, err);
        // Dropping the sender inside the failed closure cancels the reply
    }
    receiver
}

fn capture_path() -> PathBuf {
    std::env::temp_dir().join(format!("snapmark-{}.png", Uuid::new_v4()))
}

#[cfg(target_os = "macos")]
fn capture_command(path: &std::path::Path) -> Command {
    let mut command = Command::new("screencapture");
    command.arg("-i").arg(path);
    command
}

#[cfg(not(target_os = "macos"))]
fn capture_command(path: &std::path::Path) -> Command {
    let mut command = Command::new("gnome-screenshot");
    command.arg("-a").arg("-f").arg(path);
    command
}

fn run_capture() -> ShellResult<Option<PathBuf>> {
    let path = capture_path();
    let status = capture_command(&path).status()?;
    if !status.success() {
        return Err(ShellError::Capture(format!("capture command exited with {status}")));
    }

    // An aborted selection exits cleanly but writes nothing
    match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > 0 => {
            info!("Captured region to {}", path.display());
            Ok(Some(path))
        }
        _ => {
            debug!("Capture cancelled");
            Ok(None)
        }
    }
}

#[cfg(target_os = "macos")]
fn preflight_permission() -> PermissionStatus {
    #[link(name = "CoreGraphics", kind = "framework")]
    unsafe extern "C" {
        fn CGPreflightScreenCaptureAccess() -> bool;
    }
    // SAFETY: no arguments, only reads the TCC state of this process
    if unsafe { CGPreflightScreenCaptureAccess() } {
        PermissionStatus::Granted
    } else {
        PermissionStatus::Denied
    }
}

#[cfg(not(target_os = "macos"))]
fn preflight_permission() -> PermissionStatus {
    PermissionStatus::Granted
}

fn copy_png_to_clipboard(png: &[u8]) -> ClipboardResult {
    let image = match image::load_from_memory(png) {
        Ok(image) => image.to_rgba8(),
        Err(err) => return ClipboardResult::failed(err.to_string()),
    };
    let mut clipboard = match arboard::Clipboard::new() {
        Ok(clipboard) => clipboard,
        Err(err) => return ClipboardResult::failed(err.to_string()),
    };
    let data = arboard::ImageData {
        width: image.width() as usize,
        height: image.height() as usize,
        bytes: Cow::Borrowed(image.as_raw()),
    };
    match clipboard.set_image(data) {
        Ok(()) => ClipboardResult::ok(),
        Err(err) => ClipboardResult::failed(err.to_string()),
    }
}

impl Shell for NativeShell {
    fn capture_screen_region(&self) -> Reply<Option<PathBuf>> {
        spawn_reply("capture", run_capture)
    }

    fn open_image_file(&self) -> Reply<Option<PathBuf>> {
        spawn_reply("open", || {
            let picked = block_on(
                rfd::AsyncFileDialog::new()
                    .set_title("Open image")
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file(),
            );
            Ok(picked.map(|handle| handle.path().to_path_buf()))
        })
    }

    fn read_image_as_data(&self, path: PathBuf) -> Reply<ImageData> {
        spawn_reply("read", move || {
            let bytes = std::fs::read(&path)?;
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(ImageData::new(bytes, &path))
        })
    }

    fn write_image_to_clipboard(&self, png: Vec<u8>) -> Reply<ClipboardResult> {
        spawn_reply("clipboard", move || {
            let result = copy_png_to_clipboard(&png);
            if let Some(err) = &result.error {
                warn!("Clipboard write failed: {}", err);
            }
            Ok(result)
        })
    }

    fn write_image_to_file(&self, image: FlattenedExport, default_format: ExportFormat) -> Reply<SaveResult> {
        spawn_reply("save", move || {
            let picked = block_on(
                rfd::AsyncFileDialog::new()
                    .set_title("Save image")
                    .set_file_name(format!("screenshot.{}", default_format.extension()))
                    .add_filter("PNG", &["png"])
                    .add_filter("JPEG", &["jpg", "jpeg"])
                    .save_file(),
            );
            let Some(handle) = picked else {
                return Ok(SaveResult::cancelled());
            };

            let path = handle.path().to_path_buf();
            let bytes = match image.encode_for_path(&path) {
                Ok(bytes) => bytes,
                Err(err) => return Ok(SaveResult::failed(err.to_string())),
            };
            match std::fs::write(&path, bytes) {
                Ok(()) => {
                    info!("Saved {}", path.display());
                    Ok(SaveResult::saved(path))
                }
                Err(err) => Ok(SaveResult::failed(err.to_string())),
            }
        })
    }

    fn query_screen_capture_permission(&self) -> Reply<PermissionStatus> {
        spawn_reply("permission", || Ok(preflight_permission()))
    }

    #[cfg(target_os = "macos")]
    fn open_capture_permission_settings(&self) {
        if let Err(err) = open::that(PERMISSION_SETTINGS_URL) {
            error!("Failed to open privacy settings: {}", err);
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn open_capture_permission_settings(&self) {
        info!("Screen capture needs no extra permission on this platform");
    }

    fn take_capture_triggers(&mut self) -> Option<mpsc::UnboundedReceiver<CaptureTrigger>> {
        self.triggers.take()
    }
}
