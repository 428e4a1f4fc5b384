use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;

use eframe_snapmark::shell::{
    self, CaptureTrigger, ClipboardResult, ImageData, PermissionStatus, Reply, RequestKind, SaveResult, ShellError,
    ShellResult,
};
use eframe_snapmark::{EditorController, EditorError, EditorState, ExportFormat, FlattenedExport, Notice, Shell};
use egui::vec2;
use futures::channel::{mpsc, oneshot};
use image::{ImageFormat, Rgba, RgbaImage};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([30, 60, 90, 255]));
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
}

/// Scripted shell. Files are served from memory, hold_capture leaves the
/// capture reply pending until the test resolves it.
#[derive(Default)]
struct MockShell {
    capture_result: Option<PathBuf>,
    hold_capture: bool,
    held: RefCell<Vec<oneshot::Sender<ShellResult<Option<PathBuf>>>>>,
    files: HashMap<PathBuf, Vec<u8>>,
    permission: Option<PermissionStatus>,
    save_cancelled: bool,
    clipboard: RefCell<Vec<Vec<u8>>>,
    saved: RefCell<Vec<(usize, usize, ExportFormat)>>,
    triggers: Option<mpsc::UnboundedReceiver<CaptureTrigger>>,
}

impl Shell for MockShell {
    fn capture_screen_region(&self) -> Reply<Option<PathBuf>> {
        if self.hold_capture {
            let (sender, receiver) = oneshot::channel();
            self.held.borrow_mut().push(sender);
            return receiver;
        }
        shell::reply(Ok(self.capture_result.clone()))
    }

    fn open_image_file(&self) -> Reply<Option<PathBuf>> {
        shell::reply(Ok(self.files.keys().next().cloned()))
    }

    fn read_image_as_data(&self, path: PathBuf) -> Reply<ImageData> {
        let result = match self.files.get(&path) {
            Some(bytes) => Ok(ImageData::new(bytes.clone(), &path)),
            None => Err(ShellError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))),
        };
        shell::reply(result)
    }

    fn write_image_to_clipboard(&self, png: Vec<u8>) -> Reply<ClipboardResult> {
        self.clipboard.borrow_mut().push(png);
        shell::reply(Ok(ClipboardResult::ok()))
    }

    fn write_image_to_file(&self, image: FlattenedExport, default_format: ExportFormat) -> Reply<SaveResult> {
        if self.save_cancelled {
            return shell::reply(Ok(SaveResult::cancelled()));
        }
        let (width, height) = image.image().dimensions();
        self.saved
            .borrow_mut()
            .push((width as usize, height as usize, default_format));
        shell::reply(Ok(SaveResult::saved(PathBuf::from("/tmp/out.png"))))
    }

    fn query_screen_capture_permission(&self) -> Reply<PermissionStatus> {
        shell::reply(Ok(self.permission.unwrap_or(PermissionStatus::Granted)))
    }

    fn open_capture_permission_settings(&self) {}

    fn take_capture_triggers(&mut self) -> Option<mpsc::UnboundedReceiver<CaptureTrigger>> {
        self.triggers.take()
    }
}

fn capture_path() -> PathBuf {
    PathBuf::from("/tmp/capture.png")
}

fn shell_with_capture() -> MockShell {
    let mut files = HashMap::new();
    files.insert(capture_path(), png_bytes(2000, 1200));
    MockShell {
        capture_result: Some(capture_path()),
        files,
        ..MockShell::default()
    }
}

fn controller(shell: MockShell) -> EditorController<MockShell> {
    let mut controller = EditorController::new(shell, EditorState::default());
    controller.set_viewport(vec2(1200.0, 800.0));
    controller
}

#[test]
fn test_capture_loads_image() {
    let mut controller = controller(shell_with_capture());
    controller.request_capture().unwrap();

    let notices = controller.poll();
    assert_eq!(notices, vec![Notice::Loaded]);
    let surface = controller.state().surface();
    assert_eq!((surface.width(), surface.height()), (1200, 720));
    assert_eq!(surface.background().unwrap().source().size(), [2000, 1200]);
    assert!(!controller.is_busy());
}

#[test]
fn test_cancelled_capture_leaves_state_untouched() {
    let mut controller = controller(MockShell::default());
    controller.request_capture().unwrap();

    assert!(controller.poll().is_empty());
    assert!(!controller.state().has_image());
    assert!(!controller.in_flight(RequestKind::Capture));
}

#[test]
fn test_open_dialog_loads_image() {
    let mut controller = controller(shell_with_capture());
    controller.request_open().unwrap();
    assert_eq!(controller.poll(), vec![Notice::Loaded]);
    assert!(controller.state().has_image());
}

#[test]
fn test_unreadable_file_reports_failure() {
    let mut controller = controller(MockShell::default());
    controller.request_read(PathBuf::from("/tmp/missing.png")).unwrap();

    let notices = controller.poll();
    assert!(matches!(notices.as_slice(), [Notice::Failed(_)]));
    assert!(!controller.state().has_image());
}

#[test]
fn test_undecodable_bytes_keep_previous_image() {
    let mut shell = shell_with_capture();
    shell.files.insert(PathBuf::from("/tmp/broken.png"), b"not an image".to_vec());
    let mut controller = controller(shell);
    controller.request_capture().unwrap();
    controller.poll();

    controller.request_read(PathBuf::from("/tmp/broken.png")).unwrap();
    let notices = controller.poll();
    assert!(matches!(notices.as_slice(), [Notice::Failed(_)]));
    assert_eq!(controller.state().surface().background().unwrap().source().size(), [2000, 1200]);
}

#[test]
fn test_one_capture_in_flight() {
    let mut shell = shell_with_capture();
    shell.hold_capture = true;
    let mut controller = controller(shell);

    controller.request_capture().unwrap();
    assert!(matches!(
        controller.request_capture(),
        Err(EditorError::RequestInFlight(RequestKind::Capture))
    ));
    assert!(controller.poll().is_empty());
    assert!(controller.in_flight(RequestKind::Capture));

    let sender = controller.shell().held.borrow_mut().remove(0);
    sender.send(Ok(Some(capture_path()))).unwrap();
    assert_eq!(controller.poll(), vec![Notice::Loaded]);
    assert!(!controller.in_flight(RequestKind::Capture));
    assert!(controller.request_capture().is_ok());
}

#[test]
fn test_dropped_reply_is_reported() {
    let mut shell = MockShell::default();
    shell.hold_capture = true;
    let mut controller = controller(shell);

    controller.request_capture().unwrap();
    controller.shell().held.borrow_mut().clear();
    let notices = controller.poll();
    assert!(matches!(notices.as_slice(), [Notice::Failed(_)]));
    assert!(!controller.is_busy());
}

#[test]
fn test_copy_puts_png_on_clipboard() {
    let mut controller = controller(shell_with_capture());
    controller.request_capture().unwrap();
    controller.poll();

    controller.request_copy().unwrap();
    assert_eq!(controller.poll(), vec![Notice::Copied]);

    let clipboard = controller.shell().clipboard.borrow();
    let decoded = image::load_from_memory(&clipboard[0]).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1000, 600));
}

#[test]
fn test_copy_without_image_fails_fast() {
    let mut controller = controller(MockShell::default());
    assert!(matches!(controller.request_copy(), Err(EditorError::NoImage)));
    assert!(controller.shell().clipboard.borrow().is_empty());
}

#[test]
fn test_save_reports_path() {
    let mut controller = controller(shell_with_capture());
    controller.request_capture().unwrap();
    controller.poll();

    controller.request_save().unwrap();
    assert_eq!(controller.poll(), vec![Notice::Saved(PathBuf::from("/tmp/out.png"))]);
    assert_eq!(controller.shell().saved.borrow()[0], (1000, 600, ExportFormat::Png));
}

#[test]
fn test_cancelled_save_is_silent() {
    let mut shell = shell_with_capture();
    shell.save_cancelled = true;
    let mut controller = controller(shell);
    controller.request_capture().unwrap();
    controller.poll();

    controller.request_save().unwrap();
    assert!(controller.poll().is_empty());
    assert!(controller.state().has_image());
}

#[test]
fn test_missing_permission_is_advisory() {
    let mut shell = shell_with_capture();
    shell.permission = Some(PermissionStatus::Denied);
    let mut controller = controller(shell);

    controller.request_permission_check().unwrap();
    assert_eq!(controller.poll(), vec![Notice::PermissionRequired]);

    controller.request_open().unwrap();
    assert_eq!(controller.poll(), vec![Notice::Loaded]);
}

#[test]
fn test_granted_permission_is_silent() {
    let mut controller = controller(MockShell::default());
    controller.request_permission_check().unwrap();
    assert!(controller.poll().is_empty());
}

#[test]
fn test_triggers_load_images() {
    let (sender, receiver) = mpsc::unbounded();
    let mut shell = shell_with_capture();
    shell.triggers = Some(receiver);
    let mut controller = controller(shell);

    sender.unbounded_send(CaptureTrigger::Bytes(png_bytes(640, 480))).unwrap();
    assert_eq!(controller.poll(), vec![Notice::Loaded]);
    assert_eq!(controller.state().surface().width(), 640);

    sender.unbounded_send(CaptureTrigger::Path(capture_path())).unwrap();
    drop(sender);
    assert_eq!(controller.poll(), vec![Notice::Loaded]);
    assert_eq!(controller.state().surface().width(), 1200);
    assert!(controller.poll().is_empty());
}
