#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use std::path::PathBuf;

use eframe_snapmark::SnapmarkApp;
use eframe_snapmark::shell::{CaptureTrigger, NativeShell};

// When compiling natively:
fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let shell = NativeShell::new();
    // An image path on the command line is opened right away
    if let Some(path) = std::env::args_os().nth(1) {
        let _ = shell
            .trigger_sender()
            .unbounded_send(CaptureTrigger::Path(PathBuf::from(path)));
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Snapmark")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };
    eframe::run_native(
        "snapmark",
        native_options,
        Box::new(|cc| Ok(Box::new(SnapmarkApp::new(cc, shell)))),
    )
}
